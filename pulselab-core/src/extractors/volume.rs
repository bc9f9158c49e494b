//! Volume category extractor.
//!
//! Scores volume ratio (3.0), buy/sell delta (3.0), volume-profile position
//! (2.0, constant baseline) and breakout confirmation (2.0) — bucket maxima
//! sum to the category max of 10. The breakout weight is 2.0 by intent, not
//! typo: at the 1.5 the tier sizing elsewhere would suggest, the maxima
//! would total 9.5 and the category max would be unreachable.
//!
//! Delta uses exact trade prints when the feed provides them; otherwise it is
//! estimated from the shape of the current candle. Rolling 1h/4h/24h volume
//! sums are derived from the snapshot's declared timeframe, not from fixed
//! candle counts.

use std::collections::BTreeMap;

use crate::domain::{
    Candle, CategoryResult, IndicatorDetail, Timeframe, TradePrint, TradeSide, VolumeProfile,
    VolumeProfileLevel,
};
use crate::error::AnalysisError;
use crate::extractors::rules::{detail, evaluate, TierOutcome};

pub const MAX_SCORE: f64 = 10.0;

/// Number of price bins in the volume profile histogram.
pub const PROFILE_BINS: usize = 30;
/// Fraction of total volume covered by the value area.
pub const VALUE_AREA_FRACTION: f64 = 0.70;
/// Candles averaged for the volume ratio baseline.
const RATIO_WINDOW: usize = 20;
/// Constant baseline for the profile-position bucket. The current price is
/// accepted by the interface but deliberately not measured against the POC;
/// compatibility tests pin this baseline.
const PROFILE_BASELINE_POINTS: f64 = 2.0;

/// Volume ratio, delta and profile measurements shared with the setup generator.
#[derive(Debug, Clone, Copy)]
pub struct VolumeReadings {
    pub ratio: f64,
    pub delta: f64,
    /// delta / current volume, 0.0 when the current candle has no volume.
    pub delta_ratio: f64,
}

/// Current volume divided by the mean of the trailing `RATIO_WINDOW` volumes
/// (mean of all candles when fewer are available). Zero baseline reads 1.0.
pub fn volume_ratio(candles: &[Candle]) -> f64 {
    let current = match candles.last() {
        Some(c) => c.volume,
        None => return 1.0,
    };
    let take = RATIO_WINDOW.min(candles.len());
    let window = &candles[candles.len() - take..];
    let mean = window.iter().map(|c| c.volume).sum::<f64>() / take as f64;
    if mean <= 0.0 {
        1.0
    } else {
        current / mean
    }
}

/// Buy/sell volume delta.
///
/// With trade prints: sum of buy sizes minus sum of sell sizes. Without:
/// estimated from the current candle shape as volume × (bullish_ratio − 0.5) × 2,
/// which maps a close at the high to +volume and a close at the low to −volume.
pub fn volume_delta(candles: &[Candle], trades: Option<&[TradePrint]>) -> f64 {
    if let Some(trades) = trades {
        return trades
            .iter()
            .map(|t| match t.side {
                TradeSide::Buy => t.size,
                TradeSide::Sell => -t.size,
            })
            .sum();
    }
    match candles.last() {
        Some(c) => c.volume * (c.bullish_ratio() - 0.5) * 2.0,
        None => 0.0,
    }
}

/// Measure ratio/delta for a snapshot window.
pub fn readings(candles: &[Candle], trades: Option<&[TradePrint]>) -> VolumeReadings {
    let ratio = volume_ratio(candles);
    let delta = volume_delta(candles, trades);
    let current = candles.last().map(|c| c.volume).unwrap_or(0.0);
    let delta_ratio = if current > 0.0 { delta / current } else { 0.0 };
    VolumeReadings {
        ratio,
        delta,
        delta_ratio,
    }
}

/// Build the volume-at-price histogram over the candle window.
///
/// The price axis [min low, max high] is divided into `PROFILE_BINS` equal
/// bins; each candle spreads its volume across the bins it overlaps, weighted
/// by the fraction of its range inside each bin, so total bin volume equals
/// total candle volume. A degenerate (zero-width) price range collapses to a
/// single level holding everything.
pub fn build_profile(candles: &[Candle]) -> Option<VolumeProfile> {
    if candles.is_empty() {
        return None;
    }

    let min_low = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
    let max_high = candles
        .iter()
        .map(|c| c.high)
        .fold(f64::NEG_INFINITY, f64::max);

    if !min_low.is_finite() || !max_high.is_finite() {
        return None;
    }

    let span = max_high - min_low;
    if span <= 0.0 {
        let total: f64 = candles.iter().map(|c| c.volume).sum();
        return Some(VolumeProfile {
            levels: vec![VolumeProfileLevel {
                price: min_low,
                volume: total,
            }],
            poc: min_low,
            vah: min_low,
            val: min_low,
        });
    }

    let bin_width = span / PROFILE_BINS as f64;
    let mut volumes = vec![0.0_f64; PROFILE_BINS];

    for candle in candles {
        let range = candle.high - candle.low;
        if range <= 0.0 {
            let idx = (((candle.low - min_low) / bin_width) as usize).min(PROFILE_BINS - 1);
            volumes[idx] += candle.volume;
            continue;
        }
        let first = (((candle.low - min_low) / bin_width) as usize).min(PROFILE_BINS - 1);
        let last = (((candle.high - min_low) / bin_width) as usize).min(PROFILE_BINS - 1);
        for (idx, volume) in volumes.iter_mut().enumerate().take(last + 1).skip(first) {
            let bin_lo = min_low + idx as f64 * bin_width;
            let bin_hi = bin_lo + bin_width;
            let overlap = (candle.high.min(bin_hi) - candle.low.max(bin_lo)).max(0.0);
            *volume += candle.volume * overlap / range;
        }
    }

    let levels: Vec<VolumeProfileLevel> = volumes
        .iter()
        .enumerate()
        .map(|(idx, &volume)| VolumeProfileLevel {
            price: min_low + (idx as f64 + 0.5) * bin_width,
            volume,
        })
        .collect();

    let poc_idx = volumes
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(idx, _)| idx)
        .unwrap_or(0);

    // Value area: take bins in volume-descending order until the cumulative
    // volume reaches the value-area fraction of the total.
    let total: f64 = volumes.iter().sum();
    let mut order: Vec<usize> = (0..PROFILE_BINS).collect();
    order.sort_by(|&a, &b| volumes[b].total_cmp(&volumes[a]));
    let mut cumulative = 0.0;
    let mut area: Vec<usize> = Vec::new();
    for idx in order {
        area.push(idx);
        cumulative += volumes[idx];
        if total > 0.0 && cumulative >= VALUE_AREA_FRACTION * total {
            break;
        }
    }
    let vah = area
        .iter()
        .map(|&i| levels[i].price)
        .fold(f64::NEG_INFINITY, f64::max);
    let val = area
        .iter()
        .map(|&i| levels[i].price)
        .fold(f64::INFINITY, f64::min);

    Some(VolumeProfile {
        poc: levels[poc_idx].price,
        vah,
        val,
        levels,
    })
}

/// Score the volume category.
pub fn extract(
    candles: &[Candle],
    trades: Option<&[TradePrint]>,
    timeframe: &Timeframe,
) -> Result<CategoryResult, AnalysisError> {
    if candles.iter().any(|c| c.is_void()) {
        return Err(AnalysisError::Degenerate(
            "non-finite candle data in volume extractor".into(),
        ));
    }

    let mut details = BTreeMap::new();
    let mut score = 0.0;

    let r = readings(candles, trades);

    // Volume ratio tiers at 1.5 / 1.2 / 0.8.
    let out = evaluate(
        &r.ratio,
        &[
            (&|v: &f64| *v >= 1.5, 3.0, "high"),
            (&|v: &f64| *v >= 1.2, 2.0, "elevated"),
            (&|v: &f64| *v >= 0.8, 1.0, "normal"),
        ],
        (0.5, "low"),
    );
    score += out.points;
    details.insert("ratio".to_string(), detail(r.ratio, out));

    // Delta strength relative to current volume.
    let abs_delta_ratio = r.delta_ratio.abs();
    let out = evaluate(
        &abs_delta_ratio,
        &[
            (&|v: &f64| *v > 0.30, 3.0, "strong"),
            (&|v: &f64| *v > 0.15, 2.0, "moderate"),
        ],
        (1.0, "weak"),
    );
    score += out.points;
    details.insert("delta".to_string(), detail(r.delta, out));

    // Profile position: constant baseline pending price-vs-POC context.
    let profile = build_profile(candles);
    let out = match &profile {
        Some(p) => {
            let current = candles.last().map(|c| c.close).unwrap_or(p.poc);
            profile_position(current, p)
        }
        None => TierOutcome {
            points: 0.0,
            label: "unavailable",
        },
    };
    score += out.points;
    details.insert(
        "profile_position".to_string(),
        detail(profile.as_ref().map(|p| p.poc).unwrap_or(0.0), out),
    );

    // Breakout confirmation: elevated volume plus a meaningful delta.
    let breakout = (r.ratio, r.delta_ratio);
    let out = evaluate(
        &breakout,
        &[(
            &|(ratio, dr): &(f64, f64)| *ratio > 1.3 && *dr > 0.2,
            2.0,
            "confirmed",
        )],
        (0.0, "unconfirmed"),
    );
    score += out.points;
    details.insert("breakout".to_string(), detail(r.delta_ratio, out));

    // Informational rolling sums, window sizes derived from the cadence.
    for (label, hours) in [("volume_1h", 1u32), ("volume_4h", 4), ("volume_24h", 24)] {
        let count = timeframe.candles_in_hours(hours).min(candles.len());
        let sum: f64 = candles[candles.len() - count..]
            .iter()
            .map(|c| c.volume)
            .sum();
        details.insert(
            label.to_string(),
            IndicatorDetail {
                value: crate::domain::round2(sum),
                status: "window sum".to_string(),
                points: 0.0,
            },
        );
    }

    Ok(CategoryResult::finalize(score, MAX_SCORE, details, vec![]))
}

/// Profile-position sub-score.
///
/// Accepts the current price so the interface is ready for a real
/// price-vs-POC measurement, but contributes a constant baseline for now;
/// see the design ledger for why the missing logic is not invented here.
fn profile_position(_current_price: f64, _profile: &VolumeProfile) -> TierOutcome {
    TierOutcome {
        points: PROFILE_BASELINE_POINTS,
        label: "baseline",
    }
}
