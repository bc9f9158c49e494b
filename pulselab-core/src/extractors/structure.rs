//! Structure category extractor.
//!
//! Detects swing points with a prominence criterion, classifies the trend
//! pattern from the last swings, locates nearest support/resistance, and
//! checks for price/RSI divergence. Buckets: S/R proximity (4.0), pattern
//! (3.0), divergence (3.0) — summing to the category max of 10.
//!
//! The prominence threshold is an absolute price distance (default 50.0,
//! configurable): it is not normalized to asset scale, so low-priced assets
//! need a smaller threshold to register swings.

use std::collections::BTreeMap;

use crate::domain::{
    Candle, CategoryResult, Divergence, IndicatorDetail, LevelStrength, SupportResistance,
    SwingPoint, TrendPattern,
};
use crate::error::AnalysisError;
use crate::extractors::rules::{detail, evaluate};

pub const MAX_SCORE: f64 = 10.0;

/// Candles within this fraction of a level count as touches.
const TOUCH_TOLERANCE: f64 = 0.005;
/// Fallback S/R distance when no swing qualifies.
const FALLBACK_LEVEL_PCT: f64 = 0.02;
/// How many recent swings the pattern classifier compares.
const PATTERN_SWINGS: usize = 3;

/// Swing highs: local maxima of candle highs with at least `prominence`
/// price units of prominence.
///
/// Prominence of a peak is its height above the higher of the two minima
/// separating it from the nearest higher peak on each side (or the window
/// edge when no higher peak exists).
pub fn swing_highs(candles: &[Candle], prominence: f64) -> Vec<SwingPoint> {
    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    peak_indices(&highs, prominence)
        .into_iter()
        .map(|i| SwingPoint {
            index: i,
            price: candles[i].high,
            timestamp: candles[i].timestamp,
        })
        .collect()
}

/// Swing lows: local minima of candle lows, mirrored prominence criterion.
pub fn swing_lows(candles: &[Candle], prominence: f64) -> Vec<SwingPoint> {
    let negated: Vec<f64> = candles.iter().map(|c| -c.low).collect();
    peak_indices(&negated, prominence)
        .into_iter()
        .map(|i| SwingPoint {
            index: i,
            price: candles[i].low,
            timestamp: candles[i].timestamp,
        })
        .collect()
}

fn peak_indices(series: &[f64], prominence: f64) -> Vec<usize> {
    let n = series.len();
    let mut peaks = Vec::new();
    if n < 3 {
        return peaks;
    }

    let mut i = 1;
    while i < n - 1 {
        if series[i] <= series[i - 1] {
            i += 1;
            continue;
        }

        // Plateaus of equal values count as a single candidate peak.
        let mut j = i;
        while j + 1 < n && series[j + 1] == series[i] {
            j += 1;
        }
        if j + 1 >= n || series[j + 1] > series[i] {
            i = j + 1;
            continue;
        }

        // Walk outward on each side until a value exceeds the peak,
        // tracking the lowest point seen on the way.
        let mut left_min = f64::INFINITY;
        for k in (0..i).rev() {
            if series[k] > series[i] {
                break;
            }
            left_min = left_min.min(series[k]);
        }
        let mut right_min = f64::INFINITY;
        for &v in series.iter().skip(j + 1) {
            if v > series[i] {
                break;
            }
            right_min = right_min.min(v);
        }

        let base = left_min.max(right_min);
        let peak_prominence = if base.is_finite() {
            series[i] - base
        } else {
            0.0
        };
        if peak_prominence >= prominence {
            peaks.push(i);
        }
        i = j + 1;
    }
    peaks
}

fn monotonic(points: &[SwingPoint]) -> Option<bool> {
    // Some(true) strictly increasing, Some(false) strictly decreasing,
    // None for mixed or fewer than two points.
    if points.len() < 2 {
        return None;
    }
    let rising = points.windows(2).all(|w| w[1].price > w[0].price);
    let falling = points.windows(2).all(|w| w[1].price < w[0].price);
    match (rising, falling) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Classify the trend from up to the last `PATTERN_SWINGS` swing highs/lows.
///
/// Higher highs with higher lows → uptrend; lower highs with lower lows →
/// downtrend; no monotonic run on either side → consolidation; mixed
/// evidence → indeterminate.
pub fn classify_pattern(highs: &[SwingPoint], lows: &[SwingPoint]) -> TrendPattern {
    let recent_highs = &highs[highs.len().saturating_sub(PATTERN_SWINGS)..];
    let recent_lows = &lows[lows.len().saturating_sub(PATTERN_SWINGS)..];

    let highs_trend = monotonic(recent_highs);
    let lows_trend = monotonic(recent_lows);

    match (highs_trend, lows_trend) {
        (Some(true), Some(true)) => TrendPattern::Uptrend,
        (Some(false), Some(false)) => TrendPattern::Downtrend,
        (None, None) => TrendPattern::Consolidation,
        _ => TrendPattern::Indeterminate,
    }
}

/// Nearest support/resistance from swing points, with touch-count strength.
///
/// Supports are swing lows below the current price, resistances swing highs
/// above it; with no qualifying swing the level falls back to ±2% of price.
pub fn support_resistance(
    candles: &[Candle],
    highs: &[SwingPoint],
    lows: &[SwingPoint],
    current_price: f64,
) -> SupportResistance {
    let support = lows
        .iter()
        .map(|s| s.price)
        .filter(|&p| p < current_price)
        .fold(f64::NEG_INFINITY, f64::max);
    let resistance = highs
        .iter()
        .map(|s| s.price)
        .filter(|&p| p > current_price)
        .fold(f64::INFINITY, f64::min);

    let nearest_support = if support.is_finite() {
        support
    } else {
        current_price * (1.0 - FALLBACK_LEVEL_PCT)
    };
    let nearest_resistance = if resistance.is_finite() {
        resistance
    } else {
        current_price * (1.0 + FALLBACK_LEVEL_PCT)
    };

    SupportResistance {
        nearest_support,
        support_strength: LevelStrength::from_touches(count_touches(candles, nearest_support)),
        nearest_resistance,
        resistance_strength: LevelStrength::from_touches(count_touches(
            candles,
            nearest_resistance,
        )),
    }
}

fn count_touches(candles: &[Candle], level: f64) -> usize {
    if level <= 0.0 {
        return 0;
    }
    candles
        .iter()
        .filter(|c| {
            (c.high - level).abs() / level <= TOUCH_TOLERANCE
                || (c.low - level).abs() / level <= TOUCH_TOLERANCE
        })
        .count()
}

/// Price/RSI divergence at the last two swing lows (bullish) or highs (bearish).
///
/// `rsi_series` must be index-aligned with the candle window. A caller that
/// broadcasts a single RSI scalar across the window gets a flat series and
/// therefore can never observe a divergence; that is a caller-side
/// limitation, not a contract of this function.
pub fn detect_divergence(
    highs: &[SwingPoint],
    lows: &[SwingPoint],
    rsi_series: &[f64],
) -> Option<Divergence> {
    if let [.., prev, last] = lows {
        if last.index < rsi_series.len()
            && prev.index < rsi_series.len()
            && last.price < prev.price
            && rsi_series[last.index] > rsi_series[prev.index]
        {
            return Some(Divergence::Bullish);
        }
    }
    if let [.., prev, last] = highs {
        if last.index < rsi_series.len()
            && prev.index < rsi_series.len()
            && last.price > prev.price
            && rsi_series[last.index] < rsi_series[prev.index]
        {
            return Some(Divergence::Bearish);
        }
    }
    None
}

/// Score the structure category.
///
/// `rsi_series` should cover the candle window; when it is shorter the
/// divergence check is skipped with a warning.
pub fn extract(
    candles: &[Candle],
    rsi_series: &[f64],
    prominence: f64,
) -> Result<CategoryResult, AnalysisError> {
    if candles.iter().any(|c| c.is_void()) {
        return Err(AnalysisError::Degenerate(
            "non-finite candle data in structure extractor".into(),
        ));
    }

    let current_price = candles.last().map(|c| c.close).unwrap_or(0.0);
    let highs = swing_highs(candles, prominence);
    let lows = swing_lows(candles, prominence);

    let mut details = BTreeMap::new();
    let mut warnings = Vec::new();
    let mut score = 0.0;

    // S/R proximity: closer to a level means more actionable structure.
    let sr = support_resistance(candles, &highs, &lows, current_price);
    let nearest_distance_pct = if current_price > 0.0 {
        let to_support = (current_price - sr.nearest_support).abs() / current_price * 100.0;
        let to_resistance = (sr.nearest_resistance - current_price).abs() / current_price * 100.0;
        to_support.min(to_resistance)
    } else {
        100.0
    };
    let out = evaluate(
        &nearest_distance_pct,
        &[
            (&|d: &f64| *d < 0.5, 4.0, "at key level"),
            (&|d: &f64| *d < 1.0, 2.5, "near level"),
        ],
        (1.0, "far from levels"),
    );
    score += out.points;
    details.insert("sr_proximity".to_string(), detail(nearest_distance_pct, out));
    details.insert(
        "support".to_string(),
        IndicatorDetail {
            value: crate::domain::round2(sr.nearest_support),
            status: format!("{:?}", sr.support_strength).to_lowercase(),
            points: 0.0,
        },
    );
    details.insert(
        "resistance".to_string(),
        IndicatorDetail {
            value: crate::domain::round2(sr.nearest_resistance),
            status: format!("{:?}", sr.resistance_strength).to_lowercase(),
            points: 0.0,
        },
    );

    // Trend pattern. The detail value carries the ±1 code for the
    // direction vote.
    let pattern = classify_pattern(&highs, &lows);
    let out = evaluate(
        &pattern,
        &[
            (
                &|p: &TrendPattern| matches!(p, TrendPattern::Uptrend | TrendPattern::Downtrend),
                3.0,
                "trending structure",
            ),
            (
                &|p: &TrendPattern| *p == TrendPattern::Consolidation,
                1.5,
                "consolidation",
            ),
        ],
        (0.5, "indeterminate"),
    );
    score += out.points;
    details.insert(
        "pattern".to_string(),
        IndicatorDetail {
            value: pattern.as_code(),
            status: match pattern {
                TrendPattern::Uptrend => "uptrend".to_string(),
                TrendPattern::Downtrend => "downtrend".to_string(),
                TrendPattern::Consolidation => "consolidation".to_string(),
                TrendPattern::Indeterminate => "indeterminate".to_string(),
            },
            points: out.points,
        },
    );

    // Divergence.
    let divergence = if rsi_series.len() >= candles.len() {
        detect_divergence(&highs, &lows, rsi_series)
    } else {
        warnings.push("rsi series shorter than candle window; divergence skipped".to_string());
        None
    };
    let out = evaluate(
        &divergence,
        &[
            (
                &|d: &Option<Divergence>| *d == Some(Divergence::Bullish),
                3.0,
                "bullish divergence",
            ),
            (
                &|d: &Option<Divergence>| *d == Some(Divergence::Bearish),
                3.0,
                "bearish divergence",
            ),
        ],
        (0.5, "none"),
    );
    score += out.points;
    let divergence_code = match divergence {
        Some(Divergence::Bullish) => 1.0,
        Some(Divergence::Bearish) => -1.0,
        None => 0.0,
    };
    details.insert("divergence".to_string(), detail(divergence_code, out));

    Ok(CategoryResult::finalize(score, MAX_SCORE, details, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    // A small prominence threshold suits the ~100-priced test series;
    // the 50.0 production default targets BTC-scale prices.
    const PROM: f64 = 2.0;

    fn zigzag(levels: &[f64], half_cycle: usize) -> Vec<Candle> {
        // Piecewise-linear path visiting each level in turn.
        let mut closes = Vec::new();
        for pair in levels.windows(2) {
            for step in 0..half_cycle {
                let t = step as f64 / half_cycle as f64;
                closes.push(pair[0] + (pair[1] - pair[0]) * t);
            }
        }
        closes.push(*levels.last().unwrap());
        make_candles(&closes)
    }

    #[test]
    fn bucket_maxima_sum_to_max_score() {
        assert_eq!(4.0 + 3.0 + 3.0, MAX_SCORE);
    }

    #[test]
    fn swings_detected_in_zigzag() {
        let candles = zigzag(&[100.0, 110.0, 102.0, 112.0, 104.0, 114.0], 5);
        let highs = swing_highs(&candles, PROM);
        let lows = swing_lows(&candles, PROM);
        assert!(highs.len() >= 2, "expected swing highs, got {highs:?}");
        assert!(lows.len() >= 2, "expected swing lows, got {lows:?}");
    }

    #[test]
    fn ascending_zigzag_is_uptrend() {
        let candles = zigzag(&[100.0, 110.0, 103.0, 113.0, 106.0, 116.0, 109.0], 5);
        let highs = swing_highs(&candles, PROM);
        let lows = swing_lows(&candles, PROM);
        assert_eq!(classify_pattern(&highs, &lows), TrendPattern::Uptrend);
    }

    #[test]
    fn descending_zigzag_is_downtrend() {
        let candles = zigzag(&[120.0, 110.0, 117.0, 107.0, 114.0, 104.0, 111.0], 5);
        let highs = swing_highs(&candles, PROM);
        let lows = swing_lows(&candles, PROM);
        assert_eq!(classify_pattern(&highs, &lows), TrendPattern::Downtrend);
    }

    #[test]
    fn flat_series_is_consolidation() {
        let candles = make_candles(&[100.0; 40]);
        let highs = swing_highs(&candles, PROM);
        let lows = swing_lows(&candles, PROM);
        assert_eq!(classify_pattern(&highs, &lows), TrendPattern::Consolidation);
    }

    #[test]
    fn support_resistance_fallback_without_swings() {
        let candles = make_candles(&[100.0; 10]);
        let sr = support_resistance(&candles, &[], &[], 100.0);
        assert!((sr.nearest_support - 98.0).abs() < 1e-9);
        assert!((sr.nearest_resistance - 102.0).abs() < 1e-9);
    }

    #[test]
    fn bullish_divergence_lower_low_higher_rsi() {
        let candles = zigzag(&[110.0, 100.0, 108.0, 98.0, 106.0], 5);
        let lows = swing_lows(&candles, PROM);
        assert!(lows.len() >= 2);
        // RSI series rising at the later swing low despite the lower price low
        let mut rsi = vec![50.0; candles.len()];
        let prev = lows[lows.len() - 2].index;
        let last = lows[lows.len() - 1].index;
        rsi[prev] = 25.0;
        rsi[last] = 35.0;
        assert_eq!(
            detect_divergence(&[], &lows, &rsi),
            Some(Divergence::Bullish)
        );
    }

    #[test]
    fn no_divergence_on_flat_rsi_broadcast() {
        // A caller broadcasting one scalar across the window cannot
        // produce a divergence by construction.
        let candles = zigzag(&[110.0, 100.0, 108.0, 98.0, 106.0], 5);
        let highs = swing_highs(&candles, PROM);
        let lows = swing_lows(&candles, PROM);
        let rsi = vec![42.0; candles.len()];
        assert_eq!(detect_divergence(&highs, &lows, &rsi), None);
    }

    #[test]
    fn short_rsi_series_skips_divergence_with_warning() {
        let candles = zigzag(&[110.0, 100.0, 108.0, 98.0, 106.0], 5);
        let r = extract(&candles, &[50.0], PROM).unwrap();
        assert!(r.warnings.iter().any(|w| w.contains("divergence skipped")));
        assert_eq!(r.detail_value("divergence"), Some(0.0));
    }

    #[test]
    fn prominence_filters_minor_wiggles() {
        let candles = zigzag(&[100.0, 101.0, 100.2, 101.2, 100.4], 4);
        let highs = swing_highs(&candles, 50.0);
        assert!(highs.is_empty(), "50-unit prominence should reject ~1-unit swings");
    }
}
