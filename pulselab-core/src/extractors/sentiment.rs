//! Sentiment category extractor.
//!
//! Scores funding rate (3.0), 24h open-interest change (2.5), order-book
//! imbalance (3.0) and — when the feed provides it — the long/short ratio
//! (1.5). The category max is therefore 10 with the long/short ratio and
//! 8.5 without; the variable denominator flows through `percentage`.
//!
//! Extreme funding is scored as reversal risk, not trend confirmation: the
//! dead zone around zero earns full marks and heavily one-sided funding the
//! lowest tier.

use std::collections::BTreeMap;

use crate::domain::{CategoryResult, OrderBookSnapshot};
use crate::error::AnalysisError;
use crate::extractors::rules::{detail, evaluate};

/// Category max with the optional long/short bucket present.
pub const MAX_SCORE: f64 = 10.0;
/// Category max when no long/short ratio is supplied.
pub const MAX_SCORE_WITHOUT_LONG_SHORT: f64 = 8.5;

/// Funding dead zone: within ±0.01 the market pays essentially nothing.
const FUNDING_DEAD_ZONE: f64 = 0.01;
/// Beyond ±0.05 funding is treated as crowded-side reversal risk.
const FUNDING_EXTREME: f64 = 0.05;

/// Score the sentiment category.
pub fn extract(
    funding_rate: f64,
    oi_change_24h: f64,
    order_book: &OrderBookSnapshot,
    long_short_ratio: Option<f64>,
) -> Result<CategoryResult, AnalysisError> {
    if !funding_rate.is_finite() || !oi_change_24h.is_finite() {
        return Err(AnalysisError::Degenerate(
            "non-finite funding or open-interest input".into(),
        ));
    }

    let mut details = BTreeMap::new();
    let mut warnings = Vec::new();
    let mut score = 0.0;
    let mut max_score = MAX_SCORE_WITHOUT_LONG_SHORT;

    // Funding: dead zone best, extremes worst.
    let out = evaluate(
        &funding_rate,
        &[
            (
                &|f: &f64| f.abs() <= FUNDING_DEAD_ZONE,
                3.0,
                "neutral",
            ),
            (
                &|f: &f64| f.abs() <= FUNDING_EXTREME,
                1.75,
                "moderate",
            ),
        ],
        (0.5, "extreme"),
    );
    score += out.points;
    details.insert("funding".to_string(), detail(funding_rate, out));
    if funding_rate.abs() > FUNDING_EXTREME {
        warnings.push(format!(
            "extreme funding rate {funding_rate:.4}: crowded side, reversal risk"
        ));
    }

    // Open-interest change, four tiers at >10 / >5 / >-5.
    let out = evaluate(
        &oi_change_24h,
        &[
            (&|o: &f64| *o > 10.0, 2.5, "strong build-up"),
            (&|o: &f64| *o > 5.0, 2.0, "building"),
            (&|o: &f64| *o > -5.0, 1.25, "stable"),
        ],
        (0.5, "unwinding"),
    );
    score += out.points;
    details.insert("oi_change".to_string(), detail(oi_change_24h, out));
    if oi_change_24h < -10.0 {
        warnings.push(format!(
            "open interest falling sharply ({oi_change_24h:.1}% in 24h)"
        ));
    }

    // Order-book imbalance: near-balanced books and strong one-sided
    // pressure both score well; a mild skew reads as noise.
    let ratio = order_book.bid_ask_ratio();
    let out = evaluate(
        &ratio,
        &[
            (
                &|r: &f64| (0.9..=1.1).contains(r),
                3.0,
                "balanced",
            ),
            (&|r: &f64| *r > 1.3, 2.5, "strong bid pressure"),
            (&|r: &f64| *r < 0.7, 2.5, "strong ask pressure"),
        ],
        (1.5, "mild skew"),
    );
    score += out.points;
    details.insert("bid_ask_ratio".to_string(), detail(ratio, out));
    if ratio > 2.0 {
        warnings.push(format!("order book heavily bid (ratio {ratio:.2})"));
    } else if ratio < 0.5 {
        warnings.push(format!("order book heavily offered (ratio {ratio:.2})"));
    }

    // Long/short positioning, only when the feed provides it.
    if let Some(ls) = long_short_ratio {
        if !ls.is_finite() {
            return Err(AnalysisError::Degenerate(
                "non-finite long/short ratio".into(),
            ));
        }
        max_score = MAX_SCORE;
        let out = evaluate(
            &ls,
            &[(
                &|v: &f64| (v - 0.5).abs() <= 0.1,
                1.5,
                "balanced",
            )],
            (1.0, "skewed positioning risk"),
        );
        score += out.points;
        details.insert("long_short".to_string(), detail(ls, out));
    }

    Ok(CategoryResult::finalize(score, max_score, details, warnings))
}
