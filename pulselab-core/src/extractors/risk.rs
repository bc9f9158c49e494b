//! Risk category extractor plus pure sizing helpers.
//!
//! Scores account exposure (3.0), ATR% volatility (3.0), free margin (2.0)
//! and session drawdown (2.0) — bucket maxima sum to the category max of 10.
//! Drawdown only counts when the session PnL is negative.
//!
//! The sizing helpers implement classic fixed-fractional risk: risk a small
//! percentage of balance per trade, divide by the stop distance, cap the
//! resulting notional.

use std::collections::BTreeMap;

use crate::domain::{CategoryResult, Direction, PositionState};
use crate::error::AnalysisError;
use crate::extractors::rules::{detail, evaluate};

pub const MAX_SCORE: f64 = 10.0;

/// Position notional is never allowed past this fraction of balance.
pub const MAX_POSITION_FRACTION: f64 = 0.15;
/// Fallback position fraction when the stop distance is degenerate.
pub const FALLBACK_POSITION_FRACTION: f64 = 0.05;
/// Stop distance in ATR multiples used by `stop_take_profit`.
pub const STOP_ATR_MULTIPLE: f64 = 0.75;

/// Score the risk category from position state and volatility.
pub fn extract(
    position: &PositionState,
    atr_pct: f64,
    account_balance: f64,
) -> Result<CategoryResult, AnalysisError> {
    if !position.total_exposure_usd.is_finite()
        || !position.free_margin_usd.is_finite()
        || !position.session_pnl.is_finite()
        || !account_balance.is_finite()
        || !atr_pct.is_finite()
    {
        return Err(AnalysisError::Degenerate(
            "non-finite position or balance input".into(),
        ));
    }

    let mut details = BTreeMap::new();
    let mut warnings = Vec::new();
    let mut score = 0.0;

    // A zero balance reads as fully exposed with no margin.
    let exposure_pct = if account_balance > 0.0 {
        position.total_exposure_usd / account_balance * 100.0
    } else {
        100.0
    };
    let out = evaluate(
        &exposure_pct,
        &[
            (&|e: &f64| *e < 5.0, 3.0, "light"),
            (&|e: &f64| *e < 10.0, 2.25, "moderate"),
            (&|e: &f64| *e < 20.0, 1.25, "heavy"),
        ],
        (0.5, "overexposed"),
    );
    score += out.points;
    details.insert("exposure".to_string(), detail(exposure_pct, out));
    if exposure_pct > 15.0 {
        warnings.push(format!("exposure at {exposure_pct:.1}% of balance"));
    }

    // Volatility via ATR%.
    let out = evaluate(
        &atr_pct,
        &[
            (&|a: &f64| *a < 1.5, 3.0, "calm"),
            (&|a: &f64| *a < 3.0, 2.25, "normal"),
            (&|a: &f64| *a < 5.0, 1.25, "elevated"),
        ],
        (0.5, "extreme"),
    );
    score += out.points;
    details.insert("volatility".to_string(), detail(atr_pct, out));
    if atr_pct > 4.0 {
        warnings.push(format!("volatility elevated: ATR {atr_pct:.2}% of price"));
    }

    // Free margin relative to balance.
    let margin_pct = if account_balance > 0.0 {
        position.free_margin_usd / account_balance * 100.0
    } else {
        0.0
    };
    let out = evaluate(
        &margin_pct,
        &[
            (&|m: &f64| *m > 80.0, 2.0, "ample"),
            (&|m: &f64| *m > 60.0, 1.5, "comfortable"),
            (&|m: &f64| *m > 40.0, 0.75, "tight"),
        ],
        (0.25, "constrained"),
    );
    score += out.points;
    details.insert("free_margin".to_string(), detail(margin_pct, out));
    if margin_pct < 50.0 {
        warnings.push(format!("free margin down to {margin_pct:.1}% of balance"));
    }

    // Session drawdown, counted only while the session is underwater.
    let drawdown_pct = if position.session_pnl < 0.0 {
        let base = if position.session_start_balance > 0.0 {
            position.session_start_balance
        } else {
            account_balance
        };
        if base > 0.0 {
            -position.session_pnl / base * 100.0
        } else {
            100.0
        }
    } else {
        0.0
    };
    let out = evaluate(
        &drawdown_pct,
        &[
            (&|d: &f64| *d < 2.0, 2.0, "contained"),
            (&|d: &f64| *d < 5.0, 1.25, "notable"),
            (&|d: &f64| *d < 10.0, 0.75, "serious"),
        ],
        (0.25, "severe"),
    );
    score += out.points;
    details.insert("session_drawdown".to_string(), detail(drawdown_pct, out));
    if drawdown_pct > 8.0 {
        warnings.push(format!("session drawdown at {drawdown_pct:.1}%"));
    }

    Ok(CategoryResult::finalize(score, MAX_SCORE, details, warnings))
}

/// Volatility category derived from ATR%, for the optional volatility weight
/// in the scoring engine. Single bucket with max 10.
pub fn volatility_category(atr_pct: f64) -> CategoryResult {
    let out = evaluate(
        &atr_pct,
        &[
            (&|a: &f64| *a < 1.5, 10.0, "calm"),
            (&|a: &f64| *a < 3.0, 7.0, "normal"),
            (&|a: &f64| *a < 5.0, 4.0, "elevated"),
        ],
        (1.0, "extreme"),
    );
    let mut details = BTreeMap::new();
    details.insert("atr_pct".to_string(), detail(atr_pct, out));
    CategoryResult::finalize(out.points, MAX_SCORE, details, vec![])
}

/// Result of the fixed-fractional sizing computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSize {
    pub size_usd: f64,
    pub risk_amount_usd: f64,
}

/// Fixed-fractional position sizing.
///
/// risk_amount = balance × risk_pct / 100; size = risk_amount divided by the
/// stop distance as a fraction of entry, capped at 15% of balance. A
/// degenerate stop distance (or entry) falls back to 5% of balance.
pub fn position_size(balance: f64, risk_pct: f64, entry: f64, stop: f64) -> PositionSize {
    let risk_amount_usd = balance * risk_pct / 100.0;
    if balance <= 0.0 {
        return PositionSize {
            size_usd: 0.0,
            risk_amount_usd: 0.0,
        };
    }

    let stop_distance_frac = if entry > 0.0 {
        (entry - stop).abs() / entry
    } else {
        0.0
    };

    let size_usd = if stop_distance_frac > 0.0 {
        (risk_amount_usd / stop_distance_frac).min(balance * MAX_POSITION_FRACTION)
    } else {
        balance * FALLBACK_POSITION_FRACTION
    };

    PositionSize {
        size_usd,
        risk_amount_usd,
    }
}

/// ATR-based stop and target around an entry price.
///
/// Stop distance = 0.75 × ATR; target distance = stop distance × rr_ratio,
/// applied with the direction-appropriate sign. A NEUTRAL direction yields
/// the LONG-side computation (callers gate direction before sizing).
pub fn stop_take_profit(entry: f64, direction: Direction, atr: f64, rr_ratio: f64) -> (f64, f64) {
    let stop_distance = STOP_ATR_MULTIPLE * atr;
    let target_distance = stop_distance * rr_ratio;
    match direction {
        Direction::Short => (entry + stop_distance, entry - target_distance),
        _ => (entry - stop_distance, entry + target_distance),
    }
}
