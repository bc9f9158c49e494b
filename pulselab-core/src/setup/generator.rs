//! Entry/setup generator.
//!
//! A gating state machine over a finished assessment: minimum gate, timeframe
//! direction resolution, entry-rule match, level computation, sizing,
//! confidence. Any gate can bail out early with a structured
//! `NoSetup { reason }`; there is no fatal path.
//!
//! The reversal rule is defined for LONG only. The rule set has no SHORT
//! mirror; a SHORT candidate that misses the trend rule gets no second chance.

use std::collections::BTreeMap;

use crate::config::AnalysisConfig;
use crate::domain::{
    round1, round2, Direction, EntryRule, GlobalAssessment, SetupDecision, TradeSetup,
};
use crate::extractors::risk;
use crate::scoring::consolidator;

/// Trend rule must satisfy at least this many of its 5 conditions.
pub const TREND_MIN_CONDITIONS: usize = 3;
/// Reversal rule must satisfy at least this many of its 4 conditions.
pub const REVERSAL_MIN_CONDITIONS: usize = 3;
/// Stop is pushed this many ATRs past the nearest support/resistance.
pub const STOP_LEVEL_ATR: f64 = 0.5;
/// Hard stop distance in ATRs when no level is closer.
pub const STOP_MAX_ATR: f64 = 0.75;
/// Target distance in ATRs when no level caps it sooner.
pub const TARGET_ATR: f64 = 1.5;
/// ATR% above this earns a volatility warning on the setup.
pub const HIGH_ATR_PCT: f64 = 3.5;
/// Target closer than this fraction of entry earns a warning.
pub const NEAR_TARGET_FRAC: f64 = 0.005;

/// RSI trend bands, 20 points wide, shifted per direction.
const RSI_TREND_BAND_LONG: (f64, f64) = (45.0, 65.0);
const RSI_TREND_BAND_SHORT: (f64, f64) = (35.0, 55.0);

/// Indicator readings the generator needs beyond the assessment itself,
/// assembled by the pipeline from extractor detail output.
#[derive(Debug, Clone)]
pub struct SetupContext {
    pub current_price: f64,
    pub atr: f64,
    /// ATR as percent of price.
    pub atr_pct: f64,
    pub nearest_support: f64,
    pub nearest_resistance: f64,
    pub funding_rate: f64,
    pub volume_ratio: f64,
    pub volume_delta: f64,
    pub bullish_divergence: bool,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub rsi: f64,
    pub adx: f64,
    pub technical_score: f64,
    pub volume_score: f64,
    pub account_balance: f64,
}

/// Run the gating state machine.
///
/// `timeframes` is the optional multi-timeframe vote set; when present it
/// resolves the trade direction by non-neutral majority, overriding the
/// primary read. When absent the primary direction stands and alignment
/// reads 100%.
pub fn generate(
    assessment: &GlobalAssessment,
    ctx: &SetupContext,
    timeframes: Option<&BTreeMap<String, GlobalAssessment>>,
    config: &AnalysisConfig,
) -> SetupDecision {
    // Gate 1: minimum conditions.
    if assessment.global_score < config.min_score {
        return SetupDecision::no_setup(format!(
            "minimum conditions unmet: score {:.2} below {:.1}",
            assessment.global_score, config.min_score
        ));
    }
    if assessment.confidence < config.min_confidence {
        return SetupDecision::no_setup(format!(
            "minimum conditions unmet: confidence {:.1} below {:.0}",
            assessment.confidence, config.min_confidence
        ));
    }
    if assessment.direction == Direction::Neutral {
        return SetupDecision::no_setup("minimum conditions unmet: direction is neutral");
    }

    // Gate 2: direction resolution. Multi-timeframe votes recompute the
    // direction: the side carrying the larger share of the non-neutral votes
    // wins — even against the primary read — provided it clears the
    // agreement threshold. A tie or an all-neutral vote set clears nothing.
    let (direction, alignment_pct) = match timeframes {
        Some(votes) if !votes.is_empty() => {
            let long_pct = consolidator::direction_agreement(votes, Direction::Long);
            let short_pct = consolidator::direction_agreement(votes, Direction::Short);
            let (resolved, pct) = if long_pct >= short_pct {
                (Direction::Long, long_pct)
            } else {
                (Direction::Short, short_pct)
            };
            if pct < config.mtf_min_agreement_pct {
                return SetupDecision::no_setup(format!(
                    "timeframe alignment {pct:.1}% below {:.0}%",
                    config.mtf_min_agreement_pct
                ));
            }
            (resolved, pct)
        }
        _ => (assessment.direction, 100.0),
    };

    // Gate 3: entry rules, first match wins.
    let (rule, conditions_met) = match match_rule(direction, ctx) {
        Some(matched) => matched,
        None => return SetupDecision::no_setup("entry rules not satisfied"),
    };

    // Gate 4: levels.
    let entry = ctx.current_price;
    if entry <= 0.0 || ctx.atr < 0.0 {
        return SetupDecision::no_setup("degenerate price or volatility input");
    }
    let (stop_loss, take_profit) = levels(direction, entry, ctx);
    let stop_distance = (entry - stop_loss).abs();
    let target_distance = (take_profit - entry).abs();
    let risk_reward = if stop_distance > 0.0 {
        target_distance / stop_distance
    } else {
        0.0
    };

    // Gate 5: sizing.
    let size = risk::position_size(
        ctx.account_balance,
        config.risk_per_trade_pct,
        entry,
        stop_loss,
    );

    // Gate 6: confidence scaling.
    let rule_factor = (conditions_met.len() as f64 / 5.0).min(1.0);
    let confidence = (assessment.confidence * rule_factor * (alignment_pct / 100.0)).min(95.0);

    let mut warnings = Vec::new();
    if risk_reward < 1.0 {
        warnings.push(format!("risk:reward {risk_reward:.2} below 1.0"));
    }
    if ctx.atr_pct > HIGH_ATR_PCT {
        warnings.push(format!("high volatility: ATR {:.2}% of price", ctx.atr_pct));
    }
    if target_distance < entry * NEAR_TARGET_FRAC {
        warnings.push("target within 0.5% of entry".to_string());
    }

    SetupDecision::Setup(TradeSetup {
        direction,
        confidence: round1(confidence),
        entry: round2(entry),
        stop_loss: round2(stop_loss),
        take_profit: round2(take_profit),
        position_size_usd: round2(size.size_usd),
        risk_amount_usd: round2(size.risk_amount_usd),
        risk_reward_ratio: round2(risk_reward),
        rule,
        conditions_met,
        warnings,
    })
}

/// Evaluate the rule families in priority order: trend-following, then the
/// LONG-only reversal.
fn match_rule(direction: Direction, ctx: &SetupContext) -> Option<(EntryRule, Vec<String>)> {
    let trend = trend_conditions(direction, ctx);
    if trend.len() >= TREND_MIN_CONDITIONS {
        return Some((EntryRule::TrendFollowing, trend));
    }
    if direction == Direction::Long {
        let reversal = reversal_conditions(ctx);
        if reversal.len() >= REVERSAL_MIN_CONDITIONS {
            return Some((EntryRule::Reversal, reversal));
        }
    }
    None
}

fn trend_conditions(direction: Direction, ctx: &SetupContext) -> Vec<String> {
    let (ema_aligned, band) = match direction {
        Direction::Short => (ctx.ema_fast < ctx.ema_slow, RSI_TREND_BAND_SHORT),
        _ => (ctx.ema_fast > ctx.ema_slow, RSI_TREND_BAND_LONG),
    };
    let mut met = Vec::new();
    if ema_aligned {
        met.push("ema alignment".to_string());
    }
    if ctx.rsi >= band.0 && ctx.rsi <= band.1 {
        met.push("rsi in trend band".to_string());
    }
    if ctx.adx > 25.0 {
        met.push("adx trend strength".to_string());
    }
    if ctx.volume_ratio > 1.0 {
        met.push("volume expansion".to_string());
    }
    if ctx.technical_score >= 7.0 && ctx.volume_score >= 7.0 {
        met.push("technical and volume categories strong".to_string());
    }
    met
}

fn reversal_conditions(ctx: &SetupContext) -> Vec<String> {
    let mut met = Vec::new();
    if ctx.rsi < 30.0 {
        met.push("rsi oversold".to_string());
    }
    if ctx.funding_rate < -0.01 {
        met.push("negative funding".to_string());
    }
    if ctx.volume_delta > 0.0 && ctx.volume_ratio > 1.0 {
        met.push("buy-side volume expansion".to_string());
    }
    if ctx.bullish_divergence {
        met.push("bullish divergence".to_string());
    }
    met
}

/// Stop and target from the nearest structure level and ATR.
///
/// LONG: stop sits below support by half an ATR but never farther than
/// 0.75 ATR from entry; target is resistance or 1.5 ATR, whichever is
/// nearer. SHORT mirrors both.
fn levels(direction: Direction, entry: f64, ctx: &SetupContext) -> (f64, f64) {
    match direction {
        Direction::Short => {
            let stop =
                (ctx.nearest_resistance + STOP_LEVEL_ATR * ctx.atr).min(entry + STOP_MAX_ATR * ctx.atr);
            let target = (entry - TARGET_ATR * ctx.atr).max(ctx.nearest_support);
            (stop, target)
        }
        _ => {
            let stop =
                (ctx.nearest_support - STOP_LEVEL_ATR * ctx.atr).max(entry - STOP_MAX_ATR * ctx.atr);
            let target = (entry + TARGET_ATR * ctx.atr).min(ctx.nearest_resistance);
            (stop, target)
        }
    }
}
