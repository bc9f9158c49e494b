//! Multi-timeframe consolidation.
//!
//! Combines per-timeframe assessments into one weighted view. Scores are
//! blended with fixed timeframe weights, normalized by the sum of weights
//! actually present so partial timeframe sets stay on the 0..10 scale.
//! Direction is a majority vote over non-neutral assessments; a tie reads
//! NEUTRAL with zero agreement.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{round1, round2, Direction, GlobalAssessment};

/// Blend weight for an unrecognized timeframe label.
pub const DEFAULT_TIMEFRAME_WEIGHT: f64 = 0.20;

/// Blend weight for a timeframe label. Mid timeframes dominate; the labels
/// match `Timeframe::to_string`.
pub fn timeframe_weight(label: &str) -> f64 {
    match label {
        "1m" => 0.10,
        "5m" => 0.20,
        "15m" => 0.30,
        "1h" => 0.25,
        "4h" => 0.15,
        _ => DEFAULT_TIMEFRAME_WEIGHT,
    }
}

/// Consolidated cross-timeframe view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsolidatedView {
    /// Weighted blend of per-timeframe global scores, in [0, 10].
    pub consolidated_score: f64,
    /// Majority direction among non-neutral timeframes.
    pub direction: Direction,
    /// Majority share over ALL supplied timeframes, neutral included,
    /// percent. This is a different denominator from
    /// [`direction_agreement`], where neutral timeframes abstain: a
    /// 1-long/3-neutral set reads 25% here and 100% there.
    pub agreement_pct: f64,
    /// Timeframes voting each way, for the audit trail.
    pub votes: BTreeMap<String, Direction>,
}

/// Consolidate per-timeframe assessments, keyed by timeframe label.
///
/// An empty input yields score 0, NEUTRAL, agreement 0.
pub fn consolidate(assessments: &BTreeMap<String, GlobalAssessment>) -> ConsolidatedView {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    let mut votes = BTreeMap::new();
    let mut long = 0usize;
    let mut short = 0usize;

    for (label, assessment) in assessments {
        let weight = timeframe_weight(label);
        weighted_sum += assessment.global_score * weight;
        weight_total += weight;
        votes.insert(label.clone(), assessment.direction);
        match assessment.direction {
            Direction::Long => long += 1,
            Direction::Short => short += 1,
            Direction::Neutral => {}
        }
    }

    let consolidated_score = if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        0.0
    };

    let (direction, agreement_pct) = majority(long, short, assessments.len());

    ConsolidatedView {
        consolidated_score: round2(consolidated_score),
        direction,
        agreement_pct: round1(agreement_pct),
        votes,
    }
}

/// Majority direction and its agreement share over `total` timeframes.
fn majority(long: usize, short: usize, total: usize) -> (Direction, f64) {
    if total == 0 || long == short {
        return (Direction::Neutral, 0.0);
    }
    let (direction, wins) = if long > short {
        (Direction::Long, long)
    } else {
        (Direction::Short, short)
    };
    (direction, wins as f64 / total as f64 * 100.0)
}

/// Agreement of a candidate direction among the non-neutral timeframe votes,
/// percent. Used by the setup generator's alignment gate; neutral timeframes
/// abstain rather than dilute.
pub fn direction_agreement(
    assessments: &BTreeMap<String, GlobalAssessment>,
    candidate: Direction,
) -> f64 {
    if candidate == Direction::Neutral {
        return 0.0;
    }
    let non_neutral = assessments
        .values()
        .filter(|a| a.direction != Direction::Neutral)
        .count();
    if non_neutral == 0 {
        return 0.0;
    }
    let agreeing = assessments
        .values()
        .filter(|a| a.direction == candidate)
        .count();
    round1(agreeing as f64 / non_neutral as f64 * 100.0)
}
