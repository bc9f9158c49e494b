//! Category and global assessment types.
//!
//! These are the structures handed to the decision-log and presentation
//! collaborators, so all scores and prices are rounded to display precision
//! (2 decimals; percentages to 1) before landing here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Round to 2 decimal places (scores, prices).
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Round to 1 decimal place (percentages).
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Category name keys used across the scoring engine.
pub mod category {
    pub const TECHNICAL: &str = "technical";
    pub const VOLUME: &str = "volume";
    pub const SENTIMENT: &str = "sentiment";
    pub const STRUCTURE: &str = "structure";
    pub const RISK: &str = "risk";
    pub const VOLATILITY: &str = "volatility";
}

/// Qualitative bucket for a single category score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryStatus {
    Excellent,
    Good,
    Neutral,
    Weak,
    Poor,
    /// Extractor failed internally; score degraded to 0.
    Error,
}

impl CategoryStatus {
    /// Bucket a score percentage into a status.
    pub fn from_percentage(pct: f64) -> Self {
        if pct >= 80.0 {
            CategoryStatus::Excellent
        } else if pct >= 65.0 {
            CategoryStatus::Good
        } else if pct >= 45.0 {
            CategoryStatus::Neutral
        } else if pct >= 25.0 {
            CategoryStatus::Weak
        } else {
            CategoryStatus::Poor
        }
    }
}

/// One indicator row inside a category result.
///
/// `value` is the raw measured value (RSI level, funding rate, pattern code…)
/// and `points` the sub-score it earned. The scoring engine reads direction
/// votes out of these rows, so extractors record the raw values downstream
/// consumers need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorDetail {
    pub value: f64,
    pub status: String,
    pub points: f64,
}

/// Output of a single category extractor.
///
/// Invariant: the maximum attainable sub-scores of the extractor's rule
/// buckets sum exactly to `max_score`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResult {
    pub score: f64,
    pub max_score: f64,
    /// score / max_score × 100, rounded to 1 decimal.
    pub percentage: f64,
    pub status: CategoryStatus,
    pub details: BTreeMap<String, IndicatorDetail>,
    pub warnings: Vec<String>,
}

impl CategoryResult {
    /// Build a finalized result from accumulated sub-scores.
    pub fn finalize(
        score: f64,
        max_score: f64,
        details: BTreeMap<String, IndicatorDetail>,
        warnings: Vec<String>,
    ) -> Self {
        let pct = if max_score > 0.0 {
            score / max_score * 100.0
        } else {
            0.0
        };
        Self {
            score: round2(score),
            max_score: round2(max_score),
            percentage: round1(pct),
            status: CategoryStatus::from_percentage(pct),
            details,
            warnings,
        }
    }

    /// Documented degraded result: score 0, status Error.
    ///
    /// Used at the pipeline boundary when an extractor fails internally, so
    /// the rest of the pipeline still produces a (degraded) assessment.
    pub fn empty(max_score: f64, warning: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            max_score: round2(max_score),
            percentage: 0.0,
            status: CategoryStatus::Error,
            details: BTreeMap::new(),
            warnings: vec![warning.into()],
        }
    }

    /// Raw value of a detail row, if present.
    pub fn detail_value(&self, name: &str) -> Option<f64> {
        self.details.get(name).map(|d| d.value)
    }
}

/// Trade direction emitted by the scoring engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
    Neutral,
}

/// Qualitative bucket for the global score (thresholds 8.0/7.0/5.5/4.0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStatus {
    Excellent,
    Strong,
    Moderate,
    Weak,
    Poor,
}

impl AssessmentStatus {
    pub fn from_score(score: f64) -> Self {
        if score >= 8.0 {
            AssessmentStatus::Excellent
        } else if score >= 7.0 {
            AssessmentStatus::Strong
        } else if score >= 5.5 {
            AssessmentStatus::Moderate
        } else if score >= 4.0 {
            AssessmentStatus::Weak
        } else {
            AssessmentStatus::Poor
        }
    }
}

/// Per-category contribution to the global score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightedScore {
    pub score: f64,
    pub weight: f64,
    pub weighted: f64,
}

/// Fused multi-factor assessment for one snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalAssessment {
    /// Weighted category fusion, in [0, 10].
    pub global_score: f64,
    pub status: AssessmentStatus,
    pub direction: Direction,
    /// In [0, 95].
    pub confidence: f64,
    pub category_scores: BTreeMap<String, WeightedScore>,
    /// Categories scoring >= 7.5, best first.
    pub strengths: Vec<String>,
    /// Categories scoring < 5.0, worst first.
    pub weaknesses: Vec<String>,
    pub warnings: Vec<String>,
    /// Hex fingerprint of the configuration that produced this assessment.
    pub config_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_computes_percentage_and_status() {
        let r = CategoryResult::finalize(7.5, 10.0, BTreeMap::new(), vec![]);
        assert_eq!(r.percentage, 75.0);
        assert_eq!(r.status, CategoryStatus::Good);
    }

    #[test]
    fn finalize_rounds_to_display_precision() {
        let r = CategoryResult::finalize(3.333_333, 8.5, BTreeMap::new(), vec![]);
        assert_eq!(r.score, 3.33);
        assert_eq!(r.percentage, 39.2);
    }

    #[test]
    fn empty_result_is_error_status() {
        let r = CategoryResult::empty(10.0, "boom");
        assert_eq!(r.score, 0.0);
        assert_eq!(r.status, CategoryStatus::Error);
        assert_eq!(r.warnings.len(), 1);
    }

    #[test]
    fn assessment_status_thresholds() {
        assert_eq!(AssessmentStatus::from_score(8.0), AssessmentStatus::Excellent);
        assert_eq!(AssessmentStatus::from_score(7.2), AssessmentStatus::Strong);
        assert_eq!(AssessmentStatus::from_score(5.5), AssessmentStatus::Moderate);
        assert_eq!(AssessmentStatus::from_score(4.0), AssessmentStatus::Weak);
        assert_eq!(AssessmentStatus::from_score(3.9), AssessmentStatus::Poor);
    }

    #[test]
    fn direction_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Direction::Long).unwrap(), "\"LONG\"");
        assert_eq!(
            serde_json::to_string(&Direction::Neutral).unwrap(),
            "\"NEUTRAL\""
        );
    }
}
