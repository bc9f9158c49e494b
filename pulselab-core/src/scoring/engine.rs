//! Scoring engine — fuses category results into a global assessment.
//!
//! global_score = Σ(category_score × weight) with weights renormalized to
//! sum 1.0. Direction is decided by weighted votes read out of the category
//! detail rows, with a +1 hysteresis margin so near-ties stay NEUTRAL.
//! Confidence scales the score percentage by a consistency factor derived
//! from the spread of category scores, capped at 95.

use std::collections::BTreeMap;

use crate::config::AnalysisConfig;
use crate::domain::{
    category, round1, round2, AssessmentStatus, CategoryResult, Direction, GlobalAssessment,
    WeightedScore,
};

/// Categories a score >= this counts as a strength.
const STRENGTH_THRESHOLD: f64 = 7.5;
/// Categories a score below this counts as a weakness.
const WEAKNESS_THRESHOLD: f64 = 5.0;
/// Confidence is never reported above this.
pub const CONFIDENCE_CAP: f64 = 95.0;
/// Bullish votes must exceed bearish by more than this margin (and vice
/// versa) before a direction is called.
pub const VOTE_HYSTERESIS: u32 = 1;

const ALL_CATEGORIES: [&str; 6] = [
    category::TECHNICAL,
    category::VOLUME,
    category::SENTIMENT,
    category::STRUCTURE,
    category::RISK,
    category::VOLATILITY,
];

/// Fuse category results into a global assessment.
///
/// A missing category scores 0 with a warning; extractor warnings are
/// carried up prefixed with their category name.
pub fn score(
    categories: &BTreeMap<String, CategoryResult>,
    config: &AnalysisConfig,
) -> GlobalAssessment {
    let (weights, weight_warning) = config.weights.normalized();
    let mut warnings: Vec<String> = weight_warning.into_iter().collect();

    let mut category_scores = BTreeMap::new();
    let mut raw_scores = Vec::with_capacity(ALL_CATEGORIES.len());
    let mut global = 0.0;

    for name in ALL_CATEGORIES {
        let weight = weights.for_category(name);
        let raw = match categories.get(name) {
            Some(result) => {
                for w in &result.warnings {
                    warnings.push(format!("{name}: {w}"));
                }
                result.score
            }
            None => {
                warnings.push(format!("category '{name}' missing; scored 0"));
                0.0
            }
        };
        raw_scores.push(raw);
        global += raw * weight;
        category_scores.insert(
            name.to_string(),
            WeightedScore {
                score: round2(raw),
                weight: round2(weight),
                weighted: round2(raw * weight),
            },
        );
    }

    let (bullish, bearish) = count_votes(categories);
    let direction = if bullish > bearish + VOTE_HYSTERESIS {
        Direction::Long
    } else if bearish > bullish + VOTE_HYSTERESIS {
        Direction::Short
    } else {
        Direction::Neutral
    };

    let confidence = confidence_from(global, &raw_scores);

    let mut strengths: Vec<(String, f64)> = category_scores
        .iter()
        .filter(|(_, ws)| ws.score >= STRENGTH_THRESHOLD)
        .map(|(name, ws)| (name.clone(), ws.score))
        .collect();
    strengths.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut weaknesses: Vec<(String, f64)> = category_scores
        .iter()
        .filter(|(_, ws)| ws.score < WEAKNESS_THRESHOLD)
        .map(|(name, ws)| (name.clone(), ws.score))
        .collect();
    weaknesses.sort_by(|a, b| a.1.total_cmp(&b.1));

    GlobalAssessment {
        global_score: round2(global),
        status: AssessmentStatus::from_score(global),
        direction,
        confidence: round1(confidence),
        category_scores,
        strengths: strengths.into_iter().map(|(n, _)| n).collect(),
        weaknesses: weaknesses.into_iter().map(|(n, _)| n).collect(),
        warnings,
        config_hash: config.fingerprint().0,
    }
}

/// Weighted direction votes from category detail rows.
///
/// EMA relation ±2, RSI zone ±1, volume delta sign ±1, structure pattern ±2,
/// order-book ratio ±1.
pub fn count_votes(categories: &BTreeMap<String, CategoryResult>) -> (u32, u32) {
    let mut bullish = 0;
    let mut bearish = 0;

    if let Some(technical) = categories.get(category::TECHNICAL) {
        match technical.detail_value("ema_relation") {
            Some(code) if code > 0.0 => bullish += 2,
            Some(code) if code < 0.0 => bearish += 2,
            _ => {}
        }
        match technical.detail_value("rsi") {
            Some(rsi) if rsi < 40.0 => bullish += 1,
            Some(rsi) if rsi > 60.0 => bearish += 1,
            _ => {}
        }
    }

    if let Some(volume) = categories.get(category::VOLUME) {
        match volume.detail_value("delta") {
            Some(delta) if delta > 0.0 => bullish += 1,
            Some(delta) if delta < 0.0 => bearish += 1,
            _ => {}
        }
    }

    if let Some(structure) = categories.get(category::STRUCTURE) {
        match structure.detail_value("pattern") {
            Some(code) if code > 0.0 => bullish += 2,
            Some(code) if code < 0.0 => bearish += 2,
            _ => {}
        }
    }

    if let Some(sentiment) = categories.get(category::SENTIMENT) {
        match sentiment.detail_value("bid_ask_ratio") {
            Some(ratio) if ratio > 1.2 => bullish += 1,
            Some(ratio) if ratio < 0.8 => bearish += 1,
            _ => {}
        }
    }

    (bullish, bearish)
}

fn confidence_from(global: f64, raw_scores: &[f64]) -> f64 {
    if raw_scores.is_empty() {
        return 0.0;
    }
    let mean = raw_scores.iter().sum::<f64>() / raw_scores.len() as f64;
    let variance = raw_scores
        .iter()
        .map(|s| {
            let d = s - mean;
            d * d
        })
        .sum::<f64>()
        / raw_scores.len() as f64;
    let consistency = (1.0 - variance.sqrt() / 5.0).max(0.0);
    (global / 10.0 * 100.0 * consistency).min(CONFIDENCE_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IndicatorDetail;

    fn category_with(score: f64, details: &[(&str, f64)]) -> CategoryResult {
        let mut map = BTreeMap::new();
        for (name, value) in details {
            map.insert(
                name.to_string(),
                IndicatorDetail {
                    value: *value,
                    status: "test".into(),
                    points: 0.0,
                },
            );
        }
        CategoryResult::finalize(score, 10.0, map, vec![])
    }

    fn full_set(score: f64) -> BTreeMap<String, CategoryResult> {
        let mut m = BTreeMap::new();
        for name in ALL_CATEGORIES {
            m.insert(name.to_string(), category_with(score, &[]));
        }
        m
    }

    #[test]
    fn uniform_scores_fuse_to_same_value() {
        let assessment = score(&full_set(6.0), &AnalysisConfig::default());
        assert!((assessment.global_score - 6.0).abs() < 1e-9);
        // identical scores → zero spread → full consistency
        assert_eq!(assessment.confidence, 60.0);
    }

    #[test]
    fn missing_category_scores_zero_with_warning() {
        let mut categories = full_set(8.0);
        categories.remove(category::VOLATILITY);
        let assessment = score(&categories, &AnalysisConfig::default());
        assert!(assessment.global_score < 8.0);
        assert!(assessment
            .warnings
            .iter()
            .any(|w| w.contains("volatility") && w.contains("missing")));
    }

    #[test]
    fn direction_requires_margin_beyond_hysteresis() {
        // ema +2 bullish vs pattern -2 bearish → tie → NEUTRAL
        let mut categories = full_set(7.0);
        categories.insert(
            category::TECHNICAL.into(),
            category_with(7.0, &[("ema_relation", 1.0), ("rsi", 50.0)]),
        );
        categories.insert(
            category::STRUCTURE.into(),
            category_with(7.0, &[("pattern", -1.0)]),
        );
        let assessment = score(&categories, &AnalysisConfig::default());
        assert_eq!(assessment.direction, Direction::Neutral);
    }

    #[test]
    fn aligned_bullish_votes_go_long() {
        let mut categories = full_set(7.0);
        categories.insert(
            category::TECHNICAL.into(),
            category_with(7.0, &[("ema_relation", 1.0), ("rsi", 35.0)]),
        );
        categories.insert(
            category::STRUCTURE.into(),
            category_with(7.0, &[("pattern", 1.0)]),
        );
        categories.insert(
            category::VOLUME.into(),
            category_with(7.0, &[("delta", 120.0)]),
        );
        let assessment = score(&categories, &AnalysisConfig::default());
        assert_eq!(assessment.direction, Direction::Long);
    }

    #[test]
    fn strengths_and_weaknesses_sorted() {
        let mut categories = full_set(6.0);
        categories.insert(category::TECHNICAL.into(), category_with(9.0, &[]));
        categories.insert(category::VOLUME.into(), category_with(8.0, &[]));
        categories.insert(category::RISK.into(), category_with(2.0, &[]));
        categories.insert(category::SENTIMENT.into(), category_with(3.0, &[]));
        let assessment = score(&categories, &AnalysisConfig::default());
        assert_eq!(assessment.strengths, vec!["technical", "volume"]);
        assert_eq!(assessment.weaknesses, vec!["risk", "sentiment"]);
    }

    #[test]
    fn confidence_capped_at_95() {
        let assessment = score(&full_set(10.0), &AnalysisConfig::default());
        assert_eq!(assessment.confidence, CONFIDENCE_CAP);
    }

    #[test]
    fn inconsistent_categories_reduce_confidence() {
        let mut categories = full_set(5.0);
        categories.insert(category::TECHNICAL.into(), category_with(10.0, &[]));
        categories.insert(category::RISK.into(), category_with(0.0, &[]));
        let uniform = score(&full_set(5.0), &AnalysisConfig::default());
        let spread = score(&categories, &AnalysisConfig::default());
        assert!(spread.confidence < uniform.confidence);
    }

    #[test]
    fn category_warnings_are_carried_up() {
        let mut categories = full_set(7.0);
        let mut sentiment = category_with(7.0, &[]);
        sentiment.warnings.push("extreme funding rate".into());
        categories.insert(category::SENTIMENT.into(), sentiment);
        let assessment = score(&categories, &AnalysisConfig::default());
        assert!(assessment
            .warnings
            .iter()
            .any(|w| w.contains("sentiment: extreme funding rate")));
    }
}
