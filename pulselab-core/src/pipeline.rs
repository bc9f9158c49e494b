//! Analysis pipeline.
//!
//! Orchestrates the five extractors, the volatility category, the scoring
//! engine and the setup generator over one snapshot. Each extractor failure
//! is degraded to an empty category result at this boundary, so the worst
//! case is an all-neutral assessment, never an error. Every invocation is a
//! pure function of the snapshot and configuration; independent snapshots
//! score in parallel through `analyze_timeframes`.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::config::AnalysisConfig;
use crate::domain::{
    category, closes, CategoryResult, Divergence, GlobalAssessment, MarketSnapshot, SetupDecision,
};
use crate::error::AnalysisError;
use crate::extractors::{risk, sentiment, structure, technical, volume};
use crate::indicators;
use crate::scoring::{self, consolidator, ConsolidatedView};
use crate::setup::{self, SetupContext};

const ATR_PERIOD: usize = 14;

/// One snapshot's assessment together with the category results it was
/// fused from. The setup generator and presentation layers both need the
/// per-category detail the assessment alone no longer carries.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub assessment: GlobalAssessment,
    pub categories: BTreeMap<String, CategoryResult>,
}

/// Run the five extractors plus the volatility category and fuse the results.
pub fn analyze_full(snapshot: &MarketSnapshot, config: &AnalysisConfig) -> Analysis {
    let candles = &snapshot.candles;
    let close_series = closes(candles);
    let rsi_history = indicators::rsi_series(&close_series, technical::RSI_PERIOD);
    let atr_pct = indicators::atr_pct(candles, ATR_PERIOD);

    let mut categories = BTreeMap::new();
    categories.insert(
        category::TECHNICAL.to_string(),
        degrade(technical::extract(candles), technical::MAX_SCORE),
    );
    categories.insert(
        category::VOLUME.to_string(),
        degrade(
            volume::extract(candles, snapshot.trades.as_deref(), &snapshot.timeframe),
            volume::MAX_SCORE,
        ),
    );
    categories.insert(
        category::SENTIMENT.to_string(),
        degrade(
            sentiment::extract(
                snapshot.funding_rate,
                snapshot.oi_change_24h,
                &snapshot.order_book,
                snapshot.long_short_ratio,
            ),
            sentiment::MAX_SCORE,
        ),
    );
    categories.insert(
        category::STRUCTURE.to_string(),
        degrade(
            structure::extract(candles, &rsi_history, config.swing_prominence),
            structure::MAX_SCORE,
        ),
    );
    categories.insert(
        category::RISK.to_string(),
        degrade(
            risk::extract(&snapshot.position, atr_pct, snapshot.account_balance),
            risk::MAX_SCORE,
        ),
    );
    categories.insert(
        category::VOLATILITY.to_string(),
        risk::volatility_category(atr_pct),
    );

    let assessment = scoring::score(&categories, config);
    Analysis {
        assessment,
        categories,
    }
}

/// Score one snapshot into a global assessment.
pub fn analyze(snapshot: &MarketSnapshot, config: &AnalysisConfig) -> GlobalAssessment {
    analyze_full(snapshot, config).assessment
}

/// Score a set of snapshots (one per timeframe) in parallel and consolidate.
///
/// Returns the per-timeframe assessments keyed by timeframe label, plus the
/// blended cross-timeframe view.
pub fn analyze_timeframes(
    snapshots: &[MarketSnapshot],
    config: &AnalysisConfig,
) -> (BTreeMap<String, GlobalAssessment>, ConsolidatedView) {
    let assessments: BTreeMap<String, GlobalAssessment> = snapshots
        .par_iter()
        .map(|s| (s.timeframe.to_string(), analyze(s, config)))
        .collect();
    let view = consolidator::consolidate(&assessments);
    (assessments, view)
}

/// Full decision path for one snapshot: analyze, then run the gating setup
/// generator. `timeframes` optionally supplies the per-timeframe votes from
/// `analyze_timeframes` for the alignment gate.
pub fn generate_setup(
    snapshot: &MarketSnapshot,
    config: &AnalysisConfig,
    timeframes: Option<&BTreeMap<String, GlobalAssessment>>,
) -> SetupDecision {
    let analysis = analyze_full(snapshot, config);
    let ctx = setup_context(snapshot, &analysis, config);
    setup::generate(&analysis.assessment, &ctx, timeframes, config)
}

/// Assemble the indicator readings the setup generator needs from the
/// snapshot and the finished analysis.
fn setup_context(
    snapshot: &MarketSnapshot,
    analysis: &Analysis,
    config: &AnalysisConfig,
) -> SetupContext {
    let candles = &snapshot.candles;
    let close_series = closes(candles);
    let current_price = snapshot.current_price();

    let rsi_history = indicators::rsi_series(&close_series, technical::RSI_PERIOD);
    let highs = structure::swing_highs(candles, config.swing_prominence);
    let lows = structure::swing_lows(candles, config.swing_prominence);
    let sr = structure::support_resistance(candles, &highs, &lows, current_price);
    let divergence = structure::detect_divergence(&highs, &lows, &rsi_history);

    let readings = volume::readings(candles, snapshot.trades.as_deref());

    SetupContext {
        current_price,
        atr: indicators::atr(candles, ATR_PERIOD),
        atr_pct: indicators::atr_pct(candles, ATR_PERIOD),
        nearest_support: sr.nearest_support,
        nearest_resistance: sr.nearest_resistance,
        funding_rate: snapshot.funding_rate,
        volume_ratio: readings.ratio,
        volume_delta: readings.delta,
        bullish_divergence: divergence == Some(Divergence::Bullish),
        ema_fast: indicators::ema(&close_series, technical::EMA_FAST),
        ema_slow: indicators::ema(&close_series, technical::EMA_SLOW),
        rsi: indicators::rsi(&close_series, technical::RSI_PERIOD),
        adx: indicators::adx(candles, technical::ADX_PERIOD),
        technical_score: category_score(&analysis.categories, category::TECHNICAL),
        volume_score: category_score(&analysis.categories, category::VOLUME),
        account_balance: snapshot.account_balance,
    }
}

fn category_score(categories: &BTreeMap<String, CategoryResult>, name: &str) -> f64 {
    categories.get(name).map(|c| c.score).unwrap_or(0.0)
}

/// Replace an extractor failure with that category's documented empty result.
fn degrade(result: Result<CategoryResult, AnalysisError>, max_score: f64) -> CategoryResult {
    result.unwrap_or_else(|e| CategoryResult::empty(max_score, format!("extractor failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryStatus, Direction, OrderBookSnapshot, PositionState, Timeframe};
    use crate::indicators::make_candles;

    fn book() -> OrderBookSnapshot {
        OrderBookSnapshot {
            bids: vec![(100.0, 5.0).into(), (99.5, 4.0).into()],
            asks: vec![(100.5, 5.0).into(), (101.0, 4.0).into()],
        }
    }

    fn snapshot(closes: &[f64]) -> MarketSnapshot {
        MarketSnapshot {
            symbol: "BTCUSDT".to_string(),
            timeframe: Timeframe::M5,
            candles: make_candles(closes),
            funding_rate: 0.005,
            oi_change_24h: 2.0,
            long_short_ratio: None,
            order_book: book(),
            trades: None,
            account_balance: 10_000.0,
            position: PositionState {
                total_exposure_usd: 300.0,
                free_margin_usd: 9_000.0,
                session_pnl: 20.0,
                session_start_balance: 10_000.0,
            },
        }
    }

    #[test]
    fn analyze_produces_all_six_categories() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.5).collect();
        let analysis = analyze_full(&snapshot(&closes), &AnalysisConfig::default());
        for name in [
            category::TECHNICAL,
            category::VOLUME,
            category::SENTIMENT,
            category::STRUCTURE,
            category::RISK,
            category::VOLATILITY,
        ] {
            assert!(analysis.categories.contains_key(name), "missing {name}");
        }
        let score = analysis.assessment.global_score;
        assert!((0.0..=10.0).contains(&score));
    }

    #[test]
    fn extractor_failure_degrades_not_propagates() {
        let mut s = snapshot(&[100.0, 101.0, 102.0, 101.5, 102.5]);
        s.funding_rate = f64::NAN;
        let analysis = analyze_full(&s, &AnalysisConfig::default());
        let sentiment = &analysis.categories[category::SENTIMENT];
        assert_eq!(sentiment.status, CategoryStatus::Error);
        assert_eq!(sentiment.score, 0.0);
        // the rest of the pipeline still produced a (degraded) assessment
        assert!(analysis.assessment.global_score >= 0.0);
        assert!(analysis
            .assessment
            .warnings
            .iter()
            .any(|w| w.contains("extractor failed")));
    }

    #[test]
    fn empty_snapshot_yields_worst_case_not_panic() {
        let s = snapshot(&[]);
        let analysis = analyze_full(&s, &AnalysisConfig::default());
        assert!(analysis.assessment.global_score >= 0.0);
        let decision = generate_setup(&s, &AnalysisConfig::default(), None);
        assert!(!decision.has_setup());
    }

    #[test]
    fn timeframe_analysis_keys_by_label() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.5).collect();
        let mut a = snapshot(&closes);
        a.timeframe = Timeframe::M5;
        let mut b = snapshot(&closes);
        b.timeframe = Timeframe::H1;
        let (assessments, view) = analyze_timeframes(&[a, b], &AnalysisConfig::default());
        assert_eq!(assessments.len(), 2);
        assert!(assessments.contains_key("5m"));
        assert!(assessments.contains_key("1h"));
        assert!((0.0..=10.0).contains(&view.consolidated_score));
    }

    #[test]
    fn direction_is_always_a_valid_variant() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + (i as f64 * 0.4).sin() * 3.0)
            .collect();
        let assessment = analyze(&snapshot(&closes), &AnalysisConfig::default());
        assert!(matches!(
            assessment.direction,
            Direction::Long | Direction::Short | Direction::Neutral
        ));
    }
}
