//! Technical category extractor.
//!
//! Scores RSI zone (2.0), EMA alignment (2.5), ADX strength (2.5), MACD
//! momentum (1.5) and Bollinger position/width (1.5) — bucket maxima sum to
//! the category max of 10. Raw indicator values are recorded in the detail
//! rows so the scoring engine can derive direction votes from them.

use std::collections::BTreeMap;

use crate::domain::{closes, Candle, CategoryResult};
use crate::error::AnalysisError;
use crate::extractors::rules::{detail, evaluate};
use crate::indicators::{adx, bollinger, ema, macd, rsi, Macd};

pub const MAX_SCORE: f64 = 10.0;

pub const RSI_PERIOD: usize = 14;
pub const ADX_PERIOD: usize = 14;
pub const EMA_FAST: usize = 9;
pub const EMA_SLOW: usize = 21;
const BOLLINGER_PERIOD: usize = 20;
const BOLLINGER_MULT: f64 = 2.0;
/// Band width below which the market is considered squeezed.
const SQUEEZE_WIDTH: f64 = 0.02;

/// Score the technical category for one candle series.
pub fn extract(candles: &[Candle]) -> Result<CategoryResult, AnalysisError> {
    if candles.iter().any(|c| c.is_void()) {
        return Err(AnalysisError::Degenerate(
            "non-finite candle data in technical extractor".into(),
        ));
    }

    let closes = closes(candles);
    let price = closes.last().copied().unwrap_or(0.0);

    let mut details = BTreeMap::new();
    let mut score = 0.0;

    // RSI zone: neutral band scores best, extremes worst.
    let rsi_value = rsi(&closes, RSI_PERIOD);
    let out = evaluate(
        &rsi_value,
        &[
            (&|r: &f64| (40.0..=60.0).contains(r), 2.0, "neutral zone"),
            (&|r: &f64| (30.0..40.0).contains(r), 1.25, "oversold lean"),
            (
                &|r: &f64| *r > 60.0 && *r <= 70.0,
                1.25,
                "overbought lean",
            ),
        ],
        (0.5, "extreme"),
    );
    score += out.points;
    details.insert("rsi".to_string(), detail(rsi_value, out));

    // EMA alignment. The detail value encodes the implied side
    // (+1 fast above slow, -1 below) for the direction vote.
    let ema_fast = ema(&closes, EMA_FAST);
    let ema_slow = ema(&closes, EMA_SLOW);
    let relation = (price, ema_fast, ema_slow);
    let out = evaluate(
        &relation,
        &[
            (
                &|(p, f, s): &(f64, f64, f64)| p > f && f > s,
                2.5,
                "bullish alignment",
            ),
            (
                &|(p, f, s): &(f64, f64, f64)| p < f && f < s,
                2.5,
                "bearish alignment",
            ),
            (
                &|(_, f, s): &(f64, f64, f64)| f > s,
                1.5,
                "bullish cross, price lagging",
            ),
            (
                &|(_, f, s): &(f64, f64, f64)| f < s,
                1.5,
                "bearish cross, price lagging",
            ),
        ],
        (0.5, "flat"),
    );
    score += out.points;
    let ema_code = if ema_fast > ema_slow {
        1.0
    } else if ema_fast < ema_slow {
        -1.0
    } else {
        0.0
    };
    details.insert("ema_relation".to_string(), detail(ema_code, out));

    // ADX strength, four tiers at 35/25/20.
    let adx_value = adx(candles, ADX_PERIOD);
    let out = evaluate(
        &adx_value,
        &[
            (&|a: &f64| *a >= 35.0, 2.5, "strong trend"),
            (&|a: &f64| *a >= 25.0, 2.0, "trending"),
            (&|a: &f64| *a >= 20.0, 1.25, "developing"),
        ],
        (0.5, "no trend"),
    );
    score += out.points;
    details.insert("adx".to_string(), detail(adx_value, out));

    // MACD cross + sign.
    let m = macd(&closes);
    let out = evaluate(
        &m,
        &[
            (
                &|m: &Macd| m.histogram > 0.0 && m.macd > 0.0,
                1.5,
                "bullish momentum",
            ),
            (&|m: &Macd| m.histogram > 0.0, 1.0, "bullish cross"),
            (
                &|m: &Macd| m.histogram < 0.0 && m.macd < 0.0,
                0.75,
                "bearish momentum",
            ),
        ],
        (0.5, "flat"),
    );
    score += out.points;
    details.insert("macd".to_string(), detail(m.histogram, out));

    // Bollinger position and width: band breaks earn extra credit and take
    // precedence over the squeeze penalty (width < 0.02), so a breakout out
    // of a squeeze still reads as a break.
    let bands = bollinger(&closes, BOLLINGER_PERIOD, BOLLINGER_MULT);
    let position = (price, bands);
    let out = evaluate(
        &position,
        &[
            (
                &|(p, b): &(f64, crate::indicators::BollingerBands)| *p > b.upper,
                1.5,
                "upper band break",
            ),
            (
                &|(p, b): &(f64, crate::indicators::BollingerBands)| *p < b.lower,
                1.5,
                "lower band break",
            ),
            (
                &|(_, b): &(f64, crate::indicators::BollingerBands)| b.width < SQUEEZE_WIDTH,
                0.25,
                "squeeze",
            ),
        ],
        (1.0, "inside bands"),
    );
    score += out.points;
    details.insert("bollinger".to_string(), detail(bands.width, out));

    Ok(CategoryResult::finalize(score, MAX_SCORE, details, vec![]))
}
