//! Indicator math feeding the category extractors.
//!
//! All functions here are snapshot-form: they take the full candle/close
//! history and return the current value, degrading to a documented neutral
//! default when history is too short (RSI→50, ADX→0, EMA→mean, ATR→0).
//! Several use trailing-window simplifications of the textbook recursive
//! formulas; each module documents its deviation.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;

pub use adx::adx;
pub use atr::{atr, atr_pct, true_range};
pub use bollinger::{bollinger, BollingerBands};
pub use ema::ema;
pub use macd::{macd, Macd};
pub use rsi::{rsi, rsi_series};

/// Create synthetic candles from close prices for testing.
///
/// Plausible OHLCV: open = prev close (or close for the first candle),
/// high = max(open, close) + 1.0, low = min(open, close) - 1.0, volume 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<crate::domain::Candle> {
    make_candles_with_volume(closes, &vec![1000.0; closes.len()])
}

/// Synthetic candles with explicit per-candle volume.
#[cfg(test)]
pub fn make_candles_with_volume(closes: &[f64], volumes: &[f64]) -> Vec<crate::domain::Candle> {
    use crate::domain::Candle;
    assert_eq!(closes.len(), volumes.len());
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: base + chrono::Duration::minutes(5 * i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: volumes[i],
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}
