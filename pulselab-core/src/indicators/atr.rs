//! Average True Range (ATR), snapshot form.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! ATR here is a plain mean of the trailing `period` true ranges — not
//! Wilder-smoothed. Fewer than 2 candles → 0.0 (neutral).

use crate::domain::Candle;

/// True range of one candle given the previous close, if any.
pub fn true_range(candle: &Candle, prev_close: Option<f64>) -> f64 {
    let high_low = candle.high - candle.low;
    match prev_close {
        Some(pc) => high_low
            .max((candle.high - pc).abs())
            .max((candle.low - pc).abs()),
        None => high_low,
    }
}

/// Mean true range over the trailing `period` candles.
pub fn atr(candles: &[Candle], period: usize) -> f64 {
    if candles.len() < 2 || period == 0 {
        return 0.0;
    }

    let take = period.min(candles.len() - 1);
    let start = candles.len() - take;
    let mut sum = 0.0;
    for i in start..candles.len() {
        sum += true_range(&candles[i], Some(candles[i - 1].close));
    }
    sum / take as f64
}

/// ATR as a percentage of the last close (0.0 when the close is degenerate).
pub fn atr_pct(candles: &[Candle], period: usize) -> f64 {
    let last_close = candles.last().map(|c| c.close).unwrap_or(0.0);
    if last_close <= 0.0 {
        return 0.0;
    }
    atr(candles, period) / last_close * 100.0
}
