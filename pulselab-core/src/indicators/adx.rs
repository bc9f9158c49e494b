//! ADX — Average Directional Index, snapshot form.
//!
//! Directional movement and true range are averaged over the trailing window
//! only (single-window average, not Wilder's recursive smoothing). This is an
//! explicit approximation: good enough for trend-strength scoring, not
//! bit-compatible with reference ADX implementations.
//!
//! +DI = 100 * avg(+DM) / avg(TR); -DI likewise;
//! DX = 100 * |+DI - -DI| / (+DI + -DI); ADX ≈ DX over the window.
//! Edge cases: fewer than period+1 candles → 0.0; zero TR sum → 0.0.

use crate::domain::Candle;
use crate::indicators::atr::true_range;

/// Trend strength in [0, 100] over the trailing `period` candles.
pub fn adx(candles: &[Candle], period: usize) -> f64 {
    if candles.len() < period + 1 || period == 0 {
        return 0.0;
    }

    let start = candles.len() - period;
    let mut tr_sum = 0.0;
    let mut plus_dm_sum = 0.0;
    let mut minus_dm_sum = 0.0;

    for i in start..candles.len() {
        let curr = &candles[i];
        let prev = &candles[i - 1];

        tr_sum += true_range(curr, Some(prev.close));

        let high_diff = curr.high - prev.high;
        let low_diff = prev.low - curr.low;

        if high_diff > low_diff && high_diff > 0.0 {
            plus_dm_sum += high_diff;
        }
        if low_diff > high_diff && low_diff > 0.0 {
            minus_dm_sum += low_diff;
        }
    }

    if tr_sum <= 0.0 {
        return 0.0;
    }

    let plus_di = 100.0 * plus_dm_sum / tr_sum;
    let minus_di = 100.0 * minus_dm_sum / tr_sum;
    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return 0.0;
    }

    100.0 * (plus_di - minus_di).abs() / di_sum
}
