//! MACD — Moving Average Convergence Divergence, snapshot form.
//!
//! MACD line = EMA(12) - EMA(26). The signal line is approximated as
//! 0.9 × MACD (an explicit simplification — a true signal line is an EMA(9)
//! of the MACD series, which a single-snapshot computation cannot produce).
//! Histogram = MACD - signal = 0.1 × MACD, so the histogram sign always
//! matches the MACD sign here.

use crate::indicators::ema::ema;

/// MACD line, approximated signal line, and histogram.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Macd {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// MACD(12, 26, 9) with the 0.9-factor signal approximation.
pub fn macd(closes: &[f64]) -> Macd {
    let line = ema(closes, 12) - ema(closes, 26);
    let signal = 0.9 * line;
    Macd {
        macd: line,
        signal,
        histogram: line - signal,
    }
}
