//! Relative Strength Index (RSI), snapshot form.
//!
//! Average gain/loss over the trailing `period` deltas uses a plain mean,
//! not Wilder's exponential smoothing — an intentional simplification for
//! scoring purposes, not bit-compatible with reference RSI implementations.
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Edge cases: avg_loss == 0 → 100; fewer than period+1 closes → 50 (neutral).

/// RSI over the trailing `period` close-to-close deltas.
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if closes.len() < period + 1 {
        return 50.0;
    }

    let window = &closes[closes.len() - period - 1..];
    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in window.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// Trailing RSI series aligned with `closes` by index.
///
/// Entry `i` is `rsi(&closes[..=i], period)`; the first `period` entries are
/// the neutral 50. Used to feed the structure extractor's divergence check.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    (0..closes.len())
        .map(|i| rsi(&closes[..=i], period))
        .collect()
}
