//! Exponential Moving Average (EMA), snapshot form.
//!
//! Seed: simple mean of the first `period` closes, then iterate the
//! remaining closes with multiplier 2 / (period + 1).
//! Edge case: series shorter than `period` → plain mean of available closes.

/// EMA of the full close series, returning the final value.
pub fn ema(closes: &[f64], period: usize) -> f64 {
    if closes.is_empty() {
        return 0.0;
    }
    if closes.len() < period {
        return closes.iter().sum::<f64>() / closes.len() as f64;
    }

    let mut value = closes[..period].iter().sum::<f64>() / period as f64;
    let multiplier = 2.0 / (period as f64 + 1.0);
    for &close in &closes[period..] {
        value = (close - value) * multiplier + value;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_empty_series() {
        assert_eq!(ema(&[], 9), 0.0);
    }

    #[test]
    fn ema_short_series_is_plain_mean() {
        assert_eq!(ema(&[10.0, 20.0, 30.0], 9), 20.0);
    }

    #[test]
    fn ema_constant_series() {
        let closes = vec![50.0; 30];
        assert!((ema(&closes, 9) - 50.0).abs() < 1e-12);
    }

    #[test]
    fn ema_tracks_recent_prices() {
        // Rising series: EMA must sit above the overall mean but below the last close
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let v = ema(&closes, 9);
        let mean = closes.iter().sum::<f64>() / closes.len() as f64;
        assert!(v > mean);
        assert!(v < *closes.last().unwrap());
    }

    #[test]
    fn ema_exact_len_equals_seed() {
        // Exactly `period` closes: value is the SMA seed with no iteration
        let closes = [1.0, 2.0, 3.0];
        assert_eq!(ema(&closes, 3), 2.0);
    }

    #[test]
    fn fast_ema_above_slow_in_uptrend() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.5).collect();
        assert!(ema(&closes, 9) > ema(&closes, 21));
    }
}
