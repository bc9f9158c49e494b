//! Candle — the fundamental market data unit.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// OHLCV candle for a single symbol at a single timestamp (UTC).
///
/// Candle series are chronological and index-addressable. Minimum length
/// requirements vary per indicator and are documented on each indicator
/// function; short series degrade to neutral defaults instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Returns true if any price field is NaN or non-finite.
    pub fn is_void(&self) -> bool {
        !self.open.is_finite()
            || !self.high.is_finite()
            || !self.low.is_finite()
            || !self.close.is_finite()
            || !self.volume.is_finite()
    }

    /// Basic OHLC sanity check: high >= low, high bounds open/close, positive prices.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
            && self.volume >= 0.0
    }

    /// High-low range in price units.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Fraction of the candle range sitting below the close, in [0, 1].
    ///
    /// Used by the volume extractor to estimate buy/sell pressure when no
    /// trade prints are available. A zero-range candle reads as 0.5 (neutral).
    pub fn bullish_ratio(&self) -> f64 {
        let range = self.range();
        if range <= 0.0 {
            0.5
        } else {
            (self.close - self.low) / range
        }
    }
}

/// Closes of a candle slice, in order.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_candle() -> Candle {
        Candle {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn candle_is_sane() {
        assert!(sample_candle().is_sane());
    }

    #[test]
    fn candle_detects_void() {
        let mut c = sample_candle();
        c.close = f64::NAN;
        assert!(c.is_void());
        assert!(!c.is_sane());
    }

    #[test]
    fn candle_detects_insane_high_low() {
        let mut c = sample_candle();
        c.high = 97.0; // below low
        assert!(!c.is_sane());
    }

    #[test]
    fn bullish_ratio_close_at_high() {
        let mut c = sample_candle();
        c.close = c.high;
        assert_eq!(c.bullish_ratio(), 1.0);
    }

    #[test]
    fn bullish_ratio_zero_range_is_neutral() {
        let mut c = sample_candle();
        c.high = 100.0;
        c.low = 100.0;
        c.open = 100.0;
        c.close = 100.0;
        assert_eq!(c.bullish_ratio(), 0.5);
    }

    #[test]
    fn candle_serialization_roundtrip() {
        let c = sample_candle();
        let json = serde_json::to_string(&c).unwrap();
        let deser: Candle = serde_json::from_str(&json).unwrap();
        assert_eq!(c.timestamp, deser.timestamp);
        assert_eq!(c.close, deser.close);
        assert_eq!(c.volume, deser.volume);
    }
}
