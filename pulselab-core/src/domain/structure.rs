//! Market-structure types: swing points, trend patterns, support/resistance.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A local price extremum used to define market structure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub index: usize,
    pub price: f64,
    pub timestamp: NaiveDateTime,
}

/// Trend classification from the last swing highs/lows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendPattern {
    /// Higher highs and higher lows.
    Uptrend,
    /// Lower highs and lower lows.
    Downtrend,
    /// Neither side shows any monotonic run.
    Consolidation,
    /// Mixed evidence, or not enough swing points.
    Indeterminate,
}

impl TrendPattern {
    /// Numeric encoding carried in detail rows: +1 up, -1 down, 0 otherwise.
    pub fn as_code(&self) -> f64 {
        match self {
            TrendPattern::Uptrend => 1.0,
            TrendPattern::Downtrend => -1.0,
            _ => 0.0,
        }
    }
}

/// How many candles have touched a support/resistance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelStrength {
    Weak,
    Moderate,
    Strong,
}

impl LevelStrength {
    /// Bucket a touch count: < 2 weak, 2 moderate, >= 3 strong.
    pub fn from_touches(touches: usize) -> Self {
        match touches {
            0 | 1 => LevelStrength::Weak,
            2 => LevelStrength::Moderate,
            _ => LevelStrength::Strong,
        }
    }
}

/// Nearest support and resistance with their strength buckets.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SupportResistance {
    pub nearest_support: f64,
    pub support_strength: LevelStrength,
    pub nearest_resistance: f64,
    pub resistance_strength: LevelStrength,
}

/// Price/RSI divergence at the most recent swing pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Divergence {
    /// Price makes a lower low while RSI makes a higher low.
    Bullish,
    /// Price makes a higher high while RSI makes a lower high.
    Bearish,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_strength_buckets() {
        assert_eq!(LevelStrength::from_touches(0), LevelStrength::Weak);
        assert_eq!(LevelStrength::from_touches(1), LevelStrength::Weak);
        assert_eq!(LevelStrength::from_touches(2), LevelStrength::Moderate);
        assert_eq!(LevelStrength::from_touches(3), LevelStrength::Strong);
        assert_eq!(LevelStrength::from_touches(9), LevelStrength::Strong);
    }

    #[test]
    fn pattern_codes() {
        assert_eq!(TrendPattern::Uptrend.as_code(), 1.0);
        assert_eq!(TrendPattern::Downtrend.as_code(), -1.0);
        assert_eq!(TrendPattern::Consolidation.as_code(), 0.0);
        assert_eq!(TrendPattern::Indeterminate.as_code(), 0.0);
    }
}
