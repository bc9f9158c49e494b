//! Analysis configuration.
//!
//! All tunables are injected explicitly at construction — there are no
//! hidden global fallback tables. Profiles load from TOML; omitted fields
//! take the documented defaults.

use serde::{Deserialize, Serialize};

use crate::domain::category;
use crate::error::AnalysisError;
use crate::fingerprint::ConfigHash;

/// Category weights for the scoring engine.
///
/// Weights are renormalized to sum 1.0 when the configured values deviate by
/// more than `WEIGHT_TOLERANCE`; deviation is a configuration warning, never
/// a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub technical: f64,
    pub volume: f64,
    pub sentiment: f64,
    pub structure: f64,
    pub risk: f64,
    pub volatility: f64,
}

pub const WEIGHT_TOLERANCE: f64 = 0.01;

impl Default for Weights {
    fn default() -> Self {
        Self {
            technical: 0.25,
            volume: 0.20,
            sentiment: 0.15,
            structure: 0.15,
            risk: 0.15,
            volatility: 0.10,
        }
    }
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.technical + self.volume + self.sentiment + self.structure + self.risk + self.volatility
    }

    /// Normalize to sum 1.0. Returns the normalized weights and a warning
    /// when the configured sum was off by more than the tolerance.
    pub fn normalized(&self) -> (Weights, Option<String>) {
        let sum = self.sum();
        if (sum - 1.0).abs() <= WEIGHT_TOLERANCE {
            return (*self, None);
        }
        let w = Weights {
            technical: self.technical / sum,
            volume: self.volume / sum,
            sentiment: self.sentiment / sum,
            structure: self.structure / sum,
            risk: self.risk / sum,
            volatility: self.volatility / sum,
        };
        (
            w,
            Some(format!(
                "category weights summed to {sum:.3}; renormalized to 1.0"
            )),
        )
    }

    /// Weight for a category key; unknown keys weigh 0.
    pub fn for_category(&self, name: &str) -> f64 {
        match name {
            category::TECHNICAL => self.technical,
            category::VOLUME => self.volume,
            category::SENTIMENT => self.sentiment,
            category::STRUCTURE => self.structure,
            category::RISK => self.risk,
            category::VOLATILITY => self.volatility,
            _ => 0.0,
        }
    }

    fn validate(&self) -> Result<(), AnalysisError> {
        let values = [
            self.technical,
            self.volume,
            self.sentiment,
            self.structure,
            self.risk,
            self.volatility,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(AnalysisError::InvalidConfig(
                "weights must be finite and non-negative".into(),
            ));
        }
        if self.sum() <= 0.0 {
            return Err(AnalysisError::InvalidConfig(
                "weights must not all be zero".into(),
            ));
        }
        Ok(())
    }
}

/// Complete analysis profile: weights, structure tuning, and setup gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub weights: Weights,
    /// Swing prominence threshold in absolute price units. Not normalized to
    /// asset scale: the default suits BTC-scale prices.
    pub swing_prominence: f64,
    /// Percent of balance risked per trade.
    pub risk_per_trade_pct: f64,
    /// Minimum global score for a setup.
    pub min_score: f64,
    /// Minimum confidence for a setup.
    pub min_confidence: f64,
    /// Minimum agreement among non-neutral timeframe votes, percent.
    pub mtf_min_agreement_pct: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            swing_prominence: 50.0,
            risk_per_trade_pct: 1.0,
            min_score: 7.0,
            min_confidence: 70.0,
            mtf_min_agreement_pct: 60.0,
        }
    }
}

impl AnalysisConfig {
    /// Load a profile from TOML, validating every field.
    pub fn from_toml_str(s: &str) -> Result<Self, AnalysisError> {
        let config: AnalysisConfig = toml::from_str(s)
            .map_err(|e| AnalysisError::InvalidConfig(format!("toml parse error: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        self.weights.validate()?;
        let scalars = [
            ("swing_prominence", self.swing_prominence),
            ("risk_per_trade_pct", self.risk_per_trade_pct),
            ("min_score", self.min_score),
            ("min_confidence", self.min_confidence),
            ("mtf_min_agreement_pct", self.mtf_min_agreement_pct),
        ];
        for (name, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalysisError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Deterministic fingerprint of this profile, for pairing assessments
    /// with the configuration that produced them in the decision log.
    pub fn fingerprint(&self) -> ConfigHash {
        ConfigHash::of(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        assert!((Weights::default().sum() - 1.0).abs() < 1e-12);
        let (_, warning) = Weights::default().normalized();
        assert!(warning.is_none());
    }

    #[test]
    fn skewed_weights_renormalize_with_warning() {
        let w = Weights {
            technical: 0.5,
            volume: 0.5,
            sentiment: 0.5,
            structure: 0.5,
            risk: 0.5,
            volatility: 0.5,
        };
        let (n, warning) = w.normalized();
        assert!((n.sum() - 1.0).abs() < 1e-9);
        assert!(warning.unwrap().contains("renormalized"));
    }

    #[test]
    fn toml_profile_roundtrip() {
        let toml = r#"
            swing_prominence = 5.0
            risk_per_trade_pct = 0.5

            [weights]
            technical = 0.4
            volume = 0.3
            sentiment = 0.1
            structure = 0.1
            risk = 0.05
            volatility = 0.05
        "#;
        let config = AnalysisConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.swing_prominence, 5.0);
        assert_eq!(config.weights.technical, 0.4);
        // omitted gates keep their defaults
        assert_eq!(config.min_score, 7.0);
    }

    #[test]
    fn negative_weight_is_rejected() {
        let toml = r#"
            [weights]
            technical = -0.5
        "#;
        assert!(AnalysisConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn fingerprint_is_stable_and_sensitive() {
        let a = AnalysisConfig::default();
        let mut b = AnalysisConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.risk_per_trade_pct = 2.0;
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
