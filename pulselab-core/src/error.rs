//! Structured error types for the analysis core.
//!
//! There are no fatal error paths: the pipeline boundary converts every
//! extractor error into that extractor's empty category result, so the
//! worst-case output is an all-neutral assessment and a NoSetup decision.

use thiserror::Error;

/// Errors raised inside extractors and configuration loading.
///
/// `InsufficientData` is internal bookkeeping only — indicators degrade to
/// documented neutral defaults (RSI→50, ADX→0, EMA→mean) rather than
/// surfacing it, so callers should never observe it in practice.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("insufficient data: need {required} candles, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("degenerate input: {0}")]
    Degenerate(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let e = AnalysisError::InsufficientData {
            required: 15,
            available: 3,
        };
        assert_eq!(
            e.to_string(),
            "insufficient data: need 15 candles, have 3"
        );

        let e = AnalysisError::Degenerate("non-finite close price".into());
        assert!(e.to_string().contains("non-finite"));
    }
}
