//! PulseLab Core — market-snapshot analysis engine.
//!
//! Turns one `MarketSnapshot` into a normalized multi-factor assessment and,
//! when the gates pass, a fully sized trade setup:
//! - Domain types (candles, order book, assessments, setups)
//! - Indicator math with documented short-history defaults
//! - Five category extractors built on rule-bucket cascades
//! - Weighted scoring engine with direction votes and confidence
//! - Multi-timeframe consolidator
//! - Rule-gated entry/setup generator
//!
//! Everything is a pure function of the snapshot and an injected
//! `AnalysisConfig`; nothing is cached or mutated across invocations, so
//! independent symbols and timeframes score in parallel freely.

pub mod config;
pub mod domain;
pub mod error;
pub mod extractors;
pub mod fingerprint;
pub mod indicators;
pub mod pipeline;
pub mod scoring;
pub mod setup;

pub use config::{AnalysisConfig, Weights};
pub use error::AnalysisError;
pub use pipeline::{analyze, analyze_full, analyze_timeframes, generate_setup, Analysis};
