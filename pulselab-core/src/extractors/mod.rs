//! Category extractors.
//!
//! Five independent extractors turn a market snapshot into category results:
//! technical, volume, sentiment, structure and risk. Each is a pure function
//! of its explicit inputs, scores through ordered rule-bucket cascades
//! (`rules` module), and degrades to documented neutral defaults on short
//! history. Internal failures surface as `AnalysisError` and are converted
//! to empty category results at the pipeline boundary, never propagated.

pub mod risk;
pub mod rules;
pub mod sentiment;
pub mod structure;
pub mod technical;
pub mod volume;
