//! Score fusion: single-snapshot engine and multi-timeframe consolidator.

pub mod consolidator;
pub mod engine;

pub use consolidator::{consolidate, ConsolidatedView};
pub use engine::score;
