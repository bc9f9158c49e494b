//! Domain types: candles, snapshots, assessments, structure, setups.

pub mod assessment;
pub mod candle;
pub mod orderbook;
pub mod profile;
pub mod setup;
pub mod snapshot;
pub mod structure;

pub use assessment::{
    category, round1, round2, AssessmentStatus, CategoryResult, CategoryStatus, Direction,
    GlobalAssessment, IndicatorDetail, WeightedScore,
};
pub use candle::{closes, Candle};
pub use orderbook::{BookLevel, OrderBookSnapshot, TradePrint, TradeSide, IMBALANCE_DEPTH};
pub use profile::{VolumeProfile, VolumeProfileLevel};
pub use setup::{EntryRule, SetupDecision, TradeSetup};
pub use snapshot::{MarketSnapshot, PositionState, Timeframe};
pub use structure::{Divergence, LevelStrength, SupportResistance, SwingPoint, TrendPattern};
