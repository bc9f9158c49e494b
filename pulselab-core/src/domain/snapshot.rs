//! Market snapshot — the single input of one analysis invocation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::candle::Candle;
use super::orderbook::{OrderBookSnapshot, TradePrint};

/// Candle cadence of a snapshot.
///
/// Rolling windows (1h/4h/24h volume sums, etc.) are derived from the
/// declared cadence rather than hardcoded candle counts, so snapshots at any
/// cadence produce window sizes with the intended wall-clock meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    M1,
    M5,
    M15,
    H1,
    H4,
    /// Unrecognized label; windows fall back to the 5-minute cadence.
    Other(String),
}

impl Timeframe {
    /// Minutes covered by one candle at this cadence.
    pub fn minutes_per_candle(&self) -> u32 {
        match self {
            Timeframe::M1 => 1,
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
            Timeframe::Other(_) => 5,
        }
    }

    /// Number of candles covering `hours` of wall-clock time (at least 1).
    pub fn candles_in_hours(&self, hours: u32) -> usize {
        ((hours * 60) / self.minutes_per_candle()).max(1) as usize
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeframe::M1 => write!(f, "1m"),
            Timeframe::M5 => write!(f, "5m"),
            Timeframe::M15 => write!(f, "15m"),
            Timeframe::H1 => write!(f, "1h"),
            Timeframe::H4 => write!(f, "4h"),
            Timeframe::Other(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for Timeframe {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "1m" => Timeframe::M1,
            "5m" => Timeframe::M5,
            "15m" => Timeframe::M15,
            "1h" => Timeframe::H1,
            "4h" => Timeframe::H4,
            other => Timeframe::Other(other.to_string()),
        })
    }
}

/// Account exposure and session state, supplied by the risk collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionState {
    pub total_exposure_usd: f64,
    pub free_margin_usd: f64,
    pub session_pnl: f64,
    pub session_start_balance: f64,
}

/// Everything one analysis invocation consumes.
///
/// Assumed already normalized by the data-adapter collaborator: chronological
/// candles at a consistent cadence, numeric funding/OI values, book levels as
/// (price, size) pairs. Nothing here is cached or mutated by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub candles: Vec<Candle>,
    /// Current funding rate, e.g. 0.01 = 1% per funding interval.
    pub funding_rate: f64,
    /// 24h open-interest change, percent.
    pub oi_change_24h: f64,
    /// Long/short account ratio, when the feed reports one.
    pub long_short_ratio: Option<f64>,
    pub order_book: OrderBookSnapshot,
    /// Executed trades over the current candle, if the feed provides them.
    pub trades: Option<Vec<TradePrint>>,
    pub account_balance: f64,
    pub position: PositionState,
}

impl MarketSnapshot {
    /// Last close price, or 0.0 for an empty series.
    pub fn current_price(&self) -> f64 {
        self.candles.last().map(|c| c.close).unwrap_or(0.0)
    }
}
