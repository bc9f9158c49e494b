//! Order book snapshot and trade prints.

use serde::{Deserialize, Serialize};

/// A single (price, size) level in the book.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BookLevel {
    pub price: f64,
    pub size: f64,
}

impl From<(f64, f64)> for BookLevel {
    fn from((price, size): (f64, f64)) -> Self {
        BookLevel { price, size }
    }
}

/// Top-of-book snapshot: bids descending by price, asks ascending.
///
/// The sentiment extractor only inspects the top `IMBALANCE_DEPTH` levels
/// per side; deeper levels are carried but ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

/// Number of levels per side used for the imbalance ratio.
pub const IMBALANCE_DEPTH: usize = 10;

impl OrderBookSnapshot {
    /// Bid/ask size ratio over the top `IMBALANCE_DEPTH` levels.
    ///
    /// Edge case: zero ask volume reads as 2.0 when any bid volume exists
    /// (maximal one-sided pressure), 1.0 when both sides are empty.
    pub fn bid_ask_ratio(&self) -> f64 {
        let bid_vol: f64 = self
            .bids
            .iter()
            .take(IMBALANCE_DEPTH)
            .map(|l| l.size)
            .sum();
        let ask_vol: f64 = self
            .asks
            .iter()
            .take(IMBALANCE_DEPTH)
            .map(|l| l.size)
            .sum();

        if ask_vol <= 0.0 {
            if bid_vol > 0.0 {
                2.0
            } else {
                1.0
            }
        } else {
            bid_vol / ask_vol
        }
    }
}

/// Side of an executed trade print.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// An executed trade, used for exact volume-delta computation when available.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TradePrint {
    pub side: TradeSide,
    pub size: f64,
}
