//! Trade setup output types.

use serde::{Deserialize, Serialize};

use super::assessment::Direction;

/// A concrete, fully sized trade proposal.
///
/// Prices and dollar amounts are rounded to 2 decimals for the presentation
/// collaborator; `conditions_met` enumerates the satisfied entry-rule
/// conditions so the reasoning is auditable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSetup {
    pub direction: Direction,
    /// In [0, 95].
    pub confidence: f64,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub position_size_usd: f64,
    pub risk_amount_usd: f64,
    pub risk_reward_ratio: f64,
    /// Which entry rule qualified.
    pub rule: EntryRule,
    pub conditions_met: Vec<String>,
    pub warnings: Vec<String>,
}

/// Entry rule families evaluated by the setup generator, in priority order.
///
/// Reversal is defined for LONG only; the rule table has no SHORT mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryRule {
    TrendFollowing,
    Reversal,
}

/// Outcome of the setup generator: a setup, or a structured refusal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "has_setup")]
pub enum SetupDecision {
    #[serde(rename = "true")]
    Setup(TradeSetup),
    #[serde(rename = "false")]
    NoSetup { reason: String },
}

impl SetupDecision {
    pub fn has_setup(&self) -> bool {
        matches!(self, SetupDecision::Setup(_))
    }

    pub fn no_setup(reason: impl Into<String>) -> Self {
        SetupDecision::NoSetup {
            reason: reason.into(),
        }
    }

    pub fn setup(&self) -> Option<&TradeSetup> {
        match self {
            SetupDecision::Setup(s) => Some(s),
            SetupDecision::NoSetup { .. } => None,
        }
    }
}
