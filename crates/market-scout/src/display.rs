//! Presentation helpers: markdown-safe text and the paper-trade desk

use crate::error::{Result, ScoutError};
use crate::model::Ticker;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Escape `$` so markdown renderers do not read it as math
pub fn escape_dollars(text: &str) -> String {
    text.replace('$', "\\$")
}

/// Side of a simulated order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Buy => "Buy",
            Self::Sell => "Sell",
            Self::Hold => "Hold",
        })
    }
}

impl FromStr for TradeAction {
    type Err = ScoutError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "buy" | "b" => Ok(Self::Buy),
            "sell" | "s" => Ok(Self::Sell),
            "hold" | "h" => Ok(Self::Hold),
            other => Err(ScoutError::Command(format!(
                "Unknown trade action: {other}. Use buy, sell or hold"
            ))),
        }
    }
}

/// A simulated order; nothing is ever sent to a broker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperTrade {
    pub action: TradeAction,
    pub shares: u32,
    pub ticker: Ticker,
}

impl PaperTrade {
    /// Validate an order; at least one share
    pub fn new(action: TradeAction, shares: u32, ticker: Ticker) -> Result<Self> {
        if shares == 0 {
            return Err(ScoutError::Command("Number of shares must be at least 1".to_string()));
        }
        Ok(Self {
            action,
            shares,
            ticker,
        })
    }

    /// Confirmation shown to the user
    pub fn confirmation(&self) -> String {
        format!(
            "✅ Simulated Order Placed: {} {} shares of {}.\n\
             Note: To trade real capital, you would connect a brokerage API here to replace this simulation logic.",
            self.action, self.shares, self.ticker
        )
    }
}
