//! Trade log entries produced by the portfolio simulator.

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl TradeDirection {
    /// Direction of a signed share count; None for zero.
    pub fn from_shares(traded_shares: i64) -> Option<Self> {
        match traded_shares.signum() {
            1 => Some(TradeDirection::Buy),
            -1 => Some(TradeDirection::Sell),
            _ => None,
        }
    }
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            TradeDirection::Buy => "BUY",
            TradeDirection::Sell => "SELL",
        })
    }
}

/// A simulated fill at the bar's close. `traded_shares` is signed: positive
/// for buys, negative for sells.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub date: NaiveDate,
    pub direction: TradeDirection,
    pub traded_shares: i64,
    pub fill_price: f64,
}

impl TradeRecord {
    /// Cash moved by the fill: negative for buys, positive for sells.
    pub fn cash_flow(&self) -> f64 {
        -(self.traded_shares as f64) * self.fill_price
    }
}

pub type TradeLog = Vec<TradeRecord>;
