//! Open position and closed trade records of the regime-adaptive engine.

use chrono::NaiveDateTime;

use super::regime::Regime;
use super::rule::{EntryRule, ExitRule};

/// Stop price `trail_pct` percent below `reference`.
pub fn trailing_stop(reference: f64, trail_pct: f64) -> f64 {
    reference * (1.0 - trail_pct / 100.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_timestamp: NaiveDateTime,
    pub entry_price: f64,
    /// Initial stop computed from the entry price.
    pub stop_loss: f64,
    pub size: f64,
    /// Amount debited from capital on entry.
    pub risk_amount: f64,
    pub regime: Regime,
    pub entry_rule: EntryRule,
    /// Highest high among bars since entry that closed at or above the entry price.
    pub high_since_entry: f64,
}

impl Position {
    /// Ratchets the running high. Bars closing below the entry price are ignored.
    pub fn observe(&mut self, close: f64, high: f64) {
        if close >= self.entry_price && high > self.high_since_entry {
            self.high_since_entry = high;
        }
    }

    pub fn trailing_stop(&self, trail_pct: f64) -> f64 {
        trailing_stop(self.high_since_entry, trail_pct)
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        (price - self.entry_price) * self.size
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub entry_timestamp: NaiveDateTime,
    pub exit_timestamp: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    pub size: f64,
    pub pnl: f64,
    pub regime: Regime,
    pub exit_rule: ExitRule,
}
