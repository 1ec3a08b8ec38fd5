//! Capital and position state owned by one strategy engine.

use super::position::{ClosedTrade, Position};

/// Mutated only at trade boundaries: entry debits the risked amount, exit
/// credits realized PnL.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub initial_capital: f64,
    pub capital: f64,
    pub position: Option<Position>,
    pub closed_trades: Vec<ClosedTrade>,
}

impl Account {
    pub fn new(initial_capital: f64) -> Self {
        Account {
            initial_capital,
            capital: initial_capital,
            position: None,
            closed_trades: Vec::new(),
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    pub fn realized_pnl(&self) -> f64 {
        self.closed_trades.iter().map(|t| t.pnl).sum()
    }
}
