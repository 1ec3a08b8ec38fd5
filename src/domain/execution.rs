//! Entry and exit bookkeeping with volatility-adjusted sizing.
//!
//! Entry:
//! 1. risk fraction = risk_per_trade / volatility factor
//! 2. risk amount = capital × risk fraction
//! 3. stop = trailing stop applied to the entry price
//! 4. size = risk amount / (entry - stop); rejected if the distance is not positive
//! 5. capital -= risk amount
//!
//! Exit: pnl = (exit - entry) × size; capital += pnl.

use chrono::NaiveDateTime;

use super::portfolio::Account;
use super::position::{ClosedTrade, Position, trailing_stop};
use super::regime::Regime;
use super::rule::{EntryRule, ExitRule};

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered {
        size: f64,
        stop_loss: f64,
        risk_amount: f64,
    },
    /// Entry price minus stop was zero or negative.
    NonPositiveStopDistance,
    AlreadyInPosition,
}

/// Fraction of capital to risk, scaled down when volatility runs hot.
pub fn risk_fraction(risk_per_trade: f64, volatility_factor: f64) -> f64 {
    risk_per_trade * (1.0 / volatility_factor)
}

#[allow(clippy::too_many_arguments)]
pub fn enter_long(
    account: &mut Account,
    timestamp: NaiveDateTime,
    price: f64,
    high: f64,
    regime: Regime,
    entry_rule: EntryRule,
    risk_fraction: f64,
    trail_pct: f64,
) -> EntryResult {
    if account.position.is_some() {
        return EntryResult::AlreadyInPosition;
    }

    let stop_loss = trailing_stop(price, trail_pct);
    let distance = price - stop_loss;
    if distance <= 0.0 || !distance.is_finite() {
        return EntryResult::NonPositiveStopDistance;
    }

    let risk_amount = account.capital * risk_fraction;
    let size = risk_amount / distance;

    account.capital -= risk_amount;
    account.position = Some(Position {
        entry_timestamp: timestamp,
        entry_price: price,
        stop_loss,
        size,
        risk_amount,
        regime,
        entry_rule,
        high_since_entry: high.max(price),
    });

    EntryResult::Entered {
        size,
        stop_loss,
        risk_amount,
    }
}

/// Closes the open position, if any, and credits realized PnL.
pub fn exit_long(
    account: &mut Account,
    timestamp: NaiveDateTime,
    price: f64,
    exit_rule: ExitRule,
) -> Option<ClosedTrade> {
    let position = account.position.take()?;
    let pnl = position.unrealized_pnl(price);
    account.capital += pnl;

    let trade = ClosedTrade {
        entry_timestamp: position.entry_timestamp,
        exit_timestamp: timestamp,
        entry_price: position.entry_price,
        exit_price: price,
        size: position.size,
        pnl,
        regime: position.regime,
        exit_rule,
    };
    account.closed_trades.push(trade.clone());
    Some(trade)
}
