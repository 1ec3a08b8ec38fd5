//! Regime-adaptive strategy: a FLAT / IN_POSITION state machine.
//!
//! Per bar, after the window and indicators are refreshed:
//! - IN_POSITION: ratchet the running high, then exit (SELL) on the first
//!   firing exit rule, otherwise HOLD.
//! - FLAT: enter (BUY) when the current regime's entry rule fires and the
//!   stop distance is positive, otherwise HOLD.
//! - Indicators still warming up: HOLD.

use tracing::debug;

use super::SignalEngine;
use crate::domain::bar_window::BarWindow;
use crate::domain::error::TraderError;
use crate::domain::execution::{EntryResult, enter_long, exit_long, risk_fraction};
use crate::domain::indicator::snapshot::IndicatorSnapshot;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::portfolio::Account;
use crate::domain::regime::classify_regime;
use crate::domain::rule_eval::{evaluate_entry, evaluate_exit};
use crate::domain::signal::{SignalKind, SignalReason, SignalRecord};
use crate::domain::strategy::AdaptiveParams;

#[derive(Debug, Clone)]
pub struct AdaptiveEngine {
    name: String,
    params: AdaptiveParams,
    window: BarWindow,
    account: Account,
}

impl AdaptiveEngine {
    pub fn new(name: impl Into<String>, params: AdaptiveParams) -> Self {
        AdaptiveEngine {
            name: name.into(),
            window: BarWindow::new(params.window),
            account: Account::new(params.initial_capital),
            params,
        }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }
}

impl SignalEngine for AdaptiveEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, bar: &OhlcvBar) -> Result<SignalRecord, TraderError> {
        bar.ensure_finite()?;
        self.window.push(bar.clone());
        let bars = self.window.as_slice();

        let Some(snap) = IndicatorSnapshot::compute(bars, &self.params) else {
            return Ok(SignalRecord::hold(bar.timestamp, bar.close, None));
        };
        let Some(regime) = classify_regime(bars, self.params.regime_window) else {
            return Ok(SignalRecord::hold(bar.timestamp, bar.close, None));
        };

        if let Some(position) = self.account.position.as_mut() {
            position.observe(bar.close, bar.high);
            let Some(rule) = evaluate_exit(position, &snap, regime, self.params.trail_pct) else {
                return Ok(SignalRecord::hold(bar.timestamp, bar.close, Some(regime)));
            };

            if let Some(trade) = exit_long(&mut self.account, bar.timestamp, bar.close, rule) {
                debug!(
                    strategy = %self.name,
                    timestamp = %bar.timestamp,
                    price = bar.close,
                    exit = %rule,
                    pnl = trade.pnl,
                    realized = self.account.realized_pnl(),
                    capital = self.account.capital,
                    "SELL"
                );
            }
            return Ok(SignalRecord {
                timestamp: bar.timestamp,
                kind: SignalKind::Sell,
                price: bar.close,
                regime: Some(regime),
                reason: Some(SignalReason::Exit(rule)),
            });
        }

        let Some(rule) = evaluate_entry(&snap, regime) else {
            return Ok(SignalRecord::hold(bar.timestamp, bar.close, Some(regime)));
        };

        let fraction = risk_fraction(self.params.risk_per_trade, snap.volatility_factor());
        match enter_long(
            &mut self.account,
            bar.timestamp,
            bar.close,
            bar.high,
            regime,
            rule,
            fraction,
            self.params.trail_pct,
        ) {
            EntryResult::Entered {
                size, risk_amount, ..
            } => {
                debug!(
                    strategy = %self.name,
                    timestamp = %bar.timestamp,
                    price = bar.close,
                    entry = %rule,
                    size,
                    risk_amount,
                    capital = self.account.capital,
                    "BUY"
                );
                Ok(SignalRecord {
                    timestamp: bar.timestamp,
                    kind: SignalKind::Buy,
                    price: bar.close,
                    regime: Some(regime),
                    reason: Some(SignalReason::Entry(rule)),
                })
            }
            rejected => {
                debug!(strategy = %self.name, timestamp = %bar.timestamp, ?rejected, "entry rejected");
                Ok(SignalRecord::hold(bar.timestamp, bar.close, Some(regime)))
            }
        }
    }

    fn window(&self) -> &BarWindow {
        &self.window
    }
}
