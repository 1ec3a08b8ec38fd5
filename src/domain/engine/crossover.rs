//! Short/long SMA comparison, re-evaluated on every bar.
//!
//! There is no position latch: once the long lookback is filled every bar is
//! BUY (short above long) or SELL (otherwise).

use tracing::trace;

use super::SignalEngine;
use crate::domain::bar_window::BarWindow;
use crate::domain::error::TraderError;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::{closes, last_value};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::{SignalKind, SignalReason, SignalRecord};
use crate::domain::strategy::CrossoverParams;

#[derive(Debug, Clone)]
pub struct CrossoverEngine {
    name: String,
    params: CrossoverParams,
    window: BarWindow,
}

impl CrossoverEngine {
    pub fn new(name: impl Into<String>, params: CrossoverParams) -> Self {
        CrossoverEngine {
            name: name.into(),
            window: BarWindow::new(params.window()),
            params,
        }
    }
}

impl SignalEngine for CrossoverEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, bar: &OhlcvBar) -> Result<SignalRecord, TraderError> {
        bar.ensure_finite()?;
        self.window.push(bar.clone());

        let closes = closes(self.window.as_slice());
        let short = last_value(&calculate_sma(&closes, self.params.short_period));
        let long = last_value(&calculate_sma(&closes, self.params.long_period));

        let (Some(short), Some(long)) = (short, long) else {
            return Ok(SignalRecord::hold(bar.timestamp, bar.close, None));
        };

        let (kind, reason) = if short > long {
            (SignalKind::Buy, SignalReason::ShortAboveLong)
        } else {
            (SignalKind::Sell, SignalReason::ShortBelowLong)
        };
        trace!(strategy = %self.name, timestamp = %bar.timestamp, short, long, %kind);

        Ok(SignalRecord {
            timestamp: bar.timestamp,
            kind,
            price: bar.close,
            regime: None,
            reason: Some(reason),
        })
    }

    fn window(&self) -> &BarWindow {
        &self.window
    }
}
