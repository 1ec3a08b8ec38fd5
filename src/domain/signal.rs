//! Signal records emitted once per bar by a strategy engine.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;

use super::regime::Regime;
use super::rule::{EntryRule, ExitRule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Buy => "BUY",
            SignalKind::Sell => "SELL",
            SignalKind::Hold => "HOLD",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalKind {
    type Err = String;

    /// Accepts a bare token or a decorated label such as `TREND | Signal: BUY`;
    /// everything up to and including `Signal:` is discarded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = match s.split_once("Signal:") {
            Some((_, rest)) => rest,
            None => s,
        };
        match token.trim() {
            "BUY" => Ok(SignalKind::Buy),
            "SELL" => Ok(SignalKind::Sell),
            "HOLD" => Ok(SignalKind::Hold),
            other => Err(format!("unrecognized signal '{}'", other)),
        }
    }
}

/// Why an engine emitted a non-HOLD signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalReason {
    Entry(EntryRule),
    Exit(ExitRule),
    ShortAboveLong,
    ShortBelowLong,
}

impl fmt::Display for SignalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalReason::Entry(rule) => write!(f, "entry:{}", rule),
            SignalReason::Exit(rule) => write!(f, "exit:{}", rule),
            SignalReason::ShortAboveLong => write!(f, "short>long"),
            SignalReason::ShortBelowLong => write!(f, "short<=long"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SignalRecord {
    pub timestamp: NaiveDateTime,
    pub kind: SignalKind,
    pub price: f64,
    pub regime: Option<Regime>,
    pub reason: Option<SignalReason>,
}

impl SignalRecord {
    pub fn hold(timestamp: NaiveDateTime, price: f64, regime: Option<Regime>) -> Self {
        SignalRecord {
            timestamp,
            kind: SignalKind::Hold,
            price,
            regime,
            reason: None,
        }
    }

    pub fn is_hold(&self) -> bool {
        self.kind == SignalKind::Hold
    }

    /// `Signal Type` column text: `TREND | Signal: BUY` when a regime is
    /// attached, otherwise the bare token.
    pub fn label(&self) -> String {
        match self.regime {
            Some(regime) => format!(
                "{} | Signal: {}",
                regime.as_str().to_uppercase(),
                self.kind
            ),
            None => self.kind.to_string(),
        }
    }
}
