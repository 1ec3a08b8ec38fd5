//! Entry and exit rules of the regime-adaptive strategy.
//!
//! Rules are closed enums rather than booleans so the cause of every BUY/SELL
//! stays inspectable in tests and logs. Thresholds live here as constants.

use std::fmt;

use super::regime::Regime;

/// Trend entry: close must clear the EMA by this factor.
pub const TREND_EMA_PREMIUM: f64 = 1.02;
pub const TREND_MIN_RSI: f64 = 62.5;
pub const TREND_MIN_ADX: f64 = 25.0;

pub const RANGE_MAX_ADX: f64 = 20.0;
pub const RANGE_OVERSOLD_RSI: f64 = 30.0;
pub const RANGE_OVERBOUGHT_RSI: f64 = 70.0;

/// Squeeze entry: ATR must sit below this fraction of its baseline.
pub const SQUEEZE_ATR_RATIO: f64 = 0.8;
/// Squeeze entry: volume must exceed this multiple of its baseline.
pub const SQUEEZE_VOLUME_RATIO: f64 = 1.2;

/// Volatility exit: close below EMA minus this many ATRs.
pub const VOLATILITY_EXIT_ATR_MULT: f64 = 3.5;
pub const MOMENTUM_EXIT_RSI: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryRule {
    Trend,
    Range,
    Squeeze,
}

impl EntryRule {
    /// The entry rule that applies in a given regime.
    pub fn for_regime(regime: Regime) -> Self {
        match regime {
            Regime::Trend => EntryRule::Trend,
            Regime::Range => EntryRule::Range,
            Regime::Squeeze => EntryRule::Squeeze,
        }
    }
}

impl fmt::Display for EntryRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryRule::Trend => write!(f, "trend"),
            EntryRule::Range => write!(f, "range"),
            EntryRule::Squeeze => write!(f, "squeeze"),
        }
    }
}

/// Exit causes in evaluation order; the first that fires is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitRule {
    TrailingStop,
    Volatility,
    Momentum,
    RegimeShift,
}

impl fmt::Display for ExitRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitRule::TrailingStop => write!(f, "trailing_stop"),
            ExitRule::Volatility => write!(f, "volatility"),
            ExitRule::Momentum => write!(f, "momentum"),
            ExitRule::RegimeShift => write!(f, "regime_shift"),
        }
    }
}
