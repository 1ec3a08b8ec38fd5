//! Technical indicator implementations.
//!
//! Every indicator is a pure function of a bar (or value) slice returning a
//! [`Series`] aligned index-for-index with its input. `None` marks positions
//! where the lookback is not yet satisfied; callers treat it as "insufficient
//! history", never as an error.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod rsi;
pub mod sma;
pub mod snapshot;
pub mod stddev;

use std::fmt;

use crate::domain::ohlcv::OhlcvBar;

/// Denominator nudge used wherever a ratio could otherwise divide by zero.
pub const EPSILON: f64 = 1e-10;

/// Indicator values aligned with the input bars.
pub type Series = Vec<Option<f64>>;

/// Identity and parameters of an indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    VolumeEma(usize),
    Rsi(usize),
    Atr(usize),
    Adx { period: usize, atr_period: usize },
    Bollinger { period: usize, stddev_mult_x100: u32 },
}

impl IndicatorType {
    /// Bars required before the indicator's latest value is defined.
    pub fn lookback(&self) -> usize {
        match *self {
            IndicatorType::Sma(period)
            | IndicatorType::Ema(period)
            | IndicatorType::VolumeEma(period)
            | IndicatorType::Rsi(period) => period,
            // true range needs a previous close
            IndicatorType::Atr(period) => period + 1,
            IndicatorType::Adx { period, atr_period } => {
                (atr_period + 1).max(period) + period - 1
            }
            IndicatorType::Bollinger { period, .. } => period,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::VolumeEma(period) => write!(f, "VOLUME_EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Adx { period, atr_period } => {
                write!(f, "ADX({},{})", period, atr_period)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}

pub fn closes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

pub fn volumes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.volume).collect()
}

/// Latest value of a series, `None` if empty or still warming up.
pub fn last_value(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}

/// Rolling mean over a series that may contain undefined points. A window
/// containing any undefined point is itself undefined.
pub fn rolling_mean(series: &[Option<f64>], period: usize) -> Series {
    let mut out = Vec::with_capacity(series.len());
    for i in 0..series.len() {
        if period == 0 || i + 1 < period {
            out.push(None);
            continue;
        }
        let window = &series[i + 1 - period..=i];
        let sum: Option<f64> = window.iter().copied().sum();
        out.push(sum.map(|s| s / period as f64));
    }
    out
}
