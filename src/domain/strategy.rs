//! Strategy selection and parameters.

use std::fmt;
use std::str::FromStr;

use crate::domain::indicator::IndicatorType;
use crate::domain::indicator::bollinger;
use crate::domain::indicator::snapshot::BASELINE_PERIOD;
use crate::domain::regime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Regime-adaptive entries with a latched position lifecycle.
    Adaptive,
    /// Short/long SMA comparison re-evaluated on every bar.
    Crossover,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Adaptive => write!(f, "adaptive"),
            StrategyKind::Crossover => write!(f, "crossover"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "adaptive" => Ok(StrategyKind::Adaptive),
            "crossover" => Ok(StrategyKind::Crossover),
            other => Err(format!(
                "unknown strategy kind '{}' (expected adaptive or crossover)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveParams {
    pub ema_period: usize,
    pub adx_period: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
    /// Bar window capacity.
    pub window: usize,
    pub regime_window: usize,
    pub initial_capital: f64,
    /// Fraction of capital risked per trade before volatility adjustment.
    pub risk_per_trade: f64,
    /// Trailing stop distance in percent of the reference price.
    pub trail_pct: f64,
}

impl Default for AdaptiveParams {
    fn default() -> Self {
        AdaptiveParams {
            ema_period: 20,
            adx_period: 14,
            rsi_period: 12,
            atr_period: 14,
            window: 100,
            regime_window: regime::DEFAULT_WINDOW,
            initial_capital: 60.0,
            risk_per_trade: 0.065,
            trail_pct: 1.5,
        }
    }
}

impl AdaptiveParams {
    pub fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Ema(self.ema_period),
            IndicatorType::Rsi(self.rsi_period),
            IndicatorType::Atr(self.atr_period),
            IndicatorType::Adx {
                period: self.adx_period,
                atr_period: self.atr_period,
            },
            IndicatorType::Bollinger {
                period: bollinger::DEFAULT_PERIOD,
                stddev_mult_x100: bollinger::DEFAULT_STDDEV_MULT_X100,
            },
            IndicatorType::VolumeEma(BASELINE_PERIOD),
        ]
    }

    /// Bars needed before the engine evaluates any rule.
    pub fn warmup(&self) -> usize {
        self.ema_period
            .max(self.adx_period)
            .max(self.rsi_period)
            .max(self.atr_period)
    }

    /// Bars needed before every rule input, including the squeeze ATR
    /// baseline, can be defined.
    pub fn required_history(&self) -> usize {
        let indicators = self
            .indicators()
            .iter()
            .map(IndicatorType::lookback)
            .max()
            .unwrap_or(0);
        let atr_baseline =
            IndicatorType::Atr(self.atr_period).lookback() + BASELINE_PERIOD.max(self.atr_period) - 1;
        indicators.max(atr_baseline).max(self.regime_window)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrossoverParams {
    pub short_period: usize,
    pub long_period: usize,
}

impl Default for CrossoverParams {
    fn default() -> Self {
        CrossoverParams {
            short_period: 20,
            long_period: 50,
        }
    }
}

impl CrossoverParams {
    pub fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Sma(self.short_period),
            IndicatorType::Sma(self.long_period),
        ]
    }

    pub fn window(&self) -> usize {
        self.short_period.max(self.long_period)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub name: String,
    pub kind: StrategyKind,
    pub adaptive: AdaptiveParams,
    pub crossover: CrossoverParams,
}

impl Strategy {
    pub fn new(kind: StrategyKind) -> Self {
        let name = match kind {
            StrategyKind::Adaptive => "TrendSurferStrategy",
            StrategyKind::Crossover => "SMA_Strategy",
        };
        Strategy {
            name: name.to_string(),
            kind,
            adaptive: AdaptiveParams::default(),
            crossover: CrossoverParams::default(),
        }
    }

    pub fn indicators(&self) -> Vec<IndicatorType> {
        match self.kind {
            StrategyKind::Adaptive => self.adaptive.indicators(),
            StrategyKind::Crossover => self.crossover.indicators(),
        }
    }
}
