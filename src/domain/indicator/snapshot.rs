//! Per-bar indicator snapshot consumed by the regime-adaptive engine.

use super::adx::calculate_adx;
use super::atr::calculate_atr;
use super::bollinger::{self, calculate_bollinger};
use super::ema::{calculate_adjusted_ema, calculate_ema};
use super::rsi::calculate_rsi;
use super::sma::calculate_sma;
use super::{closes, last_value, rolling_mean, volumes};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::strategy::AdaptiveParams;

/// Lookback for the volume EMA and the ATR / volume baselines used by the
/// squeeze rule.
pub const BASELINE_PERIOD: usize = 20;

/// Latest indicator values for the newest bar in a window. Any field may be
/// `None` while its own lookback is still filling.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub volume: f64,
    pub ema: Option<f64>,
    pub rsi: Option<f64>,
    pub atr: Option<f64>,
    pub adx: Option<f64>,
    pub plus_di: Option<f64>,
    pub minus_di: Option<f64>,
    pub upper_band: Option<f64>,
    pub lower_band: Option<f64>,
    pub volume_ema: Option<f64>,
    /// ATR averaged over the last [`BASELINE_PERIOD`] bars.
    pub atr_baseline: Option<f64>,
    /// Volume averaged over the last [`BASELINE_PERIOD`] bars.
    pub volume_baseline: Option<f64>,
    /// ATR averaged over the ATR period; denominator of the volatility factor.
    pub atr_average: Option<f64>,
}

impl IndicatorSnapshot {
    /// Returns `None` until the window holds the longest of the configured
    /// EMA/ADX/RSI/ATR periods.
    pub fn compute(bars: &[OhlcvBar], params: &AdaptiveParams) -> Option<Self> {
        if bars.len() < params.warmup() {
            return None;
        }
        let latest = bars.last()?;

        let closes = closes(bars);
        let volumes = volumes(bars);

        let atr = calculate_atr(bars, params.atr_period);
        let dmi = calculate_adx(bars, &atr, params.adx_period);
        let bands = calculate_bollinger(
            &closes,
            bollinger::DEFAULT_PERIOD,
            bollinger::DEFAULT_STDDEV_MULT_X100,
        );

        Some(Self {
            close: latest.close,
            volume: latest.volume,
            ema: last_value(&calculate_ema(&closes, params.ema_period)),
            rsi: last_value(&calculate_rsi(&closes, params.rsi_period)),
            atr: last_value(&atr),
            adx: last_value(&dmi.adx),
            plus_di: last_value(&dmi.plus_di),
            minus_di: last_value(&dmi.minus_di),
            upper_band: last_value(&bands.upper),
            lower_band: last_value(&bands.lower),
            volume_ema: last_value(&calculate_adjusted_ema(&volumes, BASELINE_PERIOD)),
            atr_baseline: last_value(&rolling_mean(&atr, BASELINE_PERIOD)),
            volume_baseline: last_value(&calculate_sma(&volumes, BASELINE_PERIOD)),
            atr_average: last_value(&rolling_mean(&atr, params.atr_period)),
        })
    }

    /// Current ATR relative to its average; 1.0 whenever either side is
    /// undefined or the ratio is not a positive finite number.
    pub fn volatility_factor(&self) -> f64 {
        match (self.atr, self.atr_average) {
            (Some(atr), Some(avg)) if avg != 0.0 => {
                let factor = atr / avg;
                if factor.is_finite() && factor > 0.0 {
                    factor
                } else {
                    1.0
                }
            }
            _ => 1.0,
        }
    }
}
