//! Exponential Moving Average indicators.
//!
//! k = 2/(n+1). The recursive form seeds with the first value and then
//! EMA[i] = x[i]*k + EMA[i-1]*(1-k). The bias-adjusted form divides the
//! weighted sum by the sum of weights, which damps the seed's influence early on.
//! Warmup: first (n-1) points are undefined in both forms.

use super::Series;

pub fn calculate_ema(values: &[f64], period: usize) -> Series {
    if period == 0 {
        return vec![None; values.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut ema = 0.0;

    for (i, &x) in values.iter().enumerate() {
        ema = if i == 0 { x } else { x * k + ema * (1.0 - k) };
        out.push(if i + 1 >= period { Some(ema) } else { None });
    }

    out
}

pub fn calculate_adjusted_ema(values: &[f64], period: usize) -> Series {
    if period == 0 {
        return vec![None; values.len()];
    }

    let decay = 1.0 - 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut weighted = 0.0;
    let mut weights = 0.0;

    for (i, &x) in values.iter().enumerate() {
        weighted = x + decay * weighted;
        weights = 1.0 + decay * weights;
        out.push(if i + 1 >= period {
            Some(weighted / weights)
        } else {
            None
        });
    }

    out
}
