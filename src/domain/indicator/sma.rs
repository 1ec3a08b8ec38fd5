//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(x[i-n+1..=i]). Warmup: first (n-1) points are undefined.

use super::Series;

pub fn calculate_sma(values: &[f64], period: usize) -> Series {
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;

    for (i, &x) in values.iter().enumerate() {
        sum += x;
        if period > 0 && i >= period {
            sum -= values[i - period];
        }
        if period == 0 || i + 1 < period {
            out.push(None);
        } else {
            out.push(Some(sum / period as f64));
        }
    }

    out
}
