//! Standard deviation: the rolling sample form for Bollinger bands and the
//! whole-sample population form for trade statistics.
//!
//! STDDEV(n)[i] = sqrt(sum((x[i-j] - SMA(n)[i])^2 for j in 0..n) / (n-1))
//! Warmup: first (n-1) points are undefined. Requires n >= 2.

use super::Series;

pub fn calculate_stddev(values: &[f64], period: usize) -> Series {
    let mut out = Vec::with_capacity(values.len());

    for i in 0..values.len() {
        if period < 2 || i + 1 < period {
            out.push(None);
            continue;
        }
        let window = &values[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|x| {
                let diff = x - mean;
                diff * diff
            })
            .sum::<f64>()
            / (period - 1) as f64;
        out.push(Some(variance.sqrt()));
    }

    out
}

/// Population standard deviation of a whole sample; 0 for an empty sample.
pub fn population_stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}
