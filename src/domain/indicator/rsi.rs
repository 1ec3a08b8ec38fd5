//! RSI (Relative Strength Index).
//!
//! Price changes are split into gains and losses; the first bar has no prior
//! close and contributes a zero change. Both are averaged with a simple
//! rolling mean over n bars:
//!
//! RSI = 100 - 100 / (1 + avg_gain / (avg_loss + ε))
//!
//! A flat or rising window therefore saturates near 100 instead of dividing
//! by zero. Warmup: first (n-1) points are undefined.

use super::{EPSILON, Series};

pub fn calculate_rsi(closes: &[f64], period: usize) -> Series {
    if period == 0 {
        return vec![None; closes.len()];
    }

    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        let change = if i == 0 { 0.0 } else { closes[i] - closes[i - 1] };
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let mut out = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        if i + 1 < period {
            out.push(None);
            continue;
        }
        let start = i + 1 - period;
        let avg_gain = gains[start..=i].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[start..=i].iter().sum::<f64>() / period as f64;
        let rs = avg_gain / (avg_loss + EPSILON);
        out.push(Some(100.0 - 100.0 / (1.0 + rs)));
    }

    out
}
