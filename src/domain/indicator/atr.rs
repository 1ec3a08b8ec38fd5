//! Average True Range.
//!
//! TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|); undefined on the first bar,
//! which has no previous close. ATR(n) is the simple rolling mean of TR, so
//! the first defined value lands on bar n (0-based).

use super::{Series, rolling_mean};
use crate::domain::ohlcv::OhlcvBar;

pub fn true_range_series(bars: &[OhlcvBar]) -> Series {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                None
            } else {
                Some(bar.true_range(bars[i - 1].close))
            }
        })
        .collect()
}

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> Series {
    rolling_mean(&true_range_series(bars), period)
}
