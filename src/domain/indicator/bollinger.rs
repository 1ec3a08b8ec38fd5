//! Bollinger Bands.
//!
//! - Middle: SMA over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! StdDev is the sample standard deviation (divides by n-1).
//! Default parameters: period=20, multiplier=2.0.
//! Warmup: first (period-1) points are undefined.

use super::Series;
use super::sma::calculate_sma;
use super::stddev::calculate_stddev;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_STDDEV_MULT_X100: u32 = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Series,
    pub middle: Series,
    pub lower: Series,
}

pub fn calculate_bollinger(closes: &[f64], period: usize, stddev_mult_x100: u32) -> BollingerBands {
    let mult = stddev_mult_x100 as f64 / 100.0;
    let middle = calculate_sma(closes, period);
    let stddev = calculate_stddev(closes, period);

    let band = |sign: f64| -> Series {
        middle
            .iter()
            .zip(&stddev)
            .map(|(m, s)| match (m, s) {
                (Some(m), Some(s)) => Some(m + sign * mult * s),
                _ => None,
            })
            .collect()
    };
    let upper = band(1.0);
    let lower = band(-1.0);

    BollingerBands {
        upper,
        middle,
        lower,
    }
}
