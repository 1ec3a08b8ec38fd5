//! Average Directional Index with its +DI / -DI components.
//!
//! up = H[i] - H[i-1], down = L[i] - L[i-1]
//! +DM = up if up > down and up > 0, else 0
//! -DM = down if down > up and down > 0, else 0
//! ±DI = 100 * rolling_mean(±DM, n) / ATR
//! DX  = 100 * |+DI - -DI| / (+DI + -DI + ε)
//! ADX = rolling_mean(DX, n)
//!
//! The first bar has no directional movement and counts as zero. The DI
//! lines inherit the ATR warmup; a zero ATR leaves them undefined.

use super::{EPSILON, Series, rolling_mean};
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalIndex {
    pub adx: Series,
    pub plus_di: Series,
    pub minus_di: Series,
}

pub fn directional_movement(bars: &[OhlcvBar]) -> (Vec<f64>, Vec<f64>) {
    let mut plus_dm = Vec::with_capacity(bars.len());
    let mut minus_dm = Vec::with_capacity(bars.len());

    for i in 0..bars.len() {
        if i == 0 {
            plus_dm.push(0.0);
            minus_dm.push(0.0);
            continue;
        }
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i].low - bars[i - 1].low;
        plus_dm.push(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm.push(if down > up && down > 0.0 { down } else { 0.0 });
    }

    (plus_dm, minus_dm)
}

/// `atr` must be aligned with `bars`; it is passed in rather than recomputed
/// because callers already hold it.
pub fn calculate_adx(bars: &[OhlcvBar], atr: &[Option<f64>], period: usize) -> DirectionalIndex {
    let (plus_dm, minus_dm) = directional_movement(bars);
    let plus_avg = rolling_mean(&plus_dm.into_iter().map(Some).collect::<Vec<_>>(), period);
    let minus_avg = rolling_mean(&minus_dm.into_iter().map(Some).collect::<Vec<_>>(), period);

    let di = |avg: &Series| -> Series {
        avg.iter()
            .zip(atr)
            .map(|(dm, tr)| match (dm, tr) {
                (Some(dm), Some(tr)) if *tr > 0.0 => Some(100.0 * dm / tr),
                _ => None,
            })
            .collect()
    };
    let plus_di = di(&plus_avg);
    let minus_di = di(&minus_avg);

    let dx: Series = plus_di
        .iter()
        .zip(&minus_di)
        .map(|(p, m)| match (p, m) {
            (Some(p), Some(m)) => Some(100.0 * (p - m).abs() / (p + m + EPSILON)),
            _ => None,
        })
        .collect();

    DirectionalIndex {
        adx: rolling_mean(&dx, period),
        plus_di,
        minus_di,
    }
}
