//! Market regime classification from recent bar geometry.
//!
//! Over the last `window` bars:
//! - range      = max(high) - min(low)
//! - avg body   = mean(|close - open|)
//! - wick ratio = mean((high - low) / (|close - open| + ε))
//!
//! Rules, first match wins:
//! 1. trend   if range > 2 × avg body and wick ratio < 2
//! 2. range   if wick ratio > 3 and avg body < 0.5 × range
//! 3. squeeze otherwise

use std::fmt;
use std::str::FromStr;

use super::ohlcv::OhlcvBar;

pub const DEFAULT_WINDOW: usize = 15;

/// Keeps doji candles from blowing the wick ratio up to infinity.
pub const BODY_EPSILON: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regime {
    Trend,
    Range,
    Squeeze,
}

impl Regime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::Trend => "trend",
            Regime::Range => "range",
            Regime::Squeeze => "squeeze",
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Regime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trend" => Ok(Regime::Trend),
            "range" => Ok(Regime::Range),
            "squeeze" => Ok(Regime::Squeeze),
            other => Err(format!("unknown regime '{}'", other)),
        }
    }
}

/// Geometry measured over the classification window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeStats {
    pub range: f64,
    pub avg_body: f64,
    pub wick_ratio: f64,
}

impl RegimeStats {
    /// `None` for an empty slice; otherwise uses up to the last `window` bars.
    pub fn measure(bars: &[OhlcvBar], window: usize) -> Option<Self> {
        if bars.is_empty() || window == 0 {
            return None;
        }
        let recent = &bars[bars.len().saturating_sub(window)..];
        let n = recent.len() as f64;

        let high = recent.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let low = recent.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let avg_body = recent.iter().map(OhlcvBar::body).sum::<f64>() / n;
        let wick_ratio = recent
            .iter()
            .map(|b| (b.high - b.low) / (b.body() + BODY_EPSILON))
            .sum::<f64>()
            / n;

        Some(Self {
            range: high - low,
            avg_body,
            wick_ratio,
        })
    }

    pub fn regime(&self) -> Regime {
        if self.range > self.avg_body * 2.0 && self.wick_ratio < 2.0 {
            Regime::Trend
        } else if self.wick_ratio > 3.0 && self.avg_body < self.range * 0.5 {
            Regime::Range
        } else {
            Regime::Squeeze
        }
    }
}

pub fn classify_regime(bars: &[OhlcvBar], window: usize) -> Option<Regime> {
    RegimeStats::measure(bars, window).map(|stats| stats.regime())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(i: usize, open: f64, high: f64, low: f64, close: f64) -> OhlcvBar {
        OhlcvBar {
            timestamp: NaiveDate::from_ymd_opt(2025, 5, 8)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                + chrono::Duration::minutes(i as i64),
            open,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    fn marubozu_uptrend(n: usize) -> Vec<OhlcvBar> {
        (0..n)
            .map(|i| {
                let open = 100.0 + i as f64;
                bar(i, open, open + 1.1, open - 0.1, open + 1.0)
            })
            .collect()
    }

    fn long_wicks(n: usize) -> Vec<OhlcvBar> {
        (0..n)
            .map(|i| {
                let mid = 100.0 + (i % 3) as f64 * 0.1;
                bar(i, mid, mid + 2.0, mid - 2.0, mid + 0.2)
            })
            .collect()
    }

    #[test]
    fn full_body_trend() {
        let bars = marubozu_uptrend(20);
        let stats = RegimeStats::measure(&bars, DEFAULT_WINDOW).unwrap();
        assert!(stats.wick_ratio < 2.0);
        assert!(stats.range > 2.0 * stats.avg_body);
        assert_eq!(stats.regime(), Regime::Trend);
    }

    #[test]
    fn long_wick_range() {
        let bars = long_wicks(20);
        assert_eq!(classify_regime(&bars, DEFAULT_WINDOW), Some(Regime::Range));
    }

    #[test]
    fn flat_bars_are_squeeze() {
        let bars: Vec<OhlcvBar> = (0..15).map(|i| bar(i, 100.0, 100.0, 100.0, 100.0)).collect();
        assert_eq!(classify_regime(&bars, DEFAULT_WINDOW), Some(Regime::Squeeze));
    }

    #[test]
    fn big_bodies_without_range_are_squeeze() {
        // alternating full-body candles that go nowhere: range == body, wick ratio ~1
        let bars: Vec<OhlcvBar> = (0..15)
            .map(|i| {
                if i % 2 == 0 {
                    bar(i, 100.0, 110.0, 100.0, 110.0)
                } else {
                    bar(i, 110.0, 110.0, 100.0, 100.0)
                }
            })
            .collect();
        assert_eq!(classify_regime(&bars, DEFAULT_WINDOW), Some(Regime::Squeeze));
    }

    #[test]
    fn only_last_window_bars_count() {
        let mut bars = long_wicks(30);
        bars.extend(marubozu_uptrend(15).into_iter().enumerate().map(|(i, mut b)| {
            b.timestamp += chrono::Duration::minutes(30 + i as i64);
            b
        }));
        assert_eq!(classify_regime(&bars, DEFAULT_WINDOW), Some(Regime::Trend));
    }

    #[test]
    fn short_history_uses_what_is_there() {
        let bars = marubozu_uptrend(5);
        assert_eq!(classify_regime(&bars, DEFAULT_WINDOW), Some(Regime::Trend));
    }

    #[test]
    fn empty_is_unclassified() {
        assert_eq!(classify_regime(&[], DEFAULT_WINDOW), None);
        assert_eq!(classify_regime(&marubozu_uptrend(3), 0), None);
    }

    #[test]
    fn regime_round_trips_through_str() {
        for regime in [Regime::Trend, Regime::Range, Regime::Squeeze] {
            assert_eq!(regime.as_str().parse::<Regime>(), Ok(regime));
        }
        assert_eq!(" TREND ".parse::<Regime>(), Ok(Regime::Trend));
        assert!("sideways".parse::<Regime>().is_err());
    }
}
