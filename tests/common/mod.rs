#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use trendsurfer::domain::error::TraderError;
use trendsurfer::domain::metrics::LoggedSignal;
pub use trendsurfer::domain::ohlcv::OhlcvBar;
use trendsurfer::domain::signal::{SignalKind, SignalRecord};
use trendsurfer::ports::data_port::{DataPort, in_range};
use trendsurfer::ports::signal_log_port::{SignalLogPort, SignalLogRead};

pub struct MockDataPort {
    pub bars: Vec<OhlcvBar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(bars: Vec<OhlcvBar>) -> Self {
        Self { bars, error: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<OhlcvBar>, TraderError> {
        if let Some(reason) = &self.error {
            return Err(TraderError::BarSource {
                reason: reason.clone(),
            });
        }
        Ok(self
            .bars
            .iter()
            .filter(|b| in_range(b.timestamp, start, end))
            .cloned()
            .collect())
    }
}

/// Keeps written records in memory and reads them back as logged rows.
#[derive(Default)]
pub struct MemorySignalLog {
    pub written: RefCell<Vec<SignalRecord>>,
}

impl SignalLogPort for MemorySignalLog {
    fn write_signals(
        &self,
        strategy_name: &str,
        signals: &[SignalRecord],
    ) -> Result<PathBuf, TraderError> {
        self.written.borrow_mut().extend_from_slice(signals);
        Ok(PathBuf::from(format!("memory/{}.csv", strategy_name)))
    }

    fn read_signals(&self, _path: &Path) -> Result<SignalLogRead, TraderError> {
        Ok(SignalLogRead {
            signals: to_logged(&self.written.borrow()),
            skipped: 0,
        })
    }
}

pub fn to_logged(records: &[SignalRecord]) -> Vec<LoggedSignal> {
    records
        .iter()
        .filter(|r| r.kind != SignalKind::Hold)
        .map(|r| LoggedSignal {
            timestamp: r.timestamp.to_string(),
            kind: r.kind,
            price: r.price,
        })
        .collect()
}

pub fn ts(i: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::hours(i as i64)
}

pub fn make_bar(i: usize, open: f64, high: f64, low: f64, close: f64, volume: f64) -> OhlcvBar {
    OhlcvBar {
        timestamp: ts(i),
        open,
        high,
        low,
        close,
        volume,
    }
}

/// Candle from `open` to `close` with a small wick on both ends.
pub fn candle(i: usize, open: f64, close: f64, volume: f64) -> OhlcvBar {
    let (top, bottom) = if close >= open { (close, open) } else { (open, close) };
    make_bar(i, open, top + 0.05, bottom - 0.05, close, volume)
}

pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c, c + 0.5, c - 0.5, c, 1000.0))
        .collect()
}

pub fn rising_bars(count: usize, start_price: f64) -> Vec<OhlcvBar> {
    let closes: Vec<f64> = (0..count).map(|i| start_price + i as f64).collect();
    bars_from_closes(&closes)
}

/// Quiet drift followed by a strong rally on rising volume, then a sharp
/// sell-off.
pub fn breakout_then_reversal() -> Vec<OhlcvBar> {
    let mut bars = Vec::new();
    let mut price = 100.0;
    for i in 0..40 {
        let next = price + if i % 2 == 0 { 0.6 } else { -0.4 };
        bars.push(candle(i, price, next, 1000.0));
        price = next;
    }
    for i in 40..60 {
        let next = price * 1.01;
        bars.push(candle(i, price, next, 3000.0 + i as f64 * 50.0));
        price = next;
    }
    for i in 60..65 {
        let next = price * 0.96;
        bars.push(candle(i, price, next, 2000.0));
        price = next;
    }
    bars
}

pub fn write_bars_csv(dir: &Path, bars: &[OhlcvBar]) -> PathBuf {
    let path = dir.join("bars.csv");
    let mut content = String::from("Time,Open,High,Low,Close,Volume\n");
    for b in bars {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.timestamp.format("%Y-%m-%d %H:%M:%S"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    std::fs::write(&path, content).unwrap();
    path
}

pub fn logged(i: usize, kind: SignalKind, price: f64) -> LoggedSignal {
    LoggedSignal {
        timestamp: ts(i).to_string(),
        kind,
        price,
    }
}
