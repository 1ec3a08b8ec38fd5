//! CSV file bar source.
//!
//! Expects a header row naming `Time` (or `Timestamp`), `Open`, `High`, `Low`,
//! `Close` and `Volume` in any order and case. Other columns are ignored.

use std::fs::File;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::domain::error::TraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::{DataPort, in_range};

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"];

pub struct CsvAdapter {
    path: PathBuf,
}

/// Column positions resolved from the header row.
struct Columns {
    time: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, TraderError> {
        let find = |names: &[&str]| -> Result<usize, TraderError> {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
                .ok_or_else(|| TraderError::BarSource {
                    reason: format!("missing {} column", names[0]),
                })
        };
        Ok(Columns {
            time: find(&["time", "timestamp", "date"])?,
            open: find(&["open"])?,
            high: find(&["high"])?,
            low: find(&["low"])?,
            close: find(&["close"])?,
            volume: find(&["volume"])?,
        })
    }
}

impl CsvAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Accepts `YYYY-MM-DD HH:MM:SS[.f]`, ISO `T`-separated, RFC 3339,
/// `YYYY-MM-DD`, or integer epoch milliseconds.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|ts| ts.naive_utc())
}

fn field<'a>(record: &'a csv::StringRecord, idx: usize, name: &str, row: usize) -> Result<&'a str, TraderError> {
    record.get(idx).map(str::trim).ok_or_else(|| TraderError::MalformedBar {
        row,
        reason: format!("missing {} value", name),
    })
}

fn number(record: &csv::StringRecord, idx: usize, name: &str, row: usize) -> Result<f64, TraderError> {
    let raw = field(record, idx, name, row)?;
    raw.parse::<f64>().map_err(|_| TraderError::MalformedBar {
        row,
        reason: format!("invalid {} value '{}'", name, raw),
    })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<OhlcvBar>, TraderError> {
        let file = File::open(&self.path).map_err(|e| TraderError::BarSource {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;
        let mut rdr = csv::Reader::from_reader(file);

        let headers = rdr.headers().map_err(|e| TraderError::BarSource {
            reason: format!("CSV header error: {}", e),
        })?;
        let cols = Columns::from_headers(headers)?;

        let mut bars = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let row = i + 1;
            let record = result.map_err(|e| TraderError::MalformedBar {
                row,
                reason: e.to_string(),
            })?;

            let raw_time = field(&record, cols.time, "time", row)?;
            let timestamp = parse_timestamp(raw_time).ok_or_else(|| TraderError::MalformedBar {
                row,
                reason: format!("invalid timestamp '{}'", raw_time),
            })?;

            if !in_range(timestamp, start, end) {
                continue;
            }

            bars.push(OhlcvBar {
                timestamp,
                open: number(&record, cols.open, "open", row)?,
                high: number(&record, cols.high, "high", row)?,
                low: number(&record, cols.low, "low", row)?,
                close: number(&record, cols.close, "close", row)?,
                volume: number(&record, cols.volume, "volume", row)?,
            });
        }

        debug!(path = %self.path.display(), bars = bars.len(), "loaded bars");
        Ok(bars)
    }
}
