//! CSV signal log: `Timestamp,Signal Type,Price,Additional Info`.
//!
//! Files are named `YYYY-MM-DD_<strategy>.csv` (run date) inside the log
//! directory, which is created on first write. A rerun on the same day
//! replaces the file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::domain::error::TraderError;
use crate::domain::metrics::LoggedSignal;
use crate::domain::signal::{SignalKind, SignalRecord};
use crate::ports::signal_log_port::{SignalLogPort, SignalLogRead};

pub const HEADER: [&str; 4] = ["Timestamp", "Signal Type", "Price", "Additional Info"];
const REQUIRED: [&str; 3] = ["Timestamp", "Price", "Signal Type"];
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct CsvSignalLog {
    log_dir: PathBuf,
}

impl CsvSignalLog {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    pub fn log_path(&self, strategy_name: &str, date: NaiveDate) -> PathBuf {
        self.log_dir
            .join(format!("{}_{}.csv", date.format("%Y-%m-%d"), strategy_name))
    }

    /// Writes `signals` to an explicit path, HOLD records included if given.
    pub fn write_to(&self, path: &Path, signals: &[SignalRecord]) -> Result<(), TraderError> {
        let log_err = |reason: String| TraderError::SignalLog {
            file: path.display().to_string(),
            reason,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut wtr = csv::Writer::from_path(path).map_err(|e| log_err(e.to_string()))?;
        wtr.write_record(HEADER).map_err(|e| log_err(e.to_string()))?;
        for s in signals {
            let info = s.reason.map(|r| r.to_string()).unwrap_or_default();
            wtr.write_record([
                s.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                s.label(),
                s.price.to_string(),
                info,
            ])
            .map_err(|e| log_err(e.to_string()))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl SignalLogPort for CsvSignalLog {
    fn write_signals(
        &self,
        strategy_name: &str,
        signals: &[SignalRecord],
    ) -> Result<PathBuf, TraderError> {
        let path = self.log_path(strategy_name, Local::now().date_naive());
        self.write_to(&path, signals)?;
        info!(path = %path.display(), rows = signals.len(), "signal log written");
        Ok(path)
    }

    fn read_signals(&self, path: &Path) -> Result<SignalLogRead, TraderError> {
        let log_err = |reason: String| TraderError::SignalLog {
            file: path.display().to_string(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| log_err(e.to_string()))?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| log_err(e.to_string()))?.clone();
        let column = |name: &str| headers.iter().position(|h| h.trim() == name);
        let (Some(ts_col), Some(kind_col), Some(price_col)) =
            (column("Timestamp"), column("Signal Type"), column("Price"))
        else {
            return Err(log_err(format!(
                "missing required headers {:?}, found {:?}",
                REQUIRED,
                headers.iter().collect::<Vec<_>>()
            )));
        };

        let mut read = SignalLogRead::default();
        for (i, result) in rdr.records().enumerate() {
            let parsed = result.ok().and_then(|record| {
                let kind = record.get(kind_col)?.parse::<SignalKind>().ok()?;
                let price = record.get(price_col)?.trim().parse::<f64>().ok()?;
                let timestamp = record.get(ts_col).unwrap_or_default().trim().to_string();
                Some(LoggedSignal {
                    timestamp,
                    kind,
                    price,
                })
            });
            match parsed {
                Some(signal) if signal.kind != SignalKind::Hold => read.signals.push(signal),
                Some(_) => {}
                None => {
                    debug!(path = %path.display(), row = i + 1, "skipping malformed signal row");
                    read.skipped += 1;
                }
            }
        }

        Ok(read)
    }
}
