//! Signal log persistence port trait.

use std::path::{Path, PathBuf};

use crate::domain::error::TraderError;
use crate::domain::metrics::LoggedSignal;
use crate::domain::signal::SignalRecord;

/// Parsed BUY/SELL rows plus the number of rows that could not be used.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalLogRead {
    pub signals: Vec<LoggedSignal>,
    pub skipped: usize,
}

pub trait SignalLogPort {
    /// Persists one run's records and returns where they went.
    fn write_signals(
        &self,
        strategy_name: &str,
        signals: &[SignalRecord],
    ) -> Result<PathBuf, TraderError>;

    fn read_signals(&self, path: &Path) -> Result<SignalLogRead, TraderError>;
}
