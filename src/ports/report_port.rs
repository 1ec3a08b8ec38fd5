//! Metrics report export port trait.

use std::path::Path;

use crate::domain::error::TraderError;
use crate::domain::metrics::MetricsReport;

/// Port for writing metrics reports.
pub trait ReportPort {
    fn write(&self, report: &MetricsReport, output_path: &Path) -> Result<(), TraderError>;
}
