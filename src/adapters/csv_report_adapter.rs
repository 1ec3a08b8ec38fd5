//! CSV report adapter implementing ReportPort.
//!
//! One `Metric,Value` row per report entry in presentation order. Absent
//! ratios are written as empty cells and an unbounded profit factor as `inf`.

use std::fs;
use std::path::Path;

use crate::domain::error::TraderError;
use crate::domain::metrics::MetricsReport;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

/// Cell text for one reported value.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        None => String::new(),
        Some(v) if v.is_infinite() && v > 0.0 => "inf".to_string(),
        Some(v) if v.is_infinite() => "-inf".to_string(),
        Some(v) => format!("{:.2}", v),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &MetricsReport, output_path: &Path) -> Result<(), TraderError> {
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut wtr = csv::Writer::from_path(output_path).map_err(std::io::Error::from)?;
        wtr.write_record(["Metric", "Value"])
            .map_err(std::io::Error::from)?;
        for (name, value) in report.entries() {
            wtr.write_record([name.to_string(), format_value(value)])
                .map_err(std::io::Error::from)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::Trade;
    use tempfile::TempDir;

    fn report() -> MetricsReport {
        let trade = Trade {
            entry_timestamp: "t1".into(),
            exit_timestamp: "t2".into(),
            entry_price: 100.0,
            exit_price: 110.0,
            pnl: 10.0,
        };
        MetricsReport::from_trades(&[trade], 0.0)
    }

    #[test]
    fn format_value_cases() {
        assert_eq!(format_value(None), "");
        assert_eq!(format_value(Some(f64::INFINITY)), "inf");
        assert_eq!(format_value(Some(10.0)), "10.00");
        assert_eq!(format_value(Some(-0.5)), "-0.50");
    }

    #[test]
    fn writes_metric_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out/report.csv");
        CsvReportAdapter.write(&report(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "Metric,Value");
        assert_eq!(lines[1], "Total Return,10.00");
        assert_eq!(lines[3], "Win Rate (%),100.00");
        assert_eq!(lines[6], "Profit Factor,inf");
        assert_eq!(lines[11], "Sharpe Ratio,");
    }
}
