//! Backtest driver: feeds bars to an engine in order and keeps the non-HOLD
//! decisions.
//!
//! BacktestConfig carries the `[backtest]` section: where bars come from,
//! where signal logs go, and an optional time filter.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use tracing::info;

use super::engine::SignalEngine;
use super::error::TraderError;
use super::ohlcv::OhlcvBar;
use super::signal::{SignalKind, SignalRecord};

pub const DEFAULT_LOG_DIR: &str = "log";

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub data_file: PathBuf,
    pub log_dir: PathBuf,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub strategy_name: String,
    pub bars_processed: usize,
    /// Non-HOLD records in bar order.
    pub signals: Vec<SignalRecord>,
}

impl BacktestResult {
    pub fn count(&self, kind: SignalKind) -> usize {
        self.signals.iter().filter(|s| s.kind == kind).count()
    }
}

/// Runs every bar through `engine`. Aborts on the first non-finite bar,
/// non-increasing timestamp, or engine error.
pub fn run_backtest(
    engine: &mut dyn SignalEngine,
    bars: &[OhlcvBar],
) -> Result<BacktestResult, TraderError> {
    info!(strategy = engine.name(), bars = bars.len(), "backtest started");

    let mut signals = Vec::new();
    let mut previous: Option<NaiveDateTime> = None;

    for bar in bars {
        if let Some(prev) = previous {
            if bar.timestamp <= prev {
                return Err(TraderError::OutOfOrderBar {
                    timestamp: bar.timestamp.to_string(),
                    previous: prev.to_string(),
                });
            }
        }
        previous = Some(bar.timestamp);

        let record = engine.update(bar)?;
        if !record.is_hold() {
            signals.push(record);
        }
    }

    let result = BacktestResult {
        strategy_name: engine.name().to_string(),
        bars_processed: bars.len(),
        signals,
    };
    info!(
        strategy = %result.strategy_name,
        bars = result.bars_processed,
        signals = result.signals.len(),
        "backtest finished"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::engine::CrossoverEngine;
    use crate::domain::strategy::CrossoverParams;
    use chrono::{Duration, NaiveDate};

    fn bars(closes: &[f64]) -> Vec<OhlcvBar> {
        let start = NaiveDate::from_ymd_opt(2025, 5, 8)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| OhlcvBar {
                timestamp: start + Duration::minutes(i as i64),
                open: c,
                high: c,
                low: c,
                close: c,
                volume: 1.0,
            })
            .collect()
    }

    fn fast_engine() -> CrossoverEngine {
        CrossoverEngine::new(
            "fast",
            CrossoverParams {
                short_period: 1,
                long_period: 2,
            },
        )
    }

    #[test]
    fn collects_only_non_hold() {
        let mut engine = fast_engine();
        let result = run_backtest(&mut engine, &bars(&[1.0, 2.0, 1.0])).unwrap();
        assert_eq!(result.bars_processed, 3);
        assert_eq!(result.strategy_name, "fast");
        let kinds: Vec<SignalKind> = result.signals.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SignalKind::Buy, SignalKind::Sell]);
        assert_eq!(result.count(SignalKind::Buy), 1);
    }

    #[test]
    fn empty_input_is_empty_log() {
        let mut engine = fast_engine();
        let result = run_backtest(&mut engine, &[]).unwrap();
        assert_eq!(result.bars_processed, 0);
        assert!(result.signals.is_empty());
    }

    #[test]
    fn duplicate_timestamp_aborts() {
        let mut input = bars(&[1.0, 2.0, 3.0]);
        input[2].timestamp = input[1].timestamp;
        let mut engine = fast_engine();
        assert!(matches!(
            run_backtest(&mut engine, &input),
            Err(TraderError::OutOfOrderBar { .. })
        ));
    }

    #[test]
    fn engine_error_propagates() {
        let mut input = bars(&[1.0, 2.0, 3.0]);
        input[1].volume = f64::NAN;
        let mut engine = fast_engine();
        assert!(matches!(
            run_backtest(&mut engine, &input),
            Err(TraderError::NonFiniteBar { field: "volume", .. })
        ));
    }
}
