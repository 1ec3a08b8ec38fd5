//! Configuration validation.
//!
//! Validates config fields before a backtest runs. `[backtest]` keys are
//! checked straight from the port; strategy parameters are checked after
//! they have been resolved into a [`Strategy`], so command-line overrides are
//! covered too.

use crate::domain::error::TraderError;
use crate::domain::strategy::{Strategy, StrategyKind};
use crate::ports::config_port::ConfigPort;
use chrono::{NaiveDate, NaiveDateTime};

/// `YYYY-MM-DD HH:MM:SS` or a bare `YYYY-MM-DD` (midnight).
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Optional `[backtest]` time bound; absent or blank is `None`.
pub fn parse_bound(config: &dyn ConfigPort, key: &str) -> Result<Option<NaiveDateTime>, TraderError> {
    match config.get_non_empty("backtest", key) {
        None => Ok(None),
        Some(raw) => parse_datetime(&raw).map(Some).ok_or_else(|| TraderError::ConfigInvalid {
            section: "backtest".to_string(),
            key: key.to_string(),
            reason: format!("invalid {} '{}', expected YYYY-MM-DD [HH:MM:SS]", key, raw),
        }),
    }
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let start = parse_bound(config, "start")?;
    let end = parse_bound(config, "end")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(invalid("backtest", "start", "start must be before end"));
        }
    }
    validate_risk_free_rate(config)?;
    Ok(())
}

pub fn validate_strategy(strategy: &Strategy) -> Result<(), TraderError> {
    match strategy.kind {
        StrategyKind::Adaptive => validate_adaptive(strategy),
        StrategyKind::Crossover => validate_crossover(strategy),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> TraderError {
    TraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let value = config.get_double("metrics", "risk_free_rate", 0.0);
    if !value.is_finite() {
        return Err(invalid("metrics", "risk_free_rate", "risk_free_rate must be finite"));
    }
    Ok(())
}

fn validate_period(key: &str, value: usize) -> Result<(), TraderError> {
    if value == 0 {
        return Err(invalid("strategy", key, &format!("{} must be at least 1", key)));
    }
    Ok(())
}

fn validate_adaptive(strategy: &Strategy) -> Result<(), TraderError> {
    let p = &strategy.adaptive;

    if !(p.initial_capital > 0.0 && p.initial_capital.is_finite()) {
        return Err(invalid("strategy", "initial_capital", "initial_capital must be positive"));
    }
    if !(p.risk_per_trade > 0.0 && p.risk_per_trade <= 1.0) {
        return Err(invalid(
            "strategy",
            "risk_per_trade",
            "risk_per_trade must be in (0, 1]",
        ));
    }
    if !(p.trail_pct > 0.0 && p.trail_pct < 100.0) {
        return Err(invalid("strategy", "trail_pct", "trail_pct must be in (0, 100)"));
    }

    validate_period("ema_period", p.ema_period)?;
    validate_period("adx_period", p.adx_period)?;
    validate_period("rsi_period", p.rsi_period)?;
    validate_period("atr_period", p.atr_period)?;
    validate_period("regime_window", p.regime_window)?;

    let required = p.required_history();
    if p.window < required {
        return Err(invalid(
            "strategy",
            "window",
            &format!("window must hold at least {} bars for these periods", required),
        ));
    }
    Ok(())
}

fn validate_crossover(strategy: &Strategy) -> Result<(), TraderError> {
    let p = &strategy.crossover;
    validate_period("short_period", p.short_period)?;
    validate_period("long_period", p.long_period)?;
    if p.short_period >= p.long_period {
        return Err(invalid(
            "strategy",
            "short_period",
            "short_period must be less than long_period",
        ));
    }
    Ok(())
}
