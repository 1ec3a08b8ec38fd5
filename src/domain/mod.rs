//! Core domain types and logic.

pub mod ohlcv;
pub mod bar_window;
pub mod indicator;
pub mod regime;
pub mod signal;
pub mod rule;
pub mod rule_eval;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod strategy;
pub mod engine;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
