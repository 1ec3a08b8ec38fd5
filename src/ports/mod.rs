//! Port traits: the seams between domain logic and file-backed adapters.

pub mod config_port;
pub mod data_port;
pub mod report_port;
pub mod signal_log_port;
