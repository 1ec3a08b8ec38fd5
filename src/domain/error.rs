//! Domain error types.

/// Top-level error type for trendsurfer.
#[derive(Debug, thiserror::Error)]
pub enum TraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("bar source error: {reason}")]
    BarSource { reason: String },

    #[error("malformed bar at row {row}: {reason}")]
    MalformedBar { row: usize, reason: String },

    #[error("non-finite {field} in bar at {timestamp}")]
    NonFiniteBar { timestamp: String, field: &'static str },

    #[error("bar at {timestamp} does not follow {previous}")]
    OutOfOrderBar { timestamp: String, previous: String },

    #[error("signal log error in {file}: {reason}")]
    SignalLog { file: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TraderError> for std::process::ExitCode {
    fn from(err: &TraderError) -> Self {
        let code: u8 = match err {
            TraderError::Io(_) => 1,
            TraderError::ConfigParse { .. }
            | TraderError::ConfigMissing { .. }
            | TraderError::ConfigInvalid { .. } => 2,
            TraderError::BarSource { .. }
            | TraderError::MalformedBar { .. }
            | TraderError::NonFiniteBar { .. }
            | TraderError::OutOfOrderBar { .. } => 3,
            TraderError::SignalLog { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
