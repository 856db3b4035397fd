/// Result type used throughout `arrayplay`.
pub type PlayResult<T> = Result<T, PlayError>;

/// Errors produced by the array model, the interpreter and the playback engine.
///
/// Step-level variants (`Index`, `SameIndex`, `NotFound`, `Unrecognized`) never abort a run; the
/// engine records them as [`crate::StepWarning`]s and moves on to the next command.
#[derive(thiserror::Error, Debug)]
pub enum PlayError {
    /// An index-carrying command addressed a slot outside the array.
    #[error("index error: {op} index {index} out of range for length {len}")]
    Index {
        /// Command kind that failed.
        op: &'static str,
        /// Index as received (may be negative).
        index: i64,
        /// Array length at the time of the command.
        len: usize,
    },

    /// `swap` was asked to exchange a slot with itself.
    #[error("index error: swap indices must differ (both {index})")]
    SameIndex {
        /// The repeated index.
        index: i64,
    },

    /// `remove` found no element with the requested value.
    #[error("lookup error: value {value} not found")]
    NotFound {
        /// The value that was searched for.
        value: serde_json::Value,
    },

    /// A command entry could not be decoded into a known command.
    #[error("unrecognized command '{kind}': {reason}")]
    Unrecognized {
        /// The `type` tag, or `<missing>` when absent.
        kind: String,
        /// Why decoding failed.
        reason: String,
    },

    /// A lifecycle operation was attempted while a run is in progress.
    #[error("rejected: {0}")]
    Rejected(String),

    /// Playback configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Filesystem or thread spawning failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Any other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PlayError {
    /// Build an [`PlayError::Index`] error.
    pub fn index(op: &'static str, index: i64, len: usize) -> Self {
        Self::Index { op, index, len }
    }

    /// Build an [`PlayError::NotFound`] error.
    pub fn not_found(value: &serde_json::Value) -> Self {
        Self::NotFound {
            value: value.clone(),
        }
    }

    /// Build an [`PlayError::Unrecognized`] error.
    pub fn unrecognized(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unrecognized {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Build a [`PlayError::Rejected`] error.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Build a [`PlayError::Config`] error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`PlayError::Serde`] error.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Short machine-readable category, stable across releases.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Index { .. } | Self::SameIndex { .. } => "bounds",
            Self::NotFound { .. } => "lookup",
            Self::Unrecognized { .. } => "malformed",
            Self::Rejected(_) => "rejected",
            Self::Config(_) => "config",
            Self::Serde(_) => "serde",
            Self::Io(_) => "io",
            Self::Other(_) => "other",
        }
    }

    /// Whether the engine skips the offending step and keeps playing.
    pub fn is_recoverable_step(&self) -> bool {
        matches!(
            self,
            Self::Index { .. }
                | Self::SameIndex { .. }
                | Self::NotFound { .. }
                | Self::Unrecognized { .. }
        )
    }
}

impl From<serde_json::Error> for PlayError {
    fn from(err: serde_json::Error) -> Self {
        Self::serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
