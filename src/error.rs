use std::io;

use thiserror::Error;

use crate::severity::Severity;

/// Failure to turn a token or ordinal into a [`Severity`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeverityError {
    #[error("invalid priority: {0:?}")]
    InvalidToken(String),
    #[error("this isn't a priority: {0}")]
    InvalidValue(u8),
}

impl SeverityError {
    /// The sentinel severity callers fall back to after a failed parse.
    pub fn fallback(&self) -> Severity {
        Severity::NoPriority
    }
}

/// Failure raised by a [`Formatter`](crate::Formatter).
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("formatter io error: {0}")]
    Io(#[from] io::Error),
    #[error("timestamp formatting failed: {0}")]
    Time(#[from] time::error::Format),
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Custom(String),
}

/// Invalid logger configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid level in {var}: {source}")]
    Level {
        var: &'static str,
        #[source]
        source: SeverityError,
    },
    #[error("invalid format {0:?}, expected \"text\" or \"json\"")]
    Format(String),
    #[error("invalid pool size {0:?}")]
    PoolSize(String),
    #[error("could not open log file {0}: {1}")]
    OpenFile(String, io::Error),
}

/// A panic-severity record turned into an error value.
///
/// Returned by [`Handle::fail`](crate::Handle::fail) so the caller can
/// propagate the abnormal termination with `?` instead of unwinding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Failure {
    message: String,
}

impl Failure {
    pub(crate) fn new(message: String) -> Self {
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
