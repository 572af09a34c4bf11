//! Error types for the reconciler crate.

use std::fmt;

/// Result type alias for reconciler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Reconciler error types.
///
/// Only supervisor unreachability is handled locally (as a Waiting status,
/// not an error); everything else propagates to the hosting loop uncaught.
#[derive(Debug, Clone)]
pub enum Error {
    /// A supervisor call failed.
    SupervisorFailed { operation: String, reason: String },
    /// Reporting status to the hosting framework failed.
    StatusFailed { reason: String },
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SupervisorFailed { operation, reason } => {
                write!(f, "supervisor call '{operation}' failed: {reason}")
            }
            Self::StatusFailed { reason } => {
                write!(f, "status report failed: {reason}")
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Create a supervisor failed error.
    pub fn supervisor_failed(operation: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::SupervisorFailed {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a status failed error.
    pub fn status_failed(reason: impl Into<String>) -> Self {
        Self::StatusFailed {
            reason: reason.into(),
        }
    }

    /// Create an invalid config error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::supervisor_failed("get-plan", "socket closed");
        assert!(err.to_string().contains("get-plan"));
        assert!(err.to_string().contains("socket closed"));
    }

    #[test]
    fn test_invalid_config() {
        let err = Error::invalid_config("supervisor is required");
        assert!(err.to_string().contains("supervisor is required"));
    }
}
