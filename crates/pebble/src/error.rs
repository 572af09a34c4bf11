//! Error types for the pebble crate.

use std::fmt;

use thiserror::Error;

/// Result type alias for pebble operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Connection error for the supervisor socket.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("pebble socket not reachable")]
    Unreachable,

    #[error("invalid pebble socket path: {path}")]
    InvalidSocket { path: String },

    #[error("pebble handshake failed: {reason}")]
    HandshakeFailed { reason: String },
}

/// Pebble error types.
#[derive(Debug, Clone)]
pub enum Error {
    /// Supervisor is not connected.
    NotConnected,
    /// Plan retrieval failed.
    PlanFailed { reason: String },
    /// A layer with this label already exists and combine was not requested.
    LayerExists { label: String },
    /// Service not present in the current plan.
    ServiceNotFound { service: String },
    /// Serialization error.
    Serialization { reason: String },
    /// Connection error.
    Connection(ConnectError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => {
                write!(f, "pebble is not connected")
            }
            Self::PlanFailed { reason } => {
                write!(f, "failed to fetch plan: {reason}")
            }
            Self::LayerExists { label } => {
                write!(f, "layer '{label}' already exists")
            }
            Self::ServiceNotFound { service } => {
                write!(f, "service '{service}' not found in plan")
            }
            Self::Serialization { reason } => {
                write!(f, "serialization error: {reason}")
            }
            Self::Connection(err) => {
                write!(f, "connection error: {err}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<ConnectError> for Error {
    fn from(err: ConnectError) -> Self {
        Self::Connection(err)
    }
}

impl Error {
    /// Create a plan failed error.
    pub fn plan_failed(reason: impl Into<String>) -> Self {
        Self::PlanFailed {
            reason: reason.into(),
        }
    }

    /// Create a layer exists error.
    pub fn layer_exists(label: impl Into<String>) -> Self {
        Self::LayerExists {
            label: label.into(),
        }
    }

    /// Create a service not found error.
    pub fn service_not_found(service: impl Into<String>) -> Self {
        Self::ServiceNotFound {
            service: service.into(),
        }
    }

    /// Create a serialization error.
    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::Serialization {
            reason: reason.into(),
        }
    }
}
