//! Core types for the reconciler.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unit health signal.
///
/// Set after every reconciliation pass; owned and persisted by the hosting
/// framework, not by this component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Status {
    /// The unit is healthy and the plan matches the desired layer.
    Active,
    /// The unit is blocked on an external condition and will retry on the
    /// next signal.
    Waiting { reason: String },
}

impl Status {
    /// Create an active status.
    pub fn active() -> Self {
        Self::Active
    }

    /// Create a waiting status with a reason.
    pub fn waiting(reason: impl Into<String>) -> Self {
        Self::Waiting {
            reason: reason.into(),
        }
    }

    /// Check whether the unit is active.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Waiting { reason } => write!(f, "waiting: {reason}"),
        }
    }
}

/// Outcome of a single reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileOutcome {
    /// Supervisor could not be reached; the unit was left waiting.
    Unreachable,
    /// The plan already matched the desired layer; nothing was changed.
    Converged,
    /// The desired layer was applied and the service restarted.
    Applied,
}

impl ReconcileOutcome {
    /// Get a description of the outcome.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Unreachable => "supervisor unreachable",
            Self::Converged => "already converged",
            Self::Applied => "layer applied and service restarted",
        }
    }

    /// Check whether this pass mutated the supervisor.
    pub fn mutated(&self) -> bool {
        matches!(self, Self::Applied)
    }
}
