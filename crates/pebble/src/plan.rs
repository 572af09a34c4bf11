//! Service declarations and the observed plan.

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// How a service entry interacts with a same-named entry in an earlier layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Override {
    /// Replace the existing entry wholesale.
    Replace,
    /// Overlay onto the existing entry; environment entries are extended.
    Merge,
}

/// Whether the service starts automatically with the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Startup {
    Enabled,
    Disabled,
}

/// A single service declaration.
///
/// Immutable value; built fresh on every reconciliation and handed to the
/// supervisor, which owns it once applied. Equality is exact field-for-field,
/// including environment contents (key order is insignificant by
/// construction of the map).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    #[serde(rename = "override")]
    pub override_policy: Override,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    pub command: String,
    pub startup: Startup,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

impl Service {
    /// Create a new service declaration with the given startup command.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            override_policy: Override::Replace,
            summary: String::new(),
            command: command.into(),
            startup: Startup::Disabled,
            environment: BTreeMap::new(),
        }
    }

    /// Set the summary text.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Set the override policy.
    pub fn with_override(mut self, policy: Override) -> Self {
        self.override_policy = policy;
        self
    }

    /// Set the startup policy.
    pub fn with_startup(mut self, startup: Startup) -> Self {
        self.startup = startup;
        self
    }

    /// Add an environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Overlay `other` onto this declaration per merge semantics: non-empty
    /// summary and command win, startup and override policy are taken from
    /// `other`, and environment entries are inserted over existing ones.
    pub fn merged_with(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        merged.override_policy = other.override_policy;
        merged.startup = other.startup;
        if !other.summary.is_empty() {
            merged.summary = other.summary.clone();
        }
        if !other.command.is_empty() {
            merged.command = other.command.clone();
        }
        for (key, value) in &other.environment {
            merged.environment.insert(key.clone(), value.clone());
        }
        merged
    }
}

/// The supervisor's currently active plan.
///
/// Read-only snapshot; lifetime is one reconciliation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub services: BTreeMap<String, Service>,
}

impl Plan {
    /// Create a new empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a service declaration by name.
    pub fn get(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    /// Get the names of all services in the plan.
    pub fn service_names(&self) -> Vec<&str> {
        self.services.keys().map(String::as_str).collect_vec()
    }

    /// Get the number of services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Check if the plan has no services.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Serialize the plan to its nested key/value document form.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::serialization(e.to_string()))
    }
}
