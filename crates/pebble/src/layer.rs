//! Layers: named, mergeable fragments of service configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::plan::{Override, Service};

/// A named fragment of service configuration applied to the running plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub services: BTreeMap<String, Service>,
}

impl Layer {
    /// Create a new empty layer.
    pub fn new(summary: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            description: description.into(),
            services: BTreeMap::new(),
        }
    }

    /// Add a service declaration to the layer.
    pub fn with_service(mut self, name: impl Into<String>, service: Service) -> Self {
        self.services.insert(name.into(), service);
        self
    }

    /// Apply this layer's services onto an accumulated service mapping.
    ///
    /// Each entry honors its own override policy: `replace` supplants a
    /// same-named entry wholesale, `merge` overlays it. Untouched services
    /// are preserved.
    pub fn apply_to(&self, services: &mut BTreeMap<String, Service>) {
        for (name, service) in &self.services {
            let next = match (service.override_policy, services.get(name)) {
                (Override::Merge, Some(existing)) => existing.merged_with(service),
                _ => service.clone(),
            };
            services.insert(name.clone(), next);
        }
    }

    /// Merge another layer into this one, service by service.
    ///
    /// Combine semantics for `add_layer(..., combine=true)` against an
    /// existing label: the incoming layer's services overlay/override
    /// same-named entries, the summary and description are taken from the
    /// incoming layer when non-empty.
    pub fn combine(&mut self, other: &Self) {
        if !other.summary.is_empty() {
            self.summary = other.summary.clone();
        }
        if !other.description.is_empty() {
            self.description = other.description.clone();
        }
        other.apply_to(&mut self.services);
    }

    /// Check if the layer declares no services.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
