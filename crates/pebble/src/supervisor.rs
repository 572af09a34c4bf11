//! The supervisor client seam and its in-memory implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Error, Result};
use crate::layer::Layer;
use crate::plan::Plan;

/// Client contract for the process supervisor managing the workload.
///
/// Calls are possibly-latent but non-cancelable; any timeout policy belongs
/// to the implementation, not the callers.
#[async_trait]
pub trait Supervisor: Send + Sync {
    /// Check whether the supervisor can be reached right now.
    async fn can_connect(&self) -> bool;

    /// Fetch the currently active plan.
    async fn get_plan(&self) -> Result<Plan>;

    /// Add a layer under the given label.
    ///
    /// With `combine`, the layer's services are merged into an existing layer
    /// under the same label; without it, an existing label is an error.
    async fn add_layer(&self, label: &str, layer: Layer, combine: bool) -> Result<()>;

    /// Restart the named service.
    async fn restart(&self, service: &str) -> Result<()>;
}

/// A mutating supervisor call, recorded by [`InMemorySupervisor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    AddLayer { label: String, combine: bool },
    Restart { service: String },
}

#[derive(Default)]
struct State {
    connected: bool,
    layers: Vec<(String, Layer)>,
    mutations: Vec<Mutation>,
}

/// In-memory supervisor for tests and local runs.
///
/// Keeps a labelled layer stack and computes the plan by folding layers in
/// insertion order with the per-service override semantics of [`Layer`].
#[derive(Default)]
pub struct InMemorySupervisor {
    state: RwLock<State>,
}

impl InMemorySupervisor {
    /// Create a new disconnected supervisor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new connected supervisor wrapped in an Arc.
    pub fn connected_arc() -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(State {
                connected: true,
                ..State::default()
            }),
        })
    }

    /// Set whether the supervisor is reachable.
    pub async fn set_connected(&self, connected: bool) {
        self.state.write().await.connected = connected;
    }

    /// Seed a layer directly, bypassing the mutation log.
    pub async fn seed_layer(&self, label: impl Into<String>, layer: Layer) {
        self.state.write().await.layers.push((label.into(), layer));
    }

    /// Get the recorded mutating calls in order.
    pub async fn mutations(&self) -> Vec<Mutation> {
        self.state.read().await.mutations.clone()
    }

    fn plan_of(state: &State) -> Plan {
        let mut services = BTreeMap::new();
        for (_, layer) in &state.layers {
            layer.apply_to(&mut services);
        }
        Plan { services }
    }
}

#[async_trait]
impl Supervisor for InMemorySupervisor {
    async fn can_connect(&self) -> bool {
        self.state.read().await.connected
    }

    async fn get_plan(&self) -> Result<Plan> {
        let state = self.state.read().await;
        if !state.connected {
            return Err(Error::NotConnected);
        }
        Ok(Self::plan_of(&state))
    }

    async fn add_layer(&self, label: &str, layer: Layer, combine: bool) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.connected {
            return Err(Error::NotConnected);
        }

        match state.layers.iter().position(|(l, _)| l == label) {
            Some(index) => {
                if !combine {
                    return Err(Error::layer_exists(label));
                }
                if let Some((_, current)) = state.layers.get_mut(index) {
                    current.combine(&layer);
                }
            }
            None => {
                state.layers.push((label.to_string(), layer));
            }
        }

        debug!(label, combine, "Added layer");
        state.mutations.push(Mutation::AddLayer {
            label: label.to_string(),
            combine,
        });
        Ok(())
    }

    async fn restart(&self, service: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.connected {
            return Err(Error::NotConnected);
        }
        if !Self::plan_of(&state).services.contains_key(service) {
            return Err(Error::service_not_found(service));
        }

        debug!(service, "Restarted service");
        state.mutations.push(Mutation::Restart {
            service: service.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::plan::{Service, Startup};

    fn minecraft_layer() -> Layer {
        Layer::new("minecraft layer", "pebble config layer for minecraft").with_service(
            "minecraft",
            Service::new("/start")
                .with_summary("minecraft")
                .with_startup(Startup::Enabled)
                .with_env("EULA", "TRUE"),
        )
    }

    #[tokio::test]
    async fn test_disconnected_supervisor_rejects_calls() {
        let supervisor = InMemorySupervisor::new();
        assert!(!supervisor.can_connect().await);

        let plan = supervisor.get_plan().await;
        assert!(matches!(plan, Err(Error::NotConnected)));

        let added = supervisor.add_layer("minecraft", minecraft_layer(), true).await;
        assert!(added.is_err());
    }

    #[tokio::test]
    async fn test_add_layer_and_plan() {
        let supervisor = InMemorySupervisor::new();
        supervisor.set_connected(true).await;

        supervisor
            .add_layer("minecraft", minecraft_layer(), true)
            .await
            .unwrap();

        let plan = supervisor.get_plan().await.unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.get("minecraft"), minecraft_layer().services.get("minecraft"));
    }

    #[tokio::test]
    async fn test_add_layer_without_combine_rejects_existing_label() {
        let supervisor = InMemorySupervisor::new();
        supervisor.set_connected(true).await;

        supervisor
            .add_layer("minecraft", minecraft_layer(), false)
            .await
            .unwrap();
        let second = supervisor
            .add_layer("minecraft", minecraft_layer(), false)
            .await;
        assert!(matches!(second, Err(Error::LayerExists { .. })));
    }

    #[tokio::test]
    async fn test_combine_overrides_same_named_service() {
        let supervisor = InMemorySupervisor::new();
        supervisor.set_connected(true).await;

        let stale = Layer::new("", "").with_service("minecraft", Service::new("/old"));
        supervisor.seed_layer("minecraft", stale).await;

        supervisor
            .add_layer("minecraft", minecraft_layer(), true)
            .await
            .unwrap();

        let plan = supervisor.get_plan().await.unwrap();
        assert_eq!(plan.get("minecraft").map(|s| s.command.as_str()), Some("/start"));
    }

    #[tokio::test]
    async fn test_restart_requires_known_service() {
        let supervisor = InMemorySupervisor::new();
        supervisor.set_connected(true).await;

        let missing = supervisor.restart("minecraft").await;
        assert!(matches!(missing, Err(Error::ServiceNotFound { .. })));

        supervisor
            .add_layer("minecraft", minecraft_layer(), true)
            .await
            .unwrap();
        supervisor.restart("minecraft").await.unwrap();

        let mutations = supervisor.mutations().await;
        assert_eq!(mutations.len(), 2);
        assert_eq!(
            mutations[1],
            Mutation::Restart {
                service: "minecraft".to_string()
            }
        );
    }
}
