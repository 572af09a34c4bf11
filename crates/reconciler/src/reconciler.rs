//! Reconciler implementation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};
use warden_pebble::{Layer, Override, Service, Startup, Supervisor};

use crate::error::{Error, Result};
use crate::types::{ReconcileOutcome, Status};

/// Reason reported while the supervisor is unreachable.
pub const WAITING_FOR_PEBBLE: &str = "waiting for Pebble in workload container";

/// Startup command for the managed workload. Fixed; never configurable.
const START_COMMAND: &str = "/start";

/// License acceptance flag the workload requires to boot. Fixed; never
/// conditional on configuration.
const EULA_ENV: &str = "EULA";
const EULA_ACCEPTED: &str = "TRUE";

/// Sink for reporting unit status to the hosting framework.
#[async_trait]
pub trait StatusSink: Send + Sync {
    /// Report the unit status.
    async fn set_status(&self, status: Status) -> Result<()>;
}

/// In-memory status sink recording the reported history.
#[derive(Default)]
pub struct InMemoryStatusSink {
    history: RwLock<Vec<Status>>,
}

impl InMemoryStatusSink {
    /// Create a new empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty sink wrapped in an Arc.
    pub fn new_arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Get the most recently reported status.
    pub async fn latest(&self) -> Option<Status> {
        self.history.read().await.last().cloned()
    }

    /// Get the full reported history in order.
    pub async fn history(&self) -> Vec<Status> {
        self.history.read().await.clone()
    }
}

#[async_trait]
impl StatusSink for InMemoryStatusSink {
    async fn set_status(&self, status: Status) -> Result<()> {
        self.history.write().await.push(status);
        Ok(())
    }
}

/// Configuration for the reconciler.
///
/// Names and descriptive text only; the desired service template itself
/// (command, startup, environment) is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Label the desired layer is applied under.
    pub layer_label: String,
    /// Name of the managed service.
    pub service_name: String,
    /// Summary text for the applied layer.
    pub layer_summary: String,
    /// Description text for the applied layer.
    pub layer_description: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            layer_label: "minecraft".to_string(),
            service_name: "minecraft".to_string(),
            layer_summary: "minecraft layer".to_string(),
            layer_description: "pebble config layer for minecraft".to_string(),
        }
    }
}

/// Reconciles the declared service layer against the supervisor's plan.
///
/// One invocation per configuration-changed signal; runs to completion with
/// no overlapping invocations. Holds no state of its own beyond its
/// collaborator handles.
pub struct Reconciler {
    /// Supervisor for the workload container.
    supervisor: Arc<dyn Supervisor>,
    /// Status sink owned by the hosting framework.
    status: Arc<dyn StatusSink>,
    /// Configuration.
    config: ReconcilerConfig,
}

impl Reconciler {
    /// Create a new reconciler.
    pub fn new(
        supervisor: Arc<dyn Supervisor>,
        status: Arc<dyn StatusSink>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            supervisor,
            status,
            config,
        }
    }

    /// Run one reconciliation pass.
    ///
    /// Compares the supervisor's current service mapping against the desired
    /// layer, exact field-for-field. On a difference the layer is applied
    /// with combine semantics and the service restarted; on a match nothing
    /// is mutated. An unreachable supervisor is not an error: the unit is
    /// left waiting and the next signal retries from scratch.
    ///
    /// # Errors
    ///
    /// Any failure from plan fetch, layer application, restart, or the
    /// status sink propagates uncaught.
    pub async fn reconcile(&self) -> Result<ReconcileOutcome> {
        if !self.supervisor.can_connect().await {
            info!("Supervisor unreachable, leaving unit waiting");
            self.status
                .set_status(Status::waiting(WAITING_FOR_PEBBLE))
                .await?;
            return Ok(ReconcileOutcome::Unreachable);
        }

        let layer = self.desired_layer();
        let plan = self
            .supervisor
            .get_plan()
            .await
            .map_err(|e| Error::supervisor_failed("get-plan", e))?;

        let outcome = if plan.services == layer.services {
            debug!(
                service = %self.config.service_name,
                "Plan already matches desired layer"
            );
            ReconcileOutcome::Converged
        } else {
            self.supervisor
                .add_layer(&self.config.layer_label, layer, true)
                .await
                .map_err(|e| Error::supervisor_failed("add-layer", e))?;
            info!(label = %self.config.layer_label, "Added updated layer to plan");

            self.supervisor
                .restart(&self.config.service_name)
                .await
                .map_err(|e| Error::supervisor_failed("restart", e))?;
            info!(service = %self.config.service_name, "Restarted service");

            ReconcileOutcome::Applied
        };

        self.status.set_status(Status::active()).await?;
        Ok(outcome)
    }

    /// Build the desired layer for the managed workload.
    ///
    /// The command and the EULA acceptance flag never follow configuration.
    pub fn desired_layer(&self) -> Layer {
        Layer::new(&self.config.layer_summary, &self.config.layer_description).with_service(
            &self.config.service_name,
            Service::new(START_COMMAND)
                .with_summary(&self.config.service_name)
                .with_override(Override::Replace)
                .with_startup(Startup::Enabled)
                .with_env(EULA_ENV, EULA_ACCEPTED),
        )
    }

    /// Get the configuration.
    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }
}

/// Builder for Reconciler.
#[derive(Default)]
pub struct ReconcilerBuilder {
    supervisor: Option<Arc<dyn Supervisor>>,
    status: Option<Arc<dyn StatusSink>>,
    config: ReconcilerConfig,
}

impl ReconcilerBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the supervisor.
    pub fn with_supervisor(mut self, supervisor: Arc<dyn Supervisor>) -> Self {
        self.supervisor = Some(supervisor);
        self
    }

    /// Set the status sink.
    pub fn with_status_sink(mut self, status: Arc<dyn StatusSink>) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: ReconcilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the managed service name.
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.config.service_name = name.into();
        self
    }

    /// Set the layer label.
    pub fn layer_label(mut self, label: impl Into<String>) -> Self {
        self.config.layer_label = label.into();
        self
    }

    /// Build the reconciler.
    ///
    /// # Errors
    ///
    /// Returns an invalid-config error if the supervisor or status sink is
    /// missing.
    pub fn build(self) -> Result<Reconciler> {
        let supervisor = self
            .supervisor
            .ok_or_else(|| Error::invalid_config("supervisor is required"))?;
        let status = self
            .status
            .ok_or_else(|| Error::invalid_config("status sink is required"))?;

        Ok(Reconciler::new(supervisor, status, self.config))
    }
}
