//! Reconciles the declared workload layer against the supervisor's plan.
//!
//! This crate implements the operator's single behavior: on each
//! configuration-changed signal, compare the desired service layer with the
//! supervisor's currently observed plan, apply the layer and restart the
//! service if they differ, and report unit status either way.
//!
//! - **Desired state**: a fixed service template (command `/start`,
//!   startup enabled, `EULA=TRUE`)
//! - **Observed state**: the supervisor's plan, fetched per pass
//! - **Corrective action**: one `add_layer(combine=true)` plus one restart
//! - **Status**: `Active` after a pass, `Waiting` while the supervisor is
//!   unreachable
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use warden_pebble::InMemorySupervisor;
//! use warden_reconciler::{
//!     InMemoryStatusSink, ReconcileLoop, Reconciler, ReconcilerConfig, Signal,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let supervisor = InMemorySupervisor::connected_arc();
//!     let status = InMemoryStatusSink::new_arc();
//!     let reconciler = Arc::new(Reconciler::new(
//!         supervisor,
//!         status,
//!         ReconcilerConfig::default(),
//!     ));
//!
//!     let (signals, stopper, run_loop) = ReconcileLoop::channel(reconciler, 8);
//!     let handle = tokio::spawn(run_loop.run());
//!
//!     signals.send(Signal::ConfigChanged).await.unwrap();
//!     stopper.stop();
//!     handle.await.unwrap();
//! }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod error;
pub mod r#loop;
pub mod reconciler;
pub mod types;

// Re-export main types
pub use error::{Error, Result};
pub use r#loop::{LoopStopper, ReconcileLoop, Signal};
pub use reconciler::{
    InMemoryStatusSink, Reconciler, ReconcilerBuilder, ReconcilerConfig, StatusSink,
    WAITING_FOR_PEBBLE,
};
pub use types::{ReconcileOutcome, Status};
