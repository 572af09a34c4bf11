//! Pebble-style plan/layer model and supervisor client seam.
//!
//! This crate models the slice of a Pebble-like process supervisor that the
//! operator needs:
//!
//! - **Service declarations**: override policy, command, startup policy,
//!   environment mapping
//! - **Layers**: named, mergeable fragments of service configuration
//! - **Plans**: the supervisor's currently active service mapping
//! - **Supervisor seam**: the narrow client contract, with an in-memory
//!   implementation for tests and local runs
//!
//! # Example
//!
//! ```ignore
//! use warden_pebble::{InMemorySupervisor, Layer, Service, Startup, Supervisor};
//!
//! #[tokio::main]
//! async fn main() {
//!     let supervisor = InMemorySupervisor::connected_arc();
//!
//!     let layer = Layer::new("minecraft layer", "pebble config layer for minecraft")
//!         .with_service(
//!             "minecraft",
//!             Service::new("/start")
//!                 .with_startup(Startup::Enabled)
//!                 .with_env("EULA", "TRUE"),
//!         );
//!
//!     supervisor.add_layer("minecraft", layer, true).await.unwrap();
//!     supervisor.restart("minecraft").await.unwrap();
//!
//!     let plan = supervisor.get_plan().await.unwrap();
//!     println!("{}", plan.to_yaml().unwrap());
//! }
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod error;
pub mod layer;
pub mod plan;
pub mod supervisor;

// Re-export main types
pub use error::{ConnectError, Error, Result};
pub use layer::Layer;
pub use plan::{Override, Plan, Service, Startup};
pub use supervisor::{InMemorySupervisor, Mutation, Supervisor};
