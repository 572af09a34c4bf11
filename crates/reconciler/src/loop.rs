//! Serial signal loop driving the reconciler.
//!
//! The hosting framework delivers configuration-changed signals; the loop
//! runs one complete reconciliation per signal, strictly in order, with no
//! overlapping invocations. Reconcile failures are logged and the loop moves
//! on; the next signal retries from scratch.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use crate::reconciler::Reconciler;

/// External signal that the desired configuration may have changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    ConfigChanged,
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigChanged => write!(f, "config-changed"),
        }
    }
}

/// Handle used to request loop shutdown.
#[derive(Clone)]
pub struct LoopStopper {
    tx: watch::Sender<bool>,
}

impl LoopStopper {
    /// Request that the loop stop after the in-flight pass completes.
    pub fn stop(&self) {
        let _ = self.tx.send(true);
    }
}

/// Serial reconciliation loop.
pub struct ReconcileLoop {
    reconciler: Arc<Reconciler>,
    signals: mpsc::Receiver<Signal>,
    shutdown: watch::Receiver<bool>,
}

impl ReconcileLoop {
    /// Create a loop together with its signal sender and stopper.
    pub fn channel(
        reconciler: Arc<Reconciler>,
        capacity: usize,
    ) -> (mpsc::Sender<Signal>, LoopStopper, Self) {
        let (signal_tx, signal_rx) = mpsc::channel(capacity);
        let (stop_tx, stop_rx) = watch::channel(false);
        (
            signal_tx,
            LoopStopper { tx: stop_tx },
            Self {
                reconciler,
                signals: signal_rx,
                shutdown: stop_rx,
            },
        )
    }

    /// Run until the stopper fires or every signal sender is dropped.
    ///
    /// An in-flight reconciliation always runs to completion before the
    /// next signal or a shutdown request is observed.
    pub async fn run(self) {
        let Self {
            reconciler,
            mut signals,
            mut shutdown,
        } = self;

        let mut stopper_gone = false;
        loop {
            tokio::select! {
                changed = shutdown.changed(), if !stopper_gone => {
                    match changed {
                        Ok(()) => {
                            if *shutdown.borrow() {
                                info!("Reconcile loop stopping");
                                break;
                            }
                        }
                        // Stopper dropped; only the signal channel can end the loop now.
                        Err(_) => stopper_gone = true,
                    }
                }
                signal = signals.recv() => {
                    match signal {
                        Some(signal) => handle(&reconciler, signal).await,
                        None => {
                            info!("Signal channel closed, reconcile loop stopping");
                            break;
                        }
                    }
                }
            }
        }
    }
}

async fn handle(reconciler: &Reconciler, signal: Signal) {
    match signal {
        Signal::ConfigChanged => match reconciler.reconcile().await {
            Ok(outcome) => {
                info!(signal = %signal, outcome = outcome.description(), "Reconciliation complete");
            }
            Err(e) => {
                // Surfaced here on behalf of the hosting framework; the
                // next signal retries from scratch.
                error!(signal = %signal, error = %e, "Reconciliation failed");
            }
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::reconciler::{InMemoryStatusSink, ReconcilerConfig};
    use crate::types::Status;
    use warden_pebble::InMemorySupervisor;

    fn setup() -> (Arc<Reconciler>, Arc<InMemorySupervisor>, Arc<InMemoryStatusSink>) {
        let supervisor = Arc::new(InMemorySupervisor::new());
        let status = InMemoryStatusSink::new_arc();
        let reconciler = Arc::new(Reconciler::new(
            supervisor.clone(),
            status.clone(),
            ReconcilerConfig::default(),
        ));
        (reconciler, supervisor, status)
    }

    #[tokio::test]
    async fn test_loop_processes_signals_in_order() {
        let (reconciler, supervisor, status) = setup();
        supervisor.set_connected(true).await;

        let (signals, _stopper, run_loop) = ReconcileLoop::channel(reconciler, 8);
        let handle = tokio::spawn(run_loop.run());

        signals.send(Signal::ConfigChanged).await.unwrap();
        signals.send(Signal::ConfigChanged).await.unwrap();
        drop(signals);
        handle.await.unwrap();

        // First pass applies, second converges.
        assert_eq!(supervisor.mutations().await.len(), 2);
        assert_eq!(status.history().await, vec![Status::active(), Status::active()]);
    }

    #[tokio::test]
    async fn test_stopper_ends_loop() {
        let (reconciler, _, _) = setup();

        let (_signals, stopper, run_loop) = ReconcileLoop::channel(reconciler, 8);
        let handle = tokio::spawn(run_loop.run());

        stopper.stop();
        handle.await.unwrap();
    }

    /// Supervisor that passes the reachability check but fails every call.
    struct FlakySupervisor;

    #[async_trait::async_trait]
    impl warden_pebble::Supervisor for FlakySupervisor {
        async fn can_connect(&self) -> bool {
            true
        }

        async fn get_plan(&self) -> warden_pebble::Result<warden_pebble::Plan> {
            Err(warden_pebble::Error::plan_failed("socket closed"))
        }

        async fn add_layer(
            &self,
            _label: &str,
            _layer: warden_pebble::Layer,
            _combine: bool,
        ) -> warden_pebble::Result<()> {
            Err(warden_pebble::Error::plan_failed("socket closed"))
        }

        async fn restart(&self, _service: &str) -> warden_pebble::Result<()> {
            Err(warden_pebble::Error::plan_failed("socket closed"))
        }
    }

    #[tokio::test]
    async fn test_loop_survives_failed_reconciliation() {
        let status = InMemoryStatusSink::new_arc();
        let reconciler = Arc::new(Reconciler::new(
            Arc::new(FlakySupervisor),
            status.clone(),
            ReconcilerConfig::default(),
        ));

        let (signals, _stopper, run_loop) = ReconcileLoop::channel(reconciler, 8);
        let handle = tokio::spawn(run_loop.run());

        signals.send(Signal::ConfigChanged).await.unwrap();
        signals.send(Signal::ConfigChanged).await.unwrap();
        drop(signals);
        handle.await.unwrap();

        // Both passes failed at get-plan; the loop kept going and no status
        // was ever reported.
        assert!(status.history().await.is_empty());
    }
}
