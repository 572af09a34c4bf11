//! Local demo: drive the reconciler against the in-memory supervisor.

use std::sync::Arc;

use warden_pebble::{InMemorySupervisor, Supervisor};
use warden_reconciler::{
    InMemoryStatusSink, ReconcileLoop, Reconciler, ReconcilerConfig, Signal,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let supervisor = InMemorySupervisor::connected_arc();
    let status = InMemoryStatusSink::new_arc();
    let reconciler = Arc::new(Reconciler::new(
        supervisor.clone(),
        status.clone(),
        ReconcilerConfig::default(),
    ));

    let (signals, _stopper, run_loop) = ReconcileLoop::channel(reconciler, 8);
    let handle = tokio::spawn(run_loop.run());

    // First signal applies the layer and restarts the service; the second
    // finds the plan already converged.
    for _ in 0..2 {
        if signals.send(Signal::ConfigChanged).await.is_err() {
            eprintln!("Reconcile loop ended early");
            std::process::exit(1);
        }
    }
    drop(signals);

    if let Err(e) = handle.await {
        eprintln!("Reconcile loop panicked: {e}");
        std::process::exit(1);
    }

    let plan = match supervisor.get_plan().await {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("Failed to fetch plan: {e}");
            std::process::exit(1);
        }
    };
    match plan.to_yaml() {
        Ok(doc) => println!("{doc}"),
        Err(e) => {
            eprintln!("Failed to serialize plan: {e}");
            std::process::exit(1);
        }
    }

    if let Some(status) = status.latest().await {
        println!("unit status: {status}");
    }
}
