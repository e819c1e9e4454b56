use clap::Parser;
use std::sync::Arc;
use task_runner::config::Config;
use task_runner::executor::manager::TaskManager;
use task_runner::executor::simulated::{DEFAULT_TASK_TYPE, SimulatedWorkloadFactory};
use task_runner::server::{serve, shutdown_signal};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();

    // 1. Task manager with the built-in task types:
    let manager = TaskManager::new(config.manager_config());

    let simulator = SimulatedWorkloadFactory::from_entropy(config.failure_percent);
    tracing::info!(
        "Simulated tasks take {:?} and fail {}% of the time",
        simulator.delay(),
        config.failure_percent
    );
    manager.register_factory(DEFAULT_TASK_TYPE, Arc::new(simulator));

    tracing::info!("Registered task types: {:?}", manager.registered_types());

    // 2. HTTP server:
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("Press Ctrl+C to shutdown");

    serve(listener, manager, config.shutdown_grace(), shutdown_signal()).await
}
