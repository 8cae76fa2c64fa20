use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use task_shim::{
    config::ShimConfig,
    tasks::{DockerRuntime, TaskStorage},
    worker::{TaskServer, Worker},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ShimConfig::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let runtime = DockerRuntime::new().context("docker is not reachable")?;
    let storage = Arc::new(TaskStorage::new());
    let worker = Worker::new(storage, Arc::new(runtime), config.stop_timeout());

    info!(version = env!("CARGO_PKG_VERSION"), "starting task shim");
    TaskServer::new(worker, config.bind_address())
        .start_server()
        .await
        .context("task server failed")?;

    Ok(())
}
