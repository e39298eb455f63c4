//! # Service Mesh
//!
//! Entry point: telemetry, configuration, runtime, then wait for Ctrl+C.

use anyhow::{Context, Result};
use mesh_runtime::{MeshConfig, MeshRuntime};
use mesh_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry =
        init_telemetry(TelemetryConfig::from_env()).context("Failed to initialize telemetry")?;

    let config = MeshConfig::from_env().context("Invalid configuration")?;

    let runtime = MeshRuntime::new(config)?;
    let addr = runtime.start().await?;

    info!(%addr, "Mesh is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.shutdown().await;
    Ok(())
}
