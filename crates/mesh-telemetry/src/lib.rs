//! # Mesh Telemetry
//!
//! Structured logging for the service mesh, built on `tracing-subscriber`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mesh_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MESH_SERVICE_NAME` | `service-mesh` | Service name in log lines |
//! | `MESH_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `MESH_JSON_LOGS` | `false` | JSON output |
//! | `MESH_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

mod config;
mod logging;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Install the global subscriber.
///
/// Returns a guard to hold for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    logging::init_logging(&config)?;
    tracing::info!(service = %config.service_name, "Telemetry initialized");
    Ok(TelemetryGuard { config })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    config: TelemetryConfig,
}

impl TelemetryGuard {
    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}
