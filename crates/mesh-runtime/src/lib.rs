//! # Mesh Runtime
//!
//! Wires the services together and runs the HTTP gateway.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (defaults, then `MESH_*` overrides)
//! 2. Build the container: broker, pool, breakers, services, health probes
//! 3. Start the worker pool and the notification listener
//! 4. Bind the gateway socket and serve
//!
//! Shutdown runs the same steps in reverse: the gateway stops accepting and
//! drains, then the listener stops, then the pool finishes running jobs.

pub mod adapters;
pub mod container;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use ms_07_api_gateway::{ApiGatewayService, GatewayError};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub use container::{ConfigError, MeshConfig, ServiceContainer};

/// The running mesh.
pub struct MeshRuntime {
    container: Arc<ServiceContainer>,
    gateway: Arc<ApiGatewayService>,
    server: Mutex<Option<JoinHandle<Result<(), GatewayError>>>>,
}

impl MeshRuntime {
    /// Build every service and the gateway without starting anything.
    pub fn new(config: MeshConfig) -> Result<Self> {
        info!("Creating service mesh runtime");
        let gateway_config = config.gateway.clone();

        let container =
            Arc::new(ServiceContainer::new(config).context("Failed to build services")?);
        let gateway = ApiGatewayService::new(gateway_config, container.gateway_deps())
            .context("Failed to build API gateway")?;

        Ok(Self {
            container,
            gateway: Arc::new(gateway),
            server: Mutex::new(None),
        })
    }

    /// Start the background services and the gateway.
    ///
    /// Returns the address the gateway is listening on.
    pub async fn start(&self) -> Result<SocketAddr> {
        self.container
            .start()
            .context("Failed to start background services")?;

        let addr = self.gateway.config().http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        let local_addr = listener
            .local_addr()
            .context("Failed to read the bound address")?;

        let gateway = Arc::clone(&self.gateway);
        *self.server.lock() = Some(tokio::spawn(async move { gateway.serve(listener).await }));

        info!(addr = %local_addr, "Service mesh running");
        Ok(local_addr)
    }

    /// Stop the gateway, then the background services.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        self.gateway.shutdown();

        let server = self.server.lock().take();
        if let Some(server) = server {
            match server.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(error = %e, "API gateway stopped with an error"),
                Err(e) => error!(error = %e, "API gateway task terminated abnormally"),
            }
        }

        self.container.stop().await;
        info!("Shutdown complete");
    }

    pub fn container(&self) -> Arc<ServiceContainer> {
        Arc::clone(&self.container)
    }

    pub fn gateway(&self) -> Arc<ApiGatewayService> {
        Arc::clone(&self.gateway)
    }
}
