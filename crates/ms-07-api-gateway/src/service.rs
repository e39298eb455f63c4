//! API Gateway service - main entry point.
//!
//! Builds the router over the injected services and runs the HTTP server
//! until [`ApiGatewayService::shutdown`] is called.

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::handlers::{self, AppState, GatewayDeps};
use crate::middleware::{create_cors_layer, GatewayMetrics, TracingLayer};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

/// API Gateway service state
pub struct ApiGatewayService {
    config: GatewayConfig,
    deps: GatewayDeps,
    metrics: Arc<GatewayMetrics>,
    shutdown_tx: watch::Sender<bool>,
}

impl ApiGatewayService {
    /// Create a new API Gateway service
    pub fn new(config: GatewayConfig, deps: GatewayDeps) -> Result<Self, GatewayError> {
        // Validate configuration
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let (shutdown_tx, _) = watch::channel(false);
        Ok(Self {
            config,
            deps,
            metrics: Arc::new(GatewayMetrics::new()),
            shutdown_tx,
        })
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn start(&self) -> Result<(), GatewayError> {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until shutdown.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), GatewayError> {
        let local_addr: Option<SocketAddr> = listener.local_addr().ok();
        info!(addr = ?local_addr, "Starting HTTP server");

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.wait_for(|stop| *stop).await;
                info!("Received shutdown signal");
            })
            .await
            .map_err(|e| GatewayError::Server(e.to_string()))?;

        info!("API Gateway stopped");
        Ok(())
    }

    /// Trigger graceful shutdown
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }

    /// Get metrics
    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Build the HTTP router with the full middleware stack
    pub fn router(&self) -> Router {
        let state = AppState {
            deps: self.deps.clone(),
            metrics: Arc::clone(&self.metrics),
        };

        // Last layer added runs first
        Router::new()
            .route(
                "/users",
                post(handlers::users::create_user).get(handlers::users::list_users),
            )
            .route("/users/:id", get(handlers::users::get_user))
            .route("/users/:id/orders", get(handlers::users::user_orders))
            .route(
                "/users/:id/notifications",
                get(handlers::notifications::user_notifications),
            )
            .route(
                "/orders",
                post(handlers::orders::create_order).get(handlers::orders::list_orders),
            )
            .route("/orders/:id", get(handlers::orders::get_order))
            .route(
                "/notifications",
                get(handlers::notifications::list_notifications),
            )
            .route(
                "/notifications/:id",
                get(handlers::notifications::get_notification),
            )
            .route("/health", get(handlers::system::health))
            .route("/stats", get(handlers::system::stats))
            .route("/metrics", get(handlers::system::metrics))
            .route(
                "/admin/breakers/:name/reset",
                post(handlers::system::reset_breaker),
            )
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(self.config.limits.max_body_bytes))
            .layer(TimeoutLayer::new(self.config.timeouts.request))
            .layer(TracingLayer::new(Arc::clone(&self.metrics)))
            .layer(create_cors_layer(&self.config.cors))
    }
}
