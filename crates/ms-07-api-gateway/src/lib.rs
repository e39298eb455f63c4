//! # API Gateway
//!
//! Thin HTTP adapter over the mesh services.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        API GATEWAY                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  Middleware: CORS → Tracing/Metrics → Timeout → Body limit   │
//! │                              │                               │
//! │  ┌───────────┬───────────────┼───────────────┬────────────┐  │
//! │  │  /users   │   /orders     │ /notifications│  /health   │  │
//! │  │           │               │               │  /stats    │  │
//! │  │           │               │               │  /metrics  │  │
//! │  └─────┬─────┴───────┬───────┴───────┬───────┴─────┬──────┘  │
//! └────────┼─────────────┼───────────────┼─────────────┼─────────┘
//!          ▼             ▼               ▼             ▼
//!     UserService   OrderService  NotificationSvc  HealthChecker
//!                                                  breakers, pool, broker
//! ```
//!
//! Every handler decodes the request, calls one service method and maps
//! [`ServiceError`](shared_types::ServiceError) to a status code with an
//! `{"error": "..."}` body.
//!
//! # Usage
//!
//! ```ignore
//! use ms_07_api_gateway::{ApiGatewayService, GatewayConfig, GatewayDeps};
//!
//! let gateway = ApiGatewayService::new(GatewayConfig::default(), deps)?;
//! gateway.start().await?;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod service;

pub use domain::config::{ConfigError, CorsConfig, GatewayConfig, HttpConfig, LimitsConfig, TimeoutConfig};
pub use domain::error::{ApiError, GatewayError};
pub use handlers::GatewayDeps;
pub use middleware::GatewayMetrics;
pub use service::ApiGatewayService;
