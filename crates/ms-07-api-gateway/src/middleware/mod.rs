//! Middleware stack for the API Gateway.
//!
//! Layer order: Request → CORS → Tracing/Metrics → Timeout → Body limit → Handler
//!
//! Timeout and body limit come straight from tower-http; the rest live here.

pub mod cors;
pub mod metrics;
pub mod tracing;

pub use cors::create_cors_layer;
pub use metrics::{GatewayMetrics, RequestTimer};
pub use tracing::{TracingLayer, REQUEST_ID_HEADER};
