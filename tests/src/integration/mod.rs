//! Cross-service scenarios.

pub mod e2e_flows;
pub mod gateway_http;
pub mod resilience;
