//! Breaker value types.

pub mod config;
pub mod error;
pub mod state;

pub use config::{CircuitBreakerConfig, ConfigError};
pub use error::CircuitBreakerError;
pub use state::{CircuitState, CircuitStats};
