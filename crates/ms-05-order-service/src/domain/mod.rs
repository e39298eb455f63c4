//! Order domain rules and configuration.

pub mod config;
pub mod validation;

pub use config::OrderServiceConfig;
pub use validation::validate_new_order;
