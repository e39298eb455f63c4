//! # Service Container
//!
//! Central container holding every service instance with proper lifetime
//! management and dependency injection.
//!
//! - Services are built in dependency order: broker and pool, then users,
//!   then orders (which look users up), then notifications
//! - Services never reach each other through globals; every collaborator
//!   is passed in

pub mod config;
pub mod services;

pub use config::{ConfigError, MeshConfig};
pub use services::ServiceContainer;
