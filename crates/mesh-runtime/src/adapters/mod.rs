//! # Adapters
//!
//! Outbound port implementations connecting one service to another.

pub mod user_directory;

pub use user_directory::UserServiceDirectory;
