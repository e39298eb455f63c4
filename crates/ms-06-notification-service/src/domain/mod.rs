//! Notification composition and configuration.

pub mod composer;
pub mod config;

pub use composer::{compose, NotificationDraft};
pub use config::NotificationServiceConfig;
