//! Ports for the notification service.

pub mod inbound;

pub use inbound::NotificationApi;
