//! Ports for the order service.

pub mod inbound;
pub mod outbound;

pub use inbound::OrderApi;
pub use outbound::UserDirectory;
