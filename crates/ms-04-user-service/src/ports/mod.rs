//! Ports for the user service.

pub mod inbound;

pub use inbound::UserApi;
