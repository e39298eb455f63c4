//! # Shared Types Crate
//!
//! This crate contains the domain entities exchanged between services, the
//! common service error taxonomy and the fault injector used to simulate
//! transient failures.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-service types are defined here.
//! - **Owned by one service**: Each entity is created and mutated only by the
//!   service that owns its map. Everyone else sees clones.

pub mod entities;
pub mod errors;
pub mod fault;

pub use entities::*;
pub use errors::*;
pub use fault::FaultInjector;
