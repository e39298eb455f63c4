//! # Service Mesh Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs        # Fast-running mesh configurations and polling helpers
//! └── integration/
//!     ├── e2e_flows.rs     # User → order → notification flows
//!     ├── resilience.rs    # Breakers, slow subscribers, pool shutdown
//!     └── gateway_http.rs  # The same flows over the HTTP router
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mesh-tests
//! cargo test -p mesh-tests integration::resilience
//!
//! # Benchmarks
//! cargo bench -p mesh-tests
//! ```

pub mod fixtures;
pub mod integration;
