//! Order service configuration.

use std::time::Duration;

/// Default simulated processing time per order.
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderServiceConfig {
    /// Time the processing job spends before completing an order.
    pub processing_delay: Duration,
}

impl Default for OrderServiceConfig {
    fn default() -> Self {
        Self {
            processing_delay: DEFAULT_PROCESSING_DELAY,
        }
    }
}
