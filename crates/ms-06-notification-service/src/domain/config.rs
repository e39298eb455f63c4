//! Notification service configuration.

use std::time::Duration;

pub const DEFAULT_DELIVERY_DELAY: Duration = Duration::from_millis(100);

pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationServiceConfig {
    /// Simulated time to hand a notification to the outside world.
    pub delivery_delay: Duration,
    /// Buffer of the event subscription channel.
    pub queue_capacity: usize,
}

impl Default for NotificationServiceConfig {
    fn default() -> Self {
        Self {
            delivery_delay: DEFAULT_DELIVERY_DELAY,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}
