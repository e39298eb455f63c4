//! # Message Broker
//!
//! Defines the publishing side of the bus and the in-memory broker that
//! owns the topic → subscriber table.

use crate::events::{EventPayload, Message};
use crate::subscriber::Subscription;
use crate::{DEFAULT_CHANNEL_CAPACITY, DEFAULT_DELIVERY_TIMEOUT_MS};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;
use tracing::{debug, warn};

/// Trait for publishing events to the bus.
///
/// Services depend on this trait rather than on [`MessageBroker`] so tests can
/// substitute a recorder.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `payload` on `topic`.
    ///
    /// # Returns
    ///
    /// The number of subscribers the message was delivered to.
    async fn publish(&self, topic: &str, payload: EventPayload) -> usize;

    /// Get the total number of publish calls.
    fn events_published(&self) -> u64;
}

/// Broker tuning.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Upper bound on a single subscriber delivery.
    pub delivery_timeout: Duration,
    /// Buffer size used by [`MessageBroker::subscribe_channel`].
    pub subscriber_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            delivery_timeout: Duration::from_millis(DEFAULT_DELIVERY_TIMEOUT_MS),
            subscriber_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Delivery counters, as exposed on the stats endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct BrokerStats {
    pub events_published: u64,
    pub deliveries: u64,
    pub dropped_deliveries: u64,
    pub topics: usize,
}

/// In-memory topic-keyed broker.
///
/// Subscriber lists are read under a shared lock so concurrent publishers
/// never wait on each other; registration takes the exclusive lock. The lock
/// is never held while a delivery is in flight.
pub struct MessageBroker {
    /// Delivery channels by topic.
    subscribers: RwLock<HashMap<String, Vec<mpsc::Sender<Message>>>>,

    config: BrokerConfig,

    /// Total publish calls.
    events_published: AtomicU64,

    /// Successful subscriber deliveries.
    deliveries: AtomicU64,

    /// Deliveries dropped because the subscriber was full or gone.
    dropped: AtomicU64,
}

impl MessageBroker {
    /// Create a broker with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BrokerConfig::default())
    }

    /// Create a broker with the given configuration.
    #[must_use]
    pub fn with_config(config: BrokerConfig) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            config,
            events_published: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Register `sender` as a delivery channel for `topic`.
    ///
    /// The same channel may be registered under several topics.
    pub fn subscribe(&self, topic: impl Into<String>, sender: mpsc::Sender<Message>) {
        let topic = topic.into();
        let mut subs = self.subscribers.write();
        let list = subs.entry(topic.clone()).or_default();
        list.push(sender);
        debug!(topic = %topic, subscribers = list.len(), "New subscription created");
    }

    /// Subscribe a fresh channel of `capacity` to `topic`.
    #[must_use]
    pub fn subscribe_channel(&self, topic: &str, capacity: usize) -> Subscription {
        self.subscribe_topics(&[topic], capacity)
    }

    /// Subscribe one fresh channel to every topic in `topics`.
    #[must_use]
    pub fn subscribe_topics(&self, topics: &[&str], capacity: usize) -> Subscription {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        for topic in topics {
            self.subscribe(*topic, tx.clone());
        }
        Subscription::new(rx)
    }

    /// Number of live subscriber channels on `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.subscribers
            .read()
            .get(topic)
            .map(|list| list.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }

    /// Get the broker configuration.
    #[must_use]
    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Successful deliveries so far.
    pub fn deliveries(&self) -> u64 {
        self.deliveries.load(Ordering::Relaxed)
    }

    /// Dropped deliveries so far.
    pub fn dropped_deliveries(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Snapshot of the delivery counters.
    #[must_use]
    pub fn stats(&self) -> BrokerStats {
        BrokerStats {
            events_published: self.events_published.load(Ordering::Relaxed),
            deliveries: self.deliveries(),
            dropped_deliveries: self.dropped_deliveries(),
            topics: self.subscribers.read().len(),
        }
    }

    /// Remove channels whose receiver has been dropped.
    fn prune_closed(&self, topic: &str) {
        let mut subs = self.subscribers.write();
        if let Some(list) = subs.get_mut(topic) {
            let before = list.len();
            list.retain(|tx| !tx.is_closed());
            debug!(topic = topic, pruned = before - list.len(), "Pruned closed subscribers");
            if list.is_empty() {
                subs.remove(topic);
            }
        }
    }
}

impl Default for MessageBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for MessageBroker {
    async fn publish(&self, topic: &str, payload: EventPayload) -> usize {
        debug_assert_eq!(topic, payload.topic(), "payload published on a foreign topic");
        self.events_published.fetch_add(1, Ordering::Relaxed);
        let message = Message::new(topic, payload);

        // Snapshot so the read lock is released before any send suspends.
        let targets: Vec<mpsc::Sender<Message>> = self
            .subscribers
            .read()
            .get(topic)
            .cloned()
            .unwrap_or_default();

        if targets.is_empty() {
            debug!(topic = topic, message_id = %message.id, "Event dropped (no subscribers)");
            return 0;
        }

        let mut delivered = 0;
        let mut saw_closed = false;
        for (index, tx) in targets.iter().enumerate() {
            match tx
                .send_timeout(message.clone(), self.config.delivery_timeout)
                .await
            {
                Ok(()) => delivered += 1,
                Err(SendTimeoutError::Timeout(_)) => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        topic = topic,
                        message_id = %message.id,
                        subscriber = index,
                        timeout_ms = self.config.delivery_timeout.as_millis() as u64,
                        "Subscriber blocked, delivery dropped"
                    );
                }
                Err(SendTimeoutError::Closed(_)) => {
                    self.dropped.fetch_add(1, Ordering::Relaxed);
                    saw_closed = true;
                }
            }
        }

        if saw_closed {
            self.prune_closed(topic);
        }

        self.deliveries.fetch_add(delivered as u64, Ordering::Relaxed);
        debug!(
            topic = topic,
            message_id = %message.id,
            delivered = delivered,
            subscribers = targets.len(),
            "Event published"
        );
        delivered
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}
