//! Notification service implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use ms_01_circuit_breaker::CircuitBreaker;
use parking_lot::{Mutex, RwLock};
use shared_bus::{topics, Message, MessageBroker, Subscription};
use shared_types::{
    EntityId, FaultInjector, Notification, NotificationStatus, ServiceError,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::{compose, NotificationServiceConfig};
use crate::ports::NotificationApi;

/// Name used for the breaker, health check and log fields.
pub const SERVICE_NAME: &str = "notification-service";

/// Event-driven notification sender.
pub struct NotificationService {
    notifications: RwLock<HashMap<EntityId, Notification>>,
    next_id: AtomicU64,
    breaker: Arc<CircuitBreaker>,
    faults: Arc<FaultInjector>,
    config: NotificationServiceConfig,
    /// Taken by the listener task on start.
    subscription: Mutex<Option<Subscription>>,
    shutdown_tx: watch::Sender<bool>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl NotificationService {
    /// Create the service and subscribe it to every domain topic.
    pub fn new(
        broker: &MessageBroker,
        breaker: Arc<CircuitBreaker>,
        faults: Arc<FaultInjector>,
        config: NotificationServiceConfig,
    ) -> Self {
        let subscription = broker.subscribe_topics(&topics::ALL, config.queue_capacity);
        info!(
            service = SERVICE_NAME,
            topics = ?topics::ALL,
            "Initializing notification service"
        );
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            notifications: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            breaker,
            faults,
            config,
            subscription: Mutex::new(Some(subscription)),
            shutdown_tx,
            listener: Mutex::new(None),
        }
    }

    /// Spawn the listener task. Calling it again has no effect.
    pub fn start(self: &Arc<Self>) {
        let Some(subscription) = self.subscription.lock().take() else {
            warn!(service = SERVICE_NAME, "Notification listener already started");
            return;
        };
        let service = Arc::clone(self);
        let shutdown = self.shutdown_tx.subscribe();
        let handle = tokio::spawn(async move { service.listen(subscription, shutdown).await });
        *self.listener.lock() = Some(handle);
        info!(service = SERVICE_NAME, "Notification listener started");
    }

    /// Stop the listener, letting an in-flight delivery finish.
    pub async fn stop(&self) {
        self.shutdown_tx.send_replace(true);
        let handle = self.listener.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(service = SERVICE_NAME, error = %e, "Notification listener ended abnormally");
            }
            info!(service = SERVICE_NAME, "Notification listener stopped");
        }
    }

    /// Whether the listener task is alive.
    pub fn is_running(&self) -> bool {
        self.listener
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn config(&self) -> &NotificationServiceConfig {
        &self.config
    }

    async fn listen(&self, mut subscription: Subscription, mut shutdown: watch::Receiver<bool>) {
        loop {
            let message = tokio::select! {
                biased;
                _ = shutdown.wait_for(|stop| *stop) => break,
                message = subscription.recv() => match message {
                    Some(message) => message,
                    None => break,
                },
            };
            self.handle(message).await;
        }
        debug!(service = SERVICE_NAME, "Notification listener exiting");
    }

    /// Store and deliver the notification for one event.
    async fn handle(&self, message: Message) {
        let draft = compose(&message.payload);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.notifications.write().insert(
            id,
            Notification {
                id,
                user_id: draft.user_id,
                kind: draft.kind,
                message: draft.message,
                status: NotificationStatus::Pending,
                created_at: Utc::now(),
                sent_at: None,
            },
        );
        debug!(
            service = SERVICE_NAME,
            topic = %message.topic,
            message_id = %message.id,
            notification_id = id,
            "Notification queued"
        );

        let delay = self.config.delivery_delay;
        let outcome = self
            .breaker
            .execute(|| async move {
                tokio::time::sleep(delay).await;
                if self.faults.should_fail() {
                    Err(ServiceError::transient(
                        "send_notification",
                        "simulated delivery failure",
                    ))
                } else {
                    Ok(())
                }
            })
            .await
            .map_err(|e| e.unwrap_or_open(ServiceError::circuit_open));

        let mut notifications = self.notifications.write();
        let Some(notification) = notifications.get_mut(&id) else {
            return;
        };
        match outcome {
            Ok(()) => {
                notification.status = NotificationStatus::Sent;
                notification.sent_at = Some(Utc::now());
                info!(
                    service = SERVICE_NAME,
                    notification_id = id,
                    user_id = notification.user_id,
                    kind = ?notification.kind,
                    "Notification sent"
                );
            }
            Err(e) => {
                notification.status = NotificationStatus::Failed;
                warn!(
                    service = SERVICE_NAME,
                    notification_id = id,
                    error = %e,
                    "Notification delivery failed"
                );
            }
        }
    }
}

impl NotificationApi for NotificationService {
    fn list_notifications(&self) -> Vec<Notification> {
        let mut all: Vec<Notification> = self.notifications.read().values().cloned().collect();
        all.sort_by_key(|n| n.id);
        all
    }

    fn get_notification(&self, id: EntityId) -> Result<Notification, ServiceError> {
        self.notifications
            .read()
            .get(&id)
            .cloned()
            .ok_or(ServiceError::NotFound {
                entity: "notification",
                id,
            })
    }

    fn notifications_for_user(&self, user_id: EntityId) -> Vec<Notification> {
        let mut mine: Vec<Notification> = self
            .notifications
            .read()
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by_key(|n| n.id);
        mine
    }

    fn circuit_breaker(&self) -> Arc<CircuitBreaker> {
        Arc::clone(&self.breaker)
    }
}
