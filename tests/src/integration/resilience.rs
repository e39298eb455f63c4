//! # Resilience Scenarios
//!
//! Injected failures opening breakers, recovery after the cool-down, slow
//! subscribers, and orders caught by a pool shutdown.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use ms_01_circuit_breaker::CircuitState;
    use ms_02_worker_pool::{WorkerPool, WorkerPoolConfig};
    use ms_04_user_service::UserApi;
    use ms_05_order_service::OrderApi;
    use ms_06_notification_service::NotificationApi;
    use shared_bus::{topics, BrokerConfig, EventPayload, EventPublisher, MessageBroker};
    use shared_types::{NotificationStatus, OrderStatus, ServiceError, User};

    use crate::fixtures::{eventually, fast_config, start_mesh};

    fn user(id: u64) -> User {
        User {
            id,
            name: format!("user-{id}"),
            email: format!("user-{id}@x.com"),
            created_at: Default::default(),
        }
    }

    // =========================================================================
    // CIRCUIT BREAKERS
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_injected_failures_open_user_breaker() {
        let mesh = start_mesh(fast_config());
        mesh.faults.set_failure_rate(1.0);

        for _ in 0..3 {
            let err = mesh.users.create_user("Alice", "alice@x.com").await.unwrap_err();
            assert!(matches!(err, ServiceError::Transient { .. }), "{err}");
        }
        let breaker = mesh.users.circuit_breaker();
        assert_eq!(breaker.state(), CircuitState::Open);

        let err = mesh.users.create_user("Alice", "alice@x.com").await.unwrap_err();
        assert_eq!(err, ServiceError::CircuitOpen("user-service".into()));

        let report = mesh.health.check_health();
        assert!(!report.is_healthy());
        assert_eq!(
            report.checks["user-service"],
            "unhealthy: circuit breaker is open"
        );
        assert!(mesh.users.list_users().is_empty());
        mesh.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_breaker_recovers_after_cooldown() {
        let mesh = start_mesh(fast_config());
        mesh.faults.set_failure_rate(1.0);
        for _ in 0..3 {
            let _ = mesh.users.create_user("Alice", "alice@x.com").await;
        }
        assert_eq!(mesh.users.circuit_breaker().state(), CircuitState::Open);

        mesh.faults.set_failure_rate(0.0);
        tokio::time::sleep(Duration::from_millis(150)).await;

        let user = mesh.users.create_user("Alice", "alice@x.com").await.unwrap();
        assert_eq!(user.id, 1);
        let breaker = mesh.users.circuit_breaker();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.failure_count(), 0);
        assert!(mesh.health.check_health().is_healthy());
        mesh.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_single_trial_under_concurrent_requests() {
        let mut config = fast_config();
        config.breaker.timeout = Duration::from_millis(50);
        let mesh = Arc::new(start_mesh(config));
        mesh.faults.set_failure_rate(1.0);
        for _ in 0..3 {
            let _ = mesh.users.create_user("Alice", "alice@x.com").await;
        }
        tokio::time::sleep(Duration::from_millis(80)).await;

        // Trial keeps failing: exactly one caller gets through and reopens.
        let transient = Arc::new(AtomicUsize::new(0));
        let rejected = Arc::new(AtomicUsize::new(0));
        let callers: Vec<_> = (0..12)
            .map(|_| {
                let mesh = Arc::clone(&mesh);
                let transient = Arc::clone(&transient);
                let rejected = Arc::clone(&rejected);
                tokio::spawn(async move {
                    match mesh.users.create_user("Alice", "alice@x.com").await {
                        Err(ServiceError::Transient { .. }) => {
                            transient.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(ServiceError::CircuitOpen(_)) => {
                            rejected.fetch_add(1, Ordering::SeqCst);
                        }
                        other => panic!("unexpected outcome: {other:?}"),
                    }
                })
            })
            .collect();
        for caller in callers {
            caller.await.unwrap();
        }

        assert_eq!(transient.load(Ordering::SeqCst), 1);
        assert_eq!(rejected.load(Ordering::SeqCst), 11);
        assert_eq!(mesh.users.circuit_breaker().state(), CircuitState::Open);
        mesh.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failing_deliveries_mark_notifications_failed() {
        let mesh = start_mesh(fast_config());
        let user = mesh.users.create_user("Alice", "alice@x.com").await.unwrap();
        eventually(Duration::from_secs(5), || {
            mesh.notifications
                .get_notification(1)
                .ok()
                .filter(|n| n.status == NotificationStatus::Sent)
        })
        .await;

        // Faults hit every guarded call, so publish the events directly.
        mesh.faults.set_failure_rate(1.0);
        for _ in 0..4 {
            mesh.broker
                .publish(topics::USER_CREATED, EventPayload::UserCreated(user.clone()))
                .await;
        }

        eventually(Duration::from_secs(5), || {
            let failed = mesh
                .notifications
                .notifications_for_user(user.id)
                .iter()
                .filter(|n| n.status == NotificationStatus::Failed)
                .count();
            (failed == 4).then_some(())
        })
        .await;

        // Three transient failures opened the breaker; the fourth was rejected.
        assert_eq!(
            mesh.notifications.circuit_breaker().state(),
            CircuitState::Open
        );
        assert_eq!(mesh.notifications.circuit_breaker().stats().total_rejected, 1);
        mesh.stop().await;
    }

    // =========================================================================
    // BROKER
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slow_subscriber_does_not_block_others() {
        let broker = MessageBroker::with_config(BrokerConfig {
            delivery_timeout: Duration::from_millis(20),
            subscriber_capacity: 1,
        });
        // Never drained after the first message
        let _stalled = broker.subscribe_channel(topics::USER_CREATED, 1);
        let mut healthy = broker.subscribe_channel(topics::USER_CREATED, 64);

        let mut delivered = Vec::new();
        for id in 1..=5 {
            delivered.push(
                broker
                    .publish(topics::USER_CREATED, EventPayload::UserCreated(user(id)))
                    .await,
            );
        }

        assert_eq!(delivered, vec![2, 1, 1, 1, 1]);
        assert_eq!(broker.dropped_deliveries(), 4);
        for id in 1..=5 {
            let message = healthy.try_recv().unwrap().unwrap();
            assert_eq!(message.payload.user_id(), id);
        }
    }

    // =========================================================================
    // WORKER POOL
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_job_runs_exactly_once() {
        let pool = WorkerPool::new(WorkerPoolConfig {
            workers: 3,
            queue_capacity: 4,
        })
        .unwrap();
        pool.start().unwrap();

        let runs: Arc<Vec<AtomicUsize>> = Arc::new((0..40).map(|_| AtomicUsize::new(0)).collect());
        let mut handles = Vec::new();
        for i in 0..40 {
            let runs = Arc::clone(&runs);
            handles.push(
                pool.spawn(move || async move {
                    runs[i].fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    Ok(())
                })
                .await
                .unwrap(),
            );
        }
        for handle in handles {
            handle.wait().await.unwrap();
        }

        assert!(runs.iter().all(|r| r.load(Ordering::SeqCst) == 1));
        assert_eq!(pool.stats().completed, 40);
        pool.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_orders_after_pool_stop_stay_pending() {
        let mesh = start_mesh(fast_config());
        let user = mesh.users.create_user("Alice", "alice@x.com").await.unwrap();
        mesh.pool.stop().await;

        let order = mesh
            .orders
            .create_order(user.id, "Laptop", 999.0)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(
            mesh.orders.get_order(order.id).unwrap().status,
            OrderStatus::Pending
        );
        let report = mesh.health.check_health();
        assert_eq!(
            report.checks["worker-pool"],
            "unhealthy: worker pool is not running"
        );
        mesh.stop().await;
    }
}
