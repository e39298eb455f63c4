//! # End-to-end Flows
//!
//! User registration, order placement and the notifications they trigger,
//! driven through the service ports with every collaborator real.
//!
//! ```text
//! UserService ──user.created──────────────┐
//! OrderService ─order.created─────────────┼──► broker ──► NotificationService
//!      └─► WorkerPool ─order.completed────┘
//! ```

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ms_04_user_service::UserApi;
    use ms_05_order_service::OrderApi;
    use ms_06_notification_service::NotificationApi;
    use shared_bus::{topics, EventPayload};
    use shared_types::{NotificationKind, NotificationStatus, OrderStatus, ServiceError};

    use crate::fixtures::{eventually, fast_config, start_mesh, FAST_PROCESSING};

    // =========================================================================
    // USER FLOW
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_created_user_reads_back_unchanged() {
        let mesh = start_mesh(fast_config());

        let created = mesh.users.create_user("Alice", "alice@x.com").await.unwrap();
        let fetched = mesh.users.get_user(created.id).unwrap();

        assert_eq!(fetched, created);
        assert_eq!(fetched.name, "Alice");
        assert_eq!(fetched.email, "alice@x.com");
        assert!(fetched.created_at.timestamp() > 0);
        mesh.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_user_creation_publishes_exactly_one_event() {
        let mesh = start_mesh(fast_config());
        let mut events = mesh.broker.subscribe_channel(topics::USER_CREATED, 8);

        let user = mesh.users.create_user("Bob", "bob@x.com").await.unwrap();

        let message = tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(message.topic, topics::USER_CREATED);
        match message.payload {
            EventPayload::UserCreated(published) => assert_eq!(published, user),
            other => panic!("unexpected payload: {other:?}"),
        }

        // Give a duplicate the chance to show up.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(events.try_recv().unwrap().is_none());
        assert_eq!(mesh.broker.stats().events_published, 1);
        mesh.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_invalid_user_publishes_nothing() {
        let mesh = start_mesh(fast_config());
        let mut events = mesh.broker.subscribe_channel(topics::USER_CREATED, 8);

        let err = mesh.users.create_user("", "nobody").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(events.try_recv().unwrap().is_none());
        assert!(mesh.users.list_users().is_empty());
        // Validation failures never count against the breaker.
        assert_eq!(mesh.users.circuit_breaker().failure_count(), 0);
        mesh.stop().await;
    }

    // =========================================================================
    // ORDER FLOW
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_order_goes_from_pending_to_completed() {
        let mesh = start_mesh(fast_config());
        let user = mesh.users.create_user("Alice", "alice@x.com").await.unwrap();

        let order = mesh
            .orders
            .create_order(user.id, "Laptop", 999.0)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.completed_at.is_none());

        let completed = eventually(FAST_PROCESSING * 50, || {
            mesh.orders
                .get_order(order.id)
                .ok()
                .filter(|o| o.status == OrderStatus::Completed)
        })
        .await;
        assert!(completed.completed_at.is_some());
        assert!(completed.completed_at >= Some(completed.created_at));
        // The job finishes after publishing order.completed.
        eventually(Duration::from_secs(1), || {
            (mesh.pool.stats().completed == 1).then_some(())
        })
        .await;
        mesh.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_order_for_unknown_user_is_rejected() {
        let mesh = start_mesh(fast_config());

        let err = mesh
            .orders
            .create_order(42, "Laptop", 10.0)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { entity: "user", id: 42 }));
        assert!(mesh.orders.list_orders().is_empty());
        assert_eq!(mesh.pool.stats().submitted, 0);
        mesh.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_event_order_per_topic() {
        let mesh = start_mesh(fast_config());
        let mut created = mesh.broker.subscribe_channel(topics::ORDER_CREATED, 16);
        let user = mesh.users.create_user("Alice", "alice@x.com").await.unwrap();

        let mut placed = Vec::new();
        for i in 1..=5 {
            let order = mesh
                .orders
                .create_order(user.id, &format!("item-{i}"), f64::from(i))
                .await
                .unwrap();
            placed.push(order.id);
        }

        let mut seen = Vec::new();
        for _ in 0..5 {
            let message = tokio::time::timeout(Duration::from_secs(1), created.recv())
                .await
                .unwrap()
                .unwrap();
            match message.payload {
                EventPayload::OrderCreated(order) => seen.push(order.id),
                other => panic!("unexpected payload: {other:?}"),
            }
        }
        assert_eq!(seen, placed);
        mesh.stop().await;
    }

    // =========================================================================
    // NOTIFICATIONS
    // =========================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_full_flow_sends_three_notifications() {
        let mesh = start_mesh(fast_config());
        let user = mesh.users.create_user("Alice", "alice@x.com").await.unwrap();
        mesh.orders
            .create_order(user.id, "Laptop", 999.0)
            .await
            .unwrap();

        let sent = eventually(Duration::from_secs(5), || {
            let mine = mesh.notifications.notifications_for_user(user.id);
            (mine.len() == 3 && mine.iter().all(|n| n.status == NotificationStatus::Sent))
                .then_some(mine)
        })
        .await;

        let kinds: Vec<_> = sent.iter().map(|n| n.kind).collect();
        assert_eq!(kinds[0], NotificationKind::Welcome);
        assert!(kinds.contains(&NotificationKind::OrderConfirmation));
        assert!(kinds.contains(&NotificationKind::OrderCompleted));
        assert!(sent.iter().all(|n| n.sent_at.is_some()));
        assert!(sent
            .iter()
            .any(|n| n.message.contains("Laptop") && n.message.contains("$999.00")));
        mesh.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_notifications_are_per_user() {
        let mesh = start_mesh(fast_config());
        let alice = mesh.users.create_user("Alice", "alice@x.com").await.unwrap();
        let bob = mesh.users.create_user("Bob", "bob@x.com").await.unwrap();

        eventually(Duration::from_secs(5), || {
            (mesh.notifications.list_notifications().len() == 2).then_some(())
        })
        .await;

        let for_alice = mesh.notifications.notifications_for_user(alice.id);
        let for_bob = mesh.notifications.notifications_for_user(bob.id);
        assert_eq!(for_alice.len(), 1);
        assert_eq!(for_bob.len(), 1);
        assert_ne!(for_alice[0].id, for_bob[0].id);
        mesh.stop().await;
    }
}
