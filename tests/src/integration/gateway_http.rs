//! # Gateway over HTTP
//!
//! The user → order → notification flow driven through the axum router
//! built on a fully wired container.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use mesh_runtime::ServiceContainer;
    use ms_07_api_gateway::{ApiGatewayService, GatewayConfig};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::fixtures::{fast_config, start_mesh};

    fn router(mesh: &ServiceContainer) -> Router {
        ApiGatewayService::new(GatewayConfig::default(), mesh.gateway_deps())
            .unwrap()
            .router()
    }

    async fn call(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    async fn poll_until<F>(router: &Router, uri: &str, done: F) -> Value
    where
        F: Fn(&Value) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let (_, body) = call(router, get(uri)).await;
                if done(&body) {
                    return body;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_user_order_notification_flow() {
        let mesh = start_mesh(fast_config());
        let router = router(&mesh);

        let (status, user) = call(
            &router,
            post("/users", json!({"name": "Alice", "email": "alice@x.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let user_id = user["id"].as_u64().unwrap();

        let (status, order) = call(
            &router,
            post(
                "/orders",
                json!({"user_id": user_id, "product": "Laptop", "amount": 999.0}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["status"], "pending");

        let uri = format!("/orders/{}", order["id"]);
        let completed = poll_until(&router, &uri, |o| o["status"] == "completed").await;
        assert_eq!(completed["product"], "Laptop");

        let notifications = poll_until(
            &router,
            &format!("/users/{user_id}/notifications"),
            |list| {
                list.as_array().is_some_and(|l| {
                    l.len() == 3 && l.iter().all(|n| n["status"] == "sent")
                })
            },
        )
        .await;
        assert_eq!(notifications[0]["kind"], "welcome");

        let stats = poll_until(&router, "/stats", |s| s["worker_pool"]["completed"] == 1).await;
        assert_eq!(stats["message_broker"]["events_published"], 3);
        assert_eq!(stats["circuit_breakers"]["order-service"], "closed");

        let (status, health) = call(&router, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["checks"]["worker-pool"], "healthy");
        mesh.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_error_bodies() {
        let mesh = start_mesh(fast_config());
        let router = router(&mesh);

        let (status, body) = call(
            &router,
            post("/orders", json!({"user_id": 1, "product": "", "amount": 5.0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = call(
            &router,
            post("/orders", json!({"user_id": 1, "product": "Laptop", "amount": 5.0})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "user 1 not found");

        let (status, _) = call(&router, get("/orders/99")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        mesh.stop().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_open_breaker_reported_and_reset() {
        let mesh = start_mesh(fast_config());
        let router = router(&mesh);
        mesh.faults.set_failure_rate(1.0);

        for _ in 0..3 {
            let (status, _) = call(
                &router,
                post("/users", json!({"name": "A", "email": "a@x.com"})),
            )
            .await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        }
        let (status, _) = call(
            &router,
            post("/users", json!({"name": "A", "email": "a@x.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (_, health) = call(&router, get("/health")).await;
        assert_eq!(health["status"], "unhealthy");

        mesh.faults.set_failure_rate(0.0);
        let (status, reset) = call(
            &router,
            Request::post("/admin/breakers/user-service/reset")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reset["state"], "closed");

        let (status, _) = call(
            &router,
            post("/users", json!({"name": "A", "email": "a@x.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        mesh.stop().await;
    }
}
