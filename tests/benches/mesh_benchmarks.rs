//! # Service Mesh Benchmarks
//!
//! | Component | Path measured |
//! |-----------|---------------|
//! | ms-01 Circuit Breaker | `execute` on a closed breaker, rejection while open |
//! | shared-bus Broker | `publish` fan-out to N subscribers |
//! | ms-02 Worker Pool | `spawn` + `wait` round trip |
//! | ms-04 User Service | `create_user` through breaker and broker |

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ms_01_circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use ms_02_worker_pool::{WorkerPool, WorkerPoolConfig};
use ms_04_user_service::{UserApi, UserService};
use shared_bus::{topics, BrokerConfig, EventPayload, EventPublisher, MessageBroker};
use shared_types::{FaultInjector, User};
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .unwrap()
}

// ============================================================================
// MS-01: Circuit Breaker
// ============================================================================

fn bench_circuit_breaker(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("ms-01-circuit-breaker");

    let closed = CircuitBreaker::new("bench", CircuitBreakerConfig::default());
    group.bench_function("execute_closed_ok", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(closed.execute(|| async { Ok::<_, ()>(1u64) }).await)
        })
    });

    let open = CircuitBreaker::new(
        "bench-open",
        CircuitBreakerConfig {
            max_failures: 1,
            timeout: Duration::from_secs(3600),
        },
    );
    rt.block_on(async {
        let _ = open.execute(|| async { Err::<(), _>("boom") }).await;
    });
    group.bench_function("execute_open_rejected", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(open.execute(|| async { Ok::<_, ()>(()) }).await)
        })
    });

    group.finish();
}

// ============================================================================
// SHARED-BUS: Message Broker
// ============================================================================

fn bench_broker_fanout(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("shared-bus-broker");

    for subscribers in [1usize, 4, 16] {
        let broker = MessageBroker::with_config(BrokerConfig {
            delivery_timeout: Duration::from_millis(50),
            subscriber_capacity: 1024,
        });
        // Drain every subscription in the background.
        let _drains: Vec<_> = (0..subscribers)
            .map(|_| {
                let mut subscription = broker.subscribe_channel(topics::USER_CREATED, 1024);
                rt.spawn(async move { while subscription.recv().await.is_some() {} })
            })
            .collect();

        let user = User {
            id: 1,
            name: "bench".into(),
            email: "bench@x.com".into(),
            created_at: Default::default(),
        };

        group.throughput(Throughput::Elements(subscribers as u64));
        group.bench_with_input(
            BenchmarkId::new("publish", subscribers),
            &subscribers,
            |b, _| {
                b.to_async(&rt).iter(|| async {
                    black_box(
                        broker
                            .publish(topics::USER_CREATED, EventPayload::UserCreated(user.clone()))
                            .await,
                    )
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// MS-02: Worker Pool
// ============================================================================

fn bench_worker_pool(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("ms-02-worker-pool");

    let pool = WorkerPool::new(WorkerPoolConfig {
        workers: 4,
        queue_capacity: 256,
    })
    .unwrap();
    rt.block_on(async { pool.start().unwrap() });

    group.bench_function("spawn_wait_round_trip", |b| {
        b.to_async(&rt).iter(|| async {
            let handle = pool.spawn(|| async { Ok(()) }).await.unwrap();
            black_box(handle.wait().await)
        })
    });

    const BATCH: usize = 64;
    group.throughput(Throughput::Elements(BATCH as u64));
    group.bench_function("spawn_batch_64", |b| {
        b.to_async(&rt).iter(|| async {
            let mut handles = Vec::with_capacity(BATCH);
            for _ in 0..BATCH {
                handles.push(pool.spawn(|| async { Ok(()) }).await.unwrap());
            }
            for handle in handles {
                black_box(handle.wait().await.unwrap());
            }
        })
    });

    group.finish();
    rt.block_on(pool.stop());
}

// ============================================================================
// MS-04: User Service
// ============================================================================

fn bench_user_creation(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("ms-04-user-service");

    let users = Arc::new(UserService::new(
        Arc::new(CircuitBreaker::new("user-service", CircuitBreakerConfig::default())),
        Arc::new(MessageBroker::new()) as Arc<dyn EventPublisher>,
        Arc::new(FaultInjector::disabled()),
    ));

    group.bench_function("create_user", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(users.create_user("Bench", "bench@x.com").await.unwrap())
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_circuit_breaker,
    bench_broker_fanout,
    bench_worker_pool,
    bench_user_creation
);
criterion_main!(benches);
