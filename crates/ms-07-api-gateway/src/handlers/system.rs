//! Health, stats, metrics and admin handlers.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use ms_03_health_check::HealthReport;
use tracing::info;

use super::AppState;
use crate::domain::error::ApiError;
use crate::domain::types::{BreakerResetResponse, StatsResponse};

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.deps.health.check_health())
}

/// `GET /stats`
pub async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let breakers: Vec<_> = state
        .deps
        .breakers()
        .iter()
        .map(|breaker| breaker.stats())
        .collect();

    Json(StatsResponse {
        circuit_breakers: breakers
            .iter()
            .map(|stats| (stats.name.clone(), stats.state))
            .collect(),
        breakers,
        worker_pool: state.deps.pool.stats(),
        message_broker: state.deps.broker.stats(),
        timestamp: Utc::now(),
    })
}

/// `GET /metrics`
pub async fn metrics(State(state): State<AppState>) -> Response {
    #[cfg(feature = "metrics")]
    {
        (
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )],
            state.metrics.to_prometheus(),
        )
            .into_response()
    }
    #[cfg(not(feature = "metrics"))]
    {
        Json(state.metrics.to_json()).into_response()
    }
}

/// `POST /admin/breakers/:name/reset`
pub async fn reset_breaker(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<BreakerResetResponse>, ApiError> {
    let breaker = state
        .deps
        .breakers()
        .into_iter()
        .find(|breaker| breaker.name() == name)
        .ok_or_else(|| ApiError::not_found(format!("circuit breaker '{name}' not found")))?;

    breaker.reset();
    info!(breaker = %name, "Circuit breaker reset via admin endpoint");
    Ok(Json(BreakerResetResponse {
        name,
        state: breaker.state(),
    }))
}
