//! `/orders` handlers.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use shared_types::{EntityId, Order};

use super::AppState;
use crate::domain::error::ApiError;
use crate::domain::types::CreateOrderRequest;

/// `POST /orders`
///
/// Returns the order while still `pending`; clients re-read it to observe
/// completion.
pub async fn create_order(
    State(state): State<AppState>,
    body: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<Order>, ApiError> {
    let Json(request) = body?;
    let order = state
        .deps
        .orders
        .create_order(request.user_id, &request.product, request.amount)
        .await?;
    Ok(Json(order))
}

/// `GET /orders`
pub async fn list_orders(State(state): State<AppState>) -> Json<Vec<Order>> {
    Json(state.deps.orders.list_orders())
}

/// `GET /orders/:id`
pub async fn get_order(
    State(state): State<AppState>,
    id: Result<Path<EntityId>, PathRejection>,
) -> Result<Json<Order>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.deps.orders.get_order(id)?))
}
