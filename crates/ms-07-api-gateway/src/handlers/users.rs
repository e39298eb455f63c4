//! `/users` handlers.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;
use shared_types::{EntityId, Order, User};

use super::AppState;
use crate::domain::error::ApiError;
use crate::domain::types::CreateUserRequest;

/// `POST /users`
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let Json(request) = body?;
    let user = state
        .deps
        .users
        .create_user(&request.name, &request.email)
        .await?;
    Ok(Json(user))
}

/// `GET /users`
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<User>> {
    Json(state.deps.users.list_users())
}

/// `GET /users/:id`
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<EntityId>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.deps.users.get_user(id)?))
}

/// `GET /users/:id/orders`
pub async fn user_orders(
    State(state): State<AppState>,
    id: Result<Path<EntityId>, PathRejection>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let Path(id) = id?;
    state.deps.users.get_user(id)?;
    Ok(Json(state.deps.orders.orders_for_user(id)))
}
