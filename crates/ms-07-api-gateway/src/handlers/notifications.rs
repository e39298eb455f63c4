//! `/notifications` handlers.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use shared_types::{EntityId, Notification};

use super::AppState;
use crate::domain::error::ApiError;

/// `GET /notifications`
pub async fn list_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.deps.notifications.list_notifications())
}

/// `GET /notifications/:id`
pub async fn get_notification(
    State(state): State<AppState>,
    id: Result<Path<EntityId>, PathRejection>,
) -> Result<Json<Notification>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.deps.notifications.get_notification(id)?))
}

/// `GET /users/:id/notifications`
pub async fn user_notifications(
    State(state): State<AppState>,
    id: Result<Path<EntityId>, PathRejection>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    let Path(id) = id?;
    state.deps.users.get_user(id)?;
    Ok(Json(state.deps.notifications.notifications_for_user(id)))
}
