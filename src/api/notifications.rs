//! Notification API endpoints
//!
//! Handles HTTP requests for the caller's notification inbox:
//! - GET /api/v1/notifications - List own notifications
//! - GET /api/v1/notifications/unread-count - Unread badge count
//! - PUT /api/v1/notifications/{id}/read - Mark one read
//! - PUT /api/v1/notifications/read-all - Mark all read

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::NotificationResponse;
use crate::services::NotificationServiceError;

/// Response for the unread badge
#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// Response for mark-all-read
#[derive(Debug, Serialize)]
pub struct MarkAllReadResponse {
    pub updated: i64,
}

/// Build notification routes (all require authentication)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notifications))
        .route("/unread-count", get(unread_count))
        .route("/{id}/read", put(mark_read))
        .route("/read-all", put(mark_all_read))
}

/// GET /api/v1/notifications - List the caller's notifications
async fn list_notifications(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let notifications = state
        .notification_service
        .list(&user.0.auth_context())
        .await
        .map_err(map_notification_error)?;

    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

/// GET /api/v1/notifications/unread-count - Unread badge count
async fn unread_count(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UnreadCountResponse>, ApiError> {
    let count = state
        .notification_service
        .unread_count(&user.0.auth_context())
        .await
        .map_err(map_notification_error)?;

    Ok(Json(UnreadCountResponse { count }))
}

/// PUT /api/v1/notifications/{id}/read - Mark one notification read
async fn mark_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .notification_service
        .mark_read(&user.0.auth_context(), &id)
        .await
        .map_err(map_notification_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/notifications/read-all - Mark all notifications read
async fn mark_all_read(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<MarkAllReadResponse>, ApiError> {
    let updated = state
        .notification_service
        .mark_all_read(&user.0.auth_context())
        .await
        .map_err(map_notification_error)?;

    Ok(Json(MarkAllReadResponse { updated }))
}

fn map_notification_error(e: NotificationServiceError) -> ApiError {
    match e {
        NotificationServiceError::NotFound(id) => {
            ApiError::not_found(format!("Notification not found: {}", id))
        }
        NotificationServiceError::InternalError(err) => {
            tracing::error!("Notification operation failed: {:#}", err);
            ApiError::internal_error("An internal error occurred")
        }
    }
}
