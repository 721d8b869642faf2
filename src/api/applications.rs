//! Campaign application API endpoints
//!
//! Handles HTTP requests for the application side of the workflow:
//! - GET /api/v1/applications - List applications visible to the caller
//! - POST /api/v1/applications - Apply to a campaign (publishers)
//! - PUT /api/v1/applications/{id}/status - Review an application

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::ApplicationResponse;
use crate::models::{CreateApplicationInput, ReviewStatus};
use crate::services::WorkflowServiceError;

/// Request body for review decisions.
///
/// The optional reason is forwarded to the publisher's notification,
/// never stored on the application.
#[derive(Debug, Deserialize)]
pub struct UpdateReviewStatusRequest {
    pub status: ReviewStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Build application routes (all require authentication)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_applications).post(create_application))
        .route("/{id}/status", put(update_application_status))
}

/// GET /api/v1/applications - List applications visible to the caller
async fn list_applications(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<ApplicationResponse>>, ApiError> {
    let applications = state
        .application_service
        .list(&user.0.auth_context())
        .await
        .map_err(map_workflow_error)?;

    Ok(Json(applications.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/applications - Apply to a campaign
async fn create_application(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateApplicationInput>,
) -> Result<(StatusCode, Json<ApplicationResponse>), ApiError> {
    let application = state
        .application_service
        .create(&user.0.auth_context(), body)
        .await
        .map_err(map_workflow_error)?;

    Ok((StatusCode::CREATED, Json(application.into())))
}

/// PUT /api/v1/applications/{id}/status - Review an application
async fn update_application_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateReviewStatusRequest>,
) -> Result<Json<ApplicationResponse>, ApiError> {
    let application = state
        .application_service
        .update_status(&user.0.auth_context(), &id, body.status, body.reason)
        .await
        .map_err(map_workflow_error)?;

    Ok(Json(application.into()))
}

pub(super) fn map_workflow_error(e: WorkflowServiceError) -> ApiError {
    match e {
        WorkflowServiceError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
        WorkflowServiceError::Forbidden(msg) => ApiError::forbidden(msg),
        WorkflowServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        WorkflowServiceError::InternalError(err) => {
            tracing::error!("Workflow operation failed: {:#}", err);
            ApiError::internal_error("An internal error occurred")
        }
    }
}
