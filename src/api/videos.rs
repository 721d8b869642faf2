//! Video submission API endpoints
//!
//! Handles HTTP requests for the video side of the workflow:
//! - GET /api/v1/videos - List videos visible to the caller
//! - POST /api/v1/videos - Submit a video (publishers)
//! - PUT /api/v1/videos/{id}/status - Review a video
//! - GET /api/v1/videos/{id}/publish-link - Upload deep link (owner)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Serialize;

use crate::api::applications::{map_workflow_error, UpdateReviewStatusRequest};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::VideoResponse;
use crate::models::CreateVideoInput;

/// Response for the publish deep link
#[derive(Debug, Serialize)]
pub struct PublishLinkResponse {
    pub publish_url: String,
}

/// Build video routes (all require authentication)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_videos).post(create_video))
        .route("/{id}/status", put(update_video_status))
        .route("/{id}/publish-link", get(get_publish_link))
}

/// GET /api/v1/videos - List videos visible to the caller
async fn list_videos(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<VideoResponse>>, ApiError> {
    let videos = state
        .video_service
        .list(&user.0.auth_context())
        .await
        .map_err(map_workflow_error)?;

    Ok(Json(videos.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/videos - Submit a video
async fn create_video(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateVideoInput>,
) -> Result<(StatusCode, Json<VideoResponse>), ApiError> {
    let video = state
        .video_service
        .create(&user.0.auth_context(), body)
        .await
        .map_err(map_workflow_error)?;

    Ok((StatusCode::CREATED, Json(video.into())))
}

/// PUT /api/v1/videos/{id}/status - Review a video
async fn update_video_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateReviewStatusRequest>,
) -> Result<Json<VideoResponse>, ApiError> {
    let video = state
        .video_service
        .update_status(&user.0.auth_context(), &id, body.status, body.reason)
        .await
        .map_err(map_workflow_error)?;

    Ok(Json(video.into()))
}

/// GET /api/v1/videos/{id}/publish-link - Upload deep link for a fully
/// approved video
async fn get_publish_link(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<PublishLinkResponse>, ApiError> {
    let publish_url = state
        .video_service
        .publish_link(&user.0.auth_context(), &id)
        .await
        .map_err(map_workflow_error)?;

    Ok(Json(PublishLinkResponse { publish_url }))
}
