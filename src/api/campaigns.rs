//! Campaign API endpoints
//!
//! Handles HTTP requests for campaign management:
//! - GET /api/v1/campaigns - List campaigns visible to the caller
//! - POST /api/v1/campaigns - Create a campaign (advertisers)
//! - PUT /api/v1/campaigns/{id}/status - Update campaign status (owner)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::CampaignResponse;
use crate::models::{CampaignStatus, CreateCampaignInput};
use crate::services::CampaignServiceError;

/// Request body for updating a campaign's status
#[derive(Debug, Deserialize)]
pub struct UpdateCampaignStatusRequest {
    pub status: CampaignStatus,
}

/// Build campaign routes (all require authentication)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_campaigns).post(create_campaign))
        .route("/{id}/status", put(update_campaign_status))
}

/// GET /api/v1/campaigns - List campaigns visible to the caller
async fn list_campaigns(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<CampaignResponse>>, ApiError> {
    let campaigns = state
        .campaign_service
        .list(&user.0.auth_context())
        .await
        .map_err(map_campaign_error)?;

    Ok(Json(campaigns.into_iter().map(Into::into).collect()))
}

/// POST /api/v1/campaigns - Create a campaign
async fn create_campaign(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(body): Json<CreateCampaignInput>,
) -> Result<(StatusCode, Json<CampaignResponse>), ApiError> {
    let campaign = state
        .campaign_service
        .create(&user.0.auth_context(), body)
        .await
        .map_err(map_campaign_error)?;

    Ok((StatusCode::CREATED, Json(campaign.into())))
}

/// PUT /api/v1/campaigns/{id}/status - Update a campaign's status
async fn update_campaign_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateCampaignStatusRequest>,
) -> Result<Json<CampaignResponse>, ApiError> {
    let campaign = state
        .campaign_service
        .update_status(&user.0.auth_context(), &id, body.status)
        .await
        .map_err(map_campaign_error)?;

    Ok(Json(campaign.into()))
}

fn map_campaign_error(e: CampaignServiceError) -> ApiError {
    match e {
        CampaignServiceError::NotFound(id) => {
            ApiError::not_found(format!("Campaign not found: {}", id))
        }
        CampaignServiceError::Forbidden(msg) => ApiError::forbidden(msg),
        CampaignServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        CampaignServiceError::InternalError(err) => {
            tracing::error!("Campaign operation failed: {:#}", err);
            ApiError::internal_error("An internal error occurred")
        }
    }
}
