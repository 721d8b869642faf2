//! Campaign service
//!
//! Implements business logic for advertising campaigns:
//! - Role-filtered listing (advertisers see their own, publishers see
//!   active campaigns, SP team sees everything)
//! - Campaign creation by advertisers, forced to `active`
//! - Status management restricted to the owning advertiser
//!
//! Every operation takes the caller's [`AuthContext`] explicitly; there
//! is no ambient current-user state.

use crate::db::repositories::CampaignRepository;
use crate::models::{AuthContext, Campaign, CampaignStatus, CreateCampaignInput, UserRole};
use anyhow::Context;
use std::sync::Arc;

/// Error types for campaign service operations
#[derive(Debug, thiserror::Error)]
pub enum CampaignServiceError {
    /// Campaign not found
    #[error("Campaign not found: {0}")]
    NotFound(String),

    /// Caller's role or ownership does not permit the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Validation error (invalid input)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Campaign service
pub struct CampaignService {
    repo: Arc<dyn CampaignRepository>,
}

impl CampaignService {
    /// Create a new campaign service
    pub fn new(repo: Arc<dyn CampaignRepository>) -> Self {
        Self { repo }
    }

    /// List campaigns visible to the caller, newest first
    ///
    /// Advertisers see campaigns they created, publishers see only
    /// `active` campaigns, and the SP team sees all of them.
    pub async fn list(&self, actor: &AuthContext) -> Result<Vec<Campaign>, CampaignServiceError> {
        let campaigns = match actor.role {
            UserRole::Advertiser => self
                .repo
                .list_by_creator(&actor.user_id)
                .await
                .context("Failed to list campaigns by creator")?,
            UserRole::Publisher => self
                .repo
                .list_active()
                .await
                .context("Failed to list active campaigns")?,
            UserRole::SpTeam => self
                .repo
                .list_all()
                .await
                .context("Failed to list campaigns")?,
        };

        Ok(campaigns)
    }

    /// Create a campaign
    ///
    /// Only advertisers may create campaigns. The new campaign always
    /// starts `active`, whatever the client asked for.
    pub async fn create(
        &self,
        actor: &AuthContext,
        input: CreateCampaignInput,
    ) -> Result<Campaign, CampaignServiceError> {
        if actor.role != UserRole::Advertiser {
            return Err(CampaignServiceError::Forbidden(
                "Only advertisers can create campaigns".to_string(),
            ));
        }

        validate_create_input(&input)?;

        let campaign = Campaign::new(input, actor.user_id.clone());
        self.repo
            .create(&campaign)
            .await
            .context("Failed to create campaign")?;

        // Return the stored row, not the optimistic local value
        let created = self
            .repo
            .get_by_id(&campaign.id)
            .await
            .context("Failed to reload campaign")?
            .ok_or_else(|| anyhow::anyhow!("Campaign missing after create"))?;

        Ok(created)
    }

    /// Update a campaign's status
    ///
    /// Only the advertiser who created the campaign may change it.
    pub async fn update_status(
        &self,
        actor: &AuthContext,
        id: &str,
        status: CampaignStatus,
    ) -> Result<Campaign, CampaignServiceError> {
        if actor.role != UserRole::Advertiser {
            return Err(CampaignServiceError::Forbidden(
                "Only advertisers can update campaign status".to_string(),
            ));
        }

        let campaign = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to get campaign")?
            .ok_or_else(|| CampaignServiceError::NotFound(id.to_string()))?;

        if campaign.created_by != actor.user_id {
            return Err(CampaignServiceError::Forbidden(
                "You can only update your own campaigns".to_string(),
            ));
        }

        let updated = self
            .repo
            .update_status(id, status)
            .await
            .context("Failed to update campaign status")?;

        Ok(updated)
    }
}

/// Validate campaign creation input
fn validate_create_input(input: &CreateCampaignInput) -> Result<(), CampaignServiceError> {
    if input.title.trim().is_empty() {
        return Err(CampaignServiceError::ValidationError(
            "Title cannot be empty".to_string(),
        ));
    }
    if input.brand.trim().is_empty() {
        return Err(CampaignServiceError::ValidationError(
            "Brand cannot be empty".to_string(),
        ));
    }
    if input.description.trim().is_empty() {
        return Err(CampaignServiceError::ValidationError(
            "Description cannot be empty".to_string(),
        ));
    }
    if input.budget.trim().is_empty() {
        return Err(CampaignServiceError::ValidationError(
            "Budget cannot be empty".to_string(),
        ));
    }
    if input.deadline.trim().is_empty() {
        return Err(CampaignServiceError::ValidationError(
            "Deadline cannot be empty".to_string(),
        ));
    }
    Ok(())
}
