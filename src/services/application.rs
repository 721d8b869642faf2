//! Campaign application service
//!
//! Implements the publisher side of the endorsement workflow:
//! - Role-filtered listing (publishers see their own applications,
//!   advertisers see applications to their campaigns, SP team sees all)
//! - Application creation against active campaigns, with a duplicate
//!   guard and the three-section pitch message
//! - The two-stage review: SP team first, then the owning advertiser,
//!   with per-stage reviewer attribution and publisher notifications
//!
//! Every operation takes the caller's [`AuthContext`] explicitly; there
//! is no ambient current-user state.

use crate::db::repositories::{ApplicationRepository, CampaignRepository};
use crate::models::{
    ApplicationWithMeta, AuthContext, CampaignApplication, CreateApplicationInput, ReviewStage,
    ReviewStatus, UserRole,
};
use crate::services::NotificationService;
use anyhow::Context;
use std::sync::Arc;

/// Error types shared by the application and video review workflows
#[derive(Debug, thiserror::Error)]
pub enum WorkflowServiceError {
    /// Entity missing, or not visible to the caller
    #[error("{0} not found")]
    NotFound(String),

    /// Caller's role or ownership does not permit the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Validation error (invalid input or disallowed transition)
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Campaign application service
pub struct ApplicationService {
    repo: Arc<dyn ApplicationRepository>,
    campaign_repo: Arc<dyn CampaignRepository>,
    notifications: Arc<NotificationService>,
}

impl ApplicationService {
    /// Create a new application service
    pub fn new(
        repo: Arc<dyn ApplicationRepository>,
        campaign_repo: Arc<dyn CampaignRepository>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            repo,
            campaign_repo,
            notifications,
        }
    }

    /// List applications visible to the caller, newest first
    pub async fn list(
        &self,
        actor: &AuthContext,
    ) -> Result<Vec<ApplicationWithMeta>, WorkflowServiceError> {
        let applications = match actor.role {
            UserRole::Publisher => self.repo.list_by_publisher(&actor.user_id).await,
            UserRole::Advertiser => self.repo.list_by_campaign_owner(&actor.user_id).await,
            UserRole::SpTeam => self.repo.list_all().await,
        }
        .context("Failed to list applications")?;

        Ok(applications)
    }

    /// Create an application from the publisher's form.
    ///
    /// The campaign must exist and be `active`, and the caller must not
    /// already have an open application for it. The three form sections
    /// are concatenated into the stored pitch message.
    pub async fn create(
        &self,
        actor: &AuthContext,
        input: CreateApplicationInput,
    ) -> Result<ApplicationWithMeta, WorkflowServiceError> {
        if actor.role != UserRole::Publisher {
            return Err(WorkflowServiceError::Forbidden(
                "Only publishers can apply to campaigns".to_string(),
            ));
        }

        validate_application_input(&input)?;

        let campaign = self
            .campaign_repo
            .get_by_id(&input.campaign_id)
            .await
            .context("Failed to load campaign")?
            .ok_or_else(|| {
                WorkflowServiceError::NotFound(format!("Campaign {}", input.campaign_id))
            })?;

        if !campaign.accepts_applications() {
            return Err(WorkflowServiceError::ValidationError(
                "This campaign is not accepting applications".to_string(),
            ));
        }

        let has_open = self
            .repo
            .has_open_application(&campaign.id, &actor.user_id)
            .await
            .context("Failed to check for existing application")?;
        if has_open {
            return Err(WorkflowServiceError::ValidationError(
                "You have already applied to this campaign".to_string(),
            ));
        }

        let application = CampaignApplication::new(
            campaign.id.clone(),
            actor.user_id.clone(),
            Some(input.assemble_message()),
        );
        let created = self
            .repo
            .create(&application)
            .await
            .context("Failed to create application")?;

        self.repo
            .get_with_meta(&created.id)
            .await
            .context("Failed to reload application")?
            .ok_or_else(|| {
                WorkflowServiceError::InternalError(anyhow::anyhow!(
                    "Application {} missing after create",
                    created.id
                ))
            })
    }

    /// Apply a review decision to an application.
    ///
    /// The target status determines the stage: SP statuses require an SP
    /// team caller, advertiser statuses require the advertiser who owns
    /// the campaign. The transition must follow the review lifecycle. On
    /// success the stage's attribution pair is stamped, the owning
    /// publisher is notified, and the refreshed row is returned.
    pub async fn update_status(
        &self,
        actor: &AuthContext,
        id: &str,
        status: ReviewStatus,
        reason: Option<String>,
    ) -> Result<ApplicationWithMeta, WorkflowServiceError> {
        let stage = status.stage().ok_or_else(|| {
            WorkflowServiceError::ValidationError(
                "Applications cannot be moved back to pending".to_string(),
            )
        })?;

        match stage {
            ReviewStage::Sp => {
                if actor.role != UserRole::SpTeam {
                    return Err(WorkflowServiceError::Forbidden(
                        "Only the SP team can perform SP review".to_string(),
                    ));
                }
            }
            ReviewStage::Advertiser => {
                if actor.role != UserRole::Advertiser {
                    return Err(WorkflowServiceError::Forbidden(
                        "Only the advertiser can perform advertiser review".to_string(),
                    ));
                }
            }
        }

        let application = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to load application")?
            .ok_or_else(|| WorkflowServiceError::NotFound(format!("Application {}", id)))?;

        let campaign = self
            .campaign_repo
            .get_by_id(&application.campaign_id)
            .await
            .context("Failed to load campaign")?
            .ok_or_else(|| {
                WorkflowServiceError::InternalError(anyhow::anyhow!(
                    "Campaign {} missing for application {}",
                    application.campaign_id,
                    application.id
                ))
            })?;

        if stage == ReviewStage::Advertiser && campaign.created_by != actor.user_id {
            return Err(WorkflowServiceError::Forbidden(
                "You can only review applications for your own campaigns".to_string(),
            ));
        }

        if !application.status.can_transition_to(status) {
            return Err(WorkflowServiceError::ValidationError(format!(
                "Cannot change status from {} to {}",
                application.status, status
            )));
        }

        let updated = self
            .repo
            .update_status(id, status, &actor.user_id)
            .await
            .context("Failed to update application status")?;

        // Side channel: a notification failure must not undo the review
        if let Err(e) = self
            .notifications
            .notify_application_status(
                &updated.publisher_id,
                &updated.id,
                &campaign.title,
                status,
                reason.as_deref(),
            )
            .await
        {
            tracing::warn!(
                "Failed to write notification for application {}: {}",
                updated.id,
                e
            );
        }

        self.repo
            .get_with_meta(&updated.id)
            .await
            .context("Failed to reload application")?
            .ok_or_else(|| {
                WorkflowServiceError::InternalError(anyhow::anyhow!(
                    "Application {} missing after update",
                    updated.id
                ))
            })
    }
}

fn validate_application_input(input: &CreateApplicationInput) -> Result<(), WorkflowServiceError> {
    if input.experience.trim().is_empty() {
        return Err(WorkflowServiceError::ValidationError(
            "Experience is required".to_string(),
        ));
    }
    if input.audience.trim().is_empty() {
        return Err(WorkflowServiceError::ValidationError(
            "Audience is required".to_string(),
        ));
    }
    if input.video_ideas.trim().is_empty() {
        return Err(WorkflowServiceError::ValidationError(
            "Video ideas are required".to_string(),
        ));
    }
    Ok(())
}
