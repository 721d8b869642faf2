//! Video submission service
//!
//! Videos close out the endorsement workflow: a publisher submits one
//! against their fully approved application, it passes the same
//! two-stage review as the application did, and once fully approved the
//! publisher gets a deep link to the external upload page.
//!
//! Shares [`WorkflowServiceError`] with the application service; every
//! operation takes the caller's [`AuthContext`] explicitly.

use crate::db::repositories::{ApplicationRepository, CampaignRepository, VideoRepository};
use crate::models::{
    AuthContext, Campaign, CampaignApplication, CreateVideoInput, ReviewStage, ReviewStatus,
    UserRole, VideoSubmission, VideoWithMeta,
};
use crate::services::application::WorkflowServiceError;
use crate::services::NotificationService;
use anyhow::Context;
use std::sync::Arc;

/// Video submission service
pub struct VideoService {
    repo: Arc<dyn VideoRepository>,
    application_repo: Arc<dyn ApplicationRepository>,
    campaign_repo: Arc<dyn CampaignRepository>,
    notifications: Arc<NotificationService>,
}

impl VideoService {
    /// Create a new video service
    pub fn new(
        repo: Arc<dyn VideoRepository>,
        application_repo: Arc<dyn ApplicationRepository>,
        campaign_repo: Arc<dyn CampaignRepository>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            repo,
            application_repo,
            campaign_repo,
            notifications,
        }
    }

    /// List videos visible to the caller, newest upload first
    pub async fn list(
        &self,
        actor: &AuthContext,
    ) -> Result<Vec<VideoWithMeta>, WorkflowServiceError> {
        let videos = match actor.role {
            UserRole::Publisher => self.repo.list_by_publisher(&actor.user_id).await,
            UserRole::Advertiser => self.repo.list_by_campaign_owner(&actor.user_id).await,
            UserRole::SpTeam => self.repo.list_all().await,
        }
        .context("Failed to list videos")?;

        Ok(videos)
    }

    /// Submit a video against one of the caller's applications.
    ///
    /// The application must belong to the caller and be
    /// `advertiser_approved`; anything else is rejected here, not in
    /// the client.
    pub async fn create(
        &self,
        actor: &AuthContext,
        input: CreateVideoInput,
    ) -> Result<VideoWithMeta, WorkflowServiceError> {
        if actor.role != UserRole::Publisher {
            return Err(WorkflowServiceError::Forbidden(
                "Only publishers can submit videos".to_string(),
            ));
        }

        validate_video_input(&input)?;

        let application = self
            .application_repo
            .get_by_id(&input.application_id)
            .await
            .context("Failed to load application")?
            .ok_or_else(|| {
                WorkflowServiceError::NotFound(format!("Application {}", input.application_id))
            })?;

        if application.publisher_id != actor.user_id {
            return Err(WorkflowServiceError::Forbidden(
                "You can only submit videos for your own applications".to_string(),
            ));
        }

        if !application.accepts_videos() {
            return Err(WorkflowServiceError::ValidationError(
                "Videos can only be submitted for fully approved applications".to_string(),
            ));
        }

        let video = VideoSubmission::new(input);
        let created = self
            .repo
            .create(&video)
            .await
            .context("Failed to create video")?;

        self.repo
            .get_with_meta(&created.id)
            .await
            .context("Failed to reload video")?
            .ok_or_else(|| {
                WorkflowServiceError::InternalError(anyhow::anyhow!(
                    "Video {} missing after create",
                    created.id
                ))
            })
    }

    /// Apply a review decision to a video.
    ///
    /// Same stage gating as application review: SP statuses require an
    /// SP team caller, advertiser statuses require the advertiser who
    /// owns the campaign the video rolls up to.
    pub async fn update_status(
        &self,
        actor: &AuthContext,
        id: &str,
        status: ReviewStatus,
        reason: Option<String>,
    ) -> Result<VideoWithMeta, WorkflowServiceError> {
        let stage = status.stage().ok_or_else(|| {
            WorkflowServiceError::ValidationError(
                "Videos cannot be moved back to pending".to_string(),
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

        let video = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to load video")?
            .ok_or_else(|| WorkflowServiceError::NotFound(format!("Video {}", id)))?;

        let (application, campaign) = self.load_lineage(&video).await?;

        if stage == ReviewStage::Advertiser && campaign.created_by != actor.user_id {
            return Err(WorkflowServiceError::Forbidden(
                "You can only review videos for your own campaigns".to_string(),
            ));
        }

        if !video.status.can_transition_to(status) {
            return Err(WorkflowServiceError::ValidationError(format!(
                "Cannot change status from {} to {}",
                video.status, status
            )));
        }

        let updated = self
            .repo
            .update_status(id, status, &actor.user_id)
            .await
            .context("Failed to update video status")?;

        // Side channel: a notification failure must not undo the review
        if let Err(e) = self
            .notifications
            .notify_video_status(
                &application.publisher_id,
                &updated.id,
                &campaign.title,
                status,
                reason.as_deref(),
            )
            .await
        {
            tracing::warn!("Failed to write notification for video {}: {}", updated.id, e);
        }

        self.repo
            .get_with_meta(&updated.id)
            .await
            .context("Failed to reload video")?
            .ok_or_else(|| {
                WorkflowServiceError::InternalError(anyhow::anyhow!(
                    "Video {} missing after update",
                    updated.id
                ))
            })
    }

    /// Deep link to the external platform's upload page for a fully
    /// approved video. Only the submitting publisher gets the link.
    pub async fn publish_link(
        &self,
        actor: &AuthContext,
        id: &str,
    ) -> Result<String, WorkflowServiceError> {
        let video = self
            .repo
            .get_by_id(id)
            .await
            .context("Failed to load video")?
            .ok_or_else(|| WorkflowServiceError::NotFound(format!("Video {}", id)))?;

        let (application, _campaign) = self.load_lineage(&video).await?;
        if actor.role != UserRole::Publisher || application.publisher_id != actor.user_id {
            return Err(WorkflowServiceError::Forbidden(
                "Only the submitting publisher can publish this video".to_string(),
            ));
        }

        video.publish_url().ok_or_else(|| {
            WorkflowServiceError::ValidationError(
                "Only fully approved videos can be published".to_string(),
            )
        })
    }

    /// Resolve the application and campaign a video rolls up to.
    ///
    /// Both rows are guaranteed by foreign keys, so a miss here is an
    /// internal error rather than a not-found.
    async fn load_lineage(
        &self,
        video: &VideoSubmission,
    ) -> Result<(CampaignApplication, Campaign), WorkflowServiceError> {
        let application = self
            .application_repo
            .get_by_id(&video.application_id)
            .await
            .context("Failed to load application")?
            .ok_or_else(|| {
                WorkflowServiceError::InternalError(anyhow::anyhow!(
                    "Application {} missing for video {}",
                    video.application_id,
                    video.id
                ))
            })?;

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

        Ok((application, campaign))
    }
}

fn validate_video_input(input: &CreateVideoInput) -> Result<(), WorkflowServiceError> {
    if input.title.trim().is_empty() {
        return Err(WorkflowServiceError::ValidationError(
            "Title is required".to_string(),
        ));
    }
    if input.url.trim().is_empty() {
        return Err(WorkflowServiceError::ValidationError(
            "Video URL is required".to_string(),
        ));
    }
    Ok(())
}
