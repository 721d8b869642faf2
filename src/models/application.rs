//! Campaign application model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::{ReviewStage, ReviewStatus};

/// Application from a publisher to endorse a campaign.
///
/// Carries one reviewer-attribution pair per review stage. A stage's pair
/// is set exactly when that stage's status transition happens and is never
/// written by the other stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignApplication {
    /// Unique identifier (UUID)
    pub id: String,
    /// Campaign applied to
    pub campaign_id: String,
    /// Applying publisher's user ID
    pub publisher_id: String,
    /// Review status
    pub status: ReviewStatus,
    /// Free-text pitch assembled from the application form
    pub message: Option<String>,
    /// SP-stage reviewer
    pub sp_reviewed_by: Option<String>,
    /// SP-stage review timestamp
    pub sp_reviewed_at: Option<DateTime<Utc>>,
    /// Advertiser-stage reviewer
    pub advertiser_reviewed_by: Option<String>,
    /// Advertiser-stage review timestamp
    pub advertiser_reviewed_at: Option<DateTime<Utc>>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl CampaignApplication {
    /// Create a new pending application.
    pub fn new(campaign_id: String, publisher_id: String, message: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            campaign_id,
            publisher_id,
            status: ReviewStatus::Pending,
            message,
            sp_reviewed_by: None,
            sp_reviewed_at: None,
            advertiser_reviewed_by: None,
            advertiser_reviewed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the given stage's reviewer-attribution pair is populated.
    pub fn stage_reviewed(&self, stage: ReviewStage) -> bool {
        match stage {
            ReviewStage::Sp => self.sp_reviewed_by.is_some() && self.sp_reviewed_at.is_some(),
            ReviewStage::Advertiser => {
                self.advertiser_reviewed_by.is_some() && self.advertiser_reviewed_at.is_some()
            }
        }
    }

    /// Whether a video may be submitted against this application.
    pub fn accepts_videos(&self) -> bool {
        self.status == ReviewStatus::AdvertiserApproved
    }
}

/// Application joined with campaign and publisher display fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationWithMeta {
    pub id: String,
    pub campaign_id: String,
    pub publisher_id: String,
    pub status: ReviewStatus,
    pub message: Option<String>,
    pub sp_reviewed_by: Option<String>,
    pub sp_reviewed_at: Option<DateTime<Utc>>,
    pub advertiser_reviewed_by: Option<String>,
    pub advertiser_reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub campaign_title: String,
    pub campaign_brand: String,
    pub publisher_name: String,
    pub publisher_email: String,
}

/// Input for creating an application from the publisher's form
#[derive(Debug, Clone, Deserialize)]
pub struct CreateApplicationInput {
    pub campaign_id: String,
    pub experience: String,
    pub audience: String,
    pub video_ideas: String,
}

impl CreateApplicationInput {
    /// Concatenate the form sections into the stored message payload.
    pub fn assemble_message(&self) -> String {
        format!(
            "Experience: {}\n\nAudience: {}\n\nVideo Ideas: {}",
            self.experience, self.audience, self.video_ideas
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_application_is_pending() {
        let app = CampaignApplication::new(
            "campaign-1".to_string(),
            "publisher-1".to_string(),
            Some("pitch".to_string()),
        );
        assert_eq!(app.status, ReviewStatus::Pending);
        assert!(!app.stage_reviewed(ReviewStage::Sp));
        assert!(!app.stage_reviewed(ReviewStage::Advertiser));
        assert!(!app.accepts_videos());
    }

    #[test]
    fn test_stage_reviewed_requires_both_fields() {
        let mut app = CampaignApplication::new(
            "campaign-1".to_string(),
            "publisher-1".to_string(),
            None,
        );
        app.sp_reviewed_by = Some("sp-1".to_string());
        assert!(!app.stage_reviewed(ReviewStage::Sp));
        app.sp_reviewed_at = Some(Utc::now());
        assert!(app.stage_reviewed(ReviewStage::Sp));
        assert!(!app.stage_reviewed(ReviewStage::Advertiser));
    }

    #[test]
    fn test_accepts_videos_only_when_fully_approved() {
        let mut app = CampaignApplication::new(
            "campaign-1".to_string(),
            "publisher-1".to_string(),
            None,
        );
        for status in [
            ReviewStatus::Pending,
            ReviewStatus::SpApproved,
            ReviewStatus::SpRejected,
            ReviewStatus::AdvertiserRejected,
        ] {
            app.status = status;
            assert!(!app.accepts_videos());
        }
        app.status = ReviewStatus::AdvertiserApproved;
        assert!(app.accepts_videos());
    }

    #[test]
    fn test_assemble_message() {
        let input = CreateApplicationInput {
            campaign_id: "campaign-1".to_string(),
            experience: "5 years of tech reviews".to_string(),
            audience: "200k developers".to_string(),
            video_ideas: "Hands-on benchmark".to_string(),
        };
        assert_eq!(
            input.assemble_message(),
            "Experience: 5 years of tech reviews\n\nAudience: 200k developers\n\nVideo Ideas: Hands-on benchmark"
        );
    }
}
