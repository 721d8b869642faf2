//! Video submission model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::{ReviewStage, ReviewStatus};

/// Video submitted by a publisher against a fully approved application.
///
/// Shares the application's two-stage review lifecycle and reviewer
/// attribution shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoSubmission {
    /// Unique identifier (UUID)
    pub id: String,
    /// Application the video fulfills
    pub application_id: String,
    /// Video title
    pub title: String,
    /// External video URL
    pub url: String,
    /// Optional description
    pub description: Option<String>,
    /// Review status
    pub status: ReviewStatus,
    /// SP-stage reviewer
    pub sp_reviewed_by: Option<String>,
    /// SP-stage review timestamp
    pub sp_reviewed_at: Option<DateTime<Utc>>,
    /// Advertiser-stage reviewer
    pub advertiser_reviewed_by: Option<String>,
    /// Advertiser-stage review timestamp
    pub advertiser_reviewed_at: Option<DateTime<Utc>>,
    /// Upload timestamp
    pub uploaded_at: DateTime<Utc>,
}

impl VideoSubmission {
    /// Create a new pending video submission.
    pub fn new(input: CreateVideoInput) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            application_id: input.application_id,
            title: input.title,
            url: input.url,
            description: input.description,
            status: ReviewStatus::Pending,
            sp_reviewed_by: None,
            sp_reviewed_at: None,
            advertiser_reviewed_by: None,
            advertiser_reviewed_at: None,
            uploaded_at: Utc::now(),
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

    /// Deep link to the external platform's upload page.
    ///
    /// Only fully approved videos expose the publish action.
    pub fn publish_url(&self) -> Option<String> {
        if self.status != ReviewStatus::AdvertiserApproved {
            return None;
        }
        Some(format!(
            "https://www.youtube.com/upload?video_url={}",
            urlencoding::encode(&self.url)
        ))
    }
}

/// Video joined with campaign and publisher display fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoWithMeta {
    pub id: String,
    pub application_id: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub status: ReviewStatus,
    pub sp_reviewed_by: Option<String>,
    pub sp_reviewed_at: Option<DateTime<Utc>>,
    pub advertiser_reviewed_by: Option<String>,
    pub advertiser_reviewed_at: Option<DateTime<Utc>>,
    pub uploaded_at: DateTime<Utc>,
    pub campaign_title: String,
    pub campaign_brand: String,
    pub publisher_name: String,
    pub publisher_email: String,
}

/// Input for submitting a video
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVideoInput {
    pub application_id: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_video() -> VideoSubmission {
        VideoSubmission::new(CreateVideoInput {
            application_id: "app-1".to_string(),
            title: "Unboxing".to_string(),
            url: "https://cdn.example.com/v/42?s=a b".to_string(),
            description: None,
        })
    }

    #[test]
    fn test_new_video_is_pending() {
        let video = sample_video();
        assert_eq!(video.status, ReviewStatus::Pending);
        assert!(!video.stage_reviewed(ReviewStage::Sp));
        assert!(!video.stage_reviewed(ReviewStage::Advertiser));
    }

    #[test]
    fn test_publish_url_requires_full_approval() {
        let mut video = sample_video();
        for status in [
            ReviewStatus::Pending,
            ReviewStatus::SpApproved,
            ReviewStatus::SpRejected,
            ReviewStatus::AdvertiserRejected,
        ] {
            video.status = status;
            assert_eq!(video.publish_url(), None);
        }
        video.status = ReviewStatus::AdvertiserApproved;
        let url = video.publish_url().unwrap();
        assert!(url.starts_with("https://www.youtube.com/upload?video_url="));
    }

    #[test]
    fn test_publish_url_percent_encodes() {
        let mut video = sample_video();
        video.status = ReviewStatus::AdvertiserApproved;
        let url = video.publish_url().unwrap();
        assert_eq!(
            url,
            "https://www.youtube.com/upload?video_url=https%3A%2F%2Fcdn.example.com%2Fv%2F42%3Fs%3Da%20b"
        );
    }
}
