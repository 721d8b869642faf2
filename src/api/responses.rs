//! Shared API response types
//!
//! Response structures used across multiple API endpoints. Status fields
//! are rendered once here through the status presentation helpers, so
//! every endpoint reports the same labels, colors and progress values.

use serde::{Deserialize, Serialize};

use crate::models::{ApplicationWithMeta, Campaign, Notification, User, VideoWithMeta};

// ============================================================================
// User Response Types
// ============================================================================

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub role: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            avatar_url: user.avatar_url,
            role: user.role.to_string(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Campaign Response Types
// ============================================================================

/// Campaign response with presentation fields
#[derive(Debug, Serialize, Deserialize)]
pub struct CampaignResponse {
    pub id: String,
    pub title: String,
    pub brand: String,
    pub description: String,
    pub budget: String,
    pub deadline: String,
    pub requirements: Vec<String>,
    pub status: String,
    pub status_color: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Campaign> for CampaignResponse {
    fn from(campaign: Campaign) -> Self {
        Self {
            id: campaign.id,
            title: campaign.title,
            brand: campaign.brand,
            description: campaign.description,
            budget: campaign.budget,
            deadline: campaign.deadline,
            requirements: campaign.requirements,
            status: campaign.status.to_string(),
            status_color: campaign.status.badge_color().to_string(),
            created_by: campaign.created_by,
            created_at: campaign.created_at.to_rfc3339(),
            updated_at: campaign.updated_at.to_rfc3339(),
        }
    }
}

/// Campaign info embedded in application and video responses
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CampaignInfo {
    pub title: String,
    pub brand: String,
}

/// Publisher info embedded in application and video responses
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PublisherInfo {
    pub full_name: String,
    pub email: String,
}

// ============================================================================
// Application Response Types
// ============================================================================

/// Application response with campaign/publisher metadata and the
/// dashboard presentation fields
#[derive(Debug, Serialize, Deserialize)]
pub struct ApplicationResponse {
    pub id: String,
    pub campaign_id: String,
    pub publisher_id: String,
    pub status: String,
    pub status_label: String,
    pub status_color: String,
    pub progress_percent: u8,
    pub step_index: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp_reviewed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp_reviewed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertiser_reviewed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertiser_reviewed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub campaign: CampaignInfo,
    pub publisher: PublisherInfo,
}

impl From<ApplicationWithMeta> for ApplicationResponse {
    fn from(application: ApplicationWithMeta) -> Self {
        Self {
            id: application.id,
            campaign_id: application.campaign_id,
            publisher_id: application.publisher_id,
            status: application.status.to_string(),
            status_label: application.status.label().to_string(),
            status_color: application.status.badge_color().to_string(),
            progress_percent: application.status.progress_percent(),
            step_index: application.status.step_index(),
            message: application.message,
            sp_reviewed_by: application.sp_reviewed_by,
            sp_reviewed_at: application.sp_reviewed_at.map(|dt| dt.to_rfc3339()),
            advertiser_reviewed_by: application.advertiser_reviewed_by,
            advertiser_reviewed_at: application.advertiser_reviewed_at.map(|dt| dt.to_rfc3339()),
            created_at: application.created_at.to_rfc3339(),
            updated_at: application.updated_at.to_rfc3339(),
            campaign: CampaignInfo {
                title: application.campaign_title,
                brand: application.campaign_brand,
            },
            publisher: PublisherInfo {
                full_name: application.publisher_name,
                email: application.publisher_email,
            },
        }
    }
}

// ============================================================================
// Video Response Types
// ============================================================================

/// Video response with campaign/publisher metadata and the dashboard
/// presentation fields
#[derive(Debug, Serialize, Deserialize)]
pub struct VideoResponse {
    pub id: String,
    pub application_id: String,
    pub title: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: String,
    pub status_label: String,
    pub status_color: String,
    pub progress_percent: u8,
    pub step_index: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp_reviewed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp_reviewed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertiser_reviewed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertiser_reviewed_at: Option<String>,
    pub uploaded_at: String,
    pub campaign: CampaignInfo,
    pub publisher: PublisherInfo,
}

impl From<VideoWithMeta> for VideoResponse {
    fn from(video: VideoWithMeta) -> Self {
        Self {
            id: video.id,
            application_id: video.application_id,
            title: video.title,
            url: video.url,
            description: video.description,
            status: video.status.to_string(),
            status_label: video.status.label().to_string(),
            status_color: video.status.badge_color().to_string(),
            progress_percent: video.status.progress_percent(),
            step_index: video.status.step_index(),
            sp_reviewed_by: video.sp_reviewed_by,
            sp_reviewed_at: video.sp_reviewed_at.map(|dt| dt.to_rfc3339()),
            advertiser_reviewed_by: video.advertiser_reviewed_by,
            advertiser_reviewed_at: video.advertiser_reviewed_at.map(|dt| dt.to_rfc3339()),
            uploaded_at: video.uploaded_at.to_rfc3339(),
            campaign: CampaignInfo {
                title: video.campaign_title,
                brand: video.campaign_brand,
            },
            publisher: PublisherInfo {
                full_name: video.publisher_name,
                email: video.publisher_email,
            },
        }
    }
}

// ============================================================================
// Notification Response Types
// ============================================================================

/// Notification response
#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_type: Option<String>,
    pub read: bool,
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            user_id: notification.user_id,
            notification_type: notification.notification_type.to_string(),
            title: notification.title,
            message: notification.message,
            related_id: notification.related_id,
            related_type: notification.related_type,
            read: notification.read,
            created_at: notification.created_at.to_rfc3339(),
        }
    }
}
