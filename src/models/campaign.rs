//! Campaign model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::CampaignStatus;

/// Campaign entity created and owned by an advertiser.
///
/// Budget and deadline are free-text by contract; requirements is a list
/// of free-text tags. Campaigns are never hard-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    /// Unique identifier (UUID)
    pub id: String,
    /// Campaign title
    pub title: String,
    /// Brand name
    pub brand: String,
    /// Campaign description
    pub description: String,
    /// Budget range (free text)
    pub budget: String,
    /// Deadline (date string)
    pub deadline: String,
    /// Requirement tags
    pub requirements: Vec<String>,
    /// Campaign status
    pub status: CampaignStatus,
    /// Owning advertiser's user ID
    pub created_by: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Create a new Campaign owned by the given advertiser.
    ///
    /// New campaigns go live immediately with status `Active`.
    pub fn new(input: CreateCampaignInput, created_by: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            brand: input.brand,
            description: input.description,
            budget: input.budget,
            deadline: input.deadline,
            requirements: input.requirements,
            status: CampaignStatus::Active,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Publishers may only apply to active campaigns.
    pub fn accepts_applications(&self) -> bool {
        self.status == CampaignStatus::Active
    }
}

/// Input for creating a campaign
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaignInput {
    pub title: String,
    pub brand: String,
    pub description: String,
    pub budget: String,
    pub deadline: String,
    #[serde(default)]
    pub requirements: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> CreateCampaignInput {
        CreateCampaignInput {
            title: "Summer Launch".to_string(),
            brand: "Acme".to_string(),
            description: "Product launch push".to_string(),
            budget: "$500-$1000".to_string(),
            deadline: "2025-08-01".to_string(),
            requirements: vec!["10k+ subscribers".to_string(), "tech niche".to_string()],
        }
    }

    #[test]
    fn test_new_campaign_is_active() {
        let campaign = Campaign::new(sample_input(), "advertiser-1".to_string());
        assert_eq!(campaign.status, CampaignStatus::Active);
        assert_eq!(campaign.created_by, "advertiser-1");
        assert!(!campaign.id.is_empty());
        assert!(campaign.accepts_applications());
    }

    #[test]
    fn test_non_active_campaign_rejects_applications() {
        let mut campaign = Campaign::new(sample_input(), "advertiser-1".to_string());
        for status in [
            CampaignStatus::Draft,
            CampaignStatus::Paused,
            CampaignStatus::Completed,
        ] {
            campaign.status = status;
            assert!(!campaign.accepts_applications());
        }
    }

    #[test]
    fn test_requirements_default_empty() {
        let input: CreateCampaignInput = serde_json::from_str(
            r#"{"title":"T","brand":"B","description":"D","budget":"$0","deadline":"2025-01-01"}"#,
        )
        .unwrap();
        assert!(input.requirements.is_empty());
    }
}
