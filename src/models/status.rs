//! Review status lifecycle shared by applications and videos

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Review status for campaign applications and video submissions.
///
/// Both entity types move through the same two-stage lifecycle: the SP team
/// reviews first, then the advertiser. A rejection at either stage is
/// terminal, as is final approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Awaiting SP team review
    Pending,
    /// Passed SP review, awaiting advertiser
    SpApproved,
    /// Rejected by the SP team (terminal)
    SpRejected,
    /// Fully approved by the advertiser (terminal)
    AdvertiserApproved,
    /// Rejected by the advertiser (terminal)
    AdvertiserRejected,
}

impl ReviewStatus {
    /// Statuses reachable from this one.
    pub fn allowed_transitions(&self) -> &'static [ReviewStatus] {
        match self {
            Self::Pending => &[Self::SpApproved, Self::SpRejected],
            Self::SpApproved => &[Self::AdvertiserApproved, Self::AdvertiserRejected],
            Self::SpRejected | Self::AdvertiserApproved | Self::AdvertiserRejected => &[],
        }
    }

    /// Check whether a direct transition to `target` is allowed.
    pub fn can_transition_to(&self, target: ReviewStatus) -> bool {
        self.allowed_transitions().contains(&target)
    }

    /// A terminal status admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// The review stage that sets this status, if any.
    ///
    /// `Pending` is the initial state and belongs to no stage.
    pub fn stage(&self) -> Option<ReviewStage> {
        match self {
            Self::Pending => None,
            Self::SpApproved | Self::SpRejected => Some(ReviewStage::Sp),
            Self::AdvertiserApproved | Self::AdvertiserRejected => Some(ReviewStage::Advertiser),
        }
    }

    /// Human-readable status label shown on dashboards.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending SP Review",
            Self::SpApproved => "SP Approved - Pending Advertiser",
            Self::SpRejected => "SP Rejected",
            Self::AdvertiserApproved => "Approved - Ready for Video",
            Self::AdvertiserRejected => "Advertiser Rejected",
        }
    }

    /// Badge classes for the status chip.
    pub fn badge_color(&self) -> &'static str {
        match self {
            Self::Pending => "bg-yellow-100 text-yellow-800",
            Self::SpApproved => "bg-blue-100 text-blue-800",
            Self::SpRejected => "bg-red-100 text-red-800",
            Self::AdvertiserApproved => "bg-green-100 text-green-800",
            Self::AdvertiserRejected => "bg-red-100 text-red-800",
        }
    }

    /// Progress bar fill percentage. Terminal states always show 100.
    pub fn progress_percent(&self) -> u8 {
        match self {
            Self::Pending => 25,
            Self::SpApproved => 50,
            Self::SpRejected | Self::AdvertiserApproved | Self::AdvertiserRejected => 100,
        }
    }

    /// Current step out of four (submitted, SP review, advertiser review,
    /// complete). Terminal states land on the final step.
    pub fn step_index(&self) -> u8 {
        match self {
            Self::Pending => 1,
            Self::SpApproved => 2,
            Self::SpRejected | Self::AdvertiserApproved | Self::AdvertiserRejected => 4,
        }
    }
}

impl Default for ReviewStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::SpApproved => write!(f, "sp_approved"),
            Self::SpRejected => write!(f, "sp_rejected"),
            Self::AdvertiserApproved => write!(f, "advertiser_approved"),
            Self::AdvertiserRejected => write!(f, "advertiser_rejected"),
        }
    }
}

impl FromStr for ReviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "sp_approved" => Ok(Self::SpApproved),
            "sp_rejected" => Ok(Self::SpRejected),
            "advertiser_approved" => Ok(Self::AdvertiserApproved),
            "advertiser_rejected" => Ok(Self::AdvertiserRejected),
            _ => Err(format!("Invalid review status: {}", s)),
        }
    }
}

/// The two independent review stages.
///
/// Each stage owns one reviewer-attribution pair on the entity it reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStage {
    /// First-pass review by the SP team
    Sp,
    /// Final review by the campaign's advertiser
    Advertiser,
}

impl fmt::Display for ReviewStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sp => write!(f, "sp"),
            Self::Advertiser => write!(f, "advertiser"),
        }
    }
}

/// Campaign status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Completed,
}

impl CampaignStatus {
    /// Badge classes for the campaign status chip.
    pub fn badge_color(&self) -> &'static str {
        match self {
            Self::Active => "bg-green-100 text-green-800",
            Self::Draft => "bg-yellow-100 text-yellow-800",
            Self::Paused => "bg-orange-100 text-orange-800",
            Self::Completed => "bg-gray-100 text-gray-800",
        }
    }
}

impl Default for CampaignStatus {
    fn default() -> Self {
        Self::Draft
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Active => write!(f, "active"),
            Self::Paused => write!(f, "paused"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Invalid campaign status: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [ReviewStatus; 5] = [
        ReviewStatus::Pending,
        ReviewStatus::SpApproved,
        ReviewStatus::SpRejected,
        ReviewStatus::AdvertiserApproved,
        ReviewStatus::AdvertiserRejected,
    ];

    #[test]
    fn test_pending_transitions() {
        assert!(ReviewStatus::Pending.can_transition_to(ReviewStatus::SpApproved));
        assert!(ReviewStatus::Pending.can_transition_to(ReviewStatus::SpRejected));
        assert!(!ReviewStatus::Pending.can_transition_to(ReviewStatus::AdvertiserApproved));
        assert!(!ReviewStatus::Pending.can_transition_to(ReviewStatus::AdvertiserRejected));
        assert!(!ReviewStatus::Pending.can_transition_to(ReviewStatus::Pending));
    }

    #[test]
    fn test_sp_approved_transitions() {
        assert!(ReviewStatus::SpApproved.can_transition_to(ReviewStatus::AdvertiserApproved));
        assert!(ReviewStatus::SpApproved.can_transition_to(ReviewStatus::AdvertiserRejected));
        assert!(!ReviewStatus::SpApproved.can_transition_to(ReviewStatus::SpApproved));
        assert!(!ReviewStatus::SpApproved.can_transition_to(ReviewStatus::SpRejected));
        assert!(!ReviewStatus::SpApproved.can_transition_to(ReviewStatus::Pending));
    }

    #[test]
    fn test_terminal_states_admit_no_transitions() {
        for terminal in [
            ReviewStatus::SpRejected,
            ReviewStatus::AdvertiserApproved,
            ReviewStatus::AdvertiserRejected,
        ] {
            assert!(terminal.is_terminal());
            for target in ALL_STATUSES {
                assert!(
                    !terminal.can_transition_to(target),
                    "{} should not transition to {}",
                    terminal,
                    target
                );
            }
        }
    }

    #[test]
    fn test_non_terminal_states() {
        assert!(!ReviewStatus::Pending.is_terminal());
        assert!(!ReviewStatus::SpApproved.is_terminal());
    }

    #[test]
    fn test_stage_mapping() {
        assert_eq!(ReviewStatus::Pending.stage(), None);
        assert_eq!(ReviewStatus::SpApproved.stage(), Some(ReviewStage::Sp));
        assert_eq!(ReviewStatus::SpRejected.stage(), Some(ReviewStage::Sp));
        assert_eq!(
            ReviewStatus::AdvertiserApproved.stage(),
            Some(ReviewStage::Advertiser)
        );
        assert_eq!(
            ReviewStatus::AdvertiserRejected.stage(),
            Some(ReviewStage::Advertiser)
        );
    }

    #[test]
    fn test_display_from_str_round_trip() {
        for status in ALL_STATUSES {
            let parsed: ReviewStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!(ReviewStatus::from_str("approved").is_err());
        assert!(ReviewStatus::from_str("").is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(ReviewStatus::Pending.label(), "Pending SP Review");
        assert_eq!(
            ReviewStatus::SpApproved.label(),
            "SP Approved - Pending Advertiser"
        );
        assert_eq!(ReviewStatus::SpRejected.label(), "SP Rejected");
        assert_eq!(
            ReviewStatus::AdvertiserApproved.label(),
            "Approved - Ready for Video"
        );
        assert_eq!(ReviewStatus::AdvertiserRejected.label(), "Advertiser Rejected");
    }

    #[test]
    fn test_progress_values() {
        assert_eq!(ReviewStatus::Pending.progress_percent(), 25);
        assert_eq!(ReviewStatus::SpApproved.progress_percent(), 50);
        assert_eq!(ReviewStatus::SpRejected.progress_percent(), 100);
        assert_eq!(ReviewStatus::AdvertiserApproved.progress_percent(), 100);
        assert_eq!(ReviewStatus::AdvertiserRejected.progress_percent(), 100);

        assert_eq!(ReviewStatus::Pending.step_index(), 1);
        assert_eq!(ReviewStatus::SpApproved.step_index(), 2);
        assert_eq!(ReviewStatus::AdvertiserApproved.step_index(), 4);
    }

    #[test]
    fn test_rejected_statuses_share_badge_color() {
        assert_eq!(
            ReviewStatus::SpRejected.badge_color(),
            ReviewStatus::AdvertiserRejected.badge_color()
        );
        assert_eq!(ReviewStatus::Pending.badge_color(), "bg-yellow-100 text-yellow-800");
    }

    #[test]
    fn test_review_status_serde() {
        assert_eq!(
            serde_json::to_string(&ReviewStatus::SpApproved).unwrap(),
            "\"sp_approved\""
        );
        let status: ReviewStatus = serde_json::from_str("\"advertiser_rejected\"").unwrap();
        assert_eq!(status, ReviewStatus::AdvertiserRejected);
    }

    #[test]
    fn test_campaign_status_round_trip() {
        for status in [
            CampaignStatus::Draft,
            CampaignStatus::Active,
            CampaignStatus::Paused,
            CampaignStatus::Completed,
        ] {
            let parsed: CampaignStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!(CampaignStatus::from_str("archived").is_err());
    }

    #[test]
    fn test_campaign_status_default() {
        assert_eq!(CampaignStatus::default(), CampaignStatus::Draft);
    }

    #[test]
    fn test_campaign_badge_colors() {
        assert_eq!(
            CampaignStatus::Active.badge_color(),
            "bg-green-100 text-green-800"
        );
        assert_eq!(
            CampaignStatus::Paused.badge_color(),
            "bg-orange-100 text-orange-800"
        );
    }
}
