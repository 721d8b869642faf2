//! Notification model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Notification severity tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Info,
    Success,
    Warning,
    Error,
}

impl Default for NotificationType {
    fn default() -> Self {
        Self::Info
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Success => write!(f, "success"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "success" => Ok(Self::Success),
            "warning" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            _ => Err(format!("Invalid notification type: {}", s)),
        }
    }
}

/// Notification addressed to one user.
///
/// Created as a side effect of review decisions, on an independent
/// lifecycle from the entity that triggered it. Rejection feedback reaches
/// the owner only through this channel, linked via `related_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Unique identifier (UUID)
    pub id: String,
    /// Recipient user ID
    pub user_id: String,
    /// Severity tag
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    /// Short title
    pub title: String,
    /// Message body
    pub message: String,
    /// Related entity ID, if any
    pub related_id: Option<String>,
    /// Related entity kind ("application" or "video")
    pub related_type: Option<String>,
    /// Read flag
    pub read: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create a new unread notification.
    pub fn new(
        user_id: String,
        notification_type: NotificationType,
        title: String,
        message: String,
        related_id: Option<String>,
        related_type: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            notification_type,
            title,
            message,
            related_id,
            related_type,
            read: false,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_notification_is_unread() {
        let n = Notification::new(
            "user-1".to_string(),
            NotificationType::Success,
            "Application Approved".to_string(),
            "Your application passed SP review.".to_string(),
            Some("app-1".to_string()),
            Some("application".to_string()),
        );
        assert!(!n.read);
        assert!(!n.id.is_empty());
        assert_eq!(n.notification_type, NotificationType::Success);
    }

    #[test]
    fn test_type_serialized_as_type() {
        let n = Notification::new(
            "user-1".to_string(),
            NotificationType::Error,
            "Application Rejected".to_string(),
            "Feedback attached.".to_string(),
            None,
            None,
        );
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["type"], "error");
        assert!(json.get("notification_type").is_none());
    }

    #[test]
    fn test_notification_type_round_trip() {
        for t in [
            NotificationType::Info,
            NotificationType::Success,
            NotificationType::Warning,
            NotificationType::Error,
        ] {
            let parsed: NotificationType = t.to_string().parse().unwrap();
            assert_eq!(parsed, t);
        }
        assert!(NotificationType::from_str("fatal").is_err());
    }
}
