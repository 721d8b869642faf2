//! Login session model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A server-side login session, keyed by the bearer token handed to the
/// client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token (UUID v4)
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
    /// When the token was issued
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Issue a fresh session for a user, valid for `ttl_days` days
    pub fn issue(user_id: impl Into<String>, ttl_days: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            expires_at: now + Duration::days(ttl_days),
            created_at: now,
        }
    }

    /// True once the expiry timestamp has passed
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_sets_owner_and_expiry() {
        let session = Session::issue("user-1", 7);

        assert_eq!(session.user_id, "user-1");
        assert!(!session.id.is_empty());
        assert!(!session.is_expired());
    }

    #[test]
    fn test_issue_generates_distinct_tokens() {
        let a = Session::issue("user-1", 7);
        let b = Session::issue("user-1", 7);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_negative_ttl_is_already_expired() {
        let session = Session::issue("user-1", -1);
        assert!(session.is_expired());
    }
}
