//! User model
//!
//! Defines the User entity and the role set that drives dashboard selection
//! and list scoping throughout the system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// User entity representing a registered account.
///
/// Every user has exactly one role (publisher, SP team, advertiser) which
/// selects their dashboard and constrains which records they see and which
/// review stage they may act on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUID)
    pub id: String,
    /// Email address (unique)
    pub email: String,
    /// Display name
    pub full_name: String,
    /// Optional avatar image URL
    pub avatar_url: Option<String>,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// User role
    pub role: UserRole,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with a generated id.
    ///
    /// Note: The password should already be hashed before calling this
    /// function. Use `services::password::hash_password()`.
    pub fn new(email: String, full_name: String, password_hash: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            email,
            full_name,
            avatar_url: None,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_publisher(&self) -> bool {
        self.role == UserRole::Publisher
    }

    pub fn is_sp_team(&self) -> bool {
        self.role == UserRole::SpTeam
    }

    pub fn is_advertiser(&self) -> bool {
        self.role == UserRole::Advertiser
    }

    /// The authenticated context passed into service calls.
    pub fn auth_context(&self) -> AuthContext {
        AuthContext {
            user_id: self.id.clone(),
            role: self.role,
        }
    }
}

/// User role for authorization.
///
/// - Publisher: applies to campaigns and uploads videos
/// - SpTeam: first-pass reviewer for applications and videos
/// - Advertiser: creates campaigns, gives final approval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Publisher,
    SpTeam,
    Advertiser,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Publisher => write!(f, "publisher"),
            UserRole::SpTeam => write!(f, "sp_team"),
            UserRole::Advertiser => write!(f, "advertiser"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "publisher" => Ok(UserRole::Publisher),
            "sp_team" => Ok(UserRole::SpTeam),
            "advertiser" => Ok(UserRole::Advertiser),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

/// Identity and role of the caller, threaded explicitly through every
/// service call instead of read from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub user_id: String,
    pub role: UserRole,
}

impl AuthContext {
    pub fn new(user_id: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }
}

/// Input for creating a new user (before password hashing)
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Email address
    pub email: String,
    /// Display name
    pub full_name: String,
    /// Plaintext password (will be hashed)
    pub password: String,
    /// User role
    pub role: UserRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new(
            "pub@example.com".to_string(),
            "Pat Publisher".to_string(),
            "hashed_password".to_string(),
            UserRole::Publisher,
        );

        assert!(!user.id.is_empty());
        assert_eq!(user.email, "pub@example.com");
        assert_eq!(user.full_name, "Pat Publisher");
        assert_eq!(user.role, UserRole::Publisher);
    }

    #[test]
    fn test_new_users_get_distinct_ids() {
        let a = User::new(
            "a@example.com".to_string(),
            "A".to_string(),
            "hash".to_string(),
            UserRole::Advertiser,
        );
        let b = User::new(
            "b@example.com".to_string(),
            "B".to_string(),
            "hash".to_string(),
            UserRole::Advertiser,
        );
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_role_predicates() {
        let publisher = User::new(
            "p@test.com".to_string(),
            "P".to_string(),
            "hash".to_string(),
            UserRole::Publisher,
        );
        let sp = User::new(
            "sp@test.com".to_string(),
            "SP".to_string(),
            "hash".to_string(),
            UserRole::SpTeam,
        );
        let advertiser = User::new(
            "a@test.com".to_string(),
            "A".to_string(),
            "hash".to_string(),
            UserRole::Advertiser,
        );

        assert!(publisher.is_publisher());
        assert!(!publisher.is_sp_team());
        assert!(sp.is_sp_team());
        assert!(!sp.is_advertiser());
        assert!(advertiser.is_advertiser());
        assert!(!advertiser.is_publisher());
    }

    #[test]
    fn test_auth_context_carries_identity() {
        let user = User::new(
            "p@test.com".to_string(),
            "P".to_string(),
            "hash".to_string(),
            UserRole::SpTeam,
        );
        let ctx = user.auth_context();
        assert_eq!(ctx.user_id, user.id);
        assert_eq!(ctx.role, UserRole::SpTeam);
    }

    #[test]
    fn test_user_role_display() {
        assert_eq!(UserRole::Publisher.to_string(), "publisher");
        assert_eq!(UserRole::SpTeam.to_string(), "sp_team");
        assert_eq!(UserRole::Advertiser.to_string(), "advertiser");
    }

    #[test]
    fn test_user_role_from_str() {
        assert_eq!(UserRole::from_str("publisher").unwrap(), UserRole::Publisher);
        assert_eq!(UserRole::from_str("SP_TEAM").unwrap(), UserRole::SpTeam);
        assert_eq!(UserRole::from_str("Advertiser").unwrap(), UserRole::Advertiser);
        assert!(UserRole::from_str("admin").is_err());
    }

    #[test]
    fn test_user_role_serde() {
        assert_eq!(
            serde_json::to_string(&UserRole::SpTeam).unwrap(),
            "\"sp_team\""
        );
        let role: UserRole = serde_json::from_str("\"advertiser\"").unwrap();
        assert_eq!(role, UserRole::Advertiser);
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new(
            "p@test.com".to_string(),
            "P".to_string(),
            "secret-hash".to_string(),
            UserRole::Publisher,
        );
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(!json.contains("password_hash"));
    }
}
