//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod application;
pub mod campaign;
pub mod notification;
pub mod session;
pub mod user;
pub mod video;

pub use application::{ApplicationRepository, SqlxApplicationRepository};
pub use campaign::{CampaignRepository, SqlxCampaignRepository};
pub use notification::{NotificationRepository, SqlxNotificationRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use user::{SqlxUserRepository, UserRepository};
pub use video::{SqlxVideoRepository, VideoRepository};
