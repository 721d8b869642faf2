//! Data models
//!
//! This module contains all data structures used throughout the AdBridge system.
//! Models represent:
//! - Database entities (User, Session, Campaign, CampaignApplication, VideoSubmission, Notification)
//! - The shared review status lifecycle and its presentation lookups
//! - Internal data transfer objects

mod application;
mod campaign;
mod notification;
mod session;
mod status;
mod user;
mod video;

pub use application::{ApplicationWithMeta, CampaignApplication, CreateApplicationInput};
pub use campaign::{Campaign, CreateCampaignInput};
pub use notification::{Notification, NotificationType};
pub use session::Session;
pub use status::{CampaignStatus, ReviewStage, ReviewStatus};
pub use user::{AuthContext, CreateUserInput, User, UserRole};
pub use video::{CreateVideoInput, VideoSubmission, VideoWithMeta};
