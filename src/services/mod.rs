//! Services layer - Business logic
//!
//! This module contains the business logic for the endorsement platform.
//! Services are responsible for:
//! - Implementing business rules and the review workflow
//! - Role and ownership gating (enforced here, not in clients)
//! - Coordinating between repositories
//! - Handling validation and error cases

pub mod application;
pub mod auth;
pub mod campaign;
pub mod notification;
pub mod password;
pub mod video;

pub use application::{ApplicationService, WorkflowServiceError};
pub use auth::{AuthService, AuthServiceError, LoginInput};
pub use campaign::{CampaignService, CampaignServiceError};
pub use notification::{NotificationService, NotificationServiceError};
pub use password::{hash_password, verify_password};
pub use video::VideoService;
