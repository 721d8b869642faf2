//! Notification service
//!
//! User-facing notification queries plus the workflow side-effect
//! templates fired when an application or video changes status. The
//! recipient is always the owning publisher; rejection reasons travel
//! only in the notification message, never on the entity.

use crate::db::repositories::NotificationRepository;
use crate::models::{AuthContext, Notification, NotificationType, ReviewStatus};
use anyhow::Context;
use std::sync::Arc;

/// Error types for notification service operations
#[derive(Debug, thiserror::Error)]
pub enum NotificationServiceError {
    /// Notification not found (or owned by someone else)
    #[error("Notification not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Notification service
pub struct NotificationService {
    repo: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    /// Create a new notification service
    pub fn new(repo: Arc<dyn NotificationRepository>) -> Self {
        Self { repo }
    }

    /// List the caller's notifications, newest first
    pub async fn list(
        &self,
        actor: &AuthContext,
    ) -> Result<Vec<Notification>, NotificationServiceError> {
        let notifications = self
            .repo
            .list_by_user(&actor.user_id)
            .await
            .context("Failed to list notifications")?;

        Ok(notifications)
    }

    /// Count the caller's unread notifications
    pub async fn unread_count(
        &self,
        actor: &AuthContext,
    ) -> Result<i64, NotificationServiceError> {
        let count = self
            .repo
            .unread_count(&actor.user_id)
            .await
            .context("Failed to count unread notifications")?;

        Ok(count)
    }

    /// Mark one of the caller's notifications as read
    pub async fn mark_read(
        &self,
        actor: &AuthContext,
        id: &str,
    ) -> Result<(), NotificationServiceError> {
        let marked = self
            .repo
            .mark_read(id, &actor.user_id)
            .await
            .context("Failed to mark notification as read")?;

        if !marked {
            return Err(NotificationServiceError::NotFound(id.to_string()));
        }

        Ok(())
    }

    /// Mark all of the caller's notifications as read
    pub async fn mark_all_read(
        &self,
        actor: &AuthContext,
    ) -> Result<i64, NotificationServiceError> {
        let updated = self
            .repo
            .mark_all_read(&actor.user_id)
            .await
            .context("Failed to mark notifications as read")?;

        Ok(updated)
    }

    /// Write the side-effect notification for an application status change
    pub async fn notify_application_status(
        &self,
        publisher_id: &str,
        application_id: &str,
        campaign_title: &str,
        status: ReviewStatus,
        reason: Option<&str>,
    ) -> Result<(), NotificationServiceError> {
        if let Some(notification) =
            application_notification(publisher_id, application_id, campaign_title, status, reason)
        {
            self.repo
                .create(&notification)
                .await
                .context("Failed to create notification")?;
        }
        Ok(())
    }

    /// Write the side-effect notification for a video status change
    pub async fn notify_video_status(
        &self,
        publisher_id: &str,
        video_id: &str,
        campaign_title: &str,
        status: ReviewStatus,
        reason: Option<&str>,
    ) -> Result<(), NotificationServiceError> {
        if let Some(notification) =
            video_notification(publisher_id, video_id, campaign_title, status, reason)
        {
            self.repo
                .create(&notification)
                .await
                .context("Failed to create notification")?;
        }
        Ok(())
    }
}

/// Build the notification for an application status change.
///
/// Returns `None` for `pending`, which is never the result of a review.
pub fn application_notification(
    publisher_id: &str,
    application_id: &str,
    campaign_title: &str,
    status: ReviewStatus,
    reason: Option<&str>,
) -> Option<Notification> {
    let (notification_type, title, message) = match status {
        ReviewStatus::SpApproved => (
            NotificationType::Success,
            "Application Approved",
            format!(
                "Your application for \"{}\" passed SP review and is awaiting advertiser approval.",
                campaign_title
            ),
        ),
        ReviewStatus::AdvertiserApproved => (
            NotificationType::Success,
            "Application Fully Approved",
            format!(
                "Your application for \"{}\" is fully approved. You can now upload your video.",
                campaign_title
            ),
        ),
        ReviewStatus::SpRejected => (
            NotificationType::Error,
            "Application Rejected",
            reason.map(str::to_string).unwrap_or_else(|| {
                format!(
                    "Your application for \"{}\" was rejected during SP review.",
                    campaign_title
                )
            }),
        ),
        ReviewStatus::AdvertiserRejected => (
            NotificationType::Error,
            "Application Rejected",
            reason.map(str::to_string).unwrap_or_else(|| {
                format!(
                    "Your application for \"{}\" was rejected by the advertiser.",
                    campaign_title
                )
            }),
        ),
        ReviewStatus::Pending => return None,
    };

    Some(Notification::new(
        publisher_id.to_string(),
        notification_type,
        title.to_string(),
        message,
        Some(application_id.to_string()),
        Some("application".to_string()),
    ))
}

/// Build the notification for a video status change.
pub fn video_notification(
    publisher_id: &str,
    video_id: &str,
    campaign_title: &str,
    status: ReviewStatus,
    reason: Option<&str>,
) -> Option<Notification> {
    let (notification_type, title, message) = match status {
        ReviewStatus::SpApproved => (
            NotificationType::Success,
            "Video Approved",
            format!(
                "Your video for \"{}\" passed SP review and is awaiting advertiser approval.",
                campaign_title
            ),
        ),
        ReviewStatus::AdvertiserApproved => (
            NotificationType::Success,
            "Video Fully Approved",
            format!(
                "Your video for \"{}\" is fully approved. You can now publish it.",
                campaign_title
            ),
        ),
        ReviewStatus::SpRejected => (
            NotificationType::Error,
            "Video Rejected",
            reason.map(str::to_string).unwrap_or_else(|| {
                format!(
                    "Your video for \"{}\" was rejected during SP review.",
                    campaign_title
                )
            }),
        ),
        ReviewStatus::AdvertiserRejected => (
            NotificationType::Error,
            "Video Rejected",
            reason.map(str::to_string).unwrap_or_else(|| {
                format!(
                    "Your video for \"{}\" was rejected by the advertiser.",
                    campaign_title
                )
            }),
        ),
        ReviewStatus::Pending => return None,
    };

    Some(Notification::new(
        publisher_id.to_string(),
        notification_type,
        title.to_string(),
        message,
        Some(video_id.to_string()),
        Some("video".to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{SqlxNotificationRepository, SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations, DynDatabasePool};
    use crate::models::{User, UserRole};

    async fn setup_test_service() -> (DynDatabasePool, NotificationService, User) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let users = SqlxUserRepository::new(pool.clone());
        let publisher = users
            .create(&User::new(
                "publisher@example.com".to_string(),
                "Pat Publisher".to_string(),
                "hashed".to_string(),
                UserRole::Publisher,
            ))
            .await
            .expect("Failed to create user");

        let service = NotificationService::new(SqlxNotificationRepository::boxed(pool.clone()));
        (pool, service, publisher)
    }

    // ========================================================================
    // Template tests
    // ========================================================================

    #[test]
    fn test_application_approval_templates() {
        let n = application_notification("pub-1", "app-1", "Laptop Launch", ReviewStatus::SpApproved, None)
            .expect("Should produce a notification");
        assert_eq!(n.notification_type, NotificationType::Success);
        assert_eq!(n.title, "Application Approved");
        assert!(n.message.contains("Laptop Launch"));
        assert!(n.message.contains("awaiting advertiser approval"));
        assert_eq!(n.related_id.as_deref(), Some("app-1"));
        assert_eq!(n.related_type.as_deref(), Some("application"));

        let n = application_notification(
            "pub-1",
            "app-1",
            "Laptop Launch",
            ReviewStatus::AdvertiserApproved,
            None,
        )
        .expect("Should produce a notification");
        assert_eq!(n.title, "Application Fully Approved");
        assert!(n.message.contains("upload your video"));
    }

    #[test]
    fn test_application_rejection_carries_reason_verbatim() {
        let n = application_notification(
            "pub-1",
            "app-1",
            "Laptop Launch",
            ReviewStatus::SpRejected,
            Some("Audience too small"),
        )
        .expect("Should produce a notification");
        assert_eq!(n.notification_type, NotificationType::Error);
        assert_eq!(n.title, "Application Rejected");
        assert_eq!(n.message, "Audience too small");

        let n = application_notification(
            "pub-1",
            "app-1",
            "Laptop Launch",
            ReviewStatus::AdvertiserRejected,
            None,
        )
        .expect("Should produce a notification");
        assert!(n.message.contains("Laptop Launch"));
        assert!(n.message.contains("advertiser"));
    }

    #[test]
    fn test_video_templates() {
        let n = video_notification("pub-1", "vid-1", "Laptop Launch", ReviewStatus::SpApproved, None)
            .expect("Should produce a notification");
        assert_eq!(n.title, "Video Approved");
        assert_eq!(n.related_type.as_deref(), Some("video"));

        let n = video_notification(
            "pub-1",
            "vid-1",
            "Laptop Launch",
            ReviewStatus::AdvertiserApproved,
            None,
        )
        .expect("Should produce a notification");
        assert_eq!(n.title, "Video Fully Approved");
        assert!(n.message.contains("publish"));

        let n = video_notification(
            "pub-1",
            "vid-1",
            "Laptop Launch",
            ReviewStatus::SpRejected,
            Some("Wrong aspect ratio"),
        )
        .expect("Should produce a notification");
        assert_eq!(n.title, "Video Rejected");
        assert_eq!(n.message, "Wrong aspect ratio");
    }

    #[test]
    fn test_pending_produces_no_notification() {
        assert!(application_notification("p", "a", "C", ReviewStatus::Pending, None).is_none());
        assert!(video_notification("p", "v", "C", ReviewStatus::Pending, None).is_none());
    }

    // ========================================================================
    // Service tests
    // ========================================================================

    #[tokio::test]
    async fn test_notify_and_list() {
        let (_pool, service, publisher) = setup_test_service().await;

        service
            .notify_application_status(
                &publisher.id,
                "app-1",
                "Laptop Launch",
                ReviewStatus::SpApproved,
                None,
            )
            .await
            .expect("Failed to notify");

        let actor = publisher.auth_context();
        let list = service.list(&actor).await.expect("Failed to list");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].title, "Application Approved");
        assert_eq!(
            service
                .unread_count(&actor)
                .await
                .expect("Failed to count"),
            1
        );
    }

    #[tokio::test]
    async fn test_mark_read_rejects_foreign_notification() {
        let (pool, service, publisher) = setup_test_service().await;

        let users = SqlxUserRepository::new(pool.clone());
        let other = users
            .create(&User::new(
                "other@example.com".to_string(),
                "Other".to_string(),
                "hashed".to_string(),
                UserRole::Publisher,
            ))
            .await
            .expect("Failed to create user");

        service
            .notify_video_status(
                &publisher.id,
                "vid-1",
                "Laptop Launch",
                ReviewStatus::SpRejected,
                Some("Too long"),
            )
            .await
            .expect("Failed to notify");

        let owner_actor = publisher.auth_context();
        let list = service.list(&owner_actor).await.expect("Failed to list");
        let id = list[0].id.clone();

        let result = service.mark_read(&other.auth_context(), &id).await;
        assert!(matches!(result, Err(NotificationServiceError::NotFound(_))));

        service
            .mark_read(&owner_actor, &id)
            .await
            .expect("Owner should be able to mark read");
        assert_eq!(
            service
                .unread_count(&owner_actor)
                .await
                .expect("Failed to count"),
            0
        );
    }

    #[tokio::test]
    async fn test_mark_all_read() {
        let (_pool, service, publisher) = setup_test_service().await;

        for i in 0..3 {
            service
                .notify_application_status(
                    &publisher.id,
                    &format!("app-{}", i),
                    "Laptop Launch",
                    ReviewStatus::SpApproved,
                    None,
                )
                .await
                .expect("Failed to notify");
        }

        let actor = publisher.auth_context();
        let updated = service
            .mark_all_read(&actor)
            .await
            .expect("Failed to mark all read");
        assert_eq!(updated, 3);
        assert_eq!(
            service
                .unread_count(&actor)
                .await
                .expect("Failed to count"),
            0
        );
    }
}
