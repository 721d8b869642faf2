//! Notification repository
//!
//! Database operations for in-app notifications. The read flag is stored
//! in an `is_read` column because `read` is reserved in MySQL.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Notification;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Notification repository trait
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Create a new notification
    async fn create(&self, notification: &Notification) -> Result<Notification>;

    /// List notifications for a user, newest first
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Notification>>;

    /// Count unread notifications for a user
    async fn unread_count(&self, user_id: &str) -> Result<i64>;

    /// Mark a notification as read, scoped to its owner
    ///
    /// Returns false if the notification does not exist or belongs to
    /// another user.
    async fn mark_read(&self, id: &str, user_id: &str) -> Result<bool>;

    /// Mark all of a user's notifications as read, returning how many
    /// were updated
    async fn mark_all_read(&self, user_id: &str) -> Result<i64>;
}

/// sqlx implementation working over either supported driver
pub struct SqlxNotificationRepository {
    pool: DynDatabasePool,
}

impl SqlxNotificationRepository {
    /// Build a repository over the given pool
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Arc-wrapped constructor, convenient for service wiring
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn NotificationRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl NotificationRepository for SqlxNotificationRepository {
    async fn create(&self, notification: &Notification) -> Result<Notification> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_notification_sqlite(self.pool.as_sqlite().unwrap(), notification).await
            }
            DatabaseDriver::Mysql => {
                create_notification_mysql(self.pool.as_mysql().unwrap(), notification).await
            }
        }
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Notification>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_notifications_sqlite(self.pool.as_sqlite().unwrap(), user_id).await
            }
            DatabaseDriver::Mysql => {
                list_notifications_mysql(self.pool.as_mysql().unwrap(), user_id).await
            }
        }
    }

    async fn unread_count(&self, user_id: &str) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                unread_count_sqlite(self.pool.as_sqlite().unwrap(), user_id).await
            }
            DatabaseDriver::Mysql => {
                unread_count_mysql(self.pool.as_mysql().unwrap(), user_id).await
            }
        }
    }

    async fn mark_read(&self, id: &str, user_id: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                mark_read_sqlite(self.pool.as_sqlite().unwrap(), id, user_id).await
            }
            DatabaseDriver::Mysql => {
                mark_read_mysql(self.pool.as_mysql().unwrap(), id, user_id).await
            }
        }
    }

    async fn mark_all_read(&self, user_id: &str) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                mark_all_read_sqlite(self.pool.as_sqlite().unwrap(), user_id).await
            }
            DatabaseDriver::Mysql => {
                mark_all_read_mysql(self.pool.as_mysql().unwrap(), user_id).await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_notification_sqlite(
    pool: &SqlitePool,
    notification: &Notification,
) -> Result<Notification> {
    sqlx::query(
        r#"
        INSERT INTO notifications (id, user_id, type, title, message, related_id, related_type, is_read, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&notification.id)
    .bind(&notification.user_id)
    .bind(notification.notification_type.to_string())
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(&notification.related_id)
    .bind(&notification.related_type)
    .bind(notification.read)
    .bind(notification.created_at)
    .execute(pool)
    .await
    .context("Failed to create notification")?;

    Ok(notification.clone())
}

async fn list_notifications_sqlite(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Vec<Notification>> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, type, title, message, related_id, related_type, is_read, created_at
        FROM notifications
        WHERE user_id = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to list notifications")?;

    Ok(rows.iter().map(row_to_notification_sqlite).collect())
}

async fn unread_count_sqlite(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    let row = sqlx::query(
        "SELECT COUNT(*) as count FROM notifications WHERE user_id = ? AND is_read = 0",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .context("Failed to count unread notifications")?;

    Ok(row.get("count"))
}

async fn mark_read_sqlite(pool: &SqlitePool, id: &str, user_id: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to mark notification as read")?;

    Ok(result.rows_affected() > 0)
}

async fn mark_all_read_sqlite(pool: &SqlitePool, user_id: &str) -> Result<i64> {
    let result =
        sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
            .bind(user_id)
            .execute(pool)
            .await
            .context("Failed to mark notifications as read")?;

    Ok(result.rows_affected() as i64)
}

fn row_to_notification_sqlite(row: &sqlx::sqlite::SqliteRow) -> Notification {
    Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        notification_type: row.get::<String, _>("type").parse().unwrap_or_default(),
        title: row.get("title"),
        message: row.get("message"),
        related_id: row.get("related_id"),
        related_type: row.get("related_type"),
        read: row.get("is_read"),
        created_at: row.get("created_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_notification_mysql(
    pool: &MySqlPool,
    notification: &Notification,
) -> Result<Notification> {
    sqlx::query(
        r#"
        INSERT INTO notifications (id, user_id, type, title, message, related_id, related_type, is_read, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&notification.id)
    .bind(&notification.user_id)
    .bind(notification.notification_type.to_string())
    .bind(&notification.title)
    .bind(&notification.message)
    .bind(&notification.related_id)
    .bind(&notification.related_type)
    .bind(notification.read)
    .bind(notification.created_at)
    .execute(pool)
    .await
    .context("Failed to create notification")?;

    Ok(notification.clone())
}

async fn list_notifications_mysql(pool: &MySqlPool, user_id: &str) -> Result<Vec<Notification>> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, type, title, message, related_id, related_type, is_read, created_at
        FROM notifications
        WHERE user_id = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
    .context("Failed to list notifications")?;

    Ok(rows.iter().map(row_to_notification_mysql).collect())
}

async fn unread_count_mysql(pool: &MySqlPool, user_id: &str) -> Result<i64> {
    let row = sqlx::query(
        "SELECT COUNT(*) as count FROM notifications WHERE user_id = ? AND is_read = 0",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .context("Failed to count unread notifications")?;

    Ok(row.get("count"))
}

async fn mark_read_mysql(pool: &MySqlPool, id: &str, user_id: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .context("Failed to mark notification as read")?;

    Ok(result.rows_affected() > 0)
}

async fn mark_all_read_mysql(pool: &MySqlPool, user_id: &str) -> Result<i64> {
    let result =
        sqlx::query("UPDATE notifications SET is_read = 1 WHERE user_id = ? AND is_read = 0")
            .bind(user_id)
            .execute(pool)
            .await
            .context("Failed to mark notifications as read")?;

    Ok(result.rows_affected() as i64)
}

fn row_to_notification_mysql(row: &sqlx::mysql::MySqlRow) -> Notification {
    Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        notification_type: row.get::<String, _>("type").parse().unwrap_or_default(),
        title: row.get("title"),
        message: row.get("message"),
        related_id: row.get("related_id"),
        related_type: row.get("related_type"),
        read: row.get("is_read"),
        created_at: row.get("created_at"),
    }
}
