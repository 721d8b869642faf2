//! Video submission repository
//!
//! Database operations for submitted videos. Videos hang off an
//! application, so list queries join through campaign_applications to
//! reach campaign and publisher details.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{ReviewStage, ReviewStatus, VideoSubmission, VideoWithMeta};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Video repository trait
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Create a new video submission
    async fn create(&self, video: &VideoSubmission) -> Result<VideoSubmission>;

    /// Get video by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<VideoSubmission>>;

    /// Get video by ID with campaign and publisher details
    async fn get_with_meta(&self, id: &str) -> Result<Option<VideoWithMeta>>;

    /// List all videos, newest upload first
    async fn list_all(&self) -> Result<Vec<VideoWithMeta>>;

    /// List videos uploaded by a publisher, newest upload first
    async fn list_by_publisher(&self, publisher_id: &str) -> Result<Vec<VideoWithMeta>>;

    /// List videos for campaigns created by an advertiser, newest upload first
    async fn list_by_campaign_owner(&self, owner_id: &str) -> Result<Vec<VideoWithMeta>>;

    /// Update video status, stamping the review stage that the new status
    /// belongs to, and return the refreshed row
    async fn update_status(
        &self,
        id: &str,
        status: ReviewStatus,
        reviewer_id: &str,
    ) -> Result<VideoSubmission>;
}

/// sqlx implementation working over either supported driver
pub struct SqlxVideoRepository {
    pool: DynDatabasePool,
}

impl SqlxVideoRepository {
    /// Build a repository over the given pool
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Arc-wrapped constructor, convenient for service wiring
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn VideoRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl VideoRepository for SqlxVideoRepository {
    async fn create(&self, video: &VideoSubmission) -> Result<VideoSubmission> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_video_sqlite(self.pool.as_sqlite().unwrap(), video).await
            }
            DatabaseDriver::Mysql => create_video_mysql(self.pool.as_mysql().unwrap(), video).await,
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<VideoSubmission>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_video_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => get_video_by_id_mysql(self.pool.as_mysql().unwrap(), id).await,
        }
    }

    async fn get_with_meta(&self, id: &str) -> Result<Option<VideoWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_video_with_meta_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_video_with_meta_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn list_all(&self) -> Result<Vec<VideoWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_videos_sqlite(self.pool.as_sqlite().unwrap()).await,
            DatabaseDriver::Mysql => list_videos_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn list_by_publisher(&self, publisher_id: &str) -> Result<Vec<VideoWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_videos_by_publisher_sqlite(self.pool.as_sqlite().unwrap(), publisher_id).await
            }
            DatabaseDriver::Mysql => {
                list_videos_by_publisher_mysql(self.pool.as_mysql().unwrap(), publisher_id).await
            }
        }
    }

    async fn list_by_campaign_owner(&self, owner_id: &str) -> Result<Vec<VideoWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_videos_by_campaign_owner_sqlite(self.pool.as_sqlite().unwrap(), owner_id).await
            }
            DatabaseDriver::Mysql => {
                list_videos_by_campaign_owner_mysql(self.pool.as_mysql().unwrap(), owner_id).await
            }
        }
    }

    async fn update_status(
        &self,
        id: &str,
        status: ReviewStatus,
        reviewer_id: &str,
    ) -> Result<VideoSubmission> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_video_status_sqlite(self.pool.as_sqlite().unwrap(), id, status, reviewer_id)
                    .await
            }
            DatabaseDriver::Mysql => {
                update_video_status_mysql(self.pool.as_mysql().unwrap(), id, status, reviewer_id)
                    .await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_video_sqlite(pool: &SqlitePool, video: &VideoSubmission) -> Result<VideoSubmission> {
    sqlx::query(
        r#"
        INSERT INTO videos (id, application_id, title, url, description, status, uploaded_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&video.id)
    .bind(&video.application_id)
    .bind(&video.title)
    .bind(&video.url)
    .bind(&video.description)
    .bind(video.status.to_string())
    .bind(video.uploaded_at)
    .execute(pool)
    .await
    .context("Failed to create video")?;

    Ok(video.clone())
}

async fn get_video_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<VideoSubmission>> {
    let row = sqlx::query(
        r#"
        SELECT id, application_id, title, url, description, status,
               sp_reviewed_by, sp_reviewed_at, advertiser_reviewed_by, advertiser_reviewed_at,
               uploaded_at
        FROM videos
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get video by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_video_sqlite(&row))),
        None => Ok(None),
    }
}

async fn get_video_with_meta_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<VideoWithMeta>> {
    let row = sqlx::query(
        r#"
        SELECT v.*, c.title AS campaign_title, c.brand AS campaign_brand,
               u.full_name AS publisher_name, u.email AS publisher_email
        FROM videos v
        JOIN campaign_applications a ON v.application_id = a.id
        JOIN campaigns c ON a.campaign_id = c.id
        JOIN users u ON a.publisher_id = u.id
        WHERE v.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get video with details")?;

    Ok(row.map(|row| row_to_video_with_meta_sqlite(&row)))
}

async fn list_videos_sqlite(pool: &SqlitePool) -> Result<Vec<VideoWithMeta>> {
    let rows = sqlx::query(
        r#"
        SELECT v.*, c.title AS campaign_title, c.brand AS campaign_brand,
               u.full_name AS publisher_name, u.email AS publisher_email
        FROM videos v
        JOIN campaign_applications a ON v.application_id = a.id
        JOIN campaigns c ON a.campaign_id = c.id
        JOIN users u ON a.publisher_id = u.id
        ORDER BY v.uploaded_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list videos")?;

    Ok(rows.iter().map(row_to_video_with_meta_sqlite).collect())
}

async fn list_videos_by_publisher_sqlite(
    pool: &SqlitePool,
    publisher_id: &str,
) -> Result<Vec<VideoWithMeta>> {
    let rows = sqlx::query(
        r#"
        SELECT v.*, c.title AS campaign_title, c.brand AS campaign_brand,
               u.full_name AS publisher_name, u.email AS publisher_email
        FROM videos v
        JOIN campaign_applications a ON v.application_id = a.id
        JOIN campaigns c ON a.campaign_id = c.id
        JOIN users u ON a.publisher_id = u.id
        WHERE a.publisher_id = ?
        ORDER BY v.uploaded_at DESC
        "#,
    )
    .bind(publisher_id)
    .fetch_all(pool)
    .await
    .context("Failed to list videos by publisher")?;

    Ok(rows.iter().map(row_to_video_with_meta_sqlite).collect())
}

async fn list_videos_by_campaign_owner_sqlite(
    pool: &SqlitePool,
    owner_id: &str,
) -> Result<Vec<VideoWithMeta>> {
    let rows = sqlx::query(
        r#"
        SELECT v.*, c.title AS campaign_title, c.brand AS campaign_brand,
               u.full_name AS publisher_name, u.email AS publisher_email
        FROM videos v
        JOIN campaign_applications a ON v.application_id = a.id
        JOIN campaigns c ON a.campaign_id = c.id
        JOIN users u ON a.publisher_id = u.id
        WHERE c.created_by = ?
        ORDER BY v.uploaded_at DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
    .context("Failed to list videos by campaign owner")?;

    Ok(rows.iter().map(row_to_video_with_meta_sqlite).collect())
}

async fn update_video_status_sqlite(
    pool: &SqlitePool,
    id: &str,
    status: ReviewStatus,
    reviewer_id: &str,
) -> Result<VideoSubmission> {
    let now = Utc::now();

    let query = match status.stage() {
        Some(ReviewStage::Sp) => sqlx::query(
            r#"
            UPDATE videos
            SET status = ?, sp_reviewed_by = ?, sp_reviewed_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(reviewer_id)
        .bind(now)
        .bind(id),
        Some(ReviewStage::Advertiser) => sqlx::query(
            r#"
            UPDATE videos
            SET status = ?, advertiser_reviewed_by = ?, advertiser_reviewed_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(reviewer_id)
        .bind(now)
        .bind(id),
        None => sqlx::query(
            r#"
            UPDATE videos
            SET status = ?
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(id),
    };

    query
        .execute(pool)
        .await
        .context("Failed to update video status")?;

    get_video_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Video not found after update"))
}

fn row_to_video_sqlite(row: &sqlx::sqlite::SqliteRow) -> VideoSubmission {
    VideoSubmission {
        id: row.get("id"),
        application_id: row.get("application_id"),
        title: row.get("title"),
        url: row.get("url"),
        description: row.get("description"),
        status: row.get::<String, _>("status").parse().unwrap_or_default(),
        sp_reviewed_by: row.get("sp_reviewed_by"),
        sp_reviewed_at: row.get("sp_reviewed_at"),
        advertiser_reviewed_by: row.get("advertiser_reviewed_by"),
        advertiser_reviewed_at: row.get("advertiser_reviewed_at"),
        uploaded_at: row.get("uploaded_at"),
    }
}

fn row_to_video_with_meta_sqlite(row: &sqlx::sqlite::SqliteRow) -> VideoWithMeta {
    VideoWithMeta {
        id: row.get("id"),
        application_id: row.get("application_id"),
        title: row.get("title"),
        url: row.get("url"),
        description: row.get("description"),
        status: row.get::<String, _>("status").parse().unwrap_or_default(),
        sp_reviewed_by: row.get("sp_reviewed_by"),
        sp_reviewed_at: row.get("sp_reviewed_at"),
        advertiser_reviewed_by: row.get("advertiser_reviewed_by"),
        advertiser_reviewed_at: row.get("advertiser_reviewed_at"),
        uploaded_at: row.get("uploaded_at"),
        campaign_title: row.get("campaign_title"),
        campaign_brand: row.get("campaign_brand"),
        publisher_name: row.get("publisher_name"),
        publisher_email: row.get("publisher_email"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_video_mysql(pool: &MySqlPool, video: &VideoSubmission) -> Result<VideoSubmission> {
    sqlx::query(
        r#"
        INSERT INTO videos (id, application_id, title, url, description, status, uploaded_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&video.id)
    .bind(&video.application_id)
    .bind(&video.title)
    .bind(&video.url)
    .bind(&video.description)
    .bind(video.status.to_string())
    .bind(video.uploaded_at)
    .execute(pool)
    .await
    .context("Failed to create video")?;

    Ok(video.clone())
}

async fn get_video_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<VideoSubmission>> {
    let row = sqlx::query(
        r#"
        SELECT id, application_id, title, url, description, status,
               sp_reviewed_by, sp_reviewed_at, advertiser_reviewed_by, advertiser_reviewed_at,
               uploaded_at
        FROM videos
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get video by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_video_mysql(&row))),
        None => Ok(None),
    }
}

async fn get_video_with_meta_mysql(pool: &MySqlPool, id: &str) -> Result<Option<VideoWithMeta>> {
    let row = sqlx::query(
        r#"
        SELECT v.*, c.title AS campaign_title, c.brand AS campaign_brand,
               u.full_name AS publisher_name, u.email AS publisher_email
        FROM videos v
        JOIN campaign_applications a ON v.application_id = a.id
        JOIN campaigns c ON a.campaign_id = c.id
        JOIN users u ON a.publisher_id = u.id
        WHERE v.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get video with details")?;

    Ok(row.map(|row| row_to_video_with_meta_mysql(&row)))
}

async fn list_videos_mysql(pool: &MySqlPool) -> Result<Vec<VideoWithMeta>> {
    let rows = sqlx::query(
        r#"
        SELECT v.*, c.title AS campaign_title, c.brand AS campaign_brand,
               u.full_name AS publisher_name, u.email AS publisher_email
        FROM videos v
        JOIN campaign_applications a ON v.application_id = a.id
        JOIN campaigns c ON a.campaign_id = c.id
        JOIN users u ON a.publisher_id = u.id
        ORDER BY v.uploaded_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list videos")?;

    Ok(rows.iter().map(row_to_video_with_meta_mysql).collect())
}

async fn list_videos_by_publisher_mysql(
    pool: &MySqlPool,
    publisher_id: &str,
) -> Result<Vec<VideoWithMeta>> {
    let rows = sqlx::query(
        r#"
        SELECT v.*, c.title AS campaign_title, c.brand AS campaign_brand,
               u.full_name AS publisher_name, u.email AS publisher_email
        FROM videos v
        JOIN campaign_applications a ON v.application_id = a.id
        JOIN campaigns c ON a.campaign_id = c.id
        JOIN users u ON a.publisher_id = u.id
        WHERE a.publisher_id = ?
        ORDER BY v.uploaded_at DESC
        "#,
    )
    .bind(publisher_id)
    .fetch_all(pool)
    .await
    .context("Failed to list videos by publisher")?;

    Ok(rows.iter().map(row_to_video_with_meta_mysql).collect())
}

async fn list_videos_by_campaign_owner_mysql(
    pool: &MySqlPool,
    owner_id: &str,
) -> Result<Vec<VideoWithMeta>> {
    let rows = sqlx::query(
        r#"
        SELECT v.*, c.title AS campaign_title, c.brand AS campaign_brand,
               u.full_name AS publisher_name, u.email AS publisher_email
        FROM videos v
        JOIN campaign_applications a ON v.application_id = a.id
        JOIN campaigns c ON a.campaign_id = c.id
        JOIN users u ON a.publisher_id = u.id
        WHERE c.created_by = ?
        ORDER BY v.uploaded_at DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
    .context("Failed to list videos by campaign owner")?;

    Ok(rows.iter().map(row_to_video_with_meta_mysql).collect())
}

async fn update_video_status_mysql(
    pool: &MySqlPool,
    id: &str,
    status: ReviewStatus,
    reviewer_id: &str,
) -> Result<VideoSubmission> {
    let now = Utc::now();

    let query = match status.stage() {
        Some(ReviewStage::Sp) => sqlx::query(
            r#"
            UPDATE videos
            SET status = ?, sp_reviewed_by = ?, sp_reviewed_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(reviewer_id)
        .bind(now)
        .bind(id),
        Some(ReviewStage::Advertiser) => sqlx::query(
            r#"
            UPDATE videos
            SET status = ?, advertiser_reviewed_by = ?, advertiser_reviewed_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(reviewer_id)
        .bind(now)
        .bind(id),
        None => sqlx::query(
            r#"
            UPDATE videos
            SET status = ?
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(id),
    };

    query
        .execute(pool)
        .await
        .context("Failed to update video status")?;

    get_video_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Video not found after update"))
}

fn row_to_video_mysql(row: &sqlx::mysql::MySqlRow) -> VideoSubmission {
    VideoSubmission {
        id: row.get("id"),
        application_id: row.get("application_id"),
        title: row.get("title"),
        url: row.get("url"),
        description: row.get("description"),
        status: row.get::<String, _>("status").parse().unwrap_or_default(),
        sp_reviewed_by: row.get("sp_reviewed_by"),
        sp_reviewed_at: row.get("sp_reviewed_at"),
        advertiser_reviewed_by: row.get("advertiser_reviewed_by"),
        advertiser_reviewed_at: row.get("advertiser_reviewed_at"),
        uploaded_at: row.get("uploaded_at"),
    }
}

fn row_to_video_with_meta_mysql(row: &sqlx::mysql::MySqlRow) -> VideoWithMeta {
    VideoWithMeta {
        id: row.get("id"),
        application_id: row.get("application_id"),
        title: row.get("title"),
        url: row.get("url"),
        description: row.get("description"),
        status: row.get::<String, _>("status").parse().unwrap_or_default(),
        sp_reviewed_by: row.get("sp_reviewed_by"),
        sp_reviewed_at: row.get("sp_reviewed_at"),
        advertiser_reviewed_by: row.get("advertiser_reviewed_by"),
        advertiser_reviewed_at: row.get("advertiser_reviewed_at"),
        uploaded_at: row.get("uploaded_at"),
        campaign_title: row.get("campaign_title"),
        campaign_brand: row.get("campaign_brand"),
        publisher_name: row.get("publisher_name"),
        publisher_email: row.get("publisher_email"),
    }
}
