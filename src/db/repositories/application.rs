//! Campaign application repository
//!
//! Database operations for publisher applications to campaigns.
//!
//! List queries join campaigns and users so API responses can show
//! campaign and publisher details without extra round trips.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{ApplicationWithMeta, CampaignApplication, ReviewStage, ReviewStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Campaign application repository trait
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    /// Create a new application
    async fn create(&self, application: &CampaignApplication) -> Result<CampaignApplication>;

    /// Get application by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<CampaignApplication>>;

    /// Get application by ID with campaign and publisher details
    async fn get_with_meta(&self, id: &str) -> Result<Option<ApplicationWithMeta>>;

    /// List all applications, newest first
    async fn list_all(&self) -> Result<Vec<ApplicationWithMeta>>;

    /// List applications submitted by a publisher, newest first
    async fn list_by_publisher(&self, publisher_id: &str) -> Result<Vec<ApplicationWithMeta>>;

    /// List applications to campaigns created by an advertiser, newest first
    async fn list_by_campaign_owner(&self, owner_id: &str) -> Result<Vec<ApplicationWithMeta>>;

    /// Check whether the publisher already has a pending or approved
    /// application for the campaign
    async fn has_open_application(&self, campaign_id: &str, publisher_id: &str) -> Result<bool>;

    /// Update application status, stamping the review stage that the new
    /// status belongs to, and return the refreshed row
    async fn update_status(
        &self,
        id: &str,
        status: ReviewStatus,
        reviewer_id: &str,
    ) -> Result<CampaignApplication>;
}

/// sqlx implementation working over either supported driver
pub struct SqlxApplicationRepository {
    pool: DynDatabasePool,
}

impl SqlxApplicationRepository {
    /// Build a repository over the given pool
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Arc-wrapped constructor, convenient for service wiring
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn ApplicationRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl ApplicationRepository for SqlxApplicationRepository {
    async fn create(&self, application: &CampaignApplication) -> Result<CampaignApplication> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_application_sqlite(self.pool.as_sqlite().unwrap(), application).await
            }
            DatabaseDriver::Mysql => {
                create_application_mysql(self.pool.as_mysql().unwrap(), application).await
            }
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<CampaignApplication>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_application_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_application_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn get_with_meta(&self, id: &str) -> Result<Option<ApplicationWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_application_with_meta_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_application_with_meta_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn list_all(&self) -> Result<Vec<ApplicationWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_applications_sqlite(self.pool.as_sqlite().unwrap()).await
            }
            DatabaseDriver::Mysql => list_applications_mysql(self.pool.as_mysql().unwrap()).await,
        }
    }

    async fn list_by_publisher(&self, publisher_id: &str) -> Result<Vec<ApplicationWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_applications_by_publisher_sqlite(self.pool.as_sqlite().unwrap(), publisher_id)
                    .await
            }
            DatabaseDriver::Mysql => {
                list_applications_by_publisher_mysql(self.pool.as_mysql().unwrap(), publisher_id)
                    .await
            }
        }
    }

    async fn list_by_campaign_owner(&self, owner_id: &str) -> Result<Vec<ApplicationWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_applications_by_campaign_owner_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    owner_id,
                )
                .await
            }
            DatabaseDriver::Mysql => {
                list_applications_by_campaign_owner_mysql(self.pool.as_mysql().unwrap(), owner_id)
                    .await
            }
        }
    }

    async fn has_open_application(&self, campaign_id: &str, publisher_id: &str) -> Result<bool> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                has_open_application_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    campaign_id,
                    publisher_id,
                )
                .await
            }
            DatabaseDriver::Mysql => {
                has_open_application_mysql(self.pool.as_mysql().unwrap(), campaign_id, publisher_id)
                    .await
            }
        }
    }

    async fn update_status(
        &self,
        id: &str,
        status: ReviewStatus,
        reviewer_id: &str,
    ) -> Result<CampaignApplication> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_application_status_sqlite(
                    self.pool.as_sqlite().unwrap(),
                    id,
                    status,
                    reviewer_id,
                )
                .await
            }
            DatabaseDriver::Mysql => {
                update_application_status_mysql(
                    self.pool.as_mysql().unwrap(),
                    id,
                    status,
                    reviewer_id,
                )
                .await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_application_sqlite(
    pool: &SqlitePool,
    application: &CampaignApplication,
) -> Result<CampaignApplication> {
    sqlx::query(
        r#"
        INSERT INTO campaign_applications (id, campaign_id, publisher_id, status, message, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&application.id)
    .bind(&application.campaign_id)
    .bind(&application.publisher_id)
    .bind(application.status.to_string())
    .bind(&application.message)
    .bind(application.created_at)
    .bind(application.updated_at)
    .execute(pool)
    .await
    .context("Failed to create application")?;

    Ok(application.clone())
}

async fn get_application_by_id_sqlite(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<CampaignApplication>> {
    let row = sqlx::query(
        r#"
        SELECT id, campaign_id, publisher_id, status, message,
               sp_reviewed_by, sp_reviewed_at, advertiser_reviewed_by, advertiser_reviewed_at,
               created_at, updated_at
        FROM campaign_applications
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get application by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_application_sqlite(&row))),
        None => Ok(None),
    }
}

async fn get_application_with_meta_sqlite(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<ApplicationWithMeta>> {
    let row = sqlx::query(
        r#"
        SELECT a.*, c.title AS campaign_title, c.brand AS campaign_brand,
               u.full_name AS publisher_name, u.email AS publisher_email
        FROM campaign_applications a
        JOIN campaigns c ON a.campaign_id = c.id
        JOIN users u ON a.publisher_id = u.id
        WHERE a.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get application with details")?;

    Ok(row.map(|row| row_to_application_with_meta_sqlite(&row)))
}

async fn list_applications_sqlite(pool: &SqlitePool) -> Result<Vec<ApplicationWithMeta>> {
    let rows = sqlx::query(
        r#"
        SELECT a.*, c.title AS campaign_title, c.brand AS campaign_brand,
               u.full_name AS publisher_name, u.email AS publisher_email
        FROM campaign_applications a
        JOIN campaigns c ON a.campaign_id = c.id
        JOIN users u ON a.publisher_id = u.id
        ORDER BY a.created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list applications")?;

    Ok(rows
        .iter()
        .map(row_to_application_with_meta_sqlite)
        .collect())
}

async fn list_applications_by_publisher_sqlite(
    pool: &SqlitePool,
    publisher_id: &str,
) -> Result<Vec<ApplicationWithMeta>> {
    let rows = sqlx::query(
        r#"
        SELECT a.*, c.title AS campaign_title, c.brand AS campaign_brand,
               u.full_name AS publisher_name, u.email AS publisher_email
        FROM campaign_applications a
        JOIN campaigns c ON a.campaign_id = c.id
        JOIN users u ON a.publisher_id = u.id
        WHERE a.publisher_id = ?
        ORDER BY a.created_at DESC
        "#,
    )
    .bind(publisher_id)
    .fetch_all(pool)
    .await
    .context("Failed to list applications by publisher")?;

    Ok(rows
        .iter()
        .map(row_to_application_with_meta_sqlite)
        .collect())
}

async fn list_applications_by_campaign_owner_sqlite(
    pool: &SqlitePool,
    owner_id: &str,
) -> Result<Vec<ApplicationWithMeta>> {
    let rows = sqlx::query(
        r#"
        SELECT a.*, c.title AS campaign_title, c.brand AS campaign_brand,
               u.full_name AS publisher_name, u.email AS publisher_email
        FROM campaign_applications a
        JOIN campaigns c ON a.campaign_id = c.id
        JOIN users u ON a.publisher_id = u.id
        WHERE c.created_by = ?
        ORDER BY a.created_at DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
    .context("Failed to list applications by campaign owner")?;

    Ok(rows
        .iter()
        .map(row_to_application_with_meta_sqlite)
        .collect())
}

async fn has_open_application_sqlite(
    pool: &SqlitePool,
    campaign_id: &str,
    publisher_id: &str,
) -> Result<bool> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) as count FROM campaign_applications
        WHERE campaign_id = ? AND publisher_id = ?
          AND status IN ('pending', 'sp_approved', 'advertiser_approved')
        "#,
    )
    .bind(campaign_id)
    .bind(publisher_id)
    .fetch_one(pool)
    .await
    .context("Failed to check for open application")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn update_application_status_sqlite(
    pool: &SqlitePool,
    id: &str,
    status: ReviewStatus,
    reviewer_id: &str,
) -> Result<CampaignApplication> {
    let now = Utc::now();

    let query = match status.stage() {
        Some(ReviewStage::Sp) => sqlx::query(
            r#"
            UPDATE campaign_applications
            SET status = ?, sp_reviewed_by = ?, sp_reviewed_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(reviewer_id)
        .bind(now)
        .bind(now)
        .bind(id),
        Some(ReviewStage::Advertiser) => sqlx::query(
            r#"
            UPDATE campaign_applications
            SET status = ?, advertiser_reviewed_by = ?, advertiser_reviewed_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(reviewer_id)
        .bind(now)
        .bind(now)
        .bind(id),
        None => sqlx::query(
            r#"
            UPDATE campaign_applications
            SET status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(now)
        .bind(id),
    };

    query
        .execute(pool)
        .await
        .context("Failed to update application status")?;

    get_application_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Application not found after update"))
}

fn row_to_application_sqlite(row: &sqlx::sqlite::SqliteRow) -> CampaignApplication {
    CampaignApplication {
        id: row.get("id"),
        campaign_id: row.get("campaign_id"),
        publisher_id: row.get("publisher_id"),
        status: row.get::<String, _>("status").parse().unwrap_or_default(),
        message: row.get("message"),
        sp_reviewed_by: row.get("sp_reviewed_by"),
        sp_reviewed_at: row.get("sp_reviewed_at"),
        advertiser_reviewed_by: row.get("advertiser_reviewed_by"),
        advertiser_reviewed_at: row.get("advertiser_reviewed_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_application_with_meta_sqlite(row: &sqlx::sqlite::SqliteRow) -> ApplicationWithMeta {
    ApplicationWithMeta {
        id: row.get("id"),
        campaign_id: row.get("campaign_id"),
        publisher_id: row.get("publisher_id"),
        status: row.get::<String, _>("status").parse().unwrap_or_default(),
        message: row.get("message"),
        sp_reviewed_by: row.get("sp_reviewed_by"),
        sp_reviewed_at: row.get("sp_reviewed_at"),
        advertiser_reviewed_by: row.get("advertiser_reviewed_by"),
        advertiser_reviewed_at: row.get("advertiser_reviewed_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        campaign_title: row.get("campaign_title"),
        campaign_brand: row.get("campaign_brand"),
        publisher_name: row.get("publisher_name"),
        publisher_email: row.get("publisher_email"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_application_mysql(
    pool: &MySqlPool,
    application: &CampaignApplication,
) -> Result<CampaignApplication> {
    sqlx::query(
        r#"
        INSERT INTO campaign_applications (id, campaign_id, publisher_id, status, message, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&application.id)
    .bind(&application.campaign_id)
    .bind(&application.publisher_id)
    .bind(application.status.to_string())
    .bind(&application.message)
    .bind(application.created_at)
    .bind(application.updated_at)
    .execute(pool)
    .await
    .context("Failed to create application")?;

    Ok(application.clone())
}

async fn get_application_by_id_mysql(
    pool: &MySqlPool,
    id: &str,
) -> Result<Option<CampaignApplication>> {
    let row = sqlx::query(
        r#"
        SELECT id, campaign_id, publisher_id, status, message,
               sp_reviewed_by, sp_reviewed_at, advertiser_reviewed_by, advertiser_reviewed_at,
               created_at, updated_at
        FROM campaign_applications
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get application by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_application_mysql(&row))),
        None => Ok(None),
    }
}

async fn get_application_with_meta_mysql(
    pool: &MySqlPool,
    id: &str,
) -> Result<Option<ApplicationWithMeta>> {
    let row = sqlx::query(
        r#"
        SELECT a.*, c.title AS campaign_title, c.brand AS campaign_brand,
               u.full_name AS publisher_name, u.email AS publisher_email
        FROM campaign_applications a
        JOIN campaigns c ON a.campaign_id = c.id
        JOIN users u ON a.publisher_id = u.id
        WHERE a.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get application with details")?;

    Ok(row.map(|row| row_to_application_with_meta_mysql(&row)))
}

async fn list_applications_mysql(pool: &MySqlPool) -> Result<Vec<ApplicationWithMeta>> {
    let rows = sqlx::query(
        r#"
        SELECT a.*, c.title AS campaign_title, c.brand AS campaign_brand,
               u.full_name AS publisher_name, u.email AS publisher_email
        FROM campaign_applications a
        JOIN campaigns c ON a.campaign_id = c.id
        JOIN users u ON a.publisher_id = u.id
        ORDER BY a.created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
    .context("Failed to list applications")?;

    Ok(rows
        .iter()
        .map(row_to_application_with_meta_mysql)
        .collect())
}

async fn list_applications_by_publisher_mysql(
    pool: &MySqlPool,
    publisher_id: &str,
) -> Result<Vec<ApplicationWithMeta>> {
    let rows = sqlx::query(
        r#"
        SELECT a.*, c.title AS campaign_title, c.brand AS campaign_brand,
               u.full_name AS publisher_name, u.email AS publisher_email
        FROM campaign_applications a
        JOIN campaigns c ON a.campaign_id = c.id
        JOIN users u ON a.publisher_id = u.id
        WHERE a.publisher_id = ?
        ORDER BY a.created_at DESC
        "#,
    )
    .bind(publisher_id)
    .fetch_all(pool)
    .await
    .context("Failed to list applications by publisher")?;

    Ok(rows
        .iter()
        .map(row_to_application_with_meta_mysql)
        .collect())
}

async fn list_applications_by_campaign_owner_mysql(
    pool: &MySqlPool,
    owner_id: &str,
) -> Result<Vec<ApplicationWithMeta>> {
    let rows = sqlx::query(
        r#"
        SELECT a.*, c.title AS campaign_title, c.brand AS campaign_brand,
               u.full_name AS publisher_name, u.email AS publisher_email
        FROM campaign_applications a
        JOIN campaigns c ON a.campaign_id = c.id
        JOIN users u ON a.publisher_id = u.id
        WHERE c.created_by = ?
        ORDER BY a.created_at DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
    .context("Failed to list applications by campaign owner")?;

    Ok(rows
        .iter()
        .map(row_to_application_with_meta_mysql)
        .collect())
}

async fn has_open_application_mysql(
    pool: &MySqlPool,
    campaign_id: &str,
    publisher_id: &str,
) -> Result<bool> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) as count FROM campaign_applications
        WHERE campaign_id = ? AND publisher_id = ?
          AND status IN ('pending', 'sp_approved', 'advertiser_approved')
        "#,
    )
    .bind(campaign_id)
    .bind(publisher_id)
    .fetch_one(pool)
    .await
    .context("Failed to check for open application")?;

    let count: i64 = row.get("count");
    Ok(count > 0)
}

async fn update_application_status_mysql(
    pool: &MySqlPool,
    id: &str,
    status: ReviewStatus,
    reviewer_id: &str,
) -> Result<CampaignApplication> {
    let now = Utc::now();

    let query = match status.stage() {
        Some(ReviewStage::Sp) => sqlx::query(
            r#"
            UPDATE campaign_applications
            SET status = ?, sp_reviewed_by = ?, sp_reviewed_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(reviewer_id)
        .bind(now)
        .bind(now)
        .bind(id),
        Some(ReviewStage::Advertiser) => sqlx::query(
            r#"
            UPDATE campaign_applications
            SET status = ?, advertiser_reviewed_by = ?, advertiser_reviewed_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(reviewer_id)
        .bind(now)
        .bind(now)
        .bind(id),
        None => sqlx::query(
            r#"
            UPDATE campaign_applications
            SET status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(status.to_string())
        .bind(now)
        .bind(id),
    };

    query
        .execute(pool)
        .await
        .context("Failed to update application status")?;

    get_application_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Application not found after update"))
}

fn row_to_application_mysql(row: &sqlx::mysql::MySqlRow) -> CampaignApplication {
    CampaignApplication {
        id: row.get("id"),
        campaign_id: row.get("campaign_id"),
        publisher_id: row.get("publisher_id"),
        status: row.get::<String, _>("status").parse().unwrap_or_default(),
        message: row.get("message"),
        sp_reviewed_by: row.get("sp_reviewed_by"),
        sp_reviewed_at: row.get("sp_reviewed_at"),
        advertiser_reviewed_by: row.get("advertiser_reviewed_by"),
        advertiser_reviewed_at: row.get("advertiser_reviewed_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn row_to_application_with_meta_mysql(row: &sqlx::mysql::MySqlRow) -> ApplicationWithMeta {
    ApplicationWithMeta {
        id: row.get("id"),
        campaign_id: row.get("campaign_id"),
        publisher_id: row.get("publisher_id"),
        status: row.get::<String, _>("status").parse().unwrap_or_default(),
        message: row.get("message"),
        sp_reviewed_by: row.get("sp_reviewed_by"),
        sp_reviewed_at: row.get("sp_reviewed_at"),
        advertiser_reviewed_by: row.get("advertiser_reviewed_by"),
        advertiser_reviewed_at: row.get("advertiser_reviewed_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        campaign_title: row.get("campaign_title"),
        campaign_brand: row.get("campaign_brand"),
        publisher_name: row.get("publisher_name"),
        publisher_email: row.get("publisher_email"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::campaign::{CampaignRepository, SqlxCampaignRepository};
    use crate::db::repositories::user::{SqlxUserRepository, UserRepository};
    use crate::db::{create_test_pool, migrations};
    use crate::models::{Campaign, CreateCampaignInput, User, UserRole};

    struct TestContext {
        repo: SqlxApplicationRepository,
        publisher: User,
        sp_reviewer: User,
        advertiser: User,
        campaign: Campaign,
    }

    async fn setup_test_context() -> TestContext {
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
            .expect("Failed to create publisher");
        let sp_reviewer = users
            .create(&User::new(
                "sp@example.com".to_string(),
                "Sam Reviewer".to_string(),
                "hashed".to_string(),
                UserRole::SpTeam,
            ))
            .await
            .expect("Failed to create sp reviewer");
        let advertiser = users
            .create(&User::new(
                "advertiser@example.com".to_string(),
                "Ada Advertiser".to_string(),
                "hashed".to_string(),
                UserRole::Advertiser,
            ))
            .await
            .expect("Failed to create advertiser");

        let campaigns = SqlxCampaignRepository::new(pool.clone());
        let campaign = campaigns
            .create(&Campaign::new(
                CreateCampaignInput {
                    title: "Summer Launch".to_string(),
                    brand: "Acme".to_string(),
                    description: "Promote the summer line".to_string(),
                    budget: "$2,000".to_string(),
                    deadline: "2026-09-30".to_string(),
                    requirements: vec![],
                },
                advertiser.id.clone(),
            ))
            .await
            .expect("Failed to create campaign");

        TestContext {
            repo: SqlxApplicationRepository::new(pool),
            publisher,
            sp_reviewer,
            advertiser,
            campaign,
        }
    }

    fn test_application(ctx: &TestContext) -> CampaignApplication {
        CampaignApplication::new(
            ctx.campaign.id.clone(),
            ctx.publisher.id.clone(),
            Some("Experience: 5 years\n\nAudience: tech\n\nVideo Ideas: unboxing".to_string()),
        )
    }

    #[tokio::test]
    async fn test_create_and_get_application() {
        let ctx = setup_test_context().await;

        let application = test_application(&ctx);
        ctx.repo
            .create(&application)
            .await
            .expect("Failed to create application");

        let found = ctx
            .repo
            .get_by_id(&application.id)
            .await
            .expect("Failed to get application")
            .expect("Application not found");

        assert_eq!(found.status, ReviewStatus::Pending);
        assert_eq!(found.campaign_id, ctx.campaign.id);
        assert!(found.sp_reviewed_by.is_none());
        assert!(found.sp_reviewed_at.is_none());
    }

    #[tokio::test]
    async fn test_get_with_meta_includes_campaign_and_publisher() {
        let ctx = setup_test_context().await;

        let application = test_application(&ctx);
        ctx.repo
            .create(&application)
            .await
            .expect("Failed to create application");

        let with_meta = ctx
            .repo
            .get_with_meta(&application.id)
            .await
            .expect("Failed to get application")
            .expect("Application not found");

        assert_eq!(with_meta.campaign_title, "Summer Launch");
        assert_eq!(with_meta.campaign_brand, "Acme");
        assert_eq!(with_meta.publisher_name, "Pat Publisher");
        assert_eq!(with_meta.publisher_email, "publisher@example.com");
    }

    #[tokio::test]
    async fn test_list_by_publisher_excludes_others() {
        let ctx = setup_test_context().await;

        let application = test_application(&ctx);
        ctx.repo
            .create(&application)
            .await
            .expect("Failed to create application");

        let own = ctx
            .repo
            .list_by_publisher(&ctx.publisher.id)
            .await
            .expect("Failed to list applications");
        assert_eq!(own.len(), 1);

        let other = ctx
            .repo
            .list_by_publisher(&ctx.advertiser.id)
            .await
            .expect("Failed to list applications");
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_list_by_campaign_owner() {
        let ctx = setup_test_context().await;

        let application = test_application(&ctx);
        ctx.repo
            .create(&application)
            .await
            .expect("Failed to create application");

        let owned = ctx
            .repo
            .list_by_campaign_owner(&ctx.advertiser.id)
            .await
            .expect("Failed to list applications");
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, application.id);

        let unowned = ctx
            .repo
            .list_by_campaign_owner(&ctx.publisher.id)
            .await
            .expect("Failed to list applications");
        assert!(unowned.is_empty());
    }

    #[tokio::test]
    async fn test_has_open_application_ignores_rejected() {
        let ctx = setup_test_context().await;

        let application = test_application(&ctx);
        ctx.repo
            .create(&application)
            .await
            .expect("Failed to create application");

        assert!(ctx
            .repo
            .has_open_application(&ctx.campaign.id, &ctx.publisher.id)
            .await
            .expect("Failed to check open application"));

        ctx.repo
            .update_status(&application.id, ReviewStatus::SpRejected, &ctx.sp_reviewer.id)
            .await
            .expect("Failed to update status");

        assert!(!ctx
            .repo
            .has_open_application(&ctx.campaign.id, &ctx.publisher.id)
            .await
            .expect("Failed to check open application"));
    }

    #[tokio::test]
    async fn test_update_status_stamps_sp_stage() {
        let ctx = setup_test_context().await;

        let application = test_application(&ctx);
        ctx.repo
            .create(&application)
            .await
            .expect("Failed to create application");

        let updated = ctx
            .repo
            .update_status(&application.id, ReviewStatus::SpApproved, &ctx.sp_reviewer.id)
            .await
            .expect("Failed to update status");

        assert_eq!(updated.status, ReviewStatus::SpApproved);
        assert_eq!(
            updated.sp_reviewed_by.as_deref(),
            Some(ctx.sp_reviewer.id.as_str())
        );
        assert!(updated.sp_reviewed_at.is_some());
        assert!(updated.advertiser_reviewed_by.is_none());
        assert!(updated.advertiser_reviewed_at.is_none());
    }

    #[tokio::test]
    async fn test_update_status_stamps_advertiser_stage_separately() {
        let ctx = setup_test_context().await;

        let application = test_application(&ctx);
        ctx.repo
            .create(&application)
            .await
            .expect("Failed to create application");

        ctx.repo
            .update_status(&application.id, ReviewStatus::SpApproved, &ctx.sp_reviewer.id)
            .await
            .expect("Failed to update status");
        let updated = ctx
            .repo
            .update_status(
                &application.id,
                ReviewStatus::AdvertiserApproved,
                &ctx.advertiser.id,
            )
            .await
            .expect("Failed to update status");

        assert_eq!(updated.status, ReviewStatus::AdvertiserApproved);
        assert_eq!(
            updated.sp_reviewed_by.as_deref(),
            Some(ctx.sp_reviewer.id.as_str())
        );
        assert_eq!(
            updated.advertiser_reviewed_by.as_deref(),
            Some(ctx.advertiser.id.as_str())
        );
        assert!(updated.advertiser_reviewed_at.is_some());
    }
}
