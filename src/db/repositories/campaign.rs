//! Campaign repository
//!
//! Database operations for advertiser campaigns. The requirements list is
//! stored as a JSON-encoded TEXT column so both drivers share one shape.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Campaign, CampaignStatus};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Campaign repository trait
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// Create a new campaign
    async fn create(&self, campaign: &Campaign) -> Result<Campaign>;

    /// Get campaign by ID
    async fn get_by_id(&self, id: &str) -> Result<Option<Campaign>>;

    /// List all campaigns, newest first
    async fn list_all(&self) -> Result<Vec<Campaign>>;

    /// List campaigns created by a specific user, newest first
    async fn list_by_creator(&self, creator_id: &str) -> Result<Vec<Campaign>>;

    /// List campaigns currently open for applications, newest first
    async fn list_active(&self) -> Result<Vec<Campaign>>;

    /// Update campaign status, returning the refreshed row
    async fn update_status(&self, id: &str, status: CampaignStatus) -> Result<Campaign>;
}

/// sqlx implementation working over either supported driver
pub struct SqlxCampaignRepository {
    pool: DynDatabasePool,
}

impl SqlxCampaignRepository {
    /// Build a repository over the given pool
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Arc-wrapped constructor, convenient for service wiring
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CampaignRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CampaignRepository for SqlxCampaignRepository {
    async fn create(&self, campaign: &Campaign) -> Result<Campaign> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                create_campaign_sqlite(self.pool.as_sqlite().unwrap(), campaign).await
            }
            DatabaseDriver::Mysql => {
                create_campaign_mysql(self.pool.as_mysql().unwrap(), campaign).await
            }
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Campaign>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                get_campaign_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                get_campaign_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn list_all(&self) -> Result<Vec<Campaign>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_campaigns_sqlite(self.pool.as_sqlite().unwrap(), None, false).await
            }
            DatabaseDriver::Mysql => {
                list_campaigns_mysql(self.pool.as_mysql().unwrap(), None, false).await
            }
        }
    }

    async fn list_by_creator(&self, creator_id: &str) -> Result<Vec<Campaign>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_campaigns_sqlite(self.pool.as_sqlite().unwrap(), Some(creator_id), false).await
            }
            DatabaseDriver::Mysql => {
                list_campaigns_mysql(self.pool.as_mysql().unwrap(), Some(creator_id), false).await
            }
        }
    }

    async fn list_active(&self) -> Result<Vec<Campaign>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                list_campaigns_sqlite(self.pool.as_sqlite().unwrap(), None, true).await
            }
            DatabaseDriver::Mysql => {
                list_campaigns_mysql(self.pool.as_mysql().unwrap(), None, true).await
            }
        }
    }

    async fn update_status(&self, id: &str, status: CampaignStatus) -> Result<Campaign> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                update_campaign_status_sqlite(self.pool.as_sqlite().unwrap(), id, status).await
            }
            DatabaseDriver::Mysql => {
                update_campaign_status_mysql(self.pool.as_mysql().unwrap(), id, status).await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_campaign_sqlite(pool: &SqlitePool, campaign: &Campaign) -> Result<Campaign> {
    let requirements_json = serde_json::to_string(&campaign.requirements)
        .context("Failed to serialize campaign requirements")?;

    sqlx::query(
        r#"
        INSERT INTO campaigns (id, title, brand, description, budget, deadline, requirements, status, created_by, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&campaign.id)
    .bind(&campaign.title)
    .bind(&campaign.brand)
    .bind(&campaign.description)
    .bind(&campaign.budget)
    .bind(&campaign.deadline)
    .bind(&requirements_json)
    .bind(campaign.status.to_string())
    .bind(&campaign.created_by)
    .bind(campaign.created_at)
    .bind(campaign.updated_at)
    .execute(pool)
    .await
    .context("Failed to create campaign")?;

    Ok(campaign.clone())
}

async fn get_campaign_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<Campaign>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, brand, description, budget, deadline, requirements, status, created_by, created_at, updated_at
        FROM campaigns
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get campaign by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_campaign_sqlite(&row)?)),
        None => Ok(None),
    }
}

async fn list_campaigns_sqlite(
    pool: &SqlitePool,
    creator_id: Option<&str>,
    active_only: bool,
) -> Result<Vec<Campaign>> {
    let rows = match (creator_id, active_only) {
        (Some(creator), _) => {
            sqlx::query(
                r#"
                SELECT id, title, brand, description, budget, deadline, requirements, status, created_by, created_at, updated_at
                FROM campaigns
                WHERE created_by = ?
                ORDER BY created_at DESC
                "#,
            )
            .bind(creator)
            .fetch_all(pool)
            .await
        }
        (None, true) => {
            sqlx::query(
                r#"
                SELECT id, title, brand, description, budget, deadline, requirements, status, created_by, created_at, updated_at
                FROM campaigns
                WHERE status = 'active'
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(pool)
            .await
        }
        (None, false) => {
            sqlx::query(
                r#"
                SELECT id, title, brand, description, budget, deadline, requirements, status, created_by, created_at, updated_at
                FROM campaigns
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(pool)
            .await
        }
    }
    .context("Failed to list campaigns")?;

    rows.iter().map(row_to_campaign_sqlite).collect()
}

async fn update_campaign_status_sqlite(
    pool: &SqlitePool,
    id: &str,
    status: CampaignStatus,
) -> Result<Campaign> {
    sqlx::query(
        r#"
        UPDATE campaigns
        SET status = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(status.to_string())
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update campaign status")?;

    get_campaign_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Campaign not found after update"))
}

fn row_to_campaign_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<Campaign> {
    let status_str: String = row.get("status");
    let requirements_json: String = row.get("requirements");

    Ok(Campaign {
        id: row.get("id"),
        title: row.get("title"),
        brand: row.get("brand"),
        description: row.get("description"),
        budget: row.get("budget"),
        deadline: row.get("deadline"),
        requirements: serde_json::from_str(&requirements_json).unwrap_or_default(),
        status: status_str.parse().unwrap_or_default(),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_campaign_mysql(pool: &MySqlPool, campaign: &Campaign) -> Result<Campaign> {
    let requirements_json = serde_json::to_string(&campaign.requirements)
        .context("Failed to serialize campaign requirements")?;

    sqlx::query(
        r#"
        INSERT INTO campaigns (id, title, brand, description, budget, deadline, requirements, status, created_by, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&campaign.id)
    .bind(&campaign.title)
    .bind(&campaign.brand)
    .bind(&campaign.description)
    .bind(&campaign.budget)
    .bind(&campaign.deadline)
    .bind(&requirements_json)
    .bind(campaign.status.to_string())
    .bind(&campaign.created_by)
    .bind(campaign.created_at)
    .bind(campaign.updated_at)
    .execute(pool)
    .await
    .context("Failed to create campaign")?;

    Ok(campaign.clone())
}

async fn get_campaign_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<Campaign>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, brand, description, budget, deadline, requirements, status, created_by, created_at, updated_at
        FROM campaigns
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get campaign by ID")?;

    match row {
        Some(row) => Ok(Some(row_to_campaign_mysql(&row)?)),
        None => Ok(None),
    }
}

async fn list_campaigns_mysql(
    pool: &MySqlPool,
    creator_id: Option<&str>,
    active_only: bool,
) -> Result<Vec<Campaign>> {
    let rows = match (creator_id, active_only) {
        (Some(creator), _) => {
            sqlx::query(
                r#"
                SELECT id, title, brand, description, budget, deadline, requirements, status, created_by, created_at, updated_at
                FROM campaigns
                WHERE created_by = ?
                ORDER BY created_at DESC
                "#,
            )
            .bind(creator)
            .fetch_all(pool)
            .await
        }
        (None, true) => {
            sqlx::query(
                r#"
                SELECT id, title, brand, description, budget, deadline, requirements, status, created_by, created_at, updated_at
                FROM campaigns
                WHERE status = 'active'
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(pool)
            .await
        }
        (None, false) => {
            sqlx::query(
                r#"
                SELECT id, title, brand, description, budget, deadline, requirements, status, created_by, created_at, updated_at
                FROM campaigns
                ORDER BY created_at DESC
                "#,
            )
            .fetch_all(pool)
            .await
        }
    }
    .context("Failed to list campaigns")?;

    rows.iter().map(row_to_campaign_mysql).collect()
}

async fn update_campaign_status_mysql(
    pool: &MySqlPool,
    id: &str,
    status: CampaignStatus,
) -> Result<Campaign> {
    sqlx::query(
        r#"
        UPDATE campaigns
        SET status = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(status.to_string())
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .context("Failed to update campaign status")?;

    get_campaign_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Campaign not found after update"))
}

fn row_to_campaign_mysql(row: &sqlx::mysql::MySqlRow) -> Result<Campaign> {
    let status_str: String = row.get("status");
    let requirements_json: String = row.get("requirements");

    Ok(Campaign {
        id: row.get("id"),
        title: row.get("title"),
        brand: row.get("brand"),
        description: row.get("description"),
        budget: row.get("budget"),
        deadline: row.get("deadline"),
        requirements: serde_json::from_str(&requirements_json).unwrap_or_default(),
        status: status_str.parse().unwrap_or_default(),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
