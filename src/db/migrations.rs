//! Schema migrations
//!
//! The schema ships inside the binary as an ordered list of [`Migration`]
//! entries, each carrying SQLite and MySQL variants of its DDL. Applied
//! versions are recorded in a `_migrations` table, so startup can call
//! [`run_migrations`] unconditionally and only new entries will run.
//! There is no down path; recovery is restore-from-backup.

use anyhow::{Context, Result};
use sqlx::{MySqlPool, SqlitePool};
use std::collections::HashSet;

use super::DynDatabasePool;
use crate::config::DatabaseDriver;

/// One versioned schema change, with DDL for each supported driver
#[derive(Debug, Clone)]
pub struct Migration {
    /// Position in the ordered migration list
    pub version: i32,
    /// Short name recorded in `_migrations`
    pub name: &'static str,
    /// Statements run on SQLite
    pub up_sqlite: &'static str,
    /// Statements run on MySQL
    pub up_mysql: &'static str,
}

/// Every schema change the binary knows about, in apply order
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS users (
                id VARCHAR(36) PRIMARY KEY,
                email VARCHAR(255) NOT NULL UNIQUE,
                full_name VARCHAR(255) NOT NULL,
                avatar_url VARCHAR(500),
                password_hash VARCHAR(255) NOT NULL,
                role VARCHAR(20) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS users (
                id VARCHAR(36) PRIMARY KEY,
                email VARCHAR(255) NOT NULL UNIQUE,
                full_name VARCHAR(255) NOT NULL,
                avatar_url VARCHAR(500),
                password_hash VARCHAR(255) NOT NULL,
                role VARCHAR(20) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
            );
            CREATE INDEX idx_users_email ON users(email);
        "#,
    },
    Migration {
        version: 2,
        name: "create_sessions",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id VARCHAR(64) PRIMARY KEY,
                user_id VARCHAR(36) NOT NULL,
                expires_at TIMESTAMP NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS sessions (
                id VARCHAR(64) PRIMARY KEY,
                user_id VARCHAR(36) NOT NULL,
                expires_at TIMESTAMP NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX idx_sessions_user_id ON sessions(user_id);
            CREATE INDEX idx_sessions_expires_at ON sessions(expires_at);
        "#,
    },
    Migration {
        version: 3,
        name: "create_campaigns",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS campaigns (
                id VARCHAR(36) PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                brand VARCHAR(255) NOT NULL,
                description TEXT NOT NULL,
                budget VARCHAR(100) NOT NULL,
                deadline VARCHAR(50) NOT NULL,
                requirements TEXT NOT NULL,
                status VARCHAR(20) NOT NULL DEFAULT 'draft',
                created_by VARCHAR(36) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (created_by) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_campaigns_created_by ON campaigns(created_by);
            CREATE INDEX IF NOT EXISTS idx_campaigns_status ON campaigns(status);
            CREATE INDEX IF NOT EXISTS idx_campaigns_created_at ON campaigns(created_at);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS campaigns (
                id VARCHAR(36) PRIMARY KEY,
                title VARCHAR(255) NOT NULL,
                brand VARCHAR(255) NOT NULL,
                description TEXT NOT NULL,
                budget VARCHAR(100) NOT NULL,
                deadline VARCHAR(50) NOT NULL,
                requirements TEXT NOT NULL,
                status VARCHAR(20) NOT NULL DEFAULT 'draft',
                created_by VARCHAR(36) NOT NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
                FOREIGN KEY (created_by) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX idx_campaigns_created_by ON campaigns(created_by);
            CREATE INDEX idx_campaigns_status ON campaigns(status);
            CREATE INDEX idx_campaigns_created_at ON campaigns(created_at);
        "#,
    },
    Migration {
        version: 4,
        name: "create_campaign_applications",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS campaign_applications (
                id VARCHAR(36) PRIMARY KEY,
                campaign_id VARCHAR(36) NOT NULL,
                publisher_id VARCHAR(36) NOT NULL,
                status VARCHAR(30) NOT NULL DEFAULT 'pending',
                message TEXT,
                sp_reviewed_by VARCHAR(36),
                sp_reviewed_at TIMESTAMP,
                advertiser_reviewed_by VARCHAR(36),
                advertiser_reviewed_at TIMESTAMP,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (campaign_id) REFERENCES campaigns(id) ON DELETE CASCADE,
                FOREIGN KEY (publisher_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (sp_reviewed_by) REFERENCES users(id) ON DELETE SET NULL,
                FOREIGN KEY (advertiser_reviewed_by) REFERENCES users(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_applications_campaign_id ON campaign_applications(campaign_id);
            CREATE INDEX IF NOT EXISTS idx_applications_publisher_id ON campaign_applications(publisher_id);
            CREATE INDEX IF NOT EXISTS idx_applications_status ON campaign_applications(status);
            CREATE INDEX IF NOT EXISTS idx_applications_created_at ON campaign_applications(created_at);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS campaign_applications (
                id VARCHAR(36) PRIMARY KEY,
                campaign_id VARCHAR(36) NOT NULL,
                publisher_id VARCHAR(36) NOT NULL,
                status VARCHAR(30) NOT NULL DEFAULT 'pending',
                message TEXT,
                sp_reviewed_by VARCHAR(36),
                sp_reviewed_at TIMESTAMP NULL,
                advertiser_reviewed_by VARCHAR(36),
                advertiser_reviewed_at TIMESTAMP NULL,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
                FOREIGN KEY (campaign_id) REFERENCES campaigns(id) ON DELETE CASCADE,
                FOREIGN KEY (publisher_id) REFERENCES users(id) ON DELETE CASCADE,
                FOREIGN KEY (sp_reviewed_by) REFERENCES users(id) ON DELETE SET NULL,
                FOREIGN KEY (advertiser_reviewed_by) REFERENCES users(id) ON DELETE SET NULL
            );
            CREATE INDEX idx_applications_campaign_id ON campaign_applications(campaign_id);
            CREATE INDEX idx_applications_publisher_id ON campaign_applications(publisher_id);
            CREATE INDEX idx_applications_status ON campaign_applications(status);
            CREATE INDEX idx_applications_created_at ON campaign_applications(created_at);
        "#,
    },
    Migration {
        version: 5,
        name: "create_videos",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS videos (
                id VARCHAR(36) PRIMARY KEY,
                application_id VARCHAR(36) NOT NULL,
                title VARCHAR(255) NOT NULL,
                url TEXT NOT NULL,
                description TEXT,
                status VARCHAR(30) NOT NULL DEFAULT 'pending',
                sp_reviewed_by VARCHAR(36),
                sp_reviewed_at TIMESTAMP,
                advertiser_reviewed_by VARCHAR(36),
                advertiser_reviewed_at TIMESTAMP,
                uploaded_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (application_id) REFERENCES campaign_applications(id) ON DELETE CASCADE,
                FOREIGN KEY (sp_reviewed_by) REFERENCES users(id) ON DELETE SET NULL,
                FOREIGN KEY (advertiser_reviewed_by) REFERENCES users(id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_videos_application_id ON videos(application_id);
            CREATE INDEX IF NOT EXISTS idx_videos_status ON videos(status);
            CREATE INDEX IF NOT EXISTS idx_videos_uploaded_at ON videos(uploaded_at);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS videos (
                id VARCHAR(36) PRIMARY KEY,
                application_id VARCHAR(36) NOT NULL,
                title VARCHAR(255) NOT NULL,
                url TEXT NOT NULL,
                description TEXT,
                status VARCHAR(30) NOT NULL DEFAULT 'pending',
                sp_reviewed_by VARCHAR(36),
                sp_reviewed_at TIMESTAMP NULL,
                advertiser_reviewed_by VARCHAR(36),
                advertiser_reviewed_at TIMESTAMP NULL,
                uploaded_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (application_id) REFERENCES campaign_applications(id) ON DELETE CASCADE,
                FOREIGN KEY (sp_reviewed_by) REFERENCES users(id) ON DELETE SET NULL,
                FOREIGN KEY (advertiser_reviewed_by) REFERENCES users(id) ON DELETE SET NULL
            );
            CREATE INDEX idx_videos_application_id ON videos(application_id);
            CREATE INDEX idx_videos_status ON videos(status);
            CREATE INDEX idx_videos_uploaded_at ON videos(uploaded_at);
        "#,
    },
    Migration {
        version: 6,
        name: "create_notifications",
        up_sqlite: r#"
            CREATE TABLE IF NOT EXISTS notifications (
                id VARCHAR(36) PRIMARY KEY,
                user_id VARCHAR(36) NOT NULL,
                type VARCHAR(20) NOT NULL DEFAULT 'info',
                title VARCHAR(255) NOT NULL,
                message TEXT NOT NULL,
                related_id VARCHAR(36),
                related_type VARCHAR(50),
                is_read BOOLEAN NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_notifications_user_id ON notifications(user_id);
            CREATE INDEX IF NOT EXISTS idx_notifications_user_read ON notifications(user_id, is_read);
            CREATE INDEX IF NOT EXISTS idx_notifications_created_at ON notifications(created_at);
        "#,
        up_mysql: r#"
            CREATE TABLE IF NOT EXISTS notifications (
                id VARCHAR(36) PRIMARY KEY,
                user_id VARCHAR(36) NOT NULL,
                type VARCHAR(20) NOT NULL DEFAULT 'info',
                title VARCHAR(255) NOT NULL,
                message TEXT NOT NULL,
                related_id VARCHAR(36),
                related_type VARCHAR(50),
                is_read BOOLEAN NOT NULL DEFAULT 0,
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
            );
            CREATE INDEX idx_notifications_user_id ON notifications(user_id);
            CREATE INDEX idx_notifications_user_read ON notifications(user_id, is_read);
            CREATE INDEX idx_notifications_created_at ON notifications(created_at);
        "#,
    },
];

/// Bring the schema up to date, returning how many migrations ran.
///
/// Safe to call on every startup; versions already recorded in
/// `_migrations` are skipped.
pub async fn run_migrations(pool: &DynDatabasePool) -> Result<usize> {
    ensure_tracking_table(pool).await?;
    let applied = applied_versions(pool).await?;

    let mut ran = 0;
    for migration in MIGRATIONS.iter().filter(|m| !applied.contains(&m.version)) {
        tracing::info!("Applying migration {} ({})", migration.version, migration.name);
        apply_migration(pool, migration)
            .await
            .with_context(|| format!("Migration {} failed", migration.name))?;
        ran += 1;
    }

    if ran == 0 {
        tracing::debug!("Schema is current");
    } else {
        tracing::info!("Ran {} migration(s)", ran);
    }
    Ok(ran)
}

/// Whether every known migration has been applied
pub async fn is_up_to_date(pool: &DynDatabasePool) -> Result<bool> {
    ensure_tracking_table(pool).await?;
    let applied = applied_versions(pool).await?;
    Ok(MIGRATIONS.iter().all(|m| applied.contains(&m.version)))
}

/// How many migrations the next [`run_migrations`] call would run
pub async fn pending_count(pool: &DynDatabasePool) -> Result<usize> {
    ensure_tracking_table(pool).await?;
    let applied = applied_versions(pool).await?;
    Ok(MIGRATIONS
        .iter()
        .filter(|m| !applied.contains(&m.version))
        .count())
}

/// Create `_migrations` on first contact with a database
async fn ensure_tracking_table(pool: &DynDatabasePool) -> Result<()> {
    let ddl = match pool.driver() {
        DatabaseDriver::Sqlite => {
            "CREATE TABLE IF NOT EXISTS _migrations (
                 version INTEGER PRIMARY KEY,
                 name VARCHAR(255) NOT NULL UNIQUE,
                 applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
             )"
        }
        DatabaseDriver::Mysql => {
            "CREATE TABLE IF NOT EXISTS _migrations (
                 version INT PRIMARY KEY,
                 name VARCHAR(255) NOT NULL UNIQUE,
                 applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
             )"
        }
    };

    pool.execute(ddl)
        .await
        .context("Failed to create the _migrations table")?;
    Ok(())
}

/// Versions already recorded in `_migrations`
async fn applied_versions(pool: &DynDatabasePool) -> Result<HashSet<i32>> {
    let versions: Vec<i32> = match pool.driver() {
        DatabaseDriver::Sqlite => {
            sqlx::query_scalar("SELECT version FROM _migrations")
                .fetch_all(pool.as_sqlite().unwrap())
                .await
        }
        DatabaseDriver::Mysql => {
            sqlx::query_scalar("SELECT version FROM _migrations")
                .fetch_all(pool.as_mysql().unwrap())
                .await
        }
    }
    .context("Failed to read applied migrations")?;

    Ok(versions.into_iter().collect())
}

/// Run one migration's statements, then record its version
async fn apply_migration(pool: &DynDatabasePool, migration: &Migration) -> Result<()> {
    match pool.driver() {
        DatabaseDriver::Sqlite => {
            apply_migration_sqlite(pool.as_sqlite().unwrap(), migration).await
        }
        DatabaseDriver::Mysql => apply_migration_mysql(pool.as_mysql().unwrap(), migration).await,
    }
}

async fn apply_migration_sqlite(pool: &SqlitePool, migration: &Migration) -> Result<()> {
    for statement in sql_statements(migration.up_sqlite) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Statement failed: {}", preview(statement)))?;
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to record migration {}", migration.version))?;

    Ok(())
}

async fn apply_migration_mysql(pool: &MySqlPool, migration: &Migration) -> Result<()> {
    for statement in sql_statements(migration.up_mysql) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Statement failed: {}", preview(statement)))?;
    }

    sqlx::query("INSERT INTO _migrations (version, name) VALUES (?, ?)")
        .bind(migration.version)
        .bind(migration.name)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to record migration {}", migration.version))?;

    Ok(())
}

/// Split a migration script into runnable statements.
///
/// sqlx executes one statement per query, so scripts are cut at
/// semicolons. Chunks that are empty or hold nothing but `--` comments
/// are dropped.
fn sql_statements(sql: &str) -> Vec<&str> {
    sql.split(';')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty() && !comment_only(chunk))
        .collect()
}

fn comment_only(chunk: &str) -> bool {
    chunk
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with("--"))
}

/// First hundred characters of a statement, for error text
fn preview(sql: &str) -> String {
    if sql.len() <= 100 {
        return sql.to_string();
    }
    let head: String = sql.chars().take(100).collect();
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    async fn fresh_pool() -> DynDatabasePool {
        create_test_pool().await.expect("Failed to create test pool")
    }

    async fn seed_user(pool: &SqlitePool, id: &str, role: &str) {
        sqlx::query(
            "INSERT INTO users (id, email, full_name, password_hash, role) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(format!("{}@adbridge.io", id))
        .bind("Schema Tester")
        .bind("hashed")
        .bind(role)
        .execute(pool)
        .await
        .expect("Failed to insert user");
    }

    #[test]
    fn test_versions_are_unique_and_ordered() {
        for pair in MIGRATIONS.windows(2) {
            assert!(
                pair[0].version < pair[1].version,
                "migration {} must precede {}",
                pair[0].version,
                pair[1].version
            );
        }
    }

    #[test]
    fn test_statement_splitting() {
        let statements = sql_statements(
            "CREATE TABLE a (id INT);\n-- a comment\nCREATE INDEX i ON a(id);\n  ",
        );
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE"));
        assert!(statements[1].contains("CREATE INDEX"));
    }

    #[tokio::test]
    async fn test_fresh_database_applies_everything() {
        let pool = fresh_pool().await;

        let first = run_migrations(&pool).await.expect("Failed to run migrations");
        assert_eq!(first, MIGRATIONS.len());

        let second = run_migrations(&pool).await.expect("Failed to run migrations");
        assert_eq!(second, 0, "second run must be a no-op");
    }

    #[tokio::test]
    async fn test_status_helpers_track_progress() {
        let pool = fresh_pool().await;

        assert!(!is_up_to_date(&pool).await.expect("Failed to check"));
        assert_eq!(
            pending_count(&pool).await.expect("Failed to check"),
            MIGRATIONS.len()
        );

        run_migrations(&pool).await.expect("Failed to run migrations");

        assert!(is_up_to_date(&pool).await.expect("Failed to check"));
        assert_eq!(pending_count(&pool).await.expect("Failed to check"), 0);
    }

    #[tokio::test]
    async fn test_schema_accepts_user_row() {
        let pool = fresh_pool().await;
        run_migrations(&pool).await.expect("Failed to run migrations");

        seed_user(pool.as_sqlite().unwrap(), "pub-1", "publisher").await;
    }

    #[tokio::test]
    async fn test_schema_accepts_campaign_row() {
        let pool = fresh_pool().await;
        run_migrations(&pool).await.expect("Failed to run migrations");
        let sqlite_pool = pool.as_sqlite().unwrap();

        seed_user(sqlite_pool, "adv-1", "advertiser").await;

        let result = sqlx::query(
            "INSERT INTO campaigns (id, title, brand, description, budget, deadline, requirements, status, created_by) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind("camp-1")
        .bind("Launch")
        .bind("Acme")
        .bind("Desc")
        .bind("$100")
        .bind("2025-09-01")
        .bind("[]")
        .bind("active")
        .bind("adv-1")
        .execute(sqlite_pool)
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_application_requires_existing_campaign() {
        let pool = fresh_pool().await;
        run_migrations(&pool).await.expect("Failed to run migrations");
        let sqlite_pool = pool.as_sqlite().unwrap();

        seed_user(sqlite_pool, "pub-1", "publisher").await;

        // Foreign keys are on, so a dangling campaign_id must fail
        let result = sqlx::query(
            "INSERT INTO campaign_applications (id, campaign_id, publisher_id, status) VALUES (?, ?, ?, ?)",
        )
        .bind("app-1")
        .bind("no-such-campaign")
        .bind("pub-1")
        .bind("pending")
        .execute(sqlite_pool)
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_schema_accepts_notification_row() {
        let pool = fresh_pool().await;
        run_migrations(&pool).await.expect("Failed to run migrations");
        let sqlite_pool = pool.as_sqlite().unwrap();

        seed_user(sqlite_pool, "user-1", "publisher").await;

        let result = sqlx::query(
            "INSERT INTO notifications (id, user_id, type, title, message) VALUES (?, ?, ?, ?, ?)",
        )
        .bind("notif-1")
        .bind("user-1")
        .bind("success")
        .bind("Application Approved")
        .bind("Your application passed SP review.")
        .execute(sqlite_pool)
        .await;

        assert!(result.is_ok());
    }
}
