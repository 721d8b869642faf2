//! Driver-dispatching connection pools
//!
//! One deployment runs on a SQLite file, another on a MySQL server, chosen
//! by configuration. Repositories hold a [`DynDatabasePool`], branch on
//! [`DatabasePool::driver`], and reach the concrete sqlx pool through the
//! accessor for that driver.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{
    mysql::{MySqlPool, MySqlPoolOptions},
    sqlite::{SqlitePool, SqlitePoolOptions},
};
use std::sync::Arc;

use crate::config::{DatabaseConfig, DatabaseDriver};

const SQLITE_POOL_SIZE: u32 = 16;
const MYSQL_POOL_SIZE: u32 = 32;

/// Shared handle to a driver-dispatching pool
pub type DynDatabasePool = Arc<dyn DatabasePool>;

/// Backend-independent view of a connection pool
#[async_trait]
pub trait DatabasePool: Send + Sync {
    /// Driver backing this pool
    fn driver(&self) -> DatabaseDriver;

    /// The concrete SQLite pool, when [`driver`](Self::driver) is Sqlite
    fn as_sqlite(&self) -> Option<&SqlitePool>;

    /// The concrete MySQL pool, when [`driver`](Self::driver) is Mysql
    fn as_mysql(&self) -> Option<&MySqlPool>;

    /// Run a statement that returns no rows, yielding the affected count
    async fn execute(&self, query: &str) -> Result<u64>;

    /// Cheap connectivity check
    async fn ping(&self) -> Result<()>;

    /// Close all connections in the pool
    async fn close(&self);
}

/// Build the pool named by the configuration
pub async fn create_pool(config: &DatabaseConfig) -> Result<DynDatabasePool> {
    match config.driver {
        DatabaseDriver::Sqlite => {
            let db = SqliteDatabase::new(&config.url).await?;
            Ok(Arc::new(db))
        }
        DatabaseDriver::Mysql => {
            let db = MysqlDatabase::new(&config.url).await?;
            Ok(Arc::new(db))
        }
    }
}

/// In-memory SQLite pool for tests
pub async fn create_test_pool() -> Result<DynDatabasePool> {
    let db = SqliteDatabase::new(":memory:").await?;
    Ok(Arc::new(db))
}

/// Normalize a configured SQLite URL into a sqlx connection URL.
///
/// Bare file paths get a `sqlite:` prefix and `mode=rwc` so the database
/// file is created on first run; explicit option strings pass through.
fn normalize_sqlite_url(url: &str) -> String {
    if url.starts_with("sqlite:") {
        if url.contains('?') {
            url.to_string()
        } else {
            format!("{}?mode=rwc", url)
        }
    } else if url == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite:{}?mode=rwc", url)
    }
}

/// Create missing parent directories for a file-backed database path
fn ensure_parent_dir(path: &str) -> Result<()> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create database directory {:?}", parent))?;
        }
    }
    Ok(())
}

/// SQLite-backed pool
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open (creating if needed) the SQLite database at `url`
    pub async fn new(url: &str) -> Result<Self> {
        if !url.starts_with(":memory:") && !url.starts_with("sqlite::memory:") {
            ensure_parent_dir(url.trim_start_matches("sqlite:"))?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(SQLITE_POOL_SIZE)
            .connect(&normalize_sqlite_url(url))
            .await
            .with_context(|| format!("Failed to open SQLite database: {}", url))?;

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .context("Failed to turn on foreign key enforcement")?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabasePool for SqliteDatabase {
    fn driver(&self) -> DatabaseDriver {
        DatabaseDriver::Sqlite
    }

    fn as_sqlite(&self) -> Option<&SqlitePool> {
        Some(&self.pool)
    }

    fn as_mysql(&self) -> Option<&MySqlPool> {
        None
    }

    async fn execute(&self, query: &str) -> Result<u64> {
        let result = sqlx::query(query)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Statement failed: {}", query))?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Ping query failed")?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// MySQL-backed pool
pub struct MysqlDatabase {
    pool: MySqlPool,
}

impl MysqlDatabase {
    /// Connect to the MySQL server named by `url`
    pub async fn new(url: &str) -> Result<Self> {
        let connection_url = if url.starts_with("mysql://") {
            url.to_string()
        } else {
            format!("mysql://{}", url)
        };

        let pool = MySqlPoolOptions::new()
            .max_connections(MYSQL_POOL_SIZE)
            .connect(&connection_url)
            .await
            .with_context(|| format!("Failed to connect to MySQL at {}", url))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabasePool for MysqlDatabase {
    fn driver(&self) -> DatabaseDriver {
        DatabaseDriver::Mysql
    }

    fn as_sqlite(&self) -> Option<&SqlitePool> {
        None
    }

    fn as_mysql(&self) -> Option<&MySqlPool> {
        Some(&self.pool)
    }

    async fn execute(&self, query: &str) -> Result<u64> {
        let result = sqlx::query(query)
            .execute(&self.pool)
            .await
            .with_context(|| format!("Statement failed: {}", query))?;
        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("Ping query failed")?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn sqlite_file_config(path: &Path) -> DatabaseConfig {
        DatabaseConfig {
            driver: DatabaseDriver::Sqlite,
            url: path.to_string_lossy().to_string(),
        }
    }

    #[test]
    fn test_sqlite_url_normalization() {
        assert_eq!(normalize_sqlite_url(":memory:"), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("data/adbridge.db"),
            "sqlite:data/adbridge.db?mode=rwc"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:data/adbridge.db"),
            "sqlite:data/adbridge.db?mode=rwc"
        );
        // Explicit options pass through untouched
        assert_eq!(
            normalize_sqlite_url("sqlite:data/x.db?mode=ro"),
            "sqlite:data/x.db?mode=ro"
        );
    }

    #[tokio::test]
    async fn test_in_memory_pool_reports_sqlite_driver() {
        let pool = create_test_pool().await.expect("Failed to open pool");

        assert_eq!(pool.driver(), DatabaseDriver::Sqlite);
        assert!(pool.as_sqlite().is_some());
        assert!(pool.as_mysql().is_none());
    }

    #[tokio::test]
    async fn test_ping_succeeds_on_fresh_pool() {
        let pool = create_test_pool().await.expect("Failed to open pool");
        pool.ping().await.expect("Failed to ping pool");
    }

    #[tokio::test]
    async fn test_execute_reports_affected_rows() {
        let pool = create_test_pool().await.expect("Failed to open pool");

        pool.execute("CREATE TABLE scratch (id INTEGER PRIMARY KEY, note TEXT)")
            .await
            .expect("Failed to create scratch table");

        let affected = pool
            .execute("INSERT INTO scratch (note) VALUES ('hello')")
            .await
            .expect("Failed to insert row");
        assert_eq!(affected, 1);
    }

    #[tokio::test]
    async fn test_file_database_created_on_disk() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("pool.db");

        let pool = create_pool(&sqlite_file_config(&db_path))
            .await
            .expect("Failed to open pool");
        pool.ping().await.expect("Failed to ping pool");

        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_missing_parent_directories_created() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("a").join("b").join("pool.db");

        let pool = create_pool(&sqlite_file_config(&db_path))
            .await
            .expect("Failed to open pool");
        pool.ping().await.expect("Failed to ping pool");

        assert!(db_path.exists());
    }

    // Needs a reachable server; point MYSQL_TEST_URL at one to run this.
    #[tokio::test]
    #[ignore = "needs a MySQL server"]
    async fn test_mysql_pool_creation() {
        let url = std::env::var("MYSQL_TEST_URL")
            .unwrap_or_else(|_| "mysql://root@localhost/adbridge_test".to_string());
        let config = DatabaseConfig {
            driver: DatabaseDriver::Mysql,
            url,
        };

        let pool = create_pool(&config).await.expect("Failed to open pool");

        assert_eq!(pool.driver(), DatabaseDriver::Mysql);
        assert!(pool.as_mysql().is_some());
        assert!(pool.as_sqlite().is_none());
    }
}
