//! Account storage
//!
//! Accounts are looked up two ways: by id when a session is resolved, and
//! by email at login and registration. The role column stores the string
//! form of `UserRole`.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{User, UserRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new account
    async fn create(&self, user: &User) -> Result<User>;

    /// Look up a user by id
    async fn get_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Look up a user by email (unique per account)
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;
}

/// sqlx implementation working over either supported driver
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    /// Build a repository over the given pool
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Arc-wrapped constructor, convenient for service wiring
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                insert_user_sqlite(self.pool.as_sqlite().unwrap(), user).await
            }
            DatabaseDriver::Mysql => insert_user_mysql(self.pool.as_mysql().unwrap(), user).await,
        }
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                find_user_by_id_sqlite(self.pool.as_sqlite().unwrap(), id).await
            }
            DatabaseDriver::Mysql => {
                find_user_by_id_mysql(self.pool.as_mysql().unwrap(), id).await
            }
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => {
                find_user_by_email_sqlite(self.pool.as_sqlite().unwrap(), email).await
            }
            DatabaseDriver::Mysql => {
                find_user_by_email_mysql(self.pool.as_mysql().unwrap(), email).await
            }
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn insert_user_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    sqlx::query(
        "INSERT INTO users \
         (id, email, full_name, avatar_url, password_hash, role, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.full_name)
    .bind(&user.avatar_url)
    .bind(&user.password_hash)
    .bind(user.role.to_string())
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .context("Failed to insert user")?;

    Ok(user.clone())
}

async fn find_user_by_id_sqlite(pool: &SqlitePool, id: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        "SELECT id, email, full_name, avatar_url, password_hash, role, created_at, updated_at \
         FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to load user")?;

    row.map(|row| user_from_sqlite_row(&row)).transpose()
}

async fn find_user_by_email_sqlite(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        "SELECT id, email, full_name, avatar_url, password_hash, role, created_at, updated_at \
         FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .context("Failed to load user by email")?;

    row.map(|row| user_from_sqlite_row(&row)).transpose()
}

fn user_from_sqlite_row(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let stored_role: String = row.get("role");
    let role = UserRole::from_str(&stored_role)
        .with_context(|| format!("Unknown role '{}' in users table", stored_role))?;

    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        full_name: row.get("full_name"),
        avatar_url: row.get("avatar_url"),
        password_hash: row.get("password_hash"),
        role,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn insert_user_mysql(pool: &MySqlPool, user: &User) -> Result<User> {
    sqlx::query(
        "INSERT INTO users \
         (id, email, full_name, avatar_url, password_hash, role, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.full_name)
    .bind(&user.avatar_url)
    .bind(&user.password_hash)
    .bind(user.role.to_string())
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .context("Failed to insert user")?;

    Ok(user.clone())
}

async fn find_user_by_id_mysql(pool: &MySqlPool, id: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        "SELECT id, email, full_name, avatar_url, password_hash, role, created_at, updated_at \
         FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to load user")?;

    row.map(|row| user_from_mysql_row(&row)).transpose()
}

async fn find_user_by_email_mysql(pool: &MySqlPool, email: &str) -> Result<Option<User>> {
    let row = sqlx::query(
        "SELECT id, email, full_name, avatar_url, password_hash, role, created_at, updated_at \
         FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
    .context("Failed to load user by email")?;

    row.map(|row| user_from_mysql_row(&row)).transpose()
}

fn user_from_mysql_row(row: &sqlx::mysql::MySqlRow) -> Result<User> {
    let stored_role: String = row.get("role");
    let role = UserRole::from_str(&stored_role)
        .with_context(|| format!("Unknown role '{}' in users table", stored_role))?;

    Ok(User {
        id: row.get("id"),
        email: row.get("email"),
        full_name: row.get("full_name"),
        avatar_url: row.get("avatar_url"),
        password_hash: row.get("password_hash"),
        role,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> (DynDatabasePool, SqlxUserRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxUserRepository::new(pool.clone());
        (pool, repo)
    }

    fn account(email: &str, role: UserRole) -> User {
        User::new(
            email.to_string(),
            format!("Name of {}", email),
            "hashed".to_string(),
            role,
        )
    }

    #[tokio::test]
    async fn test_create_and_fetch_by_id() {
        let (_pool, repo) = setup_test_repo().await;

        let user = account("pub@adbridge.io", UserRole::Publisher);
        let created = repo.create(&user).await.expect("Failed to create user");
        assert_eq!(created.id, user.id);

        let found = repo
            .get_by_id(&user.id)
            .await
            .expect("Failed to load user")
            .expect("User should exist");

        assert_eq!(found.email, "pub@adbridge.io");
        assert_eq!(found.role, UserRole::Publisher);
        assert_eq!(found.full_name, user.full_name);
    }

    #[tokio::test]
    async fn test_unknown_id_returns_none() {
        let (_pool, repo) = setup_test_repo().await;

        let found = repo
            .get_by_id("no-such-user")
            .await
            .expect("Failed to load user");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_lookup_by_email() {
        let (_pool, repo) = setup_test_repo().await;

        let user = account("adv@adbridge.io", UserRole::Advertiser);
        repo.create(&user).await.expect("Failed to create user");

        let found = repo
            .get_by_email("adv@adbridge.io")
            .await
            .expect("Failed to load user")
            .expect("User should exist");
        assert_eq!(found.id, user.id);

        let missing = repo
            .get_by_email("nobody@adbridge.io")
            .await
            .expect("Failed to load user");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_every_role_survives_storage() {
        let (_pool, repo) = setup_test_repo().await;

        for (email, role) in [
            ("p@adbridge.io", UserRole::Publisher),
            ("s@adbridge.io", UserRole::SpTeam),
            ("a@adbridge.io", UserRole::Advertiser),
        ] {
            let created = repo
                .create(&account(email, role))
                .await
                .expect("Failed to create user");
            let found = repo
                .get_by_id(&created.id)
                .await
                .expect("Failed to load user")
                .expect("User should exist");
            assert_eq!(found.role, role);
        }
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let (_pool, repo) = setup_test_repo().await;

        let first = account("dup@adbridge.io", UserRole::Publisher);
        repo.create(&first).await.expect("Failed to create user");

        let second = account("dup@adbridge.io", UserRole::Advertiser);
        assert!(repo.create(&second).await.is_err());
    }
}
