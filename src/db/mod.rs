//! Database layer
//!
//! Pool construction, code-based migrations, and the per-entity
//! repositories. SQLite is the default driver for single-binary
//! deployments; MySQL serves larger installations. Startup wires the two
//! together: build the pool from configuration, run migrations against it,
//! then hand clones to the repositories.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{
    create_pool, create_test_pool, DatabasePool, DynDatabasePool, MysqlDatabase, SqliteDatabase,
};
