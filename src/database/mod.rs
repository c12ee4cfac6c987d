//! Database module
//!
//! This module provides all database functionality including:
//! - Schema creation and reset
//! - Model definitions
//! - Repository layer for order and notification operations

pub mod models;
pub mod repository;
pub mod schema;

pub use models::*;
pub use repository::Repository;
pub use schema::{initialize_schema, reset_schema};

use crate::error::{AppError, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Build connection options for the on-device database file.
fn connect_options(db_path: &Path) -> std::result::Result<SqliteConnectOptions, sqlx::Error> {
    SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display())).map(
        |opts| {
            opts.create_if_missing(true)
                .busy_timeout(Duration::from_secs(5))
                .journal_mode(SqliteJournalMode::Wal)
                .foreign_keys(true)
        },
    )
}

/// Create a connection pool and ensure the schema exists.
///
/// A schema failure here is fatal to startup; the embedding shell catches
/// it and decides whether to surface a degraded-mode banner.
pub async fn create_pool(db_path: &Path) -> Result<SqlitePool> {
    tracing::info!("Opening order database at: {:?}", db_path);

    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(connect_options(db_path).map_err(AppError::Schema)?)
        .await
        .map_err(AppError::Schema)?;

    initialize_schema(&pool).await?;

    tracing::info!("Database pool created successfully");

    Ok(pool)
}
