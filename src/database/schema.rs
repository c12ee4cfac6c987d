//! Database schema
//!
//! Tables are created with `CREATE TABLE IF NOT EXISTS` on every startup;
//! there is no migration framework. Uses SQLite with WAL mode for better
//! concurrency and crash safety.
//!
//! Column names are camelCase to stay compatible with databases already on
//! devices.

use crate::error::{AppError, Result};
use sqlx::sqlite::SqlitePool;

const CREATE_TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS clients (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        phone TEXT NOT NULL,
        createdAt TEXT NOT NULL,
        synced INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id TEXT PRIMARY KEY,
        status TEXT NOT NULL,
        orderDate TEXT NOT NULL,
        deliveryDate TEXT,
        notes TEXT,
        clientId TEXT NOT NULL REFERENCES clients(id),
        lastReminderDate TEXT,
        synced INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS order_items (
        id TEXT PRIMARY KEY,
        clothType TEXT NOT NULL,
        modelImage TEXT,
        fabricImage TEXT,
        orderId TEXT NOT NULL REFERENCES orders(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS measurements (
        id TEXT PRIMARY KEY,
        label TEXT NOT NULL,
        value REAL NOT NULL,
        orderItemId TEXT NOT NULL REFERENCES order_items(id)
    )
    "#,
    // orderId is a weak reference on purpose: deleting an order keeps its
    // notification history.
    r#"
    CREATE TABLE IF NOT EXISTS notifications (
        id TEXT PRIMARY KEY,
        orderId TEXT NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        date TEXT NOT NULL,
        read INTEGER NOT NULL DEFAULT 0
    )
    "#,
];

// Dependency order for dropping.
const DROP_TABLES: &[&str] = &[
    "DROP TABLE IF EXISTS notifications",
    "DROP TABLE IF EXISTS measurements",
    "DROP TABLE IF EXISTS order_items",
    "DROP TABLE IF EXISTS orders",
    "DROP TABLE IF EXISTS clients",
];

/// Idempotently ensure all five tables exist. Safe to call on every start.
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    tracing::info!("Initializing database schema");

    // WAL mode for crash safety; foreign keys for the strong references.
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(pool)
        .await
        .map_err(AppError::Schema)?;

    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await
        .map_err(AppError::Schema)?;

    for statement in CREATE_TABLES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(AppError::Schema)?;
    }

    tracing::info!("Database schema ready");
    Ok(())
}

/// Drop all five tables and recreate them empty. Data loss is total and
/// irreversible.
pub async fn reset_schema(pool: &SqlitePool) -> Result<()> {
    tracing::warn!("Resetting database schema, all data will be lost");

    for statement in DROP_TABLES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(AppError::Schema)?;
    }

    initialize_schema(pool).await
}
