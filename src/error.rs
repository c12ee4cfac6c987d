//! Error types for the order store
//!
//! The store exposes a closed set of failure kinds so callers can tell
//! schema, write, read and reminder failures apart. A missing row is never
//! an error here; readers return `Option` instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Table creation or reset failed. Fatal to startup; the embedding
    /// shell decides whether to continue in degraded mode.
    #[error("Schema error: {0}")]
    Schema(#[source] sqlx::Error),

    /// An insert or update failed mid-operation.
    #[error("Write error: {0}")]
    Write(#[source] sqlx::Error),

    /// A select failed. Not used for absent rows.
    #[error("Read error: {0}")]
    Read(#[source] sqlx::Error),

    /// Submitting a local notification for one order failed. The reminder
    /// sweep logs these and keeps going.
    #[error("Reminder error: {0}")]
    Reminder(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
