//! Error types for the My Love core
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to the frontend.

use crate::validation::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Item {id} not found in {collection}")]
    NotFound { collection: &'static str, id: i64 },

    #[error("Message {0} is a default message and cannot be modified")]
    SeedMessageImmutable(i64),

    #[error("Database is at version {on_disk}, cannot open it at older version {requested}")]
    SchemaDowngrade { on_disk: i32, requested: i32 },

    #[error("No active messages available for rotation")]
    EmptyRotationPool,

    #[error("Unsupported export version: {0}")]
    UnsupportedExportVersion(String),

    #[error("Corrupt record in {collection}: {reason}")]
    CorruptRecord {
        collection: &'static str,
        reason: String,
    },

    /// Opaque failure reported by the remote API, kept verbatim.
    #[error("{0}")]
    Remote(String),

    #[error("{0}")]
    Generic(String),
}

impl AppError {
    pub fn not_found(collection: &'static str, id: i64) -> Self {
        AppError::NotFound { collection, id }
    }

    pub fn corrupt(collection: &'static str, reason: impl Into<String>) -> Self {
        AppError::CorruptRecord {
            collection,
            reason: reason.into(),
        }
    }

    /// Field-level messages when this is a validation failure.
    pub fn field_errors(&self) -> Option<&std::collections::BTreeMap<String, String>> {
        match self {
            AppError::Validation(err) => Some(&err.field_errors),
            _ => None,
        }
    }
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
