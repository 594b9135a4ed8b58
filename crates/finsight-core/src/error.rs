//! Error types for Finsight

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    /// Imported dataset is malformed or incomplete
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A value could not be persisted; callers should tell the user
    #[error("Failed to save '{key}': {reason}")]
    StorageWrite { key: String, reason: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap any error raised while writing `key` as a write failure
    pub fn storage_write(key: &str, err: impl std::fmt::Display) -> Self {
        Error::StorageWrite {
            key: key.to_string(),
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
