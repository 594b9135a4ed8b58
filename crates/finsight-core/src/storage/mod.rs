//! Key-value storage with pluggable backends
//!
//! Persists named string blobs (mostly JSON) for the dashboard state.
//!
//! # Architecture
//!
//! - `StorageBackend` trait defines the interface for stores
//! - `LocalStore` keeps one file per key in a directory
//! - `SqliteStore` keeps rows in a pooled SQLite table created on first use
//! - `StorageGateway` owns the active backend and adds error policy,
//!   obfuscated values and typed JSON helpers
//!
//! There is no locking. Two writes to the same key race and the last one wins.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

mod local;
mod secure;
mod sqlite;

pub use local::LocalStore;
pub use secure::{Obfuscator, DEFAULT_OBFUSCATION_KEY};
pub use sqlite::SqliteStore;

/// Prefix shared by every persisted key so `clear` leaves foreign data alone
pub const NAMESPACE_PREFIX: &str = "finance-app-";

/// Which store backs the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Local,
    Sqlite,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Sqlite => "sqlite",
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" | "file" => Ok(Self::Local),
            "sqlite" | "db" => Ok(Self::Sqlite),
            other => Err(Error::Config(format!("Unknown storage backend: {}", other))),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Logical keys the application persists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    ExpenseData,
    RevenueData,
    ForecastData,
    OptimizationData,
    ReportHistory,
    SecureDocuments,
    AiSettings,
    AccountSettings,
    DataSource,
}

impl StorageKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExpenseData => "expense-data",
            Self::RevenueData => "revenue-data",
            Self::ForecastData => "forecast-data",
            Self::OptimizationData => "optimization-data",
            Self::ReportHistory => "report-history",
            Self::SecureDocuments => "secure-documents",
            Self::AiSettings => "ai-settings",
            Self::AccountSettings => "account-settings",
            Self::DataSource => "data-source",
        }
    }

    pub fn all() -> &'static [StorageKey] {
        &[
            Self::ExpenseData,
            Self::RevenueData,
            Self::ForecastData,
            Self::OptimizationData,
            Self::ReportHistory,
            Self::SecureDocuments,
            Self::AiSettings,
            Self::AccountSettings,
            Self::DataSource,
        ]
    }
}

impl std::str::FromStr for StorageKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .find(|k| k.as_str() == s)
            .copied()
            .ok_or_else(|| Error::InvalidData(format!("Unknown storage key: {}", s)))
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trait for key-value stores
///
/// Every operation is a suspension point. Implementations must accept any
/// UTF-8 key and value, including the empty string.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Which kind of store this is
    fn kind(&self) -> BackendKind;

    /// Insert or overwrite a value
    async fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Read a value, `None` when the key was never written or was removed
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Delete a value; removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<()>;

    /// Delete every value this store owns
    async fn clear(&self) -> Result<()>;

    /// Check the store can be written to
    async fn probe(&self) -> Result<()>;
}

/// Open a backend of `kind` rooted at `data_dir`
pub fn open_backend(kind: BackendKind, data_dir: &Path) -> Result<Box<dyn StorageBackend>> {
    let backend: Box<dyn StorageBackend> = match kind {
        BackendKind::Local => Box::new(LocalStore::new(data_dir.join("store"))?),
        BackendKind::Sqlite => Box::new(SqliteStore::open(data_dir.join("finsight.db"))?),
    };
    Ok(backend)
}

/// Whether a backend of `kind` can be opened and written under `data_dir`
///
/// Never fails; any error reads as unavailable.
pub async fn is_available(kind: BackendKind, data_dir: &Path) -> bool {
    let backend = match open_backend(kind, data_dir) {
        Ok(b) => b,
        Err(e) => {
            debug!("{} backend unavailable: {}", kind, e);
            return false;
        }
    };
    match backend.probe().await {
        Ok(()) => true,
        Err(e) => {
            debug!("{} backend probe failed: {}", kind, e);
            false
        }
    }
}

/// Default data directory
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("finsight")
}

/// Entry point for persisted state
///
/// Writes surface failures so callers can tell the user. Reads degrade to
/// `None` so a broken store falls back to defaults instead of failing.
pub struct StorageGateway {
    backend: Box<dyn StorageBackend>,
    data_dir: PathBuf,
    obfuscator: Obfuscator,
}

impl StorageGateway {
    /// Open a gateway over a built-in backend
    pub fn open(kind: BackendKind, data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        let backend = open_backend(kind, &data_dir)?;
        Ok(Self::with_backend(backend, data_dir))
    }

    /// Wrap an existing backend
    pub fn with_backend(backend: Box<dyn StorageBackend>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            data_dir: data_dir.into(),
            obfuscator: Obfuscator::default(),
        }
    }

    /// Replace the key used by the secure helpers
    pub fn with_obfuscator(mut self, obfuscator: Obfuscator) -> Self {
        self.obfuscator = obfuscator;
        self
    }

    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Swap the active backend
    ///
    /// Data is not migrated; values written to the old backend stay there.
    pub fn switch_backend(&mut self, kind: BackendKind) -> Result<()> {
        if kind == self.kind() {
            return Ok(());
        }
        self.backend = open_backend(kind, &self.data_dir)?;
        debug!("Switched storage backend to {}", kind);
        Ok(())
    }

    pub async fn save(&self, key: &str, value: &str) -> Result<()> {
        self.backend
            .save(key, value)
            .await
            .map_err(|e| Error::storage_write(key, e))?;
        debug!(key, bytes = value.len(), "Saved value");
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        match self.backend.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read '{}': {}", key, e);
                None
            }
        }
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        self.backend
            .remove(key)
            .await
            .map_err(|e| Error::Storage(format!("Failed to remove '{}': {}", key, e)))
    }

    pub async fn clear(&self) -> Result<()> {
        self.backend
            .clear()
            .await
            .map_err(|e| Error::Storage(format!("Failed to clear store: {}", e)))
    }

    /// Save an obfuscated value (XOR + base64; not encryption)
    pub async fn save_securely(&self, key: &str, value: &str) -> Result<()> {
        self.save(key, &self.obfuscator.obfuscate(value)).await
    }

    /// Read a value written by `save_securely`
    ///
    /// Values that do not decode read as absent.
    pub async fn get_securely(&self, key: &str) -> Option<String> {
        let stored = self.get(key).await?;
        match self.obfuscator.reveal(&stored) {
            Ok(plain) => Some(plain),
            Err(e) => {
                warn!("Failed to decode secure value '{}': {}", key, e);
                None
            }
        }
    }

    pub async fn save_json<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> Result<()> {
        let json = serde_json::to_string(value).map_err(|e| Error::storage_write(key.as_str(), e))?;
        self.save(key.as_str(), &json).await
    }

    /// Load and parse a JSON blob; malformed data reads as absent
    pub async fn load_json<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = self.get(key.as_str()).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring malformed '{}': {}", key, e);
                None
            }
        }
    }
}
