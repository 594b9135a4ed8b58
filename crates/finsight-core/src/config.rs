//! Configuration loading
//!
//! Resolution order:
//! 1. Explicit override path (if it exists)
//! 2. `~/.local/share/finsight/config.toml` (if it exists)
//! 3. Embedded defaults
//!
//! Environment variables are applied on top of whichever file was used.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detect::DetectionConfig;
use crate::error::{Error, Result};
use crate::forecast::ForecastConfig;
use crate::storage::{default_data_dir, BackendKind, Obfuscator, DEFAULT_OBFUSCATION_KEY};

/// Embedded default configuration
const DEFAULT_CONFIG: &str = include_str!("../../../config/finsight.toml");

pub const BACKEND_ENV: &str = "FINSIGHT_BACKEND";
pub const DATA_DIR_ENV: &str = "FINSIGHT_DATA_DIR";
pub const OBFUSCATION_KEY_ENV: &str = "FINSIGHT_OBFUSCATION_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: BackendKind,
    /// `None` means the platform data directory
    pub data_dir: Option<PathBuf>,
    pub obfuscation_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Local,
            data_dir: None,
            obfuscation_key: DEFAULT_OBFUSCATION_KEY.to_string(),
        }
    }
}

impl StorageConfig {
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn obfuscator(&self) -> Result<Obfuscator> {
        Obfuscator::new(&self.obfuscation_key)
    }
}

/// Forecast tunables plus the default horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSection {
    pub horizon: usize,
    #[serde(flatten)]
    pub model: ForecastConfig,
}

impl Default for ForecastSection {
    fn default() -> Self {
        Self {
            horizon: 6,
            model: ForecastConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    pub history_limit: usize,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self { history_limit: 10 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinsightConfig {
    pub storage: StorageConfig,
    pub detection: DetectionConfig,
    pub forecast: ForecastSection,
    pub reports: ReportsConfig,
}

/// Default user config location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finsight").join("config.toml"))
}

impl FinsightConfig {
    /// Load configuration (override first, then default location, then embedded)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_file(override_path)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    fn load_file(override_path: Option<&Path>) -> Result<Self> {
        let candidate = match override_path {
            Some(path) => Some(path.to_path_buf()),
            None => default_config_path(),
        };

        match candidate {
            Some(path) if path.exists() => {
                debug!("Loading config from {}", path.display());
                let content = fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Self::parse(&content)
            }
            _ => Self::parse(DEFAULT_CONFIG),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through a lookup function
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup(BACKEND_ENV) {
            self.storage.backend = backend.parse()?;
        }
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|d| !d.is_empty()) {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(key) = lookup(OBFUSCATION_KEY_ENV) {
            self.storage.obfuscation_key = key;
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.storage.obfuscation_key.is_empty() {
            return Err(Error::Config("storage.obfuscation_key must not be empty".into()));
        }
        if self.detection.duplicate_tolerance < 0.0 {
            return Err(Error::Config("detection.duplicate_tolerance must be >= 0".into()));
        }
        if self.forecast.model.moving_average_window == 0 {
            return Err(Error::Config("forecast.moving_average_window must be >= 1".into()));
        }
        if self.reports.history_limit == 0 {
            return Err(Error::Config("reports.history_limit must be >= 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_embedded_defaults_match_code_defaults() {
        let parsed = FinsightConfig::parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, FinsightConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = FinsightConfig::parse(
            r#"
            [storage]
            backend = "sqlite"

            [forecast]
            horizon = 12
            "#,
        )
        .unwrap();
        assert_eq!(config.storage.backend, BackendKind::Sqlite);
        assert_eq!(config.forecast.horizon, 12);
        assert_eq!(config.forecast.model.default_growth_rate, 0.03);
        assert_eq!(config.detection.deviation_threshold, 2.0);
    }

    #[test]
    fn test_override_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[reports]\nhistory_limit = 5\n").unwrap();

        let config = FinsightConfig::load_file(Some(&path)).unwrap();
        assert_eq!(config.reports.history_limit, 5);

        let missing = FinsightConfig::load_file(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(missing.reports.history_limit, 10);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (BACKEND_ENV, "sqlite"),
            (DATA_DIR_ENV, "/tmp/finsight-test"),
            (OBFUSCATION_KEY_ENV, "other-key"),
        ]
        .into_iter()
        .collect();

        let mut config = FinsightConfig::default();
        config
            .apply_env(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.storage.backend, BackendKind::Sqlite);
        assert_eq!(
            config.storage.resolved_data_dir(),
            PathBuf::from("/tmp/finsight-test")
        );
        assert_eq!(config.storage.obfuscation_key, "other-key");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            FinsightConfig::parse("[storage]\nobfuscation_key = \"\"\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            FinsightConfig::parse("[storage]\nbackend = \"redis\"\n"),
            Err(Error::Toml(_))
        ));

        let mut config = FinsightConfig::default();
        let bad = config.apply_env(|name| (name == BACKEND_ENV).then(|| "redis".to_string()));
        assert!(matches!(bad, Err(Error::Config(_))));
    }
}
