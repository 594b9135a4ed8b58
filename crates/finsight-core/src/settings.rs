//! User preferences persisted through the storage gateway

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::storage::{StorageGateway, StorageKey};

/// Analysis feature toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AiSettings {
    /// Run the categorizer over uncategorized imports
    pub enable_auto_categories: bool,
    pub enable_anomaly_detection: bool,
    pub enable_forecast_suggestions: bool,
    /// Minimum recommendation confidence to show, in percent (0-100)
    pub confidence_threshold: u8,
    pub preferred_model: String,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            enable_auto_categories: true,
            enable_anomaly_detection: true,
            enable_forecast_suggestions: true,
            confidence_threshold: 70,
            preferred_model: "gpt".to_string(),
        }
    }
}

impl AiSettings {
    /// Threshold as a 0.0 - 1.0 fraction, comparable with recommendation confidence
    pub fn min_confidence(&self) -> f64 {
        f64::from(self.confidence_threshold.min(100)) / 100.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountSettings {
    pub company_name: String,
    /// Lowercase ISO code
    pub default_currency: String,
    pub theme: Theme,
}

impl Default for AccountSettings {
    fn default() -> Self {
        Self {
            company_name: "Example Business LLC".to_string(),
            default_currency: "usd".to_string(),
            theme: Theme::System,
        }
    }
}

/// Both settings groups together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub ai: AiSettings,
    pub account: AccountSettings,
}

impl Settings {
    /// Load stored settings, falling back to defaults for anything missing or malformed
    pub async fn load(gateway: &StorageGateway) -> Self {
        Self {
            ai: gateway
                .load_json(StorageKey::AiSettings)
                .await
                .unwrap_or_default(),
            account: gateway
                .load_json(StorageKey::AccountSettings)
                .await
                .unwrap_or_default(),
        }
    }

    pub async fn save(&self, gateway: &StorageGateway) -> Result<()> {
        gateway.save_json(StorageKey::AiSettings, &self.ai).await?;
        gateway
            .save_json(StorageKey::AccountSettings, &self.account)
            .await?;
        info!("Saved settings");
        Ok(())
    }

    /// Set one field by dotted name, e.g. `ai.confidenceThreshold`
    pub fn set(&mut self, field: &str, value: &str) -> Result<()> {
        let mut doc = serde_json::to_value(&*self)?;
        let (group, name) = field
            .split_once('.')
            .ok_or_else(|| Error::InvalidData(format!("Expected group.field, got '{}'", field)))?;

        let slot = doc
            .get_mut(group)
            .and_then(|g| g.get_mut(name))
            .ok_or_else(|| Error::InvalidData(format!("Unknown setting '{}'", field)))?;

        // Keep the existing JSON type: numbers and booleans parse, everything else is a string
        *slot = if slot.is_string() {
            serde_json::Value::String(value.to_string())
        } else {
            serde_json::from_str(value).map_err(|_| {
                Error::InvalidData(format!("Invalid value '{}' for {}", value, field))
            })?
        };

        *self = serde_json::from_value(doc)
            .map_err(|e| Error::InvalidData(format!("Invalid value for {}: {}", field, e)))?;
        Ok(())
    }
}
