//! Settings command implementations

use anyhow::{Context, Result};
use finsight_core::{settings::Settings, storage::StorageGateway};

pub async fn cmd_settings_show(gateway: &StorageGateway) -> Result<()> {
    let settings = Settings::load(gateway).await;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

pub async fn cmd_settings_set(gateway: &StorageGateway, field: &str, value: &str) -> Result<()> {
    let mut settings = Settings::load(gateway).await;
    settings
        .set(field, value)
        .with_context(|| format!("Failed to set {}", field))?;
    settings.save(gateway).await.context("Failed to save settings")?;

    println!("✅ {} = {}", field, value);
    Ok(())
}

pub async fn cmd_settings_reset(gateway: &StorageGateway) -> Result<()> {
    Settings::default()
        .save(gateway)
        .await
        .context("Failed to save settings")?;
    println!("✅ Settings restored to defaults");
    Ok(())
}
