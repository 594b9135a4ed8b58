//! Shared command utilities
//!
//! This module contains:
//! - `load_config` - Resolve configuration with CLI overrides
//! - `open_gateway` - Open the configured storage backend
//! - Dataset loaders shared by the analysis and report commands

use std::path::Path;

use anyhow::{Context, Result};
use finsight_core::{
    config::FinsightConfig,
    models::{DataSource, ForecastPoint, RevenuePoint, Transaction},
    storage::{BackendKind, StorageGateway, StorageKey},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

/// Load config, then apply `--backend` and `--data-dir` on top
pub fn load_config(
    config_path: Option<&Path>,
    backend: Option<&str>,
    data_dir: Option<&Path>,
) -> Result<FinsightConfig> {
    let mut config = FinsightConfig::load(config_path).context("Failed to load configuration")?;

    if let Some(backend) = backend {
        config.storage.backend = backend
            .parse::<BackendKind>()
            .with_context(|| format!("Invalid --backend '{}'", backend))?;
    }
    if let Some(dir) = data_dir {
        config.storage.data_dir = Some(dir.to_path_buf());
    }

    let resolved = config.storage.resolved_data_dir();
    debug!(
        backend = %config.storage.backend,
        data_dir = %resolved.display(),
        "Resolved configuration"
    );
    Ok(config)
}

/// Open the configured backend with the configured obfuscation key
pub fn open_gateway(config: &FinsightConfig) -> Result<StorageGateway> {
    let data_dir = config.storage.resolved_data_dir();
    let gateway = StorageGateway::open(config.storage.backend, &data_dir).with_context(|| {
        format!(
            "Failed to open {} storage at {}",
            config.storage.backend,
            data_dir.display()
        )
    })?;
    Ok(gateway.with_obfuscator(config.storage.obfuscator()?))
}

/// Seeded RNG when a seed is given, entropy otherwise
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

pub async fn load_expenses(gateway: &StorageGateway) -> Vec<Transaction> {
    gateway
        .load_json(StorageKey::ExpenseData)
        .await
        .unwrap_or_default()
}

pub async fn load_revenue(gateway: &StorageGateway) -> Vec<RevenuePoint> {
    gateway
        .load_json(StorageKey::RevenueData)
        .await
        .unwrap_or_default()
}

pub async fn load_forecast(gateway: &StorageGateway) -> Vec<ForecastPoint> {
    gateway
        .load_json(StorageKey::ForecastData)
        .await
        .unwrap_or_default()
}

pub async fn load_data_source(gateway: &StorageGateway) -> DataSource {
    gateway
        .load_json(StorageKey::DataSource)
        .await
        .unwrap_or_default()
}

/// Print the standard hint when a command has nothing to work with
pub fn print_no_data(what: &str) {
    println!("📭 No {} stored yet.", what);
    println!("   Run 'finsight demo' or 'finsight import --file <csv>' first.");
}
