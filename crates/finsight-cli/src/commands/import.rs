//! Import and demo data command implementations

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use finsight_core::{
    categorize::Categorizer,
    import::{import_expenses, import_forecast, import_revenue},
    mock,
    models::DataSource,
    settings::Settings,
    storage::{StorageGateway, StorageKey},
};

use super::make_rng;

pub async fn cmd_import(
    gateway: &StorageGateway,
    file: &Path,
    kind: &str,
    no_categorize: bool,
) -> Result<()> {
    let csv_file =
        File::open(file).with_context(|| format!("Failed to open file: {}", file.display()))?;

    println!("📥 Importing {} from {}...", kind, file.display());

    match kind.to_lowercase().as_str() {
        "expenses" | "expense" => {
            let mut expenses = import_expenses(csv_file)
                .with_context(|| format!("Failed to import {}", file.display()))?;
            println!("   Found {} expenses", expenses.len());

            let settings = Settings::load(gateway).await;
            if settings.ai.enable_auto_categories && !no_categorize {
                let categorizer = Categorizer::new()?;
                let changed = categorizer.categorize_all(&mut expenses);
                if changed > 0 {
                    println!("   🏷️  Categorized {} uncategorized expenses", changed);
                }
            }

            gateway
                .save_json(StorageKey::ExpenseData, &expenses)
                .await
                .context("Failed to store expenses")?;
        }
        "revenue" => {
            let revenue = import_revenue(csv_file)
                .with_context(|| format!("Failed to import {}", file.display()))?;
            println!("   Found {} months of revenue", revenue.len());
            gateway
                .save_json(StorageKey::RevenueData, &revenue)
                .await
                .context("Failed to store revenue")?;
        }
        "forecast" => {
            let forecast = import_forecast(csv_file)
                .with_context(|| format!("Failed to import {}", file.display()))?;
            println!("   Found {} forecast months", forecast.len());
            gateway
                .save_json(StorageKey::ForecastData, &forecast)
                .await
                .context("Failed to store forecast")?;
        }
        other => anyhow::bail!(
            "Unknown dataset kind: {}. Available: expenses, revenue, forecast",
            other
        ),
    }

    gateway
        .save_json(StorageKey::DataSource, &DataSource::Imported)
        .await?;

    println!("✅ Import complete");
    Ok(())
}

pub async fn cmd_demo(
    gateway: &StorageGateway,
    expense_count: usize,
    months: usize,
    seed: Option<u64>,
) -> Result<()> {
    let mut rng = make_rng(seed);
    let today = Utc::now().date_naive();
    let this_month = today.with_day(1).unwrap_or(today);

    let expenses = mock::generate_expenses(&mut rng, expense_count, today);
    let revenue = mock::generate_revenue(&mut rng, months, this_month);

    gateway
        .save_json(StorageKey::ExpenseData, &expenses)
        .await
        .context("Failed to store demo expenses")?;
    gateway
        .save_json(StorageKey::RevenueData, &revenue)
        .await
        .context("Failed to store demo revenue")?;
    // A stale forecast would not match the new revenue
    gateway.remove(StorageKey::ForecastData.as_str()).await?;
    gateway
        .save_json(StorageKey::DataSource, &DataSource::Mock)
        .await?;

    println!(
        "🎲 Generated {} expenses and {} months of revenue",
        expenses.len(),
        revenue.len()
    );
    println!();
    println!("Next steps:");
    println!("  1. Check for anomalies: finsight anomalies");
    println!("  2. Forecast revenue:    finsight forecast");

    Ok(())
}
