//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::fs;
use std::path::PathBuf;

use finsight_core::config::FinsightConfig;
use finsight_core::models::{Category, DataSource, ForecastPoint, RevenuePoint, Transaction};
use finsight_core::recommend::OptimizationTracker;
use finsight_core::report::{ReportHistory, ReportResult, ReportType};
use finsight_core::settings::Settings;
use finsight_core::storage::{BackendKind, StorageGateway, StorageKey};
use tempfile::TempDir;

use crate::commands::{self, truncate};

fn setup_gateway(dir: &TempDir) -> StorageGateway {
    StorageGateway::open(BackendKind::Local, dir.path()).unwrap()
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

async fn seed_demo(gateway: &StorageGateway) {
    commands::cmd_demo(gateway, 60, 12, Some(7)).await.unwrap();
}

// ========== Shared Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("a longer description", 10), "a longe...");
    assert_eq!(truncate("café au lait", 6), "caf...");
}

#[test]
fn test_load_config_overrides() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "config.toml", "[forecast]\nhorizon = 9\n");

    let config = commands::load_config(Some(&path), Some("sqlite"), Some(dir.path())).unwrap();
    assert_eq!(config.storage.backend, BackendKind::Sqlite);
    assert_eq!(config.storage.resolved_data_dir(), dir.path());
    assert_eq!(config.forecast.horizon, 9);

    assert!(commands::load_config(Some(&path), Some("cloud"), None).is_err());
}

#[test]
fn test_open_gateway_from_config() {
    let dir = TempDir::new().unwrap();
    let mut config = FinsightConfig::default();
    config.storage.backend = BackendKind::Sqlite;
    config.storage.data_dir = Some(dir.path().to_path_buf());

    let gateway = commands::open_gateway(&config).unwrap();
    assert_eq!(gateway.kind(), BackendKind::Sqlite);
    assert!(dir.path().join("finsight.db").exists());
}

// ========== Import Command Tests ==========

#[tokio::test]
async fn test_cmd_import_expenses_categorizes() {
    let dir = TempDir::new().unwrap();
    let gateway = setup_gateway(&dir);
    let csv = write_file(
        &dir,
        "expenses.csv",
        "id,date,amount,description,category,vendor\n\
         a,2024-01-02,120.00,Printer paper,,Staples\n\
         b,2024-01-03,80.00,Lunch,Travel,Cafe\n",
    );

    commands::cmd_import(&gateway, &csv, "expenses", false)
        .await
        .unwrap();

    let stored: Vec<Transaction> = gateway.load_json(StorageKey::ExpenseData).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].category, Category::Supplies);
    assert_eq!(stored[1].category, Category::Travel);
    assert_eq!(
        gateway.load_json::<DataSource>(StorageKey::DataSource).await,
        Some(DataSource::Imported)
    );
}

#[tokio::test]
async fn test_cmd_import_respects_no_categorize_and_settings() {
    let dir = TempDir::new().unwrap();
    let gateway = setup_gateway(&dir);
    let csv = write_file(
        &dir,
        "expenses.csv",
        "id,date,amount,description,category,vendor\na,2024-01-02,120.00,Printer paper,,Staples\n",
    );

    commands::cmd_import(&gateway, &csv, "expenses", true)
        .await
        .unwrap();
    let stored: Vec<Transaction> = gateway.load_json(StorageKey::ExpenseData).await.unwrap();
    assert_eq!(stored[0].category, Category::Uncategorized);

    commands::cmd_settings_set(&gateway, "ai.enableAutoCategories", "false")
        .await
        .unwrap();
    commands::cmd_import(&gateway, &csv, "expenses", false)
        .await
        .unwrap();
    let stored: Vec<Transaction> = gateway.load_json(StorageKey::ExpenseData).await.unwrap();
    assert_eq!(stored[0].category, Category::Uncategorized);
}

#[tokio::test]
async fn test_cmd_import_revenue_and_forecast() {
    let dir = TempDir::new().unwrap();
    let gateway = setup_gateway(&dir);

    let revenue = write_file(&dir, "revenue.csv", "date,amount\n2024-02,1100\n2024-01,1000\n");
    commands::cmd_import(&gateway, &revenue, "revenue", false)
        .await
        .unwrap();
    let stored: Vec<RevenuePoint> = gateway.load_json(StorageKey::RevenueData).await.unwrap();
    assert_eq!(stored[0].month, "2024-01");

    let forecast = write_file(
        &dir,
        "forecast.csv",
        "date,predicted,lowerBound,upperBound\n2024-03,1200,1080,1320\n",
    );
    commands::cmd_import(&gateway, &forecast, "forecast", false)
        .await
        .unwrap();
    let stored: Vec<ForecastPoint> = gateway.load_json(StorageKey::ForecastData).await.unwrap();
    assert_eq!(stored[0].upper_bound, 1320.0);
}

#[tokio::test]
async fn test_cmd_import_errors() {
    let dir = TempDir::new().unwrap();
    let gateway = setup_gateway(&dir);

    let missing = dir.path().join("missing.csv");
    assert!(commands::cmd_import(&gateway, &missing, "expenses", false)
        .await
        .is_err());

    let csv = write_file(&dir, "budget.csv", "date,amount\n2024-01,5\n");
    let err = commands::cmd_import(&gateway, &csv, "budget", false)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Unknown dataset kind"));

    let invalid = write_file(&dir, "neg.csv", "date,amount\n2024-01,-5\n");
    assert!(commands::cmd_import(&gateway, &invalid, "revenue", false)
        .await
        .is_err());
    assert!(gateway.get("revenue-data").await.is_none());
}

#[tokio::test]
async fn test_cmd_demo_is_repeatable() {
    let dir = TempDir::new().unwrap();
    let gateway = setup_gateway(&dir);

    seed_demo(&gateway).await;
    let first = gateway.get("expense-data").await.unwrap();
    seed_demo(&gateway).await;
    let second = gateway.get("expense-data").await.unwrap();
    assert_eq!(first, second);

    let revenue: Vec<RevenuePoint> = gateway.load_json(StorageKey::RevenueData).await.unwrap();
    assert_eq!(revenue.len(), 12);
    assert_eq!(
        gateway.load_json::<DataSource>(StorageKey::DataSource).await,
        Some(DataSource::Mock)
    );
}

// ========== Analysis Command Tests ==========

#[tokio::test]
async fn test_analysis_commands_without_data() {
    let dir = TempDir::new().unwrap();
    let gateway = setup_gateway(&dir);
    let config = FinsightConfig::default();

    assert!(commands::cmd_anomalies(&gateway, &config, false).await.is_ok());
    assert!(commands::cmd_trends(&gateway).await.is_ok());
    assert!(commands::cmd_forecast(&gateway, &config, None, Some(1)).await.is_ok());
    assert!(commands::cmd_recommend(&gateway, false, Some(1), None, None)
        .await
        .is_ok());
    assert!(gateway.get("forecast-data").await.is_none());
}

#[tokio::test]
async fn test_analysis_commands_on_demo_data() {
    let dir = TempDir::new().unwrap();
    let gateway = setup_gateway(&dir);
    let config = FinsightConfig::default();
    seed_demo(&gateway).await;

    commands::cmd_anomalies(&gateway, &config, false).await.unwrap();
    commands::cmd_anomalies(&gateway, &config, true).await.unwrap();
    commands::cmd_trends(&gateway).await.unwrap();
    commands::cmd_recommend(&gateway, true, Some(3), None, None)
        .await
        .unwrap();

    commands::cmd_forecast(&gateway, &config, Some(4), Some(3))
        .await
        .unwrap();
    let forecast: Vec<ForecastPoint> = gateway.load_json(StorageKey::ForecastData).await.unwrap();
    assert_eq!(forecast.len(), 4);

    commands::cmd_forecast(&gateway, &config, None, Some(3))
        .await
        .unwrap();
    let forecast: Vec<ForecastPoint> = gateway.load_json(StorageKey::ForecastData).await.unwrap();
    assert_eq!(forecast.len(), config.forecast.horizon);
}

#[tokio::test]
async fn test_cmd_anomalies_disabled() {
    let dir = TempDir::new().unwrap();
    let gateway = setup_gateway(&dir);
    seed_demo(&gateway).await;

    commands::cmd_settings_set(&gateway, "ai.enableAnomalyDetection", "false")
        .await
        .unwrap();
    assert!(commands::cmd_anomalies(&gateway, &FinsightConfig::default(), false)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_cmd_recommend_tracking() {
    let dir = TempDir::new().unwrap();
    let gateway = setup_gateway(&dir);

    commands::cmd_recommend(&gateway, false, None, Some("travel-policy-travel"), None)
        .await
        .unwrap();
    let tracker: OptimizationTracker = gateway
        .load_json(StorageKey::OptimizationData)
        .await
        .unwrap();
    assert!(tracker.is_implemented("travel-policy-travel"));

    commands::cmd_recommend(&gateway, false, None, None, Some("travel-policy-travel"))
        .await
        .unwrap();
    let tracker: OptimizationTracker = gateway
        .load_json(StorageKey::OptimizationData)
        .await
        .unwrap();
    assert!(!tracker.is_implemented("travel-policy-travel"));
}

// ========== Report Command Tests ==========

#[tokio::test]
async fn test_cmd_report_generate_all_types() {
    let dir = TempDir::new().unwrap();
    let gateway = setup_gateway(&dir);
    let config = FinsightConfig::default();
    seed_demo(&gateway).await;

    for kind in ["expense", "forecast", "optimization"] {
        commands::cmd_report_generate(&gateway, &config, kind, None, Some(5))
            .await
            .unwrap();
    }

    let history = ReportHistory::load(&gateway, config.reports.history_limit).await;
    assert_eq!(history.len(), 3);
    assert_eq!(history.latest().unwrap().report_type, ReportType::Optimization);
    assert_eq!(history.latest().unwrap().source, DataSource::Mock);

    commands::cmd_report_history(&gateway, &config).await.unwrap();
    commands::cmd_report_metrics(&gateway, &config).await.unwrap();
}

#[tokio::test]
async fn test_cmd_report_export_and_cap() {
    let dir = TempDir::new().unwrap();
    let gateway = setup_gateway(&dir);
    let mut config = FinsightConfig::default();
    config.reports.history_limit = 2;
    seed_demo(&gateway).await;

    let export = dir.path().join("expense-report.json");
    commands::cmd_report_generate(&gateway, &config, "expense", Some(&export), None)
        .await
        .unwrap();
    let exported: ReportResult =
        serde_json::from_str(&fs::read_to_string(&export).unwrap()).unwrap();
    assert_eq!(exported.report_type, ReportType::Expense);

    for _ in 0..3 {
        commands::cmd_report_generate(&gateway, &config, "expense", None, None)
            .await
            .unwrap();
    }
    let history = ReportHistory::load(&gateway, 10).await;
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_cmd_report_errors_and_empty_data() {
    let dir = TempDir::new().unwrap();
    let gateway = setup_gateway(&dir);
    let config = FinsightConfig::default();

    assert!(commands::cmd_report_generate(&gateway, &config, "budget", None, None)
        .await
        .is_err());

    // Nothing stored: prints a hint and records nothing
    commands::cmd_report_generate(&gateway, &config, "expense", None, None)
        .await
        .unwrap();
    assert!(gateway.get("report-history").await.is_none());
    commands::cmd_report_history(&gateway, &config).await.unwrap();
    commands::cmd_report_metrics(&gateway, &config).await.unwrap();
}

// ========== Store Command Tests ==========

#[tokio::test]
async fn test_cmd_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let gateway = setup_gateway(&dir);

    commands::cmd_store_put(&gateway, "notes", "hello", false)
        .await
        .unwrap();
    assert_eq!(gateway.get("notes").await.as_deref(), Some("hello"));

    commands::cmd_store_put(&gateway, "secret", "hunter2", true)
        .await
        .unwrap();
    assert_ne!(gateway.get("secret").await.as_deref(), Some("hunter2"));
    assert_eq!(gateway.get_securely("secret").await.as_deref(), Some("hunter2"));
    commands::cmd_store_get(&gateway, "secret", true).await.unwrap();

    commands::cmd_store_remove(&gateway, "notes").await.unwrap();
    assert!(gateway.get("notes").await.is_none());
    // Removing again is fine
    commands::cmd_store_remove(&gateway, "notes").await.unwrap();
}

#[tokio::test]
async fn test_cmd_store_clear_requires_confirmation() {
    let dir = TempDir::new().unwrap();
    let gateway = setup_gateway(&dir);
    gateway.save("keep", "1").await.unwrap();

    commands::cmd_store_clear(&gateway, false).await.unwrap();
    assert!(gateway.get("keep").await.is_some());

    commands::cmd_store_clear(&gateway, true).await.unwrap();
    assert!(gateway.get("keep").await.is_none());
}

#[tokio::test]
async fn test_cmd_store_probe() {
    let dir = TempDir::new().unwrap();
    let gateway = setup_gateway(&dir);
    assert!(commands::cmd_store_probe(&gateway).await.is_ok());
}

// ========== Settings Command Tests ==========

#[tokio::test]
async fn test_cmd_settings_set_and_reset() {
    let dir = TempDir::new().unwrap();
    let gateway = setup_gateway(&dir);

    commands::cmd_settings_set(&gateway, "account.companyName", "Acme Corp")
        .await
        .unwrap();
    commands::cmd_settings_set(&gateway, "ai.confidenceThreshold", "90")
        .await
        .unwrap();

    let settings = Settings::load(&gateway).await;
    assert_eq!(settings.account.company_name, "Acme Corp");
    assert_eq!(settings.ai.confidence_threshold, 90);

    assert!(commands::cmd_settings_set(&gateway, "ai.bogus", "1")
        .await
        .is_err());

    commands::cmd_settings_show(&gateway).await.unwrap();
    commands::cmd_settings_reset(&gateway).await.unwrap();
    assert_eq!(Settings::load(&gateway).await, Settings::default());
}
