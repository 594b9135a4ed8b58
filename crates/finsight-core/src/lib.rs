//! Finsight Core Library
//!
//! Shared functionality for the Finsight expense analytics tool:
//! - Time series statistics used by every analyser
//! - Anomaly and duplicate detection over expenses
//! - Monthly trend, category and vendor analysis
//! - Revenue forecasting with widening uncertainty bands
//! - Cost-saving recommendations and implementation tracking
//! - CSV import with validation and keyword categorization
//! - Key-value storage with local file and SQLite backends
//! - Report generation, history and export

pub mod categorize;
pub mod config;
pub mod detect;
pub mod error;
pub mod forecast;
pub mod import;
pub mod mock;
pub mod models;
pub mod recommend;
pub mod report;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod trends;

/// Shared fixtures for unit tests
#[cfg(test)]
pub mod test_utils;

pub use categorize::Categorizer;
pub use config::FinsightConfig;
pub use detect::{AnomalyDetector, AnomalyRecord, DetectionConfig, DetectionResults, DuplicatePair};
pub use error::{Error, Result};
pub use forecast::{ForecastConfig, ForecastEngine, GrowthModel};
pub use models::{
    Category, CategoryBreakdown, DataSource, Difficulty, ForecastPoint,
    OptimizationRecommendation, RevenuePoint, Significance, Transaction,
};
pub use recommend::{OptimizationTracker, RecommendationEngine};
pub use report::{
    DashboardMetrics, FinancialMetrics, ReportHistory, ReportRecord, ReportResult, ReportType,
};
pub use settings::Settings;
pub use storage::{BackendKind, StorageBackend, StorageGateway, StorageKey};
pub use trends::{TrendAnalysis, TrendAnalyzer, VendorAnalysis};
