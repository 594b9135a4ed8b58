//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Finsight - Expense analytics for small businesses
#[derive(Parser)]
#[command(name = "finsight")]
#[command(about = "Expense anomaly detection, trends, forecasts and savings", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory (defaults to the config value, then the platform data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to ~/.local/share/finsight/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Storage backend: local or sqlite
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import a CSV dataset
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,

        /// Dataset kind: expenses, revenue, forecast
        #[arg(short, long, default_value = "expenses")]
        kind: String,

        /// Skip keyword categorization of uncategorized expenses
        #[arg(long)]
        no_categorize: bool,
    },

    /// Load generated demo data
    Demo {
        /// Number of expenses to generate
        #[arg(long, default_value = "100")]
        expenses: usize,

        /// Months of revenue to generate
        #[arg(long, default_value = "12")]
        months: usize,

        /// Seed for repeatable data
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Find outlier expenses and likely duplicate charges
    Anomalies {
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show monthly spending trends, category shares and top vendors
    Trends,

    /// Forecast revenue from the stored history
    Forecast {
        /// Months to project (defaults to forecast.horizon from config)
        #[arg(short, long)]
        months: Option<usize>,

        /// Seed for repeatable noise
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Suggest cost savings
    Recommend {
        /// Include recommendations below the confidence threshold
        #[arg(long)]
        all: bool,

        /// Seed for repeatable confidence scores
        #[arg(long)]
        seed: Option<u64>,

        /// Mark a recommendation as implemented
        #[arg(long, value_name = "ID")]
        implement: Option<String>,

        /// Clear the implemented mark on a recommendation
        #[arg(long, value_name = "ID")]
        unmark: Option<String>,
    },

    /// Generate and browse reports
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },

    /// Low-level access to the key-value store
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },

    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
}

#[derive(Subcommand)]
pub enum ReportAction {
    /// Generate a report and add it to the history
    Generate {
        /// Report type: expense, forecast, optimization
        report_type: String,

        /// Also write the report as JSON to this file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Seed for repeatable forecast noise and confidence scores
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List previously generated reports
    History,

    /// Revenue, expense and profit totals
    Metrics,
}

#[derive(Subcommand)]
pub enum StoreAction {
    /// Write a value
    Put {
        key: String,
        value: String,

        /// Obfuscate the value before writing
        #[arg(long)]
        secure: bool,
    },

    /// Read a value
    Get {
        key: String,

        /// Value was written with --secure
        #[arg(long)]
        secure: bool,
    },

    /// Delete a value
    Remove { key: String },

    /// Delete every stored value
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// Check which backends are usable
    Probe,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print current settings
    Show,

    /// Set one field, e.g. `ai.confidenceThreshold 80`
    Set { field: String, value: String },

    /// Restore defaults
    Reset,
}
