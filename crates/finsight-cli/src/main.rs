//! Finsight CLI - Expense analytics for small businesses
//!
//! Usage:
//!   finsight demo                        Load generated demo data
//!   finsight import --file expenses.csv  Import expenses (or --kind revenue)
//!   finsight anomalies                   Find outliers and duplicate charges
//!   finsight forecast --months 6         Project revenue
//!   finsight report generate expense     Build and store a report

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(
        cli.config.as_deref(),
        cli.backend.as_deref(),
        cli.data_dir.as_deref(),
    )?;
    let gateway = commands::open_gateway(&config)?;

    match cli.command {
        Commands::Import {
            file,
            kind,
            no_categorize,
        } => commands::cmd_import(&gateway, &file, &kind, no_categorize).await,
        Commands::Demo {
            expenses,
            months,
            seed,
        } => commands::cmd_demo(&gateway, expenses, months, seed).await,
        Commands::Anomalies { json } => commands::cmd_anomalies(&gateway, &config, json).await,
        Commands::Trends => commands::cmd_trends(&gateway).await,
        Commands::Forecast { months, seed } => {
            commands::cmd_forecast(&gateway, &config, months, seed).await
        }
        Commands::Recommend {
            all,
            seed,
            implement,
            unmark,
        } => {
            commands::cmd_recommend(
                &gateway,
                all,
                seed,
                implement.as_deref(),
                unmark.as_deref(),
            )
            .await
        }
        Commands::Report { action } => match action {
            ReportAction::Generate {
                report_type,
                export,
                seed,
            } => {
                commands::cmd_report_generate(
                    &gateway,
                    &config,
                    &report_type,
                    export.as_deref(),
                    seed,
                )
                .await
            }
            ReportAction::History => commands::cmd_report_history(&gateway, &config).await,
            ReportAction::Metrics => commands::cmd_report_metrics(&gateway, &config).await,
        },
        Commands::Store { action } => match action {
            StoreAction::Put { key, value, secure } => {
                commands::cmd_store_put(&gateway, &key, &value, secure).await
            }
            StoreAction::Get { key, secure } => commands::cmd_store_get(&gateway, &key, secure).await,
            StoreAction::Remove { key } => commands::cmd_store_remove(&gateway, &key).await,
            StoreAction::Clear { yes } => commands::cmd_store_clear(&gateway, yes).await,
            StoreAction::Probe => commands::cmd_store_probe(&gateway).await,
        },
        Commands::Settings { action } => match action {
            None | Some(SettingsAction::Show) => commands::cmd_settings_show(&gateway).await,
            Some(SettingsAction::Set { field, value }) => {
                commands::cmd_settings_set(&gateway, &field, &value).await
            }
            Some(SettingsAction::Reset) => commands::cmd_settings_reset(&gateway).await,
        },
    }
}
