//! Report command implementations

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use finsight_core::{
    config::FinsightConfig,
    detect::AnomalyDetector,
    forecast::ForecastEngine,
    recommend::RecommendationEngine,
    report::{self, DashboardMetrics, ReportHistory, ReportRecord, ReportResult, ReportType},
    storage::StorageGateway,
};

use super::{
    load_data_source, load_expenses, load_forecast, load_revenue, make_rng, print_no_data,
    truncate,
};

/// Build a report of `report_type` from the stored datasets
///
/// Returns `None` (after printing a hint) when the needed data is missing.
async fn build_report(
    gateway: &StorageGateway,
    config: &FinsightConfig,
    report_type: ReportType,
    seed: Option<u64>,
) -> Result<Option<ReportResult>> {
    let now = Utc::now();

    let built = match report_type {
        ReportType::Expense => {
            let expenses = load_expenses(gateway).await;
            if expenses.is_empty() {
                print_no_data("expenses");
                return Ok(None);
            }
            report::expense_report(&expenses, now)
        }
        ReportType::Forecast => {
            let revenue = load_revenue(gateway).await;
            if revenue.is_empty() {
                print_no_data("revenue");
                return Ok(None);
            }
            let mut forecast = load_forecast(gateway).await;
            if forecast.is_empty() {
                let mut engine =
                    ForecastEngine::with_config(make_rng(seed), config.forecast.model.clone());
                forecast = engine
                    .forecast_revenue(&revenue, config.forecast.horizon)
                    .context("Failed to forecast revenue")?;
            }
            report::forecast_report(&revenue, &forecast, now)
        }
        ReportType::Optimization => {
            let expenses = load_expenses(gateway).await;
            if expenses.is_empty() {
                print_no_data("expenses");
                return Ok(None);
            }
            let recommendations = RecommendationEngine::new(make_rng(seed)).recommend(&expenses);
            report::optimization_report(&expenses, &recommendations, now)
        }
    };

    Ok(Some(built))
}

pub async fn cmd_report_generate(
    gateway: &StorageGateway,
    config: &FinsightConfig,
    report_type: &str,
    export: Option<&Path>,
    seed: Option<u64>,
) -> Result<()> {
    let report_type: ReportType = report_type
        .parse()
        .context("Available report types: expense, forecast, optimization")?;

    let Some(generated) = build_report(gateway, config, report_type, seed).await? else {
        return Ok(());
    };

    println!("📄 {}", generated.title);
    println!("   {}", generated.summary);
    println!("   ─────────────────────────────");
    for insight in &generated.insights {
        println!("   • {}", insight);
    }

    if let Some(path) = export {
        report::export_report(&generated, path)
            .with_context(|| format!("Failed to export report to {}", path.display()))?;
        println!();
        println!("💾 Exported to {}", path.display());
    }

    let source = load_data_source(gateway).await;
    let mut history = ReportHistory::load(gateway, config.reports.history_limit).await;
    history.push(ReportRecord::new(generated, source, Utc::now()));
    history
        .save(gateway)
        .await
        .context("Failed to store report history")?;

    Ok(())
}

pub async fn cmd_report_history(gateway: &StorageGateway, config: &FinsightConfig) -> Result<()> {
    let history = ReportHistory::load(gateway, config.reports.history_limit).await;
    if history.is_empty() {
        println!("📭 No reports generated yet.");
        println!("   Run 'finsight report generate expense' to create one.");
        return Ok(());
    }

    println!("🗄️  Report history ({})", history.len());
    println!("   ─────────────────────────────");
    for record in history.records() {
        println!(
            "   {:<19} {:<13} {:<8} {}",
            record.date.get(..19).unwrap_or(&record.date),
            record.report_type.as_str(),
            record.source.as_str(),
            truncate(&record.data.summary, 60)
        );
    }

    Ok(())
}

pub async fn cmd_report_metrics(gateway: &StorageGateway, config: &FinsightConfig) -> Result<()> {
    let expenses = load_expenses(gateway).await;
    let revenue = load_revenue(gateway).await;
    if expenses.is_empty() && revenue.is_empty() {
        print_no_data("data");
        return Ok(());
    }

    let metrics = report::financial_metrics(&expenses, &revenue);

    println!("📊 Financial Metrics");
    println!("   ─────────────────────────────");
    println!("   Total revenue:  {}", report::format_money(metrics.total_revenue));
    println!("   Total expenses: {}", report::format_money(metrics.total_expenses));
    println!("   Profit:         {}", report::format_money(metrics.profit));
    match metrics.profit_margin {
        Some(margin) => println!("   Profit margin:  {:.2}%", margin),
        None => println!("   Profit margin:  n/a (no revenue)"),
    }
    println!("   Revenue growth: {:+.2}%", metrics.revenue_growth);

    if expenses.is_empty() {
        return Ok(());
    }

    let detector = AnomalyDetector::with_config(config.detection.clone());
    let dashboard = DashboardMetrics::build(&expenses, &detector, Utc::now().date_naive());

    println!();
    println!("🧾 Expenses");
    println!("   ─────────────────────────────");
    println!("   Average expense:   {}", report::format_money(dashboard.average_expense));
    println!(
        "   This month:        {} ({:+.1}% vs last month)",
        report::format_money(dashboard.this_month_total),
        dashboard.expense_trend
    );
    println!("   Last month:        {}", report::format_money(dashboard.prev_month_total));
    println!(
        "   Avg this month:    {} ({:+.1}%)",
        report::format_money(dashboard.this_month_avg),
        dashboard.avg_expense_trend
    );
    println!(
        "   Duplicate savings: {}",
        report::format_money(dashboard.potential_savings)
    );
    for item in dashboard.category_data.iter().take(5) {
        println!(
            "   {:<14} {:>12}  {:>5.1}%",
            item.category.as_str(),
            report::format_money(item.amount),
            item.percentage
        );
    }

    Ok(())
}
