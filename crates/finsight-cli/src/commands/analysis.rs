//! Analysis command implementations (anomalies, trends, forecast, recommend)

use anyhow::{Context, Result};
use finsight_core::{
    config::FinsightConfig,
    detect::AnomalyDetector,
    forecast::{forecast_insights, revenue_insights, ForecastEngine},
    models::Significance,
    recommend::{
        cost_suggestions, total_potential_savings, OptimizationTracker, RecommendationEngine,
    },
    settings::Settings,
    storage::{StorageGateway, StorageKey},
    trends::{category_breakdown, vendor_analysis, TrendAnalyzer},
};

use super::{load_expenses, load_revenue, make_rng, print_no_data, truncate};

pub async fn cmd_anomalies(
    gateway: &StorageGateway,
    config: &FinsightConfig,
    json: bool,
) -> Result<()> {
    let settings = Settings::load(gateway).await;
    if !settings.ai.enable_anomaly_detection {
        println!("⏸️  Anomaly detection is disabled.");
        println!("   Enable it with: finsight settings set ai.enableAnomalyDetection true");
        return Ok(());
    }

    let expenses = load_expenses(gateway).await;
    if expenses.is_empty() {
        print_no_data("expenses");
        return Ok(());
    }

    let results = AnomalyDetector::with_config(config.detection.clone()).detect_all(&expenses);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!("🔍 Scanned {} expenses", expenses.len());
    println!();
    println!("📊 Anomalies ({})", results.summary.total_anomalies);
    println!("   ─────────────────────────────");
    for anomaly in &results.anomalies {
        let marker = match anomaly.significance {
            Significance::High => "⬆️ ",
            Significance::Low => "⬇️ ",
        };
        println!(
            "   {} {} {:<24} ${:>10.2}  (mean ${:.2}, {:+.1}σ)",
            marker,
            anomaly.transaction.date,
            truncate(&anomaly.transaction.description, 24),
            anomaly.transaction.amount,
            anomaly.mean_amount,
            anomaly.deviation
        );
    }

    println!();
    println!(
        "👯 Potential duplicates ({})",
        results.summary.total_duplicates
    );
    println!("   ─────────────────────────────");
    for pair in &results.potential_duplicates {
        println!(
            "   {} {:<20} ${:.2} / ${:.2}  [{} · {}]",
            pair.first.date,
            truncate(&pair.first.vendor, 20),
            pair.first.amount,
            pair.second.amount,
            pair.first.id,
            pair.second.id
        );
    }

    if results.summary.total_duplicates > 0 {
        println!();
        println!(
            "💰 Resolving duplicates could save ${:.2}",
            results.summary.savings
        );
    }

    Ok(())
}

pub async fn cmd_trends(gateway: &StorageGateway) -> Result<()> {
    let expenses = load_expenses(gateway).await;
    if expenses.is_empty() {
        print_no_data("expenses");
        return Ok(());
    }

    let analysis = TrendAnalyzer::new().analyze(&expenses);

    println!("📈 Monthly Trends");
    println!("   ─────────────────────────────");
    for point in &analysis.trends {
        let change = point
            .percent_change
            .map(|p| format!("{:+.1}%", p))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "   {}  ${:>10.2}  (prev ${:.2}, {})",
            point.month, point.amount, point.previous_amount, change
        );
    }
    if let Some(avg) = analysis.average_monthly_expense {
        println!("   Average monthly expense: ${:.2}", avg);
    }
    if let (Some(high), Some(low)) = (&analysis.highest_month, &analysis.lowest_month) {
        println!("   Highest: {}   Lowest: {}", high, low);
    }

    println!();
    println!("🗂️  Categories");
    println!("   ─────────────────────────────");
    for item in category_breakdown(&expenses) {
        println!(
            "   {:<14} ${:>10.2}  {:>5.1}%",
            item.category.as_str(),
            item.amount,
            item.percentage
        );
    }

    let vendors = vendor_analysis(&expenses);
    println!();
    println!("🏪 Top Vendors ({} total)", vendors.vendor_count);
    println!("   ─────────────────────────────");
    for vendor in &vendors.top_vendors {
        println!(
            "   {:<20} ${:>10.2}  {} purchases",
            truncate(&vendor.vendor, 20),
            vendor.amount,
            vendor.frequency
        );
    }

    Ok(())
}

pub async fn cmd_forecast(
    gateway: &StorageGateway,
    config: &FinsightConfig,
    months: Option<usize>,
    seed: Option<u64>,
) -> Result<()> {
    let revenue = load_revenue(gateway).await;
    if revenue.is_empty() {
        print_no_data("revenue");
        return Ok(());
    }

    let horizon = months.unwrap_or(config.forecast.horizon);
    let mut engine = ForecastEngine::with_config(make_rng(seed), config.forecast.model.clone());
    let forecast = engine
        .forecast_revenue(&revenue, horizon)
        .context("Failed to forecast revenue")?;

    gateway
        .save_json(StorageKey::ForecastData, &forecast)
        .await
        .context("Failed to store forecast")?;

    println!(
        "🔮 Revenue forecast ({} months from {} months of history)",
        forecast.len(),
        revenue.len()
    );
    println!("   ─────────────────────────────");
    for point in &forecast {
        println!(
            "   {}  ${:>10.2}   [{:.2} - {:.2}]",
            point.month, point.predicted, point.lower_bound, point.upper_bound
        );
    }

    let settings = Settings::load(gateway).await;
    if settings.ai.enable_forecast_suggestions {
        println!();
        println!("💡 Insights");
        for insight in revenue_insights(&revenue)
            .into_iter()
            .chain(forecast_insights(&forecast))
        {
            println!("   • {}", insight);
        }
    }

    Ok(())
}

pub async fn cmd_recommend(
    gateway: &StorageGateway,
    show_all: bool,
    seed: Option<u64>,
    implement: Option<&str>,
    unmark: Option<&str>,
) -> Result<()> {
    let mut tracker: OptimizationTracker = gateway
        .load_json(StorageKey::OptimizationData)
        .await
        .unwrap_or_default();

    if implement.is_some() || unmark.is_some() {
        if let Some(id) = implement {
            tracker.mark_implemented(id);
            println!("✅ Marked '{}' as implemented", id);
        }
        if let Some(id) = unmark {
            if tracker.unmark(id) {
                println!("↩️  Cleared '{}'", id);
            } else {
                println!("   '{}' was not marked", id);
            }
        }
        gateway
            .save_json(StorageKey::OptimizationData, &tracker)
            .await
            .context("Failed to store optimization progress")?;
        return Ok(());
    }

    let expenses = load_expenses(gateway).await;
    if expenses.is_empty() {
        print_no_data("expenses");
        return Ok(());
    }

    let settings = Settings::load(gateway).await;
    let min_confidence = settings.ai.min_confidence();

    let recommendations = RecommendationEngine::new(make_rng(seed)).recommend(&expenses);
    let visible: Vec<_> = recommendations
        .iter()
        .filter(|r| show_all || r.confidence >= min_confidence)
        .cloned()
        .collect();
    let hidden = recommendations.len() - visible.len();

    println!("💡 Cost-saving recommendations");
    println!("   ─────────────────────────────");
    for rec in &visible {
        let status = if tracker.is_implemented(&rec.id) { "✓" } else { " " };
        println!(
            "   [{}] {:<40} ${:>9.2}  {:<6} {:>3.0}%",
            status,
            truncate(&rec.title, 40),
            rec.potential_savings,
            rec.implementation_difficulty.as_str(),
            rec.confidence * 100.0
        );
        println!("       id: {}", rec.id);
    }
    if hidden > 0 {
        println!(
            "   ({} below the {}% confidence threshold; use --all to show)",
            hidden, settings.ai.confidence_threshold
        );
    }

    println!();
    println!(
        "💰 Potential savings: ${:.2} (realized ${:.2})",
        total_potential_savings(&visible),
        tracker.realized_savings(&visible)
    );

    println!();
    println!("📝 Suggestions");
    for suggestion in cost_suggestions(&expenses) {
        println!("   • {}", suggestion);
    }

    Ok(())
}
