//! Derived financial reports
//!
//! Three report kinds built from the same analysers the dashboard uses:
//! - Expense analysis: totals, category shares, latest month movement
//! - Financial forecast: fitted growth, volatility and confidence
//! - Cost optimization: savings by difficulty and category, phased roadmap
//!
//! Generated reports are kept in a capped, newest-first history under the
//! `report-history` key and can be exported as pretty JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Months, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::error::{Error, Result};
use crate::detect::AnomalyDetector;
use crate::models::{
    Category, CategoryBreakdown, DataSource, Difficulty, ForecastPoint, OptimizationRecommendation, RevenuePoint,
    Transaction,
};
use crate::recommend::{group_by_difficulty, total_potential_savings};
use crate::stats;
use crate::storage::{StorageGateway, StorageKey};
use crate::trends::{category_breakdown, TrendAnalyzer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Expense,
    Forecast,
    Optimization,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Forecast => "forecast",
            Self::Optimization => "optimization",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Expense => "Expense Analysis",
            Self::Forecast => "Financial Forecast",
            Self::Optimization => "Cost Optimization",
        }
    }
}

impl std::str::FromStr for ReportType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(Self::Expense),
            "forecast" => Ok(Self::Forecast),
            "optimization" => Ok(Self::Optimization),
            other => Err(Error::InvalidData(format!("Unknown report type: {}", other))),
        }
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A generated report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResult {
    pub title: String,
    /// RFC 3339 generation time
    pub date: String,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub summary: String,
    pub insights: Vec<String>,
    pub data: serde_json::Value,
}

/// Format as dollars with thousands separators, e.g. `$12,345.67`
pub fn format_money(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = format!("{:.2}", amount.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((&cents, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{}", sign, grouped, frac)
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Expense analysis over a transaction set
pub fn expense_report(expenses: &[Transaction], now: DateTime<Utc>) -> ReportResult {
    let breakdown = category_breakdown(expenses);
    let total: f64 = expenses.iter().map(|t| t.amount).sum();
    let count = expenses.len();
    let average = if count > 0 { total / count as f64 } else { 0.0 };

    // Latest month against the one before it
    let analysis = TrendAnalyzer::new().analyze(expenses);
    let month_over_month = analysis
        .trends
        .last()
        .and_then(|t| t.percent_change)
        .unwrap_or(0.0);

    let mut insights = vec![
        format!("Total expenses for the period: {}", format_money(total)),
        format!("Month-over-month change: {:.1}%", month_over_month),
        match breakdown.first() {
            Some(top) => format!(
                "Largest expense category: {} ({:.1}%)",
                top.category, top.percentage
            ),
            None => "Largest expense category: N/A (0%)".to_string(),
        },
        format!("Average transaction amount: {}", format_money(average)),
        format!("Number of transactions: {}", count),
    ];
    insights.extend(
        breakdown
            .iter()
            .filter(|b| b.percentage > 15.0)
            .map(|b| {
                format!(
                    "{} accounts for {:.1}% of total expenses",
                    b.category, b.percentage
                )
            }),
    );

    ReportResult {
        title: ReportType::Expense.title().to_string(),
        date: timestamp(now),
        report_type: ReportType::Expense,
        summary: format!(
            "Analysis of {} expenses totaling {}",
            count,
            format_money(total)
        ),
        insights,
        data: json!({
            "totalExpenses": total,
            "categoryBreakdown": breakdown,
            "monthOverMonthChange": month_over_month,
            "transactionCount": count,
            "averageTransaction": average,
        }),
    }
}

/// Confidence tier from the spread of monthly growth, in percentage points
pub fn confidence_level(volatility: f64) -> &'static str {
    if volatility < 5.0 {
        "High"
    } else if volatility < 15.0 {
        "Medium"
    } else {
        "Low"
    }
}

/// Forecast report from a revenue history and its projection
pub fn forecast_report(
    revenue: &[RevenuePoint],
    forecast: &[ForecastPoint],
    now: DateTime<Utc>,
) -> ReportResult {
    let values: Vec<f64> = revenue.iter().map(|r| r.amount).collect();
    let rates = stats::period_growth_rates(&values);
    let avg_growth = stats::mean(&rates).unwrap_or(0.0);
    let volatility = stats::volatility(&rates).unwrap_or(0.0);
    let level = confidence_level(volatility);

    let mut insights = vec![
        format!("Average monthly growth rate: {:.2}%", avg_growth),
        format!(
            "Growth trend: {}",
            if avg_growth > 0.0 { "Positive" } else { "Negative" }
        ),
        format!("Forecast confidence: {}", level),
    ];
    if let Some(last) = forecast.last() {
        insights.push(format!(
            "Projected revenue in {} months: {}",
            forecast.len(),
            format_money(last.predicted)
        ));
    }
    insights.push(
        if avg_growth > 10.0 {
            "Consider expanding operations based on strong growth trend"
        } else if avg_growth > 0.0 {
            "Maintain current strategy while focusing on optimization"
        } else {
            "Evaluate cost-cutting measures due to negative growth trend"
        }
        .to_string(),
    );

    ReportResult {
        title: ReportType::Forecast.title().to_string(),
        date: timestamp(now),
        report_type: ReportType::Forecast,
        summary: format!(
            "{}-month financial forecast with {} confidence",
            forecast.len(),
            level.to_lowercase()
        ),
        insights,
        data: json!({
            "historicalRevenue": revenue,
            "forecastData": forecast,
            "avgGrowthRate": avg_growth,
            "volatility": volatility,
            "confidenceLevel": level,
        }),
    }
}

/// One step of the implementation plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapPhase {
    pub phase: String,
    pub recommendations: Vec<OptimizationRecommendation>,
}

/// Easy wins first, then medium, then strategic; highest savings first within a tier
pub fn implementation_roadmap(recommendations: &[OptimizationRecommendation]) -> Vec<RoadmapPhase> {
    let mut sorted: Vec<&OptimizationRecommendation> = recommendations.iter().collect();
    sorted.sort_by(|a, b| {
        a.implementation_difficulty
            .cmp(&b.implementation_difficulty)
            .then_with(|| {
                b.potential_savings
                    .partial_cmp(&a.potential_savings)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });

    let phase = |name: &str, difficulty: Difficulty, take: usize| RoadmapPhase {
        phase: name.to_string(),
        recommendations: sorted
            .iter()
            .filter(|r| r.implementation_difficulty == difficulty)
            .take(take)
            .map(|r| (*r).clone())
            .collect(),
    };

    vec![
        phase("Phase 1: Quick Wins (Week 1-2)", Difficulty::Easy, 3),
        phase("Phase 2: Medium Effort (Week 3-6)", Difficulty::Medium, 3),
        phase("Phase 3: Strategic Changes (Week 7-12)", Difficulty::Hard, 2),
    ]
}

/// Cost optimization report for a set of recommendations
pub fn optimization_report(
    expenses: &[Transaction],
    recommendations: &[OptimizationRecommendation],
    now: DateTime<Utc>,
) -> ReportResult {
    let total_savings = total_potential_savings(recommendations);
    let total_expenses: f64 = expenses.iter().map(|t| t.amount).sum();
    let percent_of_expenses = if total_expenses > 0.0 {
        total_savings / total_expenses * 100.0
    } else {
        0.0
    };

    let by_difficulty = group_by_difficulty(recommendations);
    let mut by_category: BTreeMap<Category, Vec<&OptimizationRecommendation>> = BTreeMap::new();
    for rec in recommendations {
        by_category.entry(rec.category).or_default().push(rec);
    }

    // Strict comparison keeps the first category on ties
    let mut highest: Option<(Category, f64)> = None;
    for (category, recs) in &by_category {
        let savings: f64 = recs.iter().map(|r| r.potential_savings).sum();
        if highest.map_or(true, |(_, best)| savings > best) {
            highest = Some((*category, savings));
        }
    }

    let easy_count = by_difficulty.get(&Difficulty::Easy).map_or(0, Vec::len);
    let mut insights = vec![
        format!(
            "Total potential savings: {} ({:.1}% of expenses)",
            format_money(total_savings),
            percent_of_expenses
        ),
        format!("{} cost-saving opportunities identified", recommendations.len()),
        format!("{} easy-to-implement recommendations", easy_count),
        match highest {
            Some((category, savings)) => format!(
                "Highest savings category: {} ({})",
                category,
                format_money(savings)
            ),
            None => "Highest savings category: N/A".to_string(),
        },
    ];

    let mut top: Vec<&OptimizationRecommendation> = recommendations.iter().collect();
    top.sort_by(|a, b| {
        b.potential_savings
            .partial_cmp(&a.potential_savings)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    insights.extend(
        top.iter()
            .take(3)
            .map(|r| format!("{}: Save {}", r.title, format_money(r.potential_savings))),
    );

    let by_difficulty_json: BTreeMap<&str, &Vec<&OptimizationRecommendation>> = by_difficulty
        .iter()
        .map(|(d, recs)| (d.as_str(), recs))
        .collect();
    let by_category_json: BTreeMap<&str, &Vec<&OptimizationRecommendation>> = by_category
        .iter()
        .map(|(c, recs)| (c.as_str(), recs))
        .collect();

    ReportResult {
        title: ReportType::Optimization.title().to_string(),
        date: timestamp(now),
        report_type: ReportType::Optimization,
        summary: format!(
            "{} cost-saving opportunities with potential savings of {}",
            recommendations.len(),
            format_money(total_savings)
        ),
        insights,
        data: json!({
            "recommendations": recommendations,
            "byDifficulty": by_difficulty_json,
            "byCategory": by_category_json,
            "totalPotentialSavings": total_savings,
            "percentOfExpenses": percent_of_expenses,
            "implementationRoadmap": implementation_roadmap(recommendations),
        }),
    }
}

/// Headline profit and growth numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetrics {
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub profit: f64,
    /// Percent of revenue, rounded to 2 places; `None` without revenue
    pub profit_margin: Option<f64>,
    /// Last month against the one before, rounded to 2 places
    pub revenue_growth: f64,
}

pub fn financial_metrics(expenses: &[Transaction], revenue: &[RevenuePoint]) -> FinancialMetrics {
    let total_revenue: f64 = revenue.iter().map(|r| r.amount).sum();
    let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();
    let profit = total_revenue - total_expenses;

    let profit_margin = (total_revenue != 0.0).then(|| round2(profit / total_revenue * 100.0));

    let n = revenue.len();
    let revenue_growth = if n >= 2 && revenue[n - 2].amount > 0.0 {
        round2(stats::growth_rate(revenue[n - 1].amount, revenue[n - 2].amount).unwrap_or(0.0))
    } else {
        0.0
    };

    FinancialMetrics {
        total_revenue,
        total_expenses,
        profit,
        profit_margin,
        revenue_growth,
    }
}

/// Dashboard headline numbers for the expense set
///
/// Month totals use the calendar month of the reference date and the one
/// before it. Trends are percent changes and stay at 0 without a previous
/// month to compare against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_expenses: f64,
    /// Whole dollars
    pub average_expense: f64,
    /// Money tied up in likely duplicate charges
    pub potential_savings: f64,
    pub this_month_total: f64,
    pub prev_month_total: f64,
    pub expense_trend: f64,
    pub this_month_avg: f64,
    pub prev_month_avg: f64,
    pub avg_expense_trend: f64,
    pub category_data: Vec<CategoryBreakdown>,
}

/// (total, average) for the expenses in a `YYYY-MM` month
fn month_totals(expenses: &[Transaction], month: &str) -> (f64, f64) {
    let amounts: Vec<f64> = expenses
        .iter()
        .filter(|e| e.month() == month)
        .map(|e| e.amount)
        .collect();
    let total: f64 = amounts.iter().sum();
    (total, stats::mean(&amounts).unwrap_or(0.0))
}

fn percent_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

impl DashboardMetrics {
    pub fn build(expenses: &[Transaction], detector: &AnomalyDetector, today: NaiveDate) -> Self {
        let total_expenses: f64 = expenses.iter().map(|e| e.amount).sum();
        let average_expense = stats::mean(&expenses.iter().map(|e| e.amount).collect::<Vec<_>>())
            .map(f64::round)
            .unwrap_or(0.0);

        let potential_savings = detector
            .detect_duplicates(expenses)
            .iter()
            .map(|p| p.first.amount)
            .sum();

        let this_month = today.format("%Y-%m").to_string();
        let prev_month = today
            .checked_sub_months(Months::new(1))
            .map(|d| d.format("%Y-%m").to_string())
            .unwrap_or_default();

        let (this_month_total, this_month_avg) = month_totals(expenses, &this_month);
        let (prev_month_total, prev_month_avg) = month_totals(expenses, &prev_month);

        Self {
            total_expenses,
            average_expense,
            potential_savings,
            this_month_total,
            prev_month_total,
            expense_trend: percent_change(this_month_total, prev_month_total),
            this_month_avg,
            prev_month_avg,
            avg_expense_trend: percent_change(this_month_avg, prev_month_avg),
            category_data: category_breakdown(expenses),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A report as kept in the history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: String,
    pub title: String,
    pub date: String,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub source: DataSource,
    pub data: ReportResult,
}

impl ReportRecord {
    pub fn new(report: ReportResult, source: DataSource, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("report-{}", now.timestamp_millis()),
            title: report.title.clone(),
            date: timestamp(now),
            report_type: report.report_type,
            source,
            data: report,
        }
    }
}

/// Newest-first list of generated reports, capped at `limit`
#[derive(Debug, Clone, PartialEq)]
pub struct ReportHistory {
    records: Vec<ReportRecord>,
    limit: usize,
}

impl ReportHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            records: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Load the stored history; missing or malformed history starts empty
    pub async fn load(gateway: &StorageGateway, limit: usize) -> Self {
        let mut history = Self::new(limit);
        if let Some(records) = gateway
            .load_json::<Vec<ReportRecord>>(StorageKey::ReportHistory)
            .await
        {
            history.records = records;
            history.records.truncate(history.limit);
        }
        history
    }

    pub async fn save(&self, gateway: &StorageGateway) -> Result<()> {
        gateway
            .save_json(StorageKey::ReportHistory, &self.records)
            .await
    }

    /// Add a record at the front, dropping the oldest beyond the cap
    pub fn push(&mut self, record: ReportRecord) {
        self.records.insert(0, record);
        self.records.truncate(self.limit);
    }

    pub fn records(&self) -> &[ReportRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&ReportRecord> {
        self.records.first()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Write a report as pretty-printed JSON
pub fn export_report(report: &ReportResult, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    info!("Exported {} report to {}", report.report_type, path.display());
    Ok(())
}
