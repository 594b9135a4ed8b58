//! Spending trends
//!
//! Month-over-month expense movement, category share and vendor
//! concentration. All functions are pure and recompute from the full set.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Category, CategoryBreakdown, Transaction};
use crate::stats;

/// One month compared against the month before it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub month: String,
    pub amount: f64,
    pub previous_amount: f64,
    /// `None` when the previous month total was zero
    pub percent_change: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub trends: Vec<TrendPoint>,
    pub average_monthly_expense: Option<f64>,
    pub highest_month: Option<String>,
    pub lowest_month: Option<String>,
}

/// Aggregates transactions by calendar month
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendAnalyzer;

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Sum of amounts per `YYYY-MM`, chronologically ordered
    pub fn monthly_totals(&self, transactions: &[Transaction]) -> BTreeMap<String, f64> {
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for tx in transactions {
            *totals.entry(tx.month().to_string()).or_insert(0.0) += tx.amount;
        }
        totals
    }

    pub fn analyze(&self, transactions: &[Transaction]) -> TrendAnalysis {
        let totals = self.monthly_totals(transactions);
        let months: Vec<(&String, f64)> = totals.iter().map(|(m, a)| (m, *a)).collect();

        let trends: Vec<TrendPoint> = months
            .windows(2)
            .map(|pair| {
                let (_, previous_amount) = pair[0];
                let (month, amount) = pair[1];
                TrendPoint {
                    month: month.clone(),
                    amount,
                    previous_amount,
                    percent_change: stats::growth_rate(amount, previous_amount),
                }
            })
            .collect();

        let amounts: Vec<f64> = months.iter().map(|(_, a)| *a).collect();

        // Strict comparisons keep the earliest month on ties
        let mut highest: Option<(&String, f64)> = None;
        let mut lowest: Option<(&String, f64)> = None;
        for &(month, amount) in &months {
            if highest.map_or(true, |(_, best)| amount > best) {
                highest = Some((month, amount));
            }
            if lowest.map_or(true, |(_, best)| amount < best) {
                lowest = Some((month, amount));
            }
        }

        debug!(months = months.len(), "Trend analysis complete");

        TrendAnalysis {
            trends,
            average_monthly_expense: stats::mean(&amounts),
            highest_month: highest.map(|(m, _)| m.clone()),
            lowest_month: lowest.map(|(m, _)| m.clone()),
        }
    }
}

/// Per-category totals and share of overall spend, largest first
///
/// Categories with no spend are dropped.
pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryBreakdown> {
    let mut totals: BTreeMap<Category, f64> = BTreeMap::new();
    for tx in transactions {
        *totals.entry(tx.category).or_insert(0.0) += tx.amount;
    }

    let grand_total: f64 = totals.values().sum();

    let mut breakdown: Vec<CategoryBreakdown> = totals
        .into_iter()
        .filter(|(_, amount)| *amount > 0.0)
        .map(|(category, amount)| CategoryBreakdown {
            category,
            amount,
            percentage: if grand_total > 0.0 {
                amount / grand_total * 100.0
            } else {
                0.0
            },
        })
        .collect();

    breakdown.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    breakdown
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorSpend {
    pub vendor: String,
    pub amount: f64,
    pub frequency: usize,
    pub average_transaction: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorAnalysis {
    /// Five largest vendors by total spend
    pub top_vendors: Vec<VendorSpend>,
    pub vendor_count: usize,
    pub total_spend: f64,
    pub average_vendor_spend: Option<f64>,
}

/// Vendor concentration summary
pub fn vendor_analysis(transactions: &[Transaction]) -> VendorAnalysis {
    let mut per_vendor: HashMap<&str, (f64, usize)> = HashMap::new();
    for tx in transactions {
        let entry = per_vendor.entry(tx.vendor.as_str()).or_insert((0.0, 0));
        entry.0 += tx.amount;
        entry.1 += 1;
    }

    let mut vendors: Vec<VendorSpend> = per_vendor
        .into_iter()
        .map(|(vendor, (amount, frequency))| VendorSpend {
            vendor: vendor.to_string(),
            amount,
            frequency,
            average_transaction: amount / frequency as f64,
        })
        .collect();

    vendors.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.vendor.cmp(&b.vendor))
    });

    let totals: Vec<f64> = vendors.iter().map(|v| v.amount).collect();
    let vendor_count = vendors.len();
    vendors.truncate(5);

    VendorAnalysis {
        top_vendors: vendors,
        vendor_count,
        total_spend: totals.iter().sum(),
        average_vendor_spend: stats::mean(&totals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{expense, sample_expenses};

    #[test]
    fn test_empty_input() {
        let analysis = TrendAnalyzer::new().analyze(&[]);
        assert!(analysis.trends.is_empty());
        assert_eq!(analysis.average_monthly_expense, None);
        assert_eq!(analysis.highest_month, None);
        assert_eq!(analysis.lowest_month, None);
    }

    #[test]
    fn test_month_over_month() {
        let txs = vec![
            expense("1", "2024-02-03", 150.0, Category::Rent, "A"),
            expense("2", "2024-01-10", 60.0, Category::Rent, "A"),
            expense("3", "2024-01-25", 40.0, Category::Rent, "B"),
            expense("4", "2024-03-01", 75.0, Category::Rent, "A"),
        ];
        let analysis = TrendAnalyzer::new().analyze(&txs);

        assert_eq!(analysis.trends.len(), 2);
        assert_eq!(analysis.trends[0].month, "2024-02");
        assert_eq!(analysis.trends[0].previous_amount, 100.0);
        assert!((analysis.trends[0].percent_change.unwrap() - 50.0).abs() < 1e-9);
        assert!((analysis.trends[1].percent_change.unwrap() + 50.0).abs() < 1e-9);

        assert!((analysis.average_monthly_expense.unwrap() - 325.0 / 3.0).abs() < 1e-9);
        assert_eq!(analysis.highest_month.as_deref(), Some("2024-02"));
        assert_eq!(analysis.lowest_month.as_deref(), Some("2024-03"));
    }

    #[test]
    fn test_single_month_has_extrema_but_no_trend() {
        let txs = vec![expense("1", "2024-05-01", 10.0, Category::Rent, "A")];
        let analysis = TrendAnalyzer::new().analyze(&txs);
        assert!(analysis.trends.is_empty());
        assert_eq!(analysis.highest_month.as_deref(), Some("2024-05"));
        assert_eq!(analysis.lowest_month.as_deref(), Some("2024-05"));
    }

    #[test]
    fn test_ties_keep_first_month() {
        let txs = vec![
            expense("1", "2024-02-01", 10.0, Category::Rent, "A"),
            expense("2", "2024-01-01", 10.0, Category::Rent, "A"),
        ];
        let analysis = TrendAnalyzer::new().analyze(&txs);
        assert_eq!(analysis.highest_month.as_deref(), Some("2024-01"));
        assert_eq!(analysis.lowest_month.as_deref(), Some("2024-01"));
    }

    #[test]
    fn test_zero_previous_month_has_no_percent() {
        let txs = vec![
            expense("1", "2024-01-01", 0.0, Category::Rent, "A"),
            expense("2", "2024-02-01", 10.0, Category::Rent, "A"),
        ];
        let analysis = TrendAnalyzer::new().analyze(&txs);
        assert_eq!(analysis.trends[0].percent_change, None);
    }

    #[test]
    fn test_category_breakdown_sorted_and_sums_to_100() {
        let breakdown = category_breakdown(&sample_expenses());
        assert_eq!(breakdown[0].category, Category::Software);
        let total: f64 = breakdown.iter().map(|b| b.percentage).sum();
        assert!((total - 100.0).abs() < 1e-6);
        assert!(breakdown.windows(2).all(|w| w[0].amount >= w[1].amount));
    }

    #[test]
    fn test_vendor_analysis() {
        let analysis = vendor_analysis(&sample_expenses());
        assert_eq!(analysis.vendor_count, 8);
        assert_eq!(analysis.top_vendors.len(), 5);
        assert_eq!(analysis.top_vendors[0].vendor, "WeWork");
        assert_eq!(analysis.top_vendors[0].frequency, 2);
        assert!((analysis.top_vendors[0].amount - 6100.0).abs() < 1e-9);
    }
}
