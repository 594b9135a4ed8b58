//! Anomaly detection
//!
//! Detects:
//! - Statistical outliers: expenses more than N standard deviations from
//!   their category mean
//! - Duplicate candidates: same day, same vendor, nearly the same amount
//!
//! Every call recomputes from scratch; nothing here is cached or persisted.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Category, Significance, Transaction};
use crate::stats;

/// Detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Categories with fewer transactions are skipped
    pub min_category_size: usize,
    /// Outlier threshold in standard deviations (strict `>`)
    pub deviation_threshold: f64,
    /// Relative amount difference below which two same-day, same-vendor
    /// expenses are considered duplicates
    pub duplicate_tolerance: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_category_size: 3,
            deviation_threshold: 2.0,
            duplicate_tolerance: 0.01,
        }
    }
}

/// A transaction that sits far from its category mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyRecord {
    #[serde(rename = "expense")]
    pub transaction: Transaction,
    pub mean_amount: f64,
    /// Signed distance from the mean in standard deviations
    pub deviation: f64,
    pub significance: Significance,
}

/// Two transactions that look like the same charge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicatePair {
    #[serde(rename = "expense1")]
    pub first: Transaction,
    #[serde(rename = "expense2")]
    pub second: Transaction,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionSummary {
    pub total_anomalies: usize,
    pub total_duplicates: usize,
    pub high_value_anomalies: usize,
    /// Sum of the first transaction of every duplicate pair
    pub savings: f64,
}

/// Results of running detection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResults {
    pub anomalies: Vec<AnomalyRecord>,
    pub potential_duplicates: Vec<DuplicatePair>,
    pub summary: DetectionSummary,
}

/// Main detector that runs all algorithms
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    config: DetectionConfig,
}

impl AnomalyDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Run outlier and duplicate detection and summarize
    pub fn detect_all(&self, transactions: &[Transaction]) -> DetectionResults {
        let anomalies = self.detect_anomalies(transactions);
        let potential_duplicates = self.detect_duplicates(transactions);

        let summary = DetectionSummary {
            total_anomalies: anomalies.len(),
            total_duplicates: potential_duplicates.len(),
            high_value_anomalies: anomalies
                .iter()
                .filter(|a| a.significance == Significance::High)
                .count(),
            // Only one side of each pair counts toward savings
            savings: potential_duplicates.iter().map(|p| p.first.amount).sum(),
        };

        debug!(
            anomalies = summary.total_anomalies,
            duplicates = summary.total_duplicates,
            "Anomaly detection complete"
        );

        DetectionResults {
            anomalies,
            potential_duplicates,
            summary,
        }
    }

    /// Flag expenses whose amount is an outlier within their category
    pub fn detect_anomalies(&self, transactions: &[Transaction]) -> Vec<AnomalyRecord> {
        let mut by_category: HashMap<Category, Vec<&Transaction>> = HashMap::new();
        let mut order: Vec<Category> = Vec::new();
        for tx in transactions {
            by_category
                .entry(tx.category)
                .or_insert_with(|| {
                    order.push(tx.category);
                    Vec::new()
                })
                .push(tx);
        }

        let mut anomalies = Vec::new();

        // Categories in order of first appearance
        for category in order {
            let Some(members) = by_category.remove(&category) else {
                continue;
            };
            if members.len() < self.config.min_category_size {
                continue;
            }

            let amounts: Vec<f64> = members.iter().map(|t| t.amount).collect();
            let (Some(mean), Some(std_dev)) = (stats::mean(&amounts), stats::stddev(&amounts))
            else {
                continue;
            };

            // Zero variance: nothing can be an outlier
            if std_dev == 0.0 {
                debug!(category = category.as_str(), "Skipping zero-variance category");
                continue;
            }

            let threshold = self.config.deviation_threshold * std_dev;
            for tx in members {
                if (tx.amount - mean).abs() > threshold {
                    anomalies.push(AnomalyRecord {
                        transaction: tx.clone(),
                        mean_amount: mean,
                        deviation: (tx.amount - mean) / std_dev,
                        significance: if tx.amount > mean {
                            Significance::High
                        } else {
                            Significance::Low
                        },
                    });
                }
            }
        }

        anomalies
    }

    /// Find same-day, same-vendor pairs with nearly equal amounts
    ///
    /// Candidates are bucketed by (date, vendor) before the pairwise check.
    /// Pairs come back once each, ordered by input position.
    pub fn detect_duplicates(&self, transactions: &[Transaction]) -> Vec<DuplicatePair> {
        let mut buckets: HashMap<(&str, &str), Vec<usize>> = HashMap::new();
        for (idx, tx) in transactions.iter().enumerate() {
            buckets
                .entry((tx.date.as_str(), tx.vendor.as_str()))
                .or_default()
                .push(idx);
        }

        let mut pairs: Vec<(usize, usize)> = Vec::new();
        for indices in buckets.values() {
            for (pos, &i) in indices.iter().enumerate() {
                for &j in &indices[pos + 1..] {
                    let a = transactions[i].amount;
                    let b = transactions[j].amount;
                    if relative_difference(a, b) < self.config.duplicate_tolerance {
                        pairs.push((i, j));
                    }
                }
            }
        }
        pairs.sort_unstable();

        pairs
            .into_iter()
            .map(|(i, j)| DuplicatePair {
                first: transactions[i].clone(),
                second: transactions[j].clone(),
            })
            .collect()
    }
}

/// `|a - b| / max(a, b)`, with two zero amounts counting as identical
fn relative_difference(a: f64, b: f64) -> f64 {
    let larger = a.max(b);
    if larger == 0.0 {
        return 0.0;
    }
    (a - b).abs() / larger
}
