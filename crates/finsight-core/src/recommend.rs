//! Cost-saving recommendations
//!
//! Fixed-percentage heuristics over category and vendor totals. Each rule
//! carries a confidence band; the jitter inside the band comes from an
//! injected RNG.

use std::collections::{BTreeMap, HashSet};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detect::AnomalyDetector;
use crate::models::{Category, Difficulty, OptimizationRecommendation, Transaction};

/// Vendors with at least this many purchases in a category get a consolidation hint
const CONSOLIDATION_MIN_PURCHASES: usize = 3;
/// Datasets larger than this get the general expense policy hint
const EXPENSE_POLICY_MIN_TRANSACTIONS: usize = 10;

/// Base confidence and jitter span for a rule
#[derive(Debug, Clone, Copy)]
struct ConfidenceBand {
    base: f64,
    span: f64,
}

impl ConfidenceBand {
    const fn new(base: f64, span: f64) -> Self {
        Self { base, span }
    }
}

/// A category-wide rule
struct CategoryRule {
    name: &'static str,
    category: Category,
    /// Category total must exceed this for the rule to fire
    threshold: f64,
    savings_rate: f64,
    difficulty: Difficulty,
    confidence: ConfidenceBand,
    title: &'static str,
}

const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        name: "license-audit",
        category: Category::Software,
        threshold: 5000.0,
        savings_rate: 0.25,
        difficulty: Difficulty::Medium,
        confidence: ConfidenceBand::new(0.85, 0.05),
        title: "Software license audit",
    },
    CategoryRule {
        name: "travel-policy",
        category: Category::Travel,
        threshold: 3000.0,
        savings_rate: 0.20,
        difficulty: Difficulty::Medium,
        confidence: ConfidenceBand::new(0.80, 0.05),
        title: "Implement travel policy guidelines",
    },
    CategoryRule {
        name: "utility-optimization",
        category: Category::Utilities,
        threshold: f64::NEG_INFINITY,
        savings_rate: 0.12,
        difficulty: Difficulty::Medium,
        confidence: ConfidenceBand::new(0.70, 0.05),
        title: "Optimize utility usage",
    },
    CategoryRule {
        name: "supplies-inventory",
        category: Category::Supplies,
        threshold: f64::NEG_INFINITY,
        savings_rate: 0.18,
        difficulty: Difficulty::Easy,
        confidence: ConfidenceBand::new(0.82, 0.05),
        title: "Implement supplies inventory system",
    },
    CategoryRule {
        name: "marketing-roi",
        category: Category::Marketing,
        threshold: f64::NEG_INFINITY,
        savings_rate: 0.30,
        difficulty: Difficulty::Hard,
        confidence: ConfidenceBand::new(0.75, 0.05),
        title: "Evaluate marketing ROI",
    },
];

const CONSOLIDATION_RATE: f64 = 0.15;
const CONSOLIDATION_CONFIDENCE: ConfidenceBand = ConfidenceBand::new(0.75, 0.15);
const EXPENSE_POLICY_RATE: f64 = 0.08;
const EXPENSE_POLICY_CONFIDENCE: ConfidenceBand = ConfidenceBand::new(0.90, 0.05);

/// Lowercase, non-alphanumeric runs collapsed to a single '-'
pub fn slug(parts: &[&str]) -> String {
    let joined = parts.join("-").to_lowercase();
    let mut out = String::with_capacity(joined.len());
    for ch in joined.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

fn rule_description(rule: &CategoryRule, total: f64) -> String {
    match rule.category {
        Category::Software => format!(
            "Your software expenses total ${:.2}. Consider auditing licenses to identify unused subscriptions and negotiate enterprise discounts.",
            total
        ),
        Category::Travel => {
            "Create clear travel expense guidelines and preferred vendors to control travel costs."
                .to_string()
        }
        Category::Utilities => {
            "Consider energy-efficient equipment and practices to reduce utility costs over time."
                .to_string()
        }
        Category::Supplies => {
            "Track office supplies usage to prevent overordering and waste.".to_string()
        }
        _ => "Analyze marketing channel performance to focus spending on high-return activities."
            .to_string(),
    }
}

pub struct RecommendationEngine<R: Rng> {
    rng: R,
}

impl<R: Rng> RecommendationEngine<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    fn confidence(&mut self, band: ConfidenceBand) -> f64 {
        band.base + self.rng.gen::<f64>() * band.span
    }

    /// Generate recommendations, ordered by category then vendor
    pub fn recommend(&mut self, transactions: &[Transaction]) -> Vec<OptimizationRecommendation> {
        let mut by_category: BTreeMap<Category, Vec<&Transaction>> = BTreeMap::new();
        for tx in transactions {
            by_category.entry(tx.category).or_default().push(tx);
        }

        let mut recommendations = Vec::new();

        for (category, txs) in &by_category {
            if txs.len() < 2 {
                continue;
            }
            let total: f64 = txs.iter().map(|t| t.amount).sum();

            let mut vendors: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
            for tx in txs {
                let entry = vendors.entry(tx.vendor.as_str()).or_insert((0, 0.0));
                entry.0 += 1;
                entry.1 += tx.amount;
            }

            for (vendor, (count, vendor_total)) in vendors {
                if count < CONSOLIDATION_MIN_PURCHASES {
                    continue;
                }
                let confidence = self.confidence(CONSOLIDATION_CONFIDENCE);
                recommendations.push(OptimizationRecommendation {
                    id: slug(&["consolidate", category.as_str(), vendor]),
                    title: format!("Consolidate {} purchases", vendor),
                    description: format!(
                        "You've made {} separate purchases from {} totaling ${:.2}. Consider negotiating a bulk purchase agreement to save on costs.",
                        count, vendor, vendor_total
                    ),
                    potential_savings: vendor_total * CONSOLIDATION_RATE,
                    category: *category,
                    confidence,
                    implementation_difficulty: Difficulty::Easy,
                });
            }

            for rule in CATEGORY_RULES.iter().filter(|r| r.category == *category) {
                if total <= rule.threshold {
                    continue;
                }
                let confidence = self.confidence(rule.confidence);
                recommendations.push(OptimizationRecommendation {
                    id: slug(&[rule.name, category.as_str()]),
                    title: rule.title.to_string(),
                    description: rule_description(rule, total),
                    potential_savings: total * rule.savings_rate,
                    category: *category,
                    confidence,
                    implementation_difficulty: rule.difficulty,
                });
            }
        }

        if transactions.len() > EXPENSE_POLICY_MIN_TRANSACTIONS {
            let total: f64 = transactions.iter().map(|t| t.amount).sum();
            let confidence = self.confidence(EXPENSE_POLICY_CONFIDENCE);
            recommendations.push(OptimizationRecommendation {
                id: slug(&["expense-policy", Category::Uncategorized.as_str()]),
                title: "Develop formal expense policy".to_string(),
                description: "Implementing a clear expense policy can reduce overall expenses by setting spending limits and approval workflows.".to_string(),
                potential_savings: total * EXPENSE_POLICY_RATE,
                category: Category::Uncategorized,
                confidence,
                implementation_difficulty: Difficulty::Medium,
            });
        }

        debug!(count = recommendations.len(), "Generated recommendations");
        recommendations
    }
}

/// Fraction of total spend a category may take before it draws a suggestion
fn share_threshold(category: Category) -> f64 {
    match category {
        Category::Software => 0.12,
        Category::Travel => 0.10,
        Category::Supplies => 0.08,
        Category::Marketing => 0.15,
        _ => 0.20,
    }
}

fn share_suggestion(category: Category, percent: f64) -> String {
    match category {
        Category::Software => format!(
            "Your software expenses ({:.1}% of total) seem high. Consider auditing subscriptions for unused services.",
            percent
        ),
        Category::Travel => format!(
            "Travel expenses represent {:.1}% of your total spending. Consider a stricter travel policy or more video conferencing.",
            percent
        ),
        Category::Supplies => format!(
            "Office supplies account for {:.1}% of expenses. Consider bulk purchasing or negotiating better rates with suppliers.",
            percent
        ),
        Category::Marketing => format!(
            "Marketing costs ({:.1}% of total) are significant. Review campaign ROI and focus on high-performing channels.",
            percent
        ),
        other => format!(
            "{} makes up {:.1}% of total spending. Review its contracts for renegotiation opportunities.",
            other, percent
        ),
    }
}

/// Categories where many vendors hint at a consolidation opportunity
const CONSOLIDATION_CATEGORIES: &[Category] =
    &[Category::Supplies, Category::Software, Category::Equipment];
/// Distinct vendors a consolidation category must exceed
const CONSOLIDATION_MAX_VENDORS: usize = 3;
/// Below this many specific suggestions the general ones are appended
const MIN_SPECIFIC_SUGGESTIONS: usize = 3;

const GENERAL_SUGGESTIONS: [&str; 3] = [
    "Consider implementing a formal approval process for expenses above a certain threshold.",
    "Regularly review recurring expenses to identify services that are no longer needed.",
    "Negotiate early payment discounts with your regular vendors.",
];

/// Plain-text cost suggestions
///
/// Emitted in order: categories over their share of spend, duplicate
/// charges, categories spread across too many vendors. Categories are
/// visited in order of first appearance. When fewer than three specific
/// suggestions apply the general ones are appended.
pub fn cost_suggestions(transactions: &[Transaction]) -> Vec<String> {
    let mut categories: Vec<(Category, f64, HashSet<&str>)> = Vec::new();
    for tx in transactions {
        let slot = match categories.iter().position(|(c, _, _)| *c == tx.category) {
            Some(idx) => idx,
            None => {
                categories.push((tx.category, 0.0, HashSet::new()));
                categories.len() - 1
            }
        };
        let (_, total, vendors) = &mut categories[slot];
        *total += tx.amount;
        vendors.insert(tx.vendor.as_str());
    }

    let grand_total: f64 = categories.iter().map(|(_, total, _)| total).sum();
    let mut suggestions = Vec::new();

    if grand_total > 0.0 {
        for (category, total, _) in &categories {
            let share = total / grand_total;
            if share > share_threshold(*category) {
                suggestions.push(share_suggestion(*category, share * 100.0));
            }
        }
    }

    let duplicates = AnomalyDetector::new().detect_duplicates(transactions);
    if !duplicates.is_empty() {
        let savings: f64 = duplicates.iter().map(|p| p.first.amount).sum();
        suggestions.push(format!(
            "Detected {} potential duplicate transactions that could save approximately ${:.2}.",
            duplicates.len(),
            savings
        ));
    }

    for (category, _, vendors) in &categories {
        if vendors.len() > CONSOLIDATION_MAX_VENDORS && CONSOLIDATION_CATEGORIES.contains(category) {
            suggestions.push(format!(
                "You're using {} different vendors for {}. Consider consolidating to negotiate better rates.",
                vendors.len(),
                category
            ));
        }
    }

    if suggestions.len() < MIN_SPECIFIC_SUGGESTIONS {
        suggestions.extend(GENERAL_SUGGESTIONS.iter().map(|s| s.to_string()));
    }

    debug!(count = suggestions.len(), "Generated cost suggestions");
    suggestions
}

pub fn total_potential_savings(recommendations: &[OptimizationRecommendation]) -> f64 {
    recommendations.iter().map(|r| r.potential_savings).sum()
}

/// Bucket recommendations by effort; empty tiers are omitted
pub fn group_by_difficulty(
    recommendations: &[OptimizationRecommendation],
) -> BTreeMap<Difficulty, Vec<&OptimizationRecommendation>> {
    let mut groups: BTreeMap<Difficulty, Vec<&OptimizationRecommendation>> = BTreeMap::new();
    for rec in recommendations {
        groups
            .entry(rec.implementation_difficulty)
            .or_default()
            .push(rec);
    }
    groups
}

/// Ids of recommendations the user has acted on
///
/// Survives recomputation because ids are derived from rule, category and vendor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationTracker {
    implemented: HashSet<String>,
}

impl OptimizationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the id was already marked
    pub fn mark_implemented(&mut self, id: &str) -> bool {
        self.implemented.insert(id.to_string())
    }

    pub fn unmark(&mut self, id: &str) -> bool {
        self.implemented.remove(id)
    }

    pub fn is_implemented(&self, id: &str) -> bool {
        self.implemented.contains(id)
    }

    /// Split into (implemented, pending), preserving input order
    pub fn partition<'a>(
        &self,
        recommendations: &'a [OptimizationRecommendation],
    ) -> (
        Vec<&'a OptimizationRecommendation>,
        Vec<&'a OptimizationRecommendation>,
    ) {
        recommendations
            .iter()
            .partition(|r| self.is_implemented(&r.id))
    }

    pub fn realized_savings(&self, recommendations: &[OptimizationRecommendation]) -> f64 {
        recommendations
            .iter()
            .filter(|r| self.is_implemented(&r.id))
            .map(|r| r.potential_savings)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{expense, sample_expenses};
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn mid_rng() -> StepRng {
        StepRng::new(1 << 63, 0)
    }

    fn find<'a>(recs: &'a [OptimizationRecommendation], id: &str) -> &'a OptimizationRecommendation {
        recs.iter()
            .find(|r| r.id == id)
            .unwrap_or_else(|| panic!("missing recommendation {}", id))
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug(&["consolidate", "Travel", "American Airlines"]), "consolidate-travel-american-airlines");
        assert_eq!(slug(&["a", "B&C  d"]), "a-b-c-d");
    }

    #[test]
    fn test_sample_recommendations() {
        let recs = RecommendationEngine::new(mid_rng()).recommend(&sample_expenses());

        let staples = find(&recs, "consolidate-supplies-staples");
        assert!((staples.potential_savings - 175.4 * 0.15).abs() < 1e-9);
        assert_eq!(staples.implementation_difficulty, Difficulty::Easy);
        assert!((staples.confidence - 0.825).abs() < 1e-9);

        let travel = find(&recs, "travel-policy-travel");
        assert!((travel.potential_savings - 3300.0 * 0.20).abs() < 1e-9);

        let marketing = find(&recs, "marketing-roi-marketing");
        assert_eq!(marketing.implementation_difficulty, Difficulty::Hard);
        assert!((marketing.potential_savings - 600.0).abs() < 1e-9);

        find(&recs, "utility-optimization-utilities");
        find(&recs, "supplies-inventory-supplies");

        // Software totals exactly 5000 which is not above the threshold
        assert!(!recs.iter().any(|r| r.id.starts_with("license-audit")));

        let policy = find(&recs, "expense-policy-uncategorized");
        assert_eq!(policy.category, Category::Uncategorized);
        let total: f64 = sample_expenses().iter().map(|t| t.amount).sum();
        assert!((policy.potential_savings - total * 0.08).abs() < 1e-9);
    }

    #[test]
    fn test_software_audit_above_threshold() {
        let txs = vec![
            expense("1", "2024-01-01", 3000.0, Category::Software, "Adobe"),
            expense("2", "2024-02-01", 3000.0, Category::Software, "Atlassian"),
        ];
        let recs = RecommendationEngine::new(mid_rng()).recommend(&txs);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].id, "license-audit-software");
        assert!((recs[0].potential_savings - 1500.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_transaction_categories_skipped() {
        let txs = vec![expense("1", "2024-01-01", 900.0, Category::Marketing, "Google")];
        let recs = RecommendationEngine::new(mid_rng()).recommend(&txs);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_confidence_stays_in_band() {
        let mut engine = RecommendationEngine::new(StdRng::seed_from_u64(3));
        for _ in 0..20 {
            for rec in engine.recommend(&sample_expenses()) {
                assert!(rec.confidence >= 0.70 && rec.confidence < 0.95, "{}", rec.confidence);
            }
        }
    }

    #[test]
    fn test_ids_stable_across_runs() {
        let ids = |seed| {
            RecommendationEngine::new(StdRng::seed_from_u64(seed))
                .recommend(&sample_expenses())
                .into_iter()
                .map(|r| r.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(1), ids(99));
    }

    #[test]
    fn test_grouping_and_totals() {
        let recs = RecommendationEngine::new(mid_rng()).recommend(&sample_expenses());
        let groups = group_by_difficulty(&recs);
        let grouped: usize = groups.values().map(Vec::len).sum();
        assert_eq!(grouped, recs.len());
        assert_eq!(groups[&Difficulty::Hard].len(), 1);

        let sum: f64 = recs.iter().map(|r| r.potential_savings).sum();
        assert!((total_potential_savings(&recs) - sum).abs() < 1e-9);
    }

    fn general() -> Vec<String> {
        GENERAL_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cost_suggestions_on_sample() {
        let suggestions = cost_suggestions(&sample_expenses());
        assert_eq!(
            suggestions,
            vec![
                share_suggestion(Category::Software, 5000.0 / 15095.4 * 100.0),
                share_suggestion(Category::Travel, 3300.0 / 15095.4 * 100.0),
                share_suggestion(Category::Rent, 4000.0 / 15095.4 * 100.0),
                "Detected 1 potential duplicate transactions that could save approximately $50.00."
                    .to_string(),
            ]
        );
        assert!(suggestions[0].contains("33.1%"));
    }

    #[test]
    fn test_share_thresholds_are_strict() {
        let tiers = [
            (Category::Software, 120.0),
            (Category::Travel, 100.0),
            (Category::Supplies, 80.0),
            (Category::Marketing, 150.0),
            (Category::Rent, 200.0),
        ];
        for (category, at_threshold) in tiers {
            let build = |amount: f64| {
                vec![
                    expense("a", "2024-01-01", amount, category, "Vendor A"),
                    expense("b", "2024-01-02", 1000.0 - amount, Category::Uncategorized, "Vendor B"),
                ]
            };
            let at = cost_suggestions(&build(at_threshold));
            assert!(
                !at.contains(&share_suggestion(category, at_threshold / 10.0)),
                "{} fired at its threshold",
                category
            );
            let over = cost_suggestions(&build(at_threshold + 10.0));
            assert!(
                over.contains(&share_suggestion(category, (at_threshold + 10.0) / 10.0)),
                "{} did not fire above its threshold",
                category
            );
        }
    }

    #[test]
    fn test_vendor_consolidation_suggestion() {
        let mut txs: Vec<Transaction> = ["Staples", "Office Depot", "Amazon", "Costco"]
            .iter()
            .enumerate()
            .map(|(i, v)| expense(&format!("s{}", i), "2024-01-01", 10.0 + i as f64, Category::Supplies, v))
            .collect();
        // Travel is not a consolidation category, Software has only three vendors
        for (i, v) in ["Uber", "Lyft", "Delta", "United", "Hertz"].iter().enumerate() {
            txs.push(expense(&format!("t{}", i), "2024-01-02", 10.0 + i as f64, Category::Travel, v));
        }
        for (i, v) in ["Adobe", "Slack", "Zoom"].iter().enumerate() {
            txs.push(expense(&format!("w{}", i), "2024-01-03", 10.0 + i as f64, Category::Software, v));
        }

        let suggestions = cost_suggestions(&txs);
        let consolidation: Vec<_> = suggestions
            .iter()
            .filter(|s| s.starts_with("You're using"))
            .collect();
        assert_eq!(
            consolidation,
            vec!["You're using 4 different vendors for Supplies. Consider consolidating to negotiate better rates."]
        );
    }

    #[test]
    fn test_general_suggestions_fill_in() {
        assert_eq!(cost_suggestions(&[]), general());

        // Six even categories all sit under their thresholds
        let even: Vec<Transaction> = [
            Category::Rent,
            Category::Payroll,
            Category::Utilities,
            Category::Insurance,
            Category::Equipment,
            Category::Uncategorized,
        ]
        .iter()
        .enumerate()
        .map(|(i, c)| expense(&i.to_string(), "2024-01-01", 100.0, *c, &format!("Vendor {}", i)))
        .collect();
        assert_eq!(cost_suggestions(&even), general());

        // One specific suggestion still gets the general ones appended
        let single = vec![expense("1", "2024-01-01", 100.0, Category::Marketing, "Google")];
        let suggestions = cost_suggestions(&single);
        assert_eq!(suggestions.len(), 4);
        assert_eq!(suggestions[0], share_suggestion(Category::Marketing, 100.0));
        assert_eq!(suggestions[1..], general()[..]);
    }

    #[test]
    fn test_tracker_survives_recompute() {
        let mut tracker = OptimizationTracker::new();
        assert!(tracker.mark_implemented("marketing-roi-marketing"));
        assert!(!tracker.mark_implemented("marketing-roi-marketing"));

        let recs = RecommendationEngine::new(StdRng::seed_from_u64(5)).recommend(&sample_expenses());
        let (done, pending) = tracker.partition(&recs);
        assert_eq!(done.len(), 1);
        assert_eq!(pending.len(), recs.len() - 1);
        assert!((tracker.realized_savings(&recs) - 600.0).abs() < 1e-9);

        assert!(tracker.unmark("marketing-roi-marketing"));
        assert_eq!(tracker.realized_savings(&recs), 0.0);
    }
}
