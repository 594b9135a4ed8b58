//! Keyword-based expense categorization
//!
//! Rules are checked in order against the description and the vendor; the
//! first rule with a hit decides the category.

use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::models::{Category, Transaction};

/// Description and vendor patterns for one category
struct CategoryRule {
    category: Category,
    description: Regex,
    vendor: Regex,
}

/// (category, description pattern, vendor pattern), in priority order
const RULES: &[(Category, &str, &str)] = &[
    (Category::Rent, r"\brent(al)?\b", r"property"),
    (Category::Payroll, r"salary|payroll", r"\badp\b"),
    (Category::Marketing, r"\bads?\b|campaign", r"facebook|google"),
    (Category::Supplies, r"paper|supplies", r"staples|office"),
    (Category::Utilities, r"electric|water|\bgas\b", r"utility"),
    (Category::Travel, r"flight|hotel", r"airline|travel"),
    (Category::Software, r"subscription|software", r"adobe|microsoft"),
    (Category::Equipment, r"computer|hardware", r"\bdell\b|apple"),
    (Category::Insurance, r"insurance|policy", r"insurance"),
];

pub struct Categorizer {
    rules: Vec<CategoryRule>,
}

impl Categorizer {
    pub fn new() -> Result<Self> {
        let rules = RULES
            .iter()
            .map(|(category, description, vendor)| {
                Ok(CategoryRule {
                    category: *category,
                    description: Regex::new(&format!("(?i){}", description))?,
                    vendor: Regex::new(&format!("(?i){}", vendor))?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// Best category for a description/vendor pair
    pub fn suggest(&self, description: &str, vendor: &str) -> Category {
        self.rules
            .iter()
            .find(|rule| rule.description.is_match(description) || rule.vendor.is_match(vendor))
            .map(|rule| rule.category)
            .unwrap_or(Category::Uncategorized)
    }

    /// Assign a category to every uncategorized transaction
    ///
    /// Transactions that already have a category are left alone. Returns how
    /// many were changed.
    pub fn categorize_all(&self, transactions: &mut [Transaction]) -> usize {
        let mut changed = 0;
        for tx in transactions
            .iter_mut()
            .filter(|t| t.category == Category::Uncategorized)
        {
            let suggested = self.suggest(&tx.description, &tx.vendor);
            if suggested != Category::Uncategorized {
                debug!(id = %tx.id, category = %suggested, "Categorized transaction");
                tx.category = suggested;
                changed += 1;
            }
        }
        changed
    }
}
