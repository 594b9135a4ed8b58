//! Domain models for Finsight

use serde::{Deserialize, Serialize};

/// Fixed expense classification
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Category {
    Rent,
    Payroll,
    Marketing,
    Supplies,
    Utilities,
    Travel,
    Software,
    Equipment,
    Insurance,
    #[default]
    Uncategorized,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rent => "Rent",
            Self::Payroll => "Payroll",
            Self::Marketing => "Marketing",
            Self::Supplies => "Supplies",
            Self::Utilities => "Utilities",
            Self::Travel => "Travel",
            Self::Software => "Software",
            Self::Equipment => "Equipment",
            Self::Insurance => "Insurance",
            Self::Uncategorized => "Uncategorized",
        }
    }

    /// Get all categories
    pub fn all() -> &'static [Category] {
        &[
            Self::Rent,
            Self::Payroll,
            Self::Marketing,
            Self::Supplies,
            Self::Utilities,
            Self::Travel,
            Self::Software,
            Self::Equipment,
            Self::Insurance,
            Self::Uncategorized,
        ]
    }

    /// Parse a category name, falling back to `Uncategorized`
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(Self::Uncategorized)
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let needle = s.trim();
        Self::all()
            .iter()
            .find(|c| c.as_str() == needle)
            .copied()
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An expense record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    /// Calendar day, `YYYY-MM-DD`
    pub date: String,
    pub amount: f64,
    pub description: String,
    pub category: Category,
    pub vendor: String,
}

impl Transaction {
    /// Month bucket (`YYYY-MM`) derived from the first 7 characters of the date
    pub fn month(&self) -> &str {
        self.date.get(..7).unwrap_or(&self.date)
    }
}

/// Replace the record with the same id, returning false when no record matched
pub fn replace_transaction(transactions: &mut [Transaction], updated: Transaction) -> bool {
    match transactions.iter_mut().find(|t| t.id == updated.id) {
        Some(slot) => {
            *slot = updated;
            true
        }
        None => false,
    }
}

/// One month of revenue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenuePoint {
    /// Month, `YYYY-MM`
    #[serde(rename = "date")]
    pub month: String,
    pub amount: f64,
}

/// One projected month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    #[serde(rename = "date")]
    pub month: String,
    pub predicted: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl ForecastPoint {
    /// Half-width of the confidence band as a fraction of the prediction
    pub fn uncertainty(&self) -> f64 {
        if self.predicted == 0.0 {
            return 0.0;
        }
        ((self.upper_bound - self.lower_bound) / 2.0 / self.predicted).abs()
    }
}

/// Direction of an anomalous amount relative to its category mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Significance {
    High,
    Low,
}

/// Effort tier for an optimization recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A cost-saving suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRecommendation {
    /// Stable slug, safe to track across recomputation
    pub id: String,
    pub title: String,
    pub description: String,
    pub potential_savings: f64,
    pub category: Category,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub implementation_difficulty: Difficulty,
}

/// Spend share of one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: Category,
    pub amount: f64,
    pub percentage: f64,
}

/// Where the currently loaded dataset came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Mock,
    Imported,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Imported => "imported",
        }
    }
}
