//! Shared fixtures for unit tests

use crate::models::{Category, RevenuePoint, Transaction};

/// Build an expense with a generic description
pub fn expense(id: &str, date: &str, amount: f64, category: Category, vendor: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        date: date.to_string(),
        amount,
        description: format!("{} purchase", vendor),
        category,
        vendor: vendor.to_string(),
    }
}

/// Build a revenue series from `(month, amount)` pairs
pub fn revenue(points: &[(&str, f64)]) -> Vec<RevenuePoint> {
    points
        .iter()
        .map(|(month, amount)| RevenuePoint {
            month: month.to_string(),
            amount: *amount,
        })
        .collect()
}

/// Twelve expenses across five categories, three of them from one Staples run
pub fn sample_expenses() -> Vec<Transaction> {
    vec![
        expense("exp-1", "2024-01-05", 50.00, Category::Supplies, "Staples"),
        expense("exp-2", "2024-01-05", 50.40, Category::Supplies, "Staples"),
        expense("exp-3", "2024-01-20", 75.00, Category::Supplies, "Staples"),
        expense("exp-4", "2024-01-10", 2400.00, Category::Software, "Adobe"),
        expense("exp-5", "2024-02-10", 2600.00, Category::Software, "Salesforce"),
        expense("exp-6", "2024-02-12", 1200.00, Category::Travel, "American Airlines"),
        expense("exp-7", "2024-02-18", 2100.00, Category::Travel, "WeWork"),
        expense("exp-8", "2024-02-01", 300.00, Category::Utilities, "Verizon"),
        expense("exp-9", "2024-03-01", 320.00, Category::Utilities, "Verizon"),
        expense("exp-10", "2024-03-03", 900.00, Category::Marketing, "Google"),
        expense("exp-11", "2024-03-15", 1100.00, Category::Marketing, "Facebook"),
        expense("exp-12", "2024-03-20", 4000.00, Category::Rent, "WeWork"),
    ]
}
