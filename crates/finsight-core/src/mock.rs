//! Demo data generation
//!
//! Produces plausible expense and revenue sets so the analysers have
//! something to chew on before a real import. Output is fully determined by
//! the injected RNG and the reference date.

use chrono::{Days, Months, NaiveDate};
use rand::Rng;

use crate::forecast::round_cents;
use crate::models::{Category, RevenuePoint, Transaction};

/// Days back from the reference date that generated expenses may fall on
const EXPENSE_WINDOW_DAYS: u64 = 90;

const VENDORS: &[&str] = &[
    "Amazon",
    "Office Depot",
    "WeWork",
    "Salesforce",
    "Adobe",
    "Verizon",
    "American Airlines",
    "Dell",
    "Staples",
    "Uber",
];

const DESCRIPTIONS: &[&str] = &[
    "Monthly subscription",
    "Office supplies",
    "Team lunch",
    "Conference tickets",
    "New equipment",
    "Software license",
    "Utility bill",
    "Marketing campaign",
    "Travel expenses",
    "Consulting services",
];

/// (floor, span) of the uniform amount range for a category
fn amount_range(category: Category) -> (f64, f64) {
    match category {
        Category::Rent => (1500.0, 3500.0),
        Category::Payroll => (3000.0, 7000.0),
        Category::Marketing => (500.0, 2500.0),
        _ => (50.0, 950.0),
    }
}

/// Uniform pick from a non-empty table
fn pick<R: Rng, T: Copy>(rng: &mut R, items: &[T]) -> T {
    items[rng.gen_range(0..items.len())]
}

/// `count` expenses dated within 90 days before `today`, newest first
pub fn generate_expenses<R: Rng>(rng: &mut R, count: usize, today: NaiveDate) -> Vec<Transaction> {
    let mut expenses: Vec<Transaction> = (0..count)
        .map(|i| {
            let days_ago = rng.gen_range(0..EXPENSE_WINDOW_DAYS);
            let date = today.checked_sub_days(Days::new(days_ago)).unwrap_or(today);
            let category = pick(rng, Category::all());
            let (floor, span) = amount_range(category);
            let amount = round_cents(floor + rng.gen::<f64>() * span);

            Transaction {
                id: format!("exp-{}", i + 1),
                date: date.format("%Y-%m-%d").to_string(),
                amount,
                description: pick(rng, DESCRIPTIONS).to_string(),
                category,
                vendor: pick(rng, VENDORS).to_string(),
            }
        })
        .collect();

    expenses.sort_by(|a, b| b.date.cmp(&a.date));
    expenses
}

/// `months` of revenue ending at `last_month`, oldest first
///
/// The base rises by 500 per month from 15000 and each value varies by up
/// to 20% either way.
pub fn generate_revenue<R: Rng>(rng: &mut R, months: usize, last_month: NaiveDate) -> Vec<RevenuePoint> {
    let mut points: Vec<RevenuePoint> = (0..months)
        .map(|i| {
            let month = last_month
                .checked_sub_months(Months::new(i as u32))
                .unwrap_or(last_month);
            let base = 15000.0 + (months - i) as f64 * 500.0;
            let variance = base * 0.2;
            let amount = base + (rng.gen::<f64>() * variance * 2.0 - variance);

            RevenuePoint {
                month: month.format("%Y-%m").to_string(),
                amount: round_cents(amount),
            }
        })
        .collect();

    points.reverse();
    points
}
