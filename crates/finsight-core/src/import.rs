//! CSV import for expense, revenue and forecast datasets
//!
//! Parsing is lenient and keeps absent cells as `None` in the raw rows.
//! Validation then decides whether the dataset is usable, and conversion
//! fills the remaining gaps with defaults.

use std::io::Read;

use csv::{ReaderBuilder, Trim};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{Category, ForecastPoint, RevenuePoint, Transaction};

/// Expense columns: `id,date,amount,description,category,vendor`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExpenseRow {
    pub id: Option<String>,
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub vendor: Option<String>,
}

impl ExpenseRow {
    /// Fill defaults; `index` is the 0-based row number
    pub fn into_transaction(self, index: usize) -> Transaction {
        Transaction {
            id: self.id.unwrap_or_else(|| format!("exp-{}", index + 1)),
            date: self.date.unwrap_or_default(),
            amount: self.amount.unwrap_or(0.0),
            description: self
                .description
                .unwrap_or_else(|| "Imported expense".to_string()),
            category: self
                .category
                .as_deref()
                .map(Category::parse_lenient)
                .unwrap_or_default(),
            vendor: self.vendor.unwrap_or_else(|| "Unknown vendor".to_string()),
        }
    }
}

/// Revenue columns: `date,amount` with `date` as `YYYY-MM`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RevenueRow {
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<f64>,
}

impl RevenueRow {
    pub fn into_point(self) -> RevenuePoint {
        RevenuePoint {
            month: self.date.unwrap_or_default(),
            amount: self.amount.unwrap_or(0.0),
        }
    }
}

/// Forecast columns: `date,predicted,lowerBound,upperBound`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ForecastRow {
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub predicted: Option<f64>,
    #[serde(default, rename = "lowerBound", deserialize_with = "lenient_amount")]
    pub lower_bound: Option<f64>,
    #[serde(default, rename = "upperBound", deserialize_with = "lenient_amount")]
    pub upper_bound: Option<f64>,
}

impl ForecastRow {
    pub fn into_point(self) -> ForecastPoint {
        ForecastPoint {
            month: self.date.unwrap_or_default(),
            predicted: self.predicted.unwrap_or(0.0),
            lower_bound: self.lower_bound.unwrap_or(0.0),
            upper_bound: self.upper_bound.unwrap_or(0.0),
        }
    }
}

/// Parse an amount cell, accepting `$1,234.56` and `(100.00)` forms
pub fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Unparseable amounts read as absent instead of failing the whole file
fn lenient_amount<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_amount))
}

fn read_rows<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

pub fn parse_expense_rows<R: Read>(reader: R) -> Result<Vec<ExpenseRow>> {
    let rows: Vec<ExpenseRow> = read_rows(reader)?;
    debug!("Parsed {} expense rows", rows.len());
    Ok(rows)
}

/// Parse revenue rows sorted ascending by month
pub fn parse_revenue_rows<R: Read>(reader: R) -> Result<Vec<RevenueRow>> {
    let mut rows: Vec<RevenueRow> = read_rows(reader)?;
    rows.sort_by(|a, b| a.date.cmp(&b.date));
    debug!("Parsed {} revenue rows", rows.len());
    Ok(rows)
}

/// Parse forecast rows sorted ascending by month
pub fn parse_forecast_rows<R: Read>(reader: R) -> Result<Vec<ForecastRow>> {
    let mut rows: Vec<ForecastRow> = read_rows(reader)?;
    rows.sort_by(|a, b| a.date.cmp(&b.date));
    debug!("Parsed {} forecast rows", rows.len());
    Ok(rows)
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.is_empty())
}

fn check_amount(amount: Option<f64>, row: usize, kind: &str) -> Result<()> {
    match amount {
        Some(a) if a >= 0.0 => Ok(()),
        Some(a) => Err(Error::Validation(format!(
            "Invalid {} data: negative amount {} on row {}",
            kind,
            a,
            row + 1
        ))),
        None => Err(Error::Validation(format!(
            "Invalid {} data: missing amount on row {}",
            kind,
            row + 1
        ))),
    }
}

pub fn validate_expenses(rows: &[ExpenseRow]) -> Result<()> {
    if rows.is_empty() {
        return Err(Error::Validation("Invalid expense data: empty dataset".into()));
    }
    for (i, row) in rows.iter().enumerate() {
        if !has_text(&row.date) {
            return Err(Error::Validation(format!(
                "Invalid expense data: missing date on row {}",
                i + 1
            )));
        }
        check_amount(row.amount, i, "expense")?;
    }
    Ok(())
}

pub fn validate_revenue(rows: &[RevenueRow]) -> Result<()> {
    if rows.is_empty() {
        return Err(Error::Validation("Invalid revenue data: empty dataset".into()));
    }
    for (i, row) in rows.iter().enumerate() {
        if !has_text(&row.date) {
            return Err(Error::Validation(format!(
                "Invalid revenue data: missing date on row {}",
                i + 1
            )));
        }
        check_amount(row.amount, i, "revenue")?;
    }
    Ok(())
}

/// Forecast values may be negative but every column must be present
pub fn validate_forecast(rows: &[ForecastRow]) -> Result<()> {
    if rows.is_empty() {
        return Err(Error::Validation("Invalid forecast data: empty dataset".into()));
    }
    for (i, row) in rows.iter().enumerate() {
        let complete = has_text(&row.date)
            && row.predicted.is_some()
            && row.lower_bound.is_some()
            && row.upper_bound.is_some();
        if !complete {
            return Err(Error::Validation(format!(
                "Invalid forecast data: missing required fields on row {}",
                i + 1
            )));
        }
    }
    Ok(())
}

/// Parse, validate and convert an expense CSV
pub fn import_expenses<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let rows = parse_expense_rows(reader)?;
    validate_expenses(&rows)?;
    let expenses: Vec<Transaction> = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| row.into_transaction(i))
        .collect();
    info!("Imported {} expenses", expenses.len());
    Ok(expenses)
}

/// Parse, validate and convert a revenue CSV
pub fn import_revenue<R: Read>(reader: R) -> Result<Vec<RevenuePoint>> {
    let rows = parse_revenue_rows(reader)?;
    validate_revenue(&rows)?;
    let revenue: Vec<RevenuePoint> = rows.into_iter().map(RevenueRow::into_point).collect();
    info!("Imported {} revenue months", revenue.len());
    Ok(revenue)
}

/// Parse, validate and convert a forecast CSV
pub fn import_forecast<R: Read>(reader: R) -> Result<Vec<ForecastPoint>> {
    let rows = parse_forecast_rows(reader)?;
    validate_forecast(&rows)?;
    let forecast: Vec<ForecastPoint> = rows.into_iter().map(ForecastRow::into_point).collect();
    info!("Imported {} forecast months", forecast.len());
    Ok(forecast)
}
