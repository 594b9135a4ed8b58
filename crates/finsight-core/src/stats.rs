//! Time series statistics
//!
//! Pure helpers shared by every analyser. Degenerate inputs (empty slices,
//! zero denominators) return `None` instead of NaN or Infinity so callers
//! have to pick a fallback explicitly.
//!
//! Standard deviation is the population form (divide by n) everywhere.

/// Arithmetic mean
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation
pub fn stddev(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Percent change from `prev` to `curr`
pub fn growth_rate(curr: f64, prev: f64) -> Option<f64> {
    if prev == 0.0 {
        return None;
    }
    Some((curr - prev) / prev * 100.0)
}

/// Spread of a growth-rate series
pub fn volatility(rates: &[f64]) -> Option<f64> {
    stddev(rates)
}

/// Mean of the last `min(window, len)` values
pub fn moving_average(values: &[f64], window: usize) -> Option<f64> {
    let take = window.min(values.len());
    if take == 0 {
        return None;
    }
    mean(&values[values.len() - take..])
}

/// Percent growth between each consecutive pair, skipping zero denominators
pub fn period_growth_rates(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter_map(|pair| growth_rate(pair[1], pair[0]))
        .collect()
}

/// Average percent growth across consecutive pairs
pub fn average_growth_percent(values: &[f64]) -> Option<f64> {
    mean(&period_growth_rates(values))
}
