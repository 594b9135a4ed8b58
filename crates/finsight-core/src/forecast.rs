//! Revenue forecasting
//!
//! Projects a monthly series forward with a compounding growth model:
//! - Anchor on the latest value (moving average when the latest is zero)
//! - Fit the average period growth rate and its volatility
//! - Perturb each step by volatility-scaled noise from an injected RNG
//! - Widen the confidence band linearly with the step index
//!
//! The RNG is owned by the engine so a seeded generator gives repeatable output.

use chrono::{Datelike, Months, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ForecastPoint, RevenuePoint};
use crate::stats;

/// Tunables for the growth model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Periods averaged when the latest value cannot anchor the projection
    pub moving_average_window: usize,
    /// Growth rate used when the history has no usable consecutive pair
    pub default_growth_rate: f64,
    /// Volatility used when the history has no usable consecutive pair
    pub default_volatility: f64,
    /// Band half-width at the first step, as a fraction of the prediction
    pub base_uncertainty: f64,
    /// Band growth per step
    pub uncertainty_step: f64,
    /// Multiplier on the noise term; 0 disables perturbation
    pub noise_scale: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            moving_average_window: 3,
            default_growth_rate: 0.03,
            default_volatility: 0.02,
            base_uncertainty: 0.10,
            uncertainty_step: 0.03,
            noise_scale: 1.0,
        }
    }
}

/// Parameters fitted from a history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthModel {
    pub anchor: f64,
    /// Fractional, 0.1 == 10%
    pub growth_rate: f64,
    pub volatility: f64,
}

pub struct ForecastEngine<R: Rng> {
    rng: R,
    config: ForecastConfig,
}

impl<R: Rng> ForecastEngine<R> {
    pub fn new(rng: R) -> Self {
        Self::with_config(rng, ForecastConfig::default())
    }

    pub fn with_config(rng: R, config: ForecastConfig) -> Self {
        Self { rng, config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Fit anchor, growth and volatility from a history
    pub fn fit(&self, values: &[f64]) -> Result<GrowthModel> {
        let last = *values
            .last()
            .ok_or_else(|| Error::InvalidData("cannot forecast an empty history".into()))?;

        let anchor = if last != 0.0 {
            last
        } else {
            stats::moving_average(values, self.config.moving_average_window).unwrap_or(0.0)
        };

        // Fractional rates, unlike stats::period_growth_rates which is in percent
        let rates: Vec<f64> = values
            .windows(2)
            .filter(|pair| pair[0] > 0.0)
            .map(|pair| pair[1] / pair[0] - 1.0)
            .collect();

        Ok(GrowthModel {
            anchor,
            growth_rate: stats::mean(&rates).unwrap_or(self.config.default_growth_rate),
            volatility: stats::volatility(&rates).unwrap_or(self.config.default_volatility),
        })
    }

    /// Project `horizon` months after `last_month`
    pub fn forecast(
        &mut self,
        values: &[f64],
        last_month: NaiveDate,
        horizon: usize,
    ) -> Result<Vec<ForecastPoint>> {
        let months = u32::try_from(horizon)
            .map_err(|_| Error::InvalidData(format!("Forecast horizon too large: {}", horizon)))?;
        let model = self.fit(values)?;
        debug!(
            anchor = model.anchor,
            growth_rate = model.growth_rate,
            volatility = model.volatility,
            horizon,
            "Fitted growth model"
        );

        let mut points = Vec::with_capacity(horizon);
        let mut previous = model.anchor;

        for step in 0..months {
            let noise =
                (self.rng.gen::<f64>() - 0.5) * model.volatility * self.config.noise_scale;
            let predicted = previous * (1.0 + model.growth_rate + noise);

            let uncertainty =
                self.config.base_uncertainty + step as f64 * self.config.uncertainty_step;
            let a = predicted * (1.0 - uncertainty);
            let b = predicted * (1.0 + uncertainty);

            points.push(ForecastPoint {
                month: month_label(last_month, step + 1),
                predicted: round_cents(predicted),
                lower_bound: round_cents(a.min(b)),
                upper_bound: round_cents(a.max(b)),
            });

            // Compound on the unrounded value
            previous = predicted;
        }

        Ok(points)
    }

    /// Forecast the months following the last point of a revenue history
    pub fn forecast_revenue(
        &mut self,
        history: &[RevenuePoint],
        horizon: usize,
    ) -> Result<Vec<ForecastPoint>> {
        let values: Vec<f64> = history.iter().map(|p| p.amount).collect();
        let last_month = history
            .last()
            .and_then(|p| parse_month(&p.month))
            .unwrap_or_else(current_month);
        self.forecast(&values, last_month, horizon)
    }
}

/// First day of a `YYYY-MM` month
pub fn parse_month(month: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{}-01", month.get(..7)?), "%Y-%m-%d").ok()
}

fn current_month() -> NaiveDate {
    let today = Utc::now().date_naive();
    today.with_day(1).unwrap_or(today)
}

fn month_label(start: NaiveDate, offset: u32) -> String {
    start
        .checked_add_months(Months::new(offset))
        .unwrap_or(start)
        .format("%Y-%m")
        .to_string()
}

pub(crate) fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Observations about a revenue history
pub fn revenue_insights(history: &[RevenuePoint]) -> Vec<String> {
    if history.len() < 3 {
        return vec!["Not enough historical data to generate meaningful insights.".into()];
    }

    let values: Vec<f64> = history.iter().map(|p| p.amount).collect();
    let mut insights = Vec::new();

    let first = values[0];
    let last = values[values.len() - 1];
    if let Some(change) = stats::growth_rate(last, first) {
        let line = if change > 20.0 {
            format!(
                "Strong growth trend: Revenue increased by {:.1}% over the analyzed period.",
                change
            )
        } else if change > 5.0 {
            format!(
                "Moderate growth trend: Revenue increased by {:.1}% over the analyzed period.",
                change
            )
        } else if change < -10.0 {
            format!(
                "Significant decline: Revenue decreased by {:.1}% over the analyzed period.",
                change.abs()
            )
        } else if change < 0.0 {
            format!(
                "Slight decline: Revenue decreased by {:.1}% over the analyzed period.",
                change.abs()
            )
        } else {
            format!(
                "Stable revenue: Only {:.1}% change over the analyzed period.",
                change
            )
        };
        insights.push(line);
    }

    let recent = &values[values.len() - 3..];
    if recent[2] > recent[1] && recent[1] > recent[0] {
        insights.push("Recent upward momentum: Revenue has increased for 3 consecutive months.".into());
    } else if recent[2] < recent[1] && recent[1] < recent[0] {
        insights.push("Recent downward trend: Revenue has decreased for 3 consecutive months.".into());
    }

    let rising = values.windows(2).filter(|w| w[1] > w[0]).count();
    let falling = values.windows(2).filter(|w| w[1] < w[0]).count();
    if rising > falling * 2 {
        insights.push("Consistent growth: Most months show revenue increases.".into());
    } else if falling > rising * 2 {
        insights.push("Concerning pattern: Most months show revenue decreases.".into());
    } else {
        insights.push(
            "Mixed performance: Alternating months of growth and decline suggest possible seasonal patterns."
                .into(),
        );
    }

    insights
}

/// Observations about a generated or imported forecast
pub fn forecast_insights(points: &[ForecastPoint]) -> Vec<String> {
    if points.len() < 2 {
        return vec!["Insufficient data for insights".into()];
    }

    let predicted: Vec<f64> = points.iter().map(|p| p.predicted).collect();
    let avg_growth = stats::average_growth_percent(&predicted).unwrap_or(0.0);
    let mut insights = Vec::new();

    insights.push(if avg_growth > 5.0 {
        format!(
            "Strong growth forecast: Average monthly increase of {:.1}%.",
            avg_growth
        )
    } else if avg_growth > 2.0 {
        format!(
            "Moderate growth forecast: Average monthly increase of {:.1}%.",
            avg_growth
        )
    } else if avg_growth > 0.0 {
        format!(
            "Slight growth forecast: Average monthly increase of {:.1}%.",
            avg_growth
        )
    } else {
        format!(
            "Declining forecast: Average monthly decrease of {:.1}%.",
            avg_growth.abs()
        )
    });

    if let Some(total) = stats::growth_rate(predicted[predicted.len() - 1], predicted[0]) {
        insights.push(format!(
            "Total forecasted {} of {:.1}% over the next {} months.",
            if total > 0.0 { "growth" } else { "decline" },
            total.abs(),
            points.len()
        ));
    }

    if let Some(last) = points.last() {
        let half_width = last.uncertainty() * 100.0;
        insights.push(if half_width > 15.0 {
            format!(
                "High uncertainty in long-term forecast (±{:.1}%). Consider shorter planning cycles.",
                half_width
            )
        } else if half_width > 7.5 {
            format!(
                "Moderate uncertainty in long-term forecast (±{:.1}%).",
                half_width
            )
        } else {
            format!(
                "Low uncertainty in forecast (±{:.1}%). High confidence in predictions.",
                half_width
            )
        });
    }

    insights.push(if avg_growth > 3.0 {
        "With strong projected growth, consider investing in capacity expansion or new product development.".into()
    } else if avg_growth < 0.0 {
        "With projected decline, focus on cost optimization and exploring new revenue streams.".into()
    } else {
        "With stable growth projections, focus on operational efficiency and customer retention.".into()
    });

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::revenue;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Always yields 0.5 from `gen::<f64>()`, which cancels the noise term
    fn zero_noise() -> StepRng {
        StepRng::new(1 << 63, 0)
    }

    #[test]
    fn test_ten_percent_growth() {
        let history = revenue(&[("2024-01", 1000.0), ("2024-02", 1100.0), ("2024-03", 1210.0)]);
        let mut engine = ForecastEngine::new(zero_noise());

        let model = engine.fit(&[1000.0, 1100.0, 1210.0]).unwrap();
        assert!((model.growth_rate - 0.1).abs() < 1e-9);

        let points = engine.forecast_revenue(&history, 2).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].month, "2024-04");
        assert_eq!(points[1].month, "2024-05");
        assert!((points[0].predicted - 1331.0).abs() < 0.01);
        assert!((points[1].predicted - 1464.1).abs() < 0.01);

        let width = |p: &ForecastPoint| p.upper_bound - p.lower_bound;
        assert!(width(&points[1]) > width(&points[0]));
    }

    #[test]
    fn test_bounds_contain_prediction_and_widen() {
        let history = revenue(&[
            ("2023-10", 800.0),
            ("2023-11", 950.0),
            ("2023-12", 700.0),
            ("2024-01", 1200.0),
        ]);
        let mut engine = ForecastEngine::new(StdRng::seed_from_u64(7));
        let points = engine.forecast_revenue(&history, 12).unwrap();

        assert_eq!(points.len(), 12);
        for p in &points {
            assert!(p.lower_bound <= p.predicted && p.predicted <= p.upper_bound);
        }
        for pair in points.windows(2) {
            assert!(pair[1].uncertainty() >= pair[0].uncertainty() - 1e-3);
        }
        assert_eq!(points[11].month, "2025-01");
    }

    #[test]
    fn test_seeded_rng_is_repeatable() {
        let values = [500.0, 520.0, 480.0, 610.0];
        let start = parse_month("2024-04").unwrap();
        let a = ForecastEngine::new(StdRng::seed_from_u64(42))
            .forecast(&values, start, 6)
            .unwrap();
        let b = ForecastEngine::new(StdRng::seed_from_u64(42))
            .forecast(&values, start, 6)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_single_point_uses_defaults() {
        let engine = ForecastEngine::new(zero_noise());
        let model = engine.fit(&[1000.0]).unwrap();
        assert_eq!(model.growth_rate, 0.03);
        assert_eq!(model.volatility, 0.02);
    }

    #[test]
    fn test_zero_latest_value_anchors_on_moving_average() {
        let engine = ForecastEngine::new(zero_noise());
        let model = engine.fit(&[300.0, 600.0, 0.0]).unwrap();
        assert!((model.anchor - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_history_is_an_error() {
        let mut engine = ForecastEngine::new(zero_noise());
        let result = engine.forecast_revenue(&[], 3);
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_zero_horizon() {
        let mut engine = ForecastEngine::new(zero_noise());
        let points = engine
            .forecast(&[1.0, 2.0], parse_month("2024-01").unwrap(), 0)
            .unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_oversized_horizon_rejected() {
        let mut engine = ForecastEngine::new(zero_noise());
        let too_far = u32::MAX as usize + 1;
        let result = engine.forecast(&[1.0, 2.0], parse_month("2024-01").unwrap(), too_far);
        assert!(matches!(result, Err(Error::InvalidData(ref m)) if m.contains("horizon")));
    }

    #[test]
    fn test_month_labels_roll_over_year() {
        assert_eq!(month_label(parse_month("2024-11").unwrap(), 2), "2025-01");
        assert_eq!(parse_month("garbage"), None);
    }

    #[test]
    fn test_revenue_insights() {
        let short = revenue(&[("2024-01", 1.0)]);
        assert_eq!(revenue_insights(&short).len(), 1);

        let growing = revenue(&[("2024-01", 1000.0), ("2024-02", 1100.0), ("2024-03", 1300.0)]);
        let insights = revenue_insights(&growing);
        assert!(insights[0].starts_with("Strong growth trend: Revenue increased by 30.0%"));
        assert!(insights.iter().any(|i| i.starts_with("Recent upward momentum")));
        assert!(insights.iter().any(|i| i.starts_with("Consistent growth")));
    }

    #[test]
    fn test_forecast_insights() {
        let history = revenue(&[("2024-01", 1000.0), ("2024-02", 1100.0), ("2024-03", 1210.0)]);
        let points = ForecastEngine::new(zero_noise())
            .forecast_revenue(&history, 6)
            .unwrap();
        let insights = forecast_insights(&points);

        assert_eq!(insights.len(), 4);
        assert!(insights[0].starts_with("Strong growth forecast: Average monthly increase of 10.0%"));
        assert!(insights[1].starts_with("Total forecasted growth"));
        assert!(insights[3].contains("capacity expansion"));
        assert_eq!(forecast_insights(&points[..1]).len(), 1);
    }
}
