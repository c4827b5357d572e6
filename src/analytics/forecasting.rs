use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;
use crate::analytics::regression::LinearFit;
use crate::analytics::seasonal::{SeasonalModel, SeasonalSettings};
use crate::analytics::types::{ForecastModel, ForecastPoint, SalesForecast};
use crate::config::ForecastConfig;
use crate::data::types::Interaction;
use crate::error::{EngineError, EngineResult};
use tracing::{debug, info};

/// Mean used when an event has no purchase history at all
const DEFAULT_DAILY_SALES: f64 = 1.0;

pub struct SalesForecaster {
    config: ForecastConfig,
}

/// Pick the forecasting branch from the amount of purchase history
///
/// Enough purchases for the seasonal model wins; otherwise a linear trend
/// needs two distinct days, and anything less gets a constant mean.
pub fn select_forecast_model(
    purchase_count: usize,
    distinct_days: usize,
    min_seasonal_purchases: usize,
) -> ForecastModel {
    if purchase_count >= min_seasonal_purchases {
        ForecastModel::Seasonal
    } else if distinct_days >= 2 {
        ForecastModel::Linear
    } else {
        ForecastModel::Constant
    }
}

impl SalesForecaster {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    /// Forecast daily ticket purchases for `today + 1 ..= today + days_ahead`
    pub fn forecast(
        &self,
        event_id: &str,
        interactions: &[Interaction],
        days_ahead: i64,
        today: NaiveDate,
    ) -> EngineResult<SalesForecast> {
        self.validate_days_ahead(days_ahead)?;

        let daily = daily_purchase_counts(event_id, interactions);
        let purchase_count: usize = daily.values().sum();
        let model = select_forecast_model(purchase_count, daily.len(), self.config.min_seasonal_purchases);

        info!(
            "Forecasting {} days for {}: {} purchases over {} days -> {:?} model",
            days_ahead,
            event_id,
            purchase_count,
            daily.len(),
            model
        );

        let dates = future_dates(today, days_ahead);
        let (model, points) = match model {
            ForecastModel::Seasonal => self.seasonal_forecast(&daily, &dates),
            ForecastModel::Linear => self.linear_forecast(&daily, &dates),
            ForecastModel::Constant => (ForecastModel::Constant, self.constant_forecast(&daily, &dates)),
        };

        Ok(SalesForecast {
            event_id: event_id.to_string(),
            model,
            points,
        })
    }

    fn validate_days_ahead(&self, days_ahead: i64) -> EngineResult<()> {
        if days_ahead < 0 {
            return Err(EngineError::invalid(
                "days_ahead",
                format!("must not be negative (got {})", days_ahead),
            ));
        }
        if days_ahead > self.config.max_days_ahead {
            return Err(EngineError::invalid(
                "days_ahead",
                format!("must be at most {} (got {})", self.config.max_days_ahead, days_ahead),
            ));
        }
        Ok(())
    }

    fn seasonal_forecast(
        &self,
        daily: &BTreeMap<NaiveDate, usize>,
        dates: &[NaiveDate],
    ) -> (ForecastModel, Vec<ForecastPoint>) {
        let observations: BTreeMap<NaiveDate, f64> =
            daily.iter().map(|(&d, &count)| (d, count as f64)).collect();

        let settings = SeasonalSettings {
            weekly: self.config.weekly_seasonality,
            interval_width: self.config.interval_width,
        };

        // Fresh model per call; nothing is cached between requests
        let Some(model) = SeasonalModel::fit(&observations, &settings) else {
            return (ForecastModel::Constant, self.constant_forecast(daily, dates));
        };

        debug!(
            "Seasonal fit: slope={:.4}, weekly={:?}",
            model.trend_slope(),
            model.weekly_effects()
        );

        let points = dates
            .iter()
            .map(|&date| {
                let p = model.predict(date);
                ForecastPoint::clamped(date, p.yhat, p.lower, p.upper)
            })
            .collect();

        (ForecastModel::Seasonal, points)
    }

    /// OLS over the ordinal index of each observed day, extrapolated
    fn linear_forecast(
        &self,
        daily: &BTreeMap<NaiveDate, usize>,
        dates: &[NaiveDate],
    ) -> (ForecastModel, Vec<ForecastPoint>) {
        let counts: Vec<f64> = daily.values().map(|&c| c as f64).collect();

        let Some(fit) = LinearFit::fit_series(&counts) else {
            return (ForecastModel::Constant, self.constant_forecast(daily, dates));
        };

        debug!("Linear fallback: slope={:.4}, intercept={:.4}", fit.slope, fit.intercept);

        let band = self.config.fallback_band;
        let start = counts.len();
        let points = dates
            .iter()
            .enumerate()
            .map(|(i, &date)| {
                let predicted = fit.predict((start + i) as f64);
                ForecastPoint::clamped(date, predicted, predicted * (1.0 - band), predicted * (1.0 + band))
            })
            .collect();

        (ForecastModel::Linear, points)
    }

    /// Flat projection at the mean daily count (1 with no history)
    fn constant_forecast(&self, daily: &BTreeMap<NaiveDate, usize>, dates: &[NaiveDate]) -> Vec<ForecastPoint> {
        let mean = if daily.is_empty() {
            DEFAULT_DAILY_SALES
        } else {
            daily.values().sum::<usize>() as f64 / daily.len() as f64
        };

        let band = self.config.fallback_band;
        dates
            .iter()
            .map(|&date| ForecastPoint::clamped(date, mean, mean * (1.0 - band), mean * (1.0 + band)))
            .collect()
    }
}

/// Purchase counts per calendar day for one event
pub fn daily_purchase_counts(event_id: &str, interactions: &[Interaction]) -> BTreeMap<NaiveDate, usize> {
    let mut daily = BTreeMap::new();

    for interaction in interactions.iter().filter(|i| i.is_purchase_of(event_id)) {
        *daily.entry(interaction.timestamp.date_naive()).or_insert(0) += 1;
    }

    daily
}

fn future_dates(today: NaiveDate, days_ahead: i64) -> Vec<NaiveDate> {
    (1..=days_ahead).map(|i| today + Duration::days(i)).collect()
}
