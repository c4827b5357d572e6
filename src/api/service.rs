use chrono::{DateTime, Utc};
use crate::analytics::{PriceOptimizer, SalesForecaster, TrendScorer};
use crate::analytics::types::{PriceRecommendation, SalesForecast, TrendingEvent};
use crate::api::types::{ApiError, ForecastQuery, PriceOptimizationRequest, TrendingQuery};
use crate::config::Config;
use crate::data::types::Dataset;

/// Answers the trending, forecast and pricing queries over a dataset.
///
/// Holds configuration only; every call works on the dataset it is given.
pub struct Insights {
    default_limit: usize,
    default_days_ahead: i64,
    trend_scorer: TrendScorer,
    forecaster: SalesForecaster,
    optimizer: PriceOptimizer,
}

impl Insights {
    pub fn new(config: &Config) -> Self {
        Self {
            default_limit: config.trending.default_limit,
            default_days_ahead: config.forecast.default_days_ahead,
            trend_scorer: TrendScorer::new(config.trending.clone()),
            forecaster: SalesForecaster::new(config.forecast.clone()),
            optimizer: PriceOptimizer::new(config.pricing.clone()),
        }
    }

    pub fn trending(
        &self,
        dataset: &Dataset,
        query: &TrendingQuery,
        now: DateTime<Utc>,
    ) -> Result<Vec<TrendingEvent>, ApiError> {
        let limit = query.limit.unwrap_or(self.default_limit);

        Ok(self.trend_scorer.score_and_rank(
            &dataset.events,
            &dataset.interactions,
            &query.filters(),
            limit,
            now,
        ))
    }

    pub fn sales_forecast(
        &self,
        dataset: &Dataset,
        query: &ForecastQuery,
        now: DateTime<Utc>,
    ) -> Result<SalesForecast, ApiError> {
        let event_id = required_event_id(query.event_id.as_deref())?;
        let days_ahead = query.days_ahead.unwrap_or(self.default_days_ahead);

        Ok(self.forecaster.forecast(
            event_id,
            &dataset.interactions,
            days_ahead,
            now.date_naive(),
        )?)
    }

    pub fn optimize_price(
        &self,
        dataset: &Dataset,
        request: &PriceOptimizationRequest,
    ) -> Result<PriceRecommendation, ApiError> {
        let event_id = required_event_id(request.event_id.as_deref())?;

        Ok(self.optimizer.optimize_price(
            event_id,
            &dataset.interactions,
            &dataset.events,
            request.current_price,
            request.target_attendance,
        )?)
    }
}

fn required_event_id(event_id: Option<&str>) -> Result<&str, ApiError> {
    match event_id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(ApiError::bad_request("Event ID is required")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_event_id() {
        assert_eq!(required_event_id(Some("event_1")).unwrap(), "event_1");
        assert_eq!(required_event_id(Some("")).unwrap_err().status, 400);
        assert_eq!(
            required_event_id(None).unwrap_err().body.error,
            "Event ID is required"
        );
    }
}
