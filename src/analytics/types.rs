use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::data::types::Event;
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendScore {
    pub event_id: String,
    pub score: f64,
}

/// An event record augmented with its trend score, serialized flat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingEvent {
    #[serde(flatten)]
    pub event: Event,
    pub trend_score: f64,
}

/// Exact-match filters applied to events before scoring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrendFilters {
    pub category: Option<String>,
    pub location: Option<String>,
}

impl TrendFilters {
    pub const KEYS: [&'static str; 2] = ["category", "location"];

    /// Build from loose key/value pairs, rejecting unknown keys
    pub fn from_pairs<'a, I>(pairs: I) -> EngineResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filters = Self::default();

        for (key, value) in pairs {
            match key {
                "category" => filters.category = Some(value.to_string()),
                "location" => filters.location = Some(value.to_string()),
                other => {
                    return Err(EngineError::invalid(
                        "filter",
                        format!("unknown key '{}' (expected one of {:?})", other, Self::KEYS),
                    ))
                }
            }
        }

        Ok(filters)
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.location.is_none()
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.category.as_deref().map_or(true, |c| event.category == c)
            && self.location.as_deref().map_or(true, |l| event.location == l)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_sales: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl ForecastPoint {
    /// Clamp to >= 0 while keeping lower <= predicted <= upper
    pub fn clamped(date: NaiveDate, predicted: f64, lower: f64, upper: f64) -> Self {
        let predicted_sales = predicted.max(0.0);
        Self {
            date,
            predicted_sales,
            lower_bound: lower.max(0.0).min(predicted_sales),
            upper_bound: upper.max(predicted_sales),
        }
    }
}

/// Which forecasting branch produced the points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastModel {
    Seasonal,
    Linear,
    Constant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesForecast {
    pub event_id: String,
    pub model: ForecastModel,
    pub points: Vec<ForecastPoint>,
}

/// Which pricing rule produced the recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBasis {
    /// No category peer has purchase data
    Unchanged,
    /// Price solved from the demand curve for a target attendance
    TargetAttendance,
    /// Constant-elasticity markup (or flat raise when inelastic)
    ProfitMaximizing,
    /// Target requested but elasticity is zero; profit rule used instead
    DegenerateElasticity,
    /// Too few peers for regression; adjusted on mean peer demand
    DemandHeuristic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecommendation {
    pub event_id: String,
    pub current_price: f64,
    pub recommended_price: f64,
    pub elasticity: Option<f64>,
    pub peers_with_data: usize,
    pub basis: PriceBasis,
}
