use serde::{Deserialize, Serialize};
use crate::analytics::types::{
    ForecastModel, ForecastPoint, PriceBasis, PriceRecommendation, SalesForecast, TrendFilters,
    TrendingEvent,
};
use crate::error::EngineError;

/// Unknown keys are rejected rather than read as an empty filter
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrendingQuery {
    pub limit: Option<usize>,
    pub location: Option<String>,
    pub category: Option<String>,
}

impl TrendingQuery {
    /// Empty query values mean "no filter"
    pub fn filters(&self) -> TrendFilters {
        TrendFilters {
            category: self.category.clone().filter(|c| !c.is_empty()),
            location: self.location.clone().filter(|l| !l.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingResponse {
    pub success: bool,
    pub trending_events: Vec<TrendingEvent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastQuery {
    pub event_id: Option<String>,
    pub days_ahead: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub success: bool,
    pub model: ForecastModel,
    pub forecast: Vec<ForecastPoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceOptimizationRequest {
    pub event_id: Option<String>,
    pub current_price: Option<f64>,
    pub target_attendance: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceOptimizationResponse {
    pub success: bool,
    pub optimized_price: f64,
    pub basis: PriceBasis,
    pub elasticity: Option<f64>,
}

impl From<Vec<TrendingEvent>> for TrendingResponse {
    fn from(trending_events: Vec<TrendingEvent>) -> Self {
        Self {
            success: true,
            trending_events,
        }
    }
}

impl From<SalesForecast> for ForecastResponse {
    fn from(forecast: SalesForecast) -> Self {
        Self {
            success: true,
            model: forecast.model,
            forecast: forecast.points,
        }
    }
}

impl From<PriceRecommendation> for PriceOptimizationResponse {
    fn from(recommendation: PriceRecommendation) -> Self {
        Self {
            success: true,
            optimized_price: recommendation.recommended_price,
            basis: recommendation.basis,
            elasticity: recommendation.elasticity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// An engine failure translated for the HTTP layer
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{status}: {}", .body.error)]
pub struct ApiError {
    pub status: u16,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error: message.into(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

/// HTTP status for an engine error
pub fn status_for(err: &EngineError) -> u16 {
    match err {
        EngineError::EventNotFound(_) => 404,
        EngineError::InvalidInput { .. } => 400,
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::new(status_for(&err), err.to_string())
    }
}
