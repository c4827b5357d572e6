pub mod forecasting;
pub mod pricing;
pub mod regression;
pub mod seasonal;
pub mod trending;
pub mod types;

pub use forecasting::SalesForecaster;
pub use pricing::PriceOptimizer;
pub use trending::TrendScorer;
