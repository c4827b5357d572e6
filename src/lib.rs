//! Trend scoring, ticket-sales forecasting and price optimization for an
//! event-ticketing platform.
//!
//! Every component is a pure function of the events and interactions it is
//! handed: nothing is cached or mutated between calls.

pub mod analytics;
pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod monitoring;

pub use analytics::{PriceOptimizer, SalesForecaster, TrendScorer};
pub use config::Config;
pub use data::types::{Dataset, Event, Interaction, InteractionType};
pub use error::{EngineError, EngineResult};
