//! JSON contracts consumed by the HTTP layer.
//!
//! The engine raises typed errors; this module turns them into the status
//! code and `{"error": ...}` body the HTTP collaborator sends back.

pub mod service;
pub mod types;

pub use service::Insights;
pub use types::{ApiError, ErrorBody};
