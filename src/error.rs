/// Errors surfaced by the analytics engine.
///
/// Sparse data is never an error: every component falls back to a simpler
/// model instead. Only unknown references and malformed input fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Event {0} not found")]
    EventNotFound(String),

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

impl EngineError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
