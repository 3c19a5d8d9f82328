//! Domain errors for the Stoa dialogue engine.

use thiserror::Error;

/// Domain-level errors that can occur while processing a turn.
///
/// Nothing here is fatal to the process: every failure path degrades
/// to a usable, if generic, reply at the turn controller.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Generation service failed: {0}")]
    Generation(String),

    #[error("State persistence failed: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Persistence(err.to_string())
    }
}
