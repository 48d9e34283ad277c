use thiserror::Error;

/// Errors returned by enrollment analysis configuration.
#[derive(Debug, Error)]
pub enum EnrollError {
    #[error("invalid completion criteria: {0}")]
    InvalidCriteria(String),
}
