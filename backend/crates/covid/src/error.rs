//! Statistics Error Types
//!
//! Feature-specific variants that convert into the unified
//! `kernel::error::AppError` at the handler boundary.

use kernel::error::app_error::AppError;
use thiserror::Error;

/// Statistics-specific result type alias
pub type CovidResult<T> = Result<T, CovidError>;

#[derive(Debug, Error)]
pub enum CovidError {
    /// A date query parameter is not `YYYY-MM-DD`
    #[error("Invalid {field} format, expected YYYY-MM-DD")]
    InvalidDate {
        field: &'static str,
        #[source]
        source: chrono::ParseError,
    },

    /// No national record exists yet
    #[error("No national case data found")]
    NationalCaseNotFound,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<CovidError> for AppError {
    fn from(err: CovidError) -> Self {
        let message = err.to_string();
        match err {
            CovidError::InvalidDate { source, .. } => {
                AppError::bad_request(message).with_source(source)
            }
            CovidError::NationalCaseNotFound => AppError::not_found(message),
            CovidError::Database(source) => source.into(),
        }
    }
}
