//! # Store Errors

use thiserror::Error;

/// Result type for data collection operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Data collection failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The collection cannot be reached
    #[error("Data collection unavailable: {0}")]
    Unavailable(String),

    /// The requested primitive is not supported (e.g. no text index)
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Seed data could not be loaded
    #[error("Seed error: {0}")]
    Seed(String),
}

impl StoreError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Unavailable(_) => "STORE_UNAVAILABLE",
            StoreError::Unsupported(_) => "STORE_UNSUPPORTED",
            StoreError::Seed(_) => "STORE_SEED_ERROR",
        }
    }
}
