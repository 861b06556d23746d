//! # Query Errors

use thiserror::Error;

use crate::search::SearchError;
use crate::store::StoreError;

pub type QueryResult<T> = Result<T, QueryError>;

/// Failures surfaced by the query router
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Rejected input (bad page index, unknown sort field, blank payload field)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Primary and fallback search both failed
    #[error("Search failed: primary: {primary}; fallback: {fallback}")]
    SearchFailed {
        primary: StoreError,
        fallback: StoreError,
    },

    /// Data collection failure, propagated without retry
    #[error("Persistence error: {0}")]
    Persistence(#[from] StoreError),
}

impl QueryError {
    pub fn validation(message: impl Into<String>) -> Self {
        QueryError::Validation(message.into())
    }

    /// Stable error kind
    pub fn code(&self) -> &'static str {
        match self {
            QueryError::Validation(_) => "VALIDATION_ERROR",
            QueryError::SearchFailed { .. } => "SEARCH_FAILED",
            QueryError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}

impl From<SearchError> for QueryError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::EmptyTerm => QueryError::validation("search term must not be empty"),
            SearchError::Failed { primary, fallback } => {
                QueryError::SearchFailed { primary, fallback }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(QueryError::validation("x").code(), "VALIDATION_ERROR");
        assert_eq!(
            QueryError::from(StoreError::Unavailable("down".to_string())).code(),
            "PERSISTENCE_ERROR"
        );
    }

    #[test]
    fn test_search_errors_convert() {
        assert_eq!(
            QueryError::from(SearchError::EmptyTerm).code(),
            "VALIDATION_ERROR"
        );
        let failed = SearchError::Failed {
            primary: StoreError::Unsupported("a".to_string()),
            fallback: StoreError::Unavailable("b".to_string()),
        };
        assert_eq!(QueryError::from(failed).code(), "SEARCH_FAILED");
    }
}
