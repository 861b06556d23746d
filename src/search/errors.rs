//! # Search Errors

use thiserror::Error;

use crate::store::StoreError;

pub type SearchResult<T> = Result<T, SearchError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Term is empty after normalization
    #[error("Search term must not be empty")]
    EmptyTerm,

    /// Both strategies failed
    #[error("Search failed: primary: {primary}; fallback: {fallback}")]
    Failed {
        primary: StoreError,
        fallback: StoreError,
    },
}

impl SearchError {
    pub fn code(&self) -> &'static str {
        match self {
            SearchError::EmptyTerm => "SEARCH_EMPTY_TERM",
            SearchError::Failed { .. } => "SEARCH_FAILED",
        }
    }
}
