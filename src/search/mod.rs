//! # Search
//!
//! Text search as an explicit two-strategy chain: [`RankedSearch`] first,
//! [`SubstringSearch`] when the ranked path fails at runtime.

mod errors;
mod executor;
mod strategy;

pub use errors::{SearchError, SearchResult};
pub use executor::{normalize_term, SearchExecutor, SEARCH_OPERATION};
pub use strategy::{RankedSearch, SearchStrategy, SubstringSearch};
