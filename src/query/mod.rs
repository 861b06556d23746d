//! # Query Routing
//!
//! Normalizes read requests into [`QuerySpec`]s and serves them through the
//! tiered cache.

mod errors;
mod result;
mod router;
mod spec;

pub use errors::{QueryError, QueryResult};
pub use result::{CachedResult, CachedValue, ValueCount};
pub use router::{PagedQueryRouter, REFERENCE_FIELDS};
pub use spec::{page_request, ExamFilters, QuerySpec};
