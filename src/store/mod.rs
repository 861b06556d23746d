//! # Exam Store
//!
//! The persistent collection the query layer reads from and writes to.
//! The core only depends on the [`ExamStore`] trait; [`InMemoryExamStore`]
//! backs the server and the tests.

pub mod errors;
pub mod filter;
pub mod memory;
pub mod model;
pub mod page;
pub mod text;

use async_trait::async_trait;

pub use errors::{StoreError, StoreResult};
pub use filter::{FieldFilter, FilterOperator, FilterValue};
pub use memory::{InMemoryExamStore, StoreCounters};
pub use model::{Exam, ExamField, ExamSummary, NewExam};
pub use page::{Page, PageRequest, SortDirection, SortSpec, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Distinct value with its number of occurrences
pub type ValueCount = (String, u64);

/// Downstream data collection
#[async_trait]
pub trait ExamStore: Send + Sync {
    /// Filtered, sorted, paginated fetch
    async fn fetch(
        &self,
        filters: &[FieldFilter],
        sort: &SortSpec,
        page: &PageRequest,
    ) -> StoreResult<Page<Exam>>;

    /// Filtered, sorted fetch without pagination
    async fn fetch_all(&self, filters: &[FieldFilter], sort: &SortSpec) -> StoreResult<Vec<Exam>>;

    /// Distinct non-empty values of a text column, in no particular order
    async fn distinct(&self, field: ExamField) -> StoreResult<Vec<String>>;

    /// Occurrences per distinct value of a text column, in no particular order
    async fn count_by(&self, field: ExamField) -> StoreResult<Vec<ValueCount>>;

    /// Token search over subject and degree, ordered by ascending date.
    ///
    /// May fail at runtime when no text index is available.
    async fn full_text_search(&self, term: &str, page: &PageRequest) -> StoreResult<Page<Exam>>;

    /// Case-insensitive substring search over subject and degree, ordered
    /// by ascending date
    async fn substring_search(&self, term: &str, page: &PageRequest) -> StoreResult<Page<Exam>>;

    async fn get(&self, id: i64) -> StoreResult<Option<Exam>>;

    async fn insert(&self, exam: NewExam) -> StoreResult<Exam>;

    /// Replace an existing exam; `None` when `id` does not exist
    async fn update(&self, id: i64, exam: NewExam) -> StoreResult<Option<Exam>>;

    /// Delete by id; `false` when `id` does not exist
    async fn delete(&self, id: i64) -> StoreResult<bool>;

    async fn exists(&self, id: i64) -> StoreResult<bool>;
}
