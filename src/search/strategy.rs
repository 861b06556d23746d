//! Search strategies over the exam store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::store::{Exam, ExamStore, Page, PageRequest, StoreResult};

/// One way of answering a text search.
///
/// Implementations return matches ordered by ascending date.
#[async_trait]
pub trait SearchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, term: &str, page: &PageRequest) -> StoreResult<Page<Exam>>;
}

/// Token search backed by the store's text index
pub struct RankedSearch {
    store: Arc<dyn ExamStore>,
}

impl RankedSearch {
    pub fn new(store: Arc<dyn ExamStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SearchStrategy for RankedSearch {
    fn name(&self) -> &'static str {
        "ranked"
    }

    async fn search(&self, term: &str, page: &PageRequest) -> StoreResult<Page<Exam>> {
        self.store.full_text_search(term, page).await
    }
}

/// Case-insensitive substring match. Broader recall than [`RankedSearch`].
pub struct SubstringSearch {
    store: Arc<dyn ExamStore>,
}

impl SubstringSearch {
    pub fn new(store: Arc<dyn ExamStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SearchStrategy for SubstringSearch {
    fn name(&self) -> &'static str {
        "substring"
    }

    async fn search(&self, term: &str, page: &PageRequest) -> StoreResult<Page<Exam>> {
        self.store.substring_search(term, page).await
    }
}
