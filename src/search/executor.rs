//! # Search Executor
//!
//! Runs the primary strategy and, on any failure, the fallback. A primary
//! failure is logged and swallowed; only a failure of both reaches the caller.
//! Results of either path go to the medium cache tier.

use std::sync::Arc;

use super::errors::{SearchError, SearchResult};
use super::strategy::{RankedSearch, SearchStrategy, SubstringSearch};
use crate::cache::{CacheKey, CacheTier, QueryCache};
use crate::query::{CachedResult, CachedValue};
use crate::store::{ExamStore, ExamSummary, Page, PageRequest};

/// Cache key operation for search results
pub const SEARCH_OPERATION: &str = "exams.search";

const SEARCH_TIER: CacheTier = CacheTier::Medium;

/// Trim and lowercase a search term. Inner whitespace is kept as typed,
/// so the substring path still sees the literal text.
pub fn normalize_term(term: &str) -> String {
    term.trim().to_lowercase()
}

/// Primary/fallback search chain
pub struct SearchExecutor {
    primary: Arc<dyn SearchStrategy>,
    fallback: Arc<dyn SearchStrategy>,
    cache: Arc<QueryCache<CachedResult>>,
}

impl SearchExecutor {
    pub fn new(
        primary: Arc<dyn SearchStrategy>,
        fallback: Arc<dyn SearchStrategy>,
        cache: Arc<QueryCache<CachedResult>>,
    ) -> Self {
        Self {
            primary,
            fallback,
            cache,
        }
    }

    /// Ranked search with substring fallback over the same store
    pub fn for_store(store: Arc<dyn ExamStore>, cache: Arc<QueryCache<CachedResult>>) -> Self {
        Self::new(
            Arc::new(RankedSearch::new(Arc::clone(&store))),
            Arc::new(SubstringSearch::new(store)),
            cache,
        )
    }

    /// Search subject and degree, ordered by ascending date.
    ///
    /// Callers route blank terms elsewhere; a blank term here is
    /// [`SearchError::EmptyTerm`].
    pub async fn search(&self, term: &str, page: &PageRequest) -> SearchResult<Page<ExamSummary>> {
        let term = normalize_term(term);
        if term.is_empty() {
            return Err(SearchError::EmptyTerm);
        }

        let key = CacheKey::builder(SEARCH_OPERATION)
            .param("term", Some(term.as_str()))
            .page(page)
            .build();

        if let Some(hit) = self.cache.get(SEARCH_TIER, &key) {
            if let Some(result) = Page::<ExamSummary>::from_cached(&hit) {
                tracing::debug!(tier = %SEARCH_TIER, key = %key, "cache hit");
                return Ok(result);
            }
        }
        tracing::debug!(tier = %SEARCH_TIER, key = %key, "cache miss");

        let found = match self.primary.search(&term, page).await {
            Ok(found) => found,
            Err(primary) => {
                tracing::warn!(
                    strategy = self.primary.name(),
                    fallback = self.fallback.name(),
                    code = primary.code(),
                    error = %primary,
                    "primary search failed, falling back"
                );
                match self.fallback.search(&term, page).await {
                    Ok(found) => found,
                    Err(fallback) => {
                        tracing::error!(
                            strategy = self.fallback.name(),
                            code = fallback.code(),
                            error = %fallback,
                            "fallback search failed"
                        );
                        return Err(SearchError::Failed { primary, fallback });
                    }
                }
            }
        };

        let summaries = found.map(ExamSummary::from);
        self.cache
            .put(SEARCH_TIER, key, summaries.clone().into_cached());
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::NaiveDateTime;

    use super::*;
    use crate::cache::CacheConfig;
    use crate::store::{Exam, StoreError, StoreResult};

    struct Fixed {
        name: &'static str,
        result: StoreResult<Vec<Exam>>,
    }

    #[async_trait]
    impl SearchStrategy for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn search(&self, _term: &str, page: &PageRequest) -> StoreResult<Page<Exam>> {
            self.result
                .clone()
                .map(|exams| Page::from_ordered(exams, page))
        }
    }

    fn exam(id: i64) -> Exam {
        Exam {
            id,
            subject: "Redes".to_string(),
            degree: "GII".to_string(),
            year: "3".to_string(),
            semester: "A".to_string(),
            date: NaiveDateTime::parse_from_str("2025-01-10 09:00", "%Y-%m-%d %H:%M").unwrap(),
            room: None,
            school: "ETSINF".to_string(),
        }
    }

    fn executor(
        primary: StoreResult<Vec<Exam>>,
        fallback: StoreResult<Vec<Exam>>,
    ) -> SearchExecutor {
        SearchExecutor::new(
            Arc::new(Fixed {
                name: "primary",
                result: primary,
            }),
            Arc::new(Fixed {
                name: "fallback",
                result: fallback,
            }),
            Arc::new(QueryCache::new(&CacheConfig::default())),
        )
    }

    #[test]
    fn test_normalize_term() {
        assert_eq!(normalize_term("  Redes de Computadores "), "redes de computadores");
        assert_eq!(normalize_term(" Bases  de Datos"), "bases  de datos");
        assert_eq!(normalize_term(" \n "), "");
    }

    struct Recording {
        seen: parking_lot::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SearchStrategy for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn search(&self, term: &str, page: &PageRequest) -> StoreResult<Page<Exam>> {
            self.seen.lock().push(term.to_string());
            Err(StoreError::Unsupported(format!("{} at page {}", term, page.page())))
        }
    }

    #[tokio::test]
    async fn test_strategies_receive_inner_whitespace() {
        let primary = Arc::new(Recording {
            seen: parking_lot::Mutex::new(Vec::new()),
        });
        let fallback = Arc::new(Recording {
            seen: parking_lot::Mutex::new(Vec::new()),
        });
        let executor = SearchExecutor::new(
            primary.clone(),
            fallback.clone(),
            Arc::new(QueryCache::new(&CacheConfig::default())),
        );

        let err = executor
            .search("  Bases  de Datos ", &PageRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Failed { .. }));
        assert_eq!(*primary.seen.lock(), vec!["bases  de datos".to_string()]);
        assert_eq!(*fallback.seen.lock(), vec!["bases  de datos".to_string()]);
    }

    #[tokio::test]
    async fn test_primary_result_used() {
        let executor = executor(Ok(vec![exam(1)]), Ok(vec![exam(2)]));
        let page = executor.search("redes", &PageRequest::default()).await.unwrap();
        assert_eq!(page.items[0].id, 1);
    }

    #[tokio::test]
    async fn test_primary_failure_is_hidden() {
        let executor = executor(
            Err(StoreError::Unsupported("no index".to_string())),
            Ok(vec![exam(2)]),
        );
        let page = executor.search("redes", &PageRequest::default()).await.unwrap();
        assert_eq!(page.items[0].id, 2);
    }

    #[tokio::test]
    async fn test_double_failure_surfaces() {
        let executor = executor(
            Err(StoreError::Unsupported("no index".to_string())),
            Err(StoreError::Unavailable("down".to_string())),
        );
        let err = executor
            .search("redes", &PageRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "SEARCH_FAILED");
        assert!(matches!(
            err,
            SearchError::Failed {
                primary: StoreError::Unsupported(_),
                fallback: StoreError::Unavailable(_),
            }
        ));
    }

    #[tokio::test]
    async fn test_blank_term_rejected() {
        let executor = executor(Ok(vec![]), Ok(vec![]));
        let err = executor.search("   ", &PageRequest::default()).await.unwrap_err();
        assert_eq!(err, SearchError::EmptyTerm);
    }

    #[tokio::test]
    async fn test_equivalent_terms_share_cache_entry() {
        let executor = executor(Ok(vec![exam(1)]), Ok(vec![]));
        executor.search("Redes", &PageRequest::default()).await.unwrap();
        executor.search("  redes ", &PageRequest::default()).await.unwrap();

        let stats = executor.cache.stats(CacheTier::Medium);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
    }
}
