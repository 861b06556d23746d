//! Cached result snapshots.

use serde::{Deserialize, Serialize};

use crate::store::{Exam, ExamSummary, Page};

/// Number of exams sharing one column value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: u64,
}

/// Everything the router and search executor store in the cache
#[derive(Debug, Clone, PartialEq)]
pub enum CachedResult {
    Summaries(Page<ExamSummary>),
    Exams(Vec<Exam>),
    Values(Vec<String>),
    Counts(Vec<ValueCount>),
}

/// Conversion between a concrete result type and its cached form
pub trait CachedValue: Clone {
    fn into_cached(self) -> CachedResult;

    /// `None` when the snapshot holds another kind of result
    fn from_cached(cached: &CachedResult) -> Option<Self>;
}

impl CachedValue for Page<ExamSummary> {
    fn into_cached(self) -> CachedResult {
        CachedResult::Summaries(self)
    }

    fn from_cached(cached: &CachedResult) -> Option<Self> {
        match cached {
            CachedResult::Summaries(page) => Some(page.clone()),
            _ => None,
        }
    }
}

impl CachedValue for Vec<Exam> {
    fn into_cached(self) -> CachedResult {
        CachedResult::Exams(self)
    }

    fn from_cached(cached: &CachedResult) -> Option<Self> {
        match cached {
            CachedResult::Exams(exams) => Some(exams.clone()),
            _ => None,
        }
    }
}

impl CachedValue for Vec<String> {
    fn into_cached(self) -> CachedResult {
        CachedResult::Values(self)
    }

    fn from_cached(cached: &CachedResult) -> Option<Self> {
        match cached {
            CachedResult::Values(values) => Some(values.clone()),
            _ => None,
        }
    }
}

impl CachedValue for Vec<ValueCount> {
    fn into_cached(self) -> CachedResult {
        CachedResult::Counts(self)
    }

    fn from_cached(cached: &CachedResult) -> Option<Self> {
        match cached {
            CachedResult::Counts(counts) => Some(counts.clone()),
            _ => None,
        }
    }
}
