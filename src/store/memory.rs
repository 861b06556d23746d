//! # In-Memory Exam Store
//!
//! Process-local implementation of [`ExamStore`] with switches to simulate
//! a missing text index or an unreachable collection.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::errors::{StoreError, StoreResult};
use super::filter::{matches_all, FieldFilter};
use super::model::{Exam, ExamField, NewExam};
use super::page::{Page, PageRequest, SortSpec};
use super::text;
use super::{ExamStore, ValueCount};

/// Call counters, passive only
#[derive(Debug, Default)]
pub struct StoreCounters {
    fetches: AtomicU64,
    full_text_searches: AtomicU64,
    substring_searches: AtomicU64,
}

impl StoreCounters {
    pub fn fetches(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    pub fn full_text_searches(&self) -> u64 {
        self.full_text_searches.load(Ordering::Relaxed)
    }

    pub fn substring_searches(&self) -> u64 {
        self.substring_searches.load(Ordering::Relaxed)
    }
}

/// In-memory exam collection
#[derive(Debug)]
pub struct InMemoryExamStore {
    exams: RwLock<BTreeMap<i64, Exam>>,
    next_id: AtomicI64,
    full_text_enabled: AtomicBool,
    available: AtomicBool,
    counters: StoreCounters,
}

impl InMemoryExamStore {
    pub fn new() -> Self {
        Self::with_exams(Vec::new())
    }

    /// Seed with existing records, keeping their ids
    pub fn with_exams(exams: Vec<Exam>) -> Self {
        let next_id = exams.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        Self {
            exams: RwLock::new(exams.into_iter().map(|e| (e.id, e)).collect()),
            next_id: AtomicI64::new(next_id),
            full_text_enabled: AtomicBool::new(true),
            available: AtomicBool::new(true),
            counters: StoreCounters::default(),
        }
    }

    /// Load a JSON array of exams
    pub fn from_seed_file(path: &Path) -> StoreResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| StoreError::Seed(format!("{}: {}", path.display(), e)))?;
        let exams: Vec<Exam> = serde_json::from_str(&raw)
            .map_err(|e| StoreError::Seed(format!("{}: {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), count = exams.len(), "loaded exam seed data");
        Ok(Self::with_exams(exams))
    }

    /// Toggle the full-text primitive (off simulates a missing text index)
    pub fn set_full_text_enabled(&self, enabled: bool) {
        self.full_text_enabled.store(enabled, Ordering::SeqCst);
    }

    /// Toggle availability of the whole collection
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn counters(&self) -> &StoreCounters {
        &self.counters
    }

    pub fn len(&self) -> usize {
        self.exams.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".to_string()))
        }
    }

    fn select<P>(&self, predicate: P, sort: &SortSpec) -> Vec<Exam>
    where
        P: Fn(&Exam) -> bool,
    {
        let mut selected: Vec<Exam> = self
            .exams
            .read()
            .values()
            .filter(|e| predicate(e))
            .cloned()
            .collect();
        sort.apply(&mut selected);
        selected
    }

    fn searchable_text(exam: &Exam) -> String {
        format!("{} {}", exam.subject, exam.degree)
    }
}

impl Default for InMemoryExamStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExamStore for InMemoryExamStore {
    async fn fetch(
        &self,
        filters: &[FieldFilter],
        sort: &SortSpec,
        page: &PageRequest,
    ) -> StoreResult<Page<Exam>> {
        self.ensure_available()?;
        self.counters.fetches.fetch_add(1, Ordering::Relaxed);
        let selected = self.select(|e| matches_all(filters, e), sort);
        Ok(Page::from_ordered(selected, page))
    }

    async fn fetch_all(&self, filters: &[FieldFilter], sort: &SortSpec) -> StoreResult<Vec<Exam>> {
        self.ensure_available()?;
        self.counters.fetches.fetch_add(1, Ordering::Relaxed);
        Ok(self.select(|e| matches_all(filters, e), sort))
    }

    async fn distinct(&self, field: ExamField) -> StoreResult<Vec<String>> {
        self.ensure_available()?;
        let exams = self.exams.read();
        let values: BTreeSet<String> = exams
            .values()
            .filter_map(|e| field.text(e))
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        Ok(values.into_iter().collect())
    }

    async fn count_by(&self, field: ExamField) -> StoreResult<Vec<ValueCount>> {
        self.ensure_available()?;
        let exams = self.exams.read();
        let mut counts: HashMap<String, u64> = HashMap::new();
        for value in exams.values().filter_map(|e| field.text(e)) {
            *counts.entry(value.to_string()).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn full_text_search(&self, term: &str, page: &PageRequest) -> StoreResult<Page<Exam>> {
        self.ensure_available()?;
        self.counters
            .full_text_searches
            .fetch_add(1, Ordering::Relaxed);
        if !self.full_text_enabled.load(Ordering::SeqCst) {
            return Err(StoreError::Unsupported(
                "full-text index is not available".to_string(),
            ));
        }
        let selected = self.select(
            |e| text::full_text_matches(&Self::searchable_text(e), term),
            &SortSpec::by_date(),
        );
        Ok(Page::from_ordered(selected, page))
    }

    async fn substring_search(&self, term: &str, page: &PageRequest) -> StoreResult<Page<Exam>> {
        self.ensure_available()?;
        self.counters
            .substring_searches
            .fetch_add(1, Ordering::Relaxed);
        let selected = self.select(
            |e| {
                text::contains_ignore_case(&e.subject, term)
                    || text::contains_ignore_case(&e.degree, term)
            },
            &SortSpec::by_date(),
        );
        Ok(Page::from_ordered(selected, page))
    }

    async fn get(&self, id: i64) -> StoreResult<Option<Exam>> {
        self.ensure_available()?;
        Ok(self.exams.read().get(&id).cloned())
    }

    async fn insert(&self, exam: NewExam) -> StoreResult<Exam> {
        self.ensure_available()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let exam = exam.into_exam(id);
        self.exams.write().insert(id, exam.clone());
        Ok(exam)
    }

    async fn update(&self, id: i64, exam: NewExam) -> StoreResult<Option<Exam>> {
        self.ensure_available()?;
        let mut exams = self.exams.write();
        match exams.get_mut(&id) {
            Some(existing) => {
                *existing = exam.into_exam(id);
                Ok(Some(existing.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> StoreResult<bool> {
        self.ensure_available()?;
        Ok(self.exams.write().remove(&id).is_some())
    }

    async fn exists(&self, id: i64) -> StoreResult<bool> {
        self.ensure_available()?;
        Ok(self.exams.read().contains_key(&id))
    }
}
