//! # Paged Query Router
//!
//! Dispatches read requests to cached or uncached store queries.
//!
//! Every cached read is request-scoped validate, then lookup, then on a miss
//! execute and store. Writes go straight to the store and do not touch the
//! cache; cached reads may lag a write by at most the tier's ttl.
//! Single-entity reads are never cached.

use std::cmp::Ordering;
use std::future::Future;
use std::sync::Arc;

use chrono::{Months, NaiveDateTime};

use super::errors::{QueryError, QueryResult};
use super::result::{CachedResult, CachedValue, ValueCount};
use super::spec::QuerySpec;
use crate::cache::{CacheKey, CacheTier, QueryCache};
use crate::clock::{system_clock, SharedClock};
use crate::search::{normalize_term, SearchExecutor};
use crate::store::{
    Exam, ExamField, ExamStore, ExamSummary, FieldFilter, NewExam, Page, PageRequest, SortSpec,
};

/// Fields with a browsable set of distinct values
pub const REFERENCE_FIELDS: [ExamField; 5] = [
    ExamField::Degree,
    ExamField::Year,
    ExamField::Semester,
    ExamField::School,
    ExamField::Room,
];

const KEY_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct PagedQueryRouter {
    store: Arc<dyn ExamStore>,
    cache: Arc<QueryCache<CachedResult>>,
    search: SearchExecutor,
    clock: SharedClock,
}

impl PagedQueryRouter {
    /// Router with the default ranked/substring search chain and wall clock
    pub fn new(store: Arc<dyn ExamStore>, cache: Arc<QueryCache<CachedResult>>) -> Self {
        let search = SearchExecutor::for_store(Arc::clone(&store), Arc::clone(&cache));
        Self::with_parts(store, cache, search, system_clock())
    }

    pub fn with_parts(
        store: Arc<dyn ExamStore>,
        cache: Arc<QueryCache<CachedResult>>,
        search: SearchExecutor,
        clock: SharedClock,
    ) -> Self {
        Self {
            store,
            cache,
            search,
            clock,
        }
    }

    pub fn cache(&self) -> &Arc<QueryCache<CachedResult>> {
        &self.cache
    }

    async fn cached<T, F>(&self, tier: CacheTier, key: CacheKey, compute: F) -> QueryResult<T>
    where
        T: CachedValue,
        F: Future<Output = QueryResult<T>>,
    {
        if let Some(hit) = self.cache.get(tier, &key) {
            if let Some(value) = T::from_cached(&hit) {
                tracing::debug!(tier = %tier, key = %key, "cache hit");
                return Ok(value);
            }
        }
        tracing::debug!(tier = %tier, key = %key, "cache miss");

        let value = compute.await?;
        self.cache.put(tier, key, value.clone().into_cached());
        Ok(value)
    }

    fn now(&self) -> NaiveDateTime {
        self.clock.now().naive_utc()
    }

    // ==================
    // Paginated listings
    // ==================

    /// Unfiltered specs list everything; otherwise multi-criteria filtering
    pub async fn route(&self, spec: &QuerySpec) -> QueryResult<Page<ExamSummary>> {
        if spec.filters.is_empty() {
            self.list(spec).await
        } else {
            self.multi_criteria(spec).await
        }
    }

    /// All exams in the requested order
    pub async fn list(&self, spec: &QuerySpec) -> QueryResult<Page<ExamSummary>> {
        let key = CacheKey::builder("exams.list")
            .value("sort", spec.sort.field)
            .value("dir", spec.sort.direction.as_str())
            .page(&spec.page)
            .build();
        self.cached(CacheTier::Short, key, async {
            let page = self.store.fetch(&[], &spec.sort, &spec.page).await?;
            Ok(page.map(ExamSummary::from))
        })
        .await
    }

    pub async fn by_degree(
        &self,
        degree: &str,
        page: &PageRequest,
    ) -> QueryResult<Page<ExamSummary>> {
        let degree = required("degree", degree)?;
        let key = CacheKey::builder("exams.by_degree")
            .param("degree", Some(degree))
            .page(page)
            .build();
        self.cached(CacheTier::Short, key, async {
            let filters = [FieldFilter::eq(ExamField::Degree, degree)];
            let found = self.store.fetch(&filters, &SortSpec::by_date(), page).await?;
            Ok(found.map(ExamSummary::from))
        })
        .await
    }

    /// Case-insensitive subject containment
    pub async fn by_subject(
        &self,
        subject: &str,
        page: &PageRequest,
    ) -> QueryResult<Page<ExamSummary>> {
        let subject = required("subject", subject)?;
        let key = CacheKey::builder("exams.by_subject")
            .param("subject", Some(subject.to_lowercase().as_str()))
            .page(page)
            .build();
        self.cached(CacheTier::Short, key, async {
            let filters = [FieldFilter::contains(ExamField::Subject, subject)];
            let found = self.store.fetch(&filters, &SortSpec::by_date(), page).await?;
            Ok(found.map(ExamSummary::from))
        })
        .await
    }

    /// Absent filters impose no constraint
    pub async fn multi_criteria(&self, spec: &QuerySpec) -> QueryResult<Page<ExamSummary>> {
        let key = CacheKey::builder("exams.multi_criteria")
            .param("degree", spec.filters.degree.as_deref())
            .param("year", spec.filters.year.as_deref())
            .param("semester", spec.filters.semester.as_deref())
            .value("sort", spec.sort.field)
            .value("dir", spec.sort.direction.as_str())
            .page(&spec.page)
            .build();
        self.cached(CacheTier::Medium, key, async {
            let filters = spec.filters.to_field_filters();
            let found = self.store.fetch(&filters, &spec.sort, &spec.page).await?;
            Ok(found.map(ExamSummary::from))
        })
        .await
    }

    /// Text search when a term is given, multi-criteria filtering otherwise.
    ///
    /// A missing or whitespace-only term never reaches the search executor.
    pub async fn search(
        &self,
        term: Option<&str>,
        spec: &QuerySpec,
    ) -> QueryResult<Page<ExamSummary>> {
        match term.filter(|t| !normalize_term(t).is_empty()) {
            Some(term) => Ok(self.search.search(term, &spec.page).await?),
            None => self.multi_criteria(spec).await,
        }
    }

    // ==================
    // Full listings
    // ==================

    pub async fn by_year_semester(&self, year: &str, semester: &str) -> QueryResult<Vec<Exam>> {
        let year = required("year", year)?;
        let semester = required("semester", semester)?;
        let key = CacheKey::builder("exams.by_year_semester")
            .param("year", Some(year))
            .param("semester", Some(semester))
            .build();
        self.cached(CacheTier::Short, key, async {
            let filters = [
                FieldFilter::eq(ExamField::Year, year),
                FieldFilter::eq(ExamField::Semester, semester),
            ];
            Ok(self.store.fetch_all(&filters, &SortSpec::by_date()).await?)
        })
        .await
    }

    /// Exams with `start <= date <= end`
    pub async fn date_range(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> QueryResult<Vec<Exam>> {
        if start > end {
            return Err(QueryError::validation(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        let key = CacheKey::builder("exams.date_range")
            .value("start", start.format(KEY_DATE_FORMAT))
            .value("end", end.format(KEY_DATE_FORMAT))
            .build();
        self.cached(CacheTier::Short, key, async {
            let filters = [FieldFilter::date_from(start), FieldFilter::date_until(end)];
            Ok(self.store.fetch_all(&filters, &SortSpec::by_date()).await?)
        })
        .await
    }

    /// Exams from now on, uncached
    pub async fn upcoming(&self) -> QueryResult<Vec<Exam>> {
        let filters = [FieldFilter::date_from(self.now())];
        Ok(self.store.fetch_all(&filters, &SortSpec::by_date()).await?)
    }

    /// Exams between now and six months from now
    pub async fn current_period(&self) -> QueryResult<Vec<Exam>> {
        let start = self.now();
        let end = start
            .checked_add_months(Months::new(6))
            .unwrap_or(NaiveDateTime::MAX);
        let key = CacheKey::builder("exams.current_period")
            .value("from", start.date())
            .build();
        self.cached(CacheTier::Medium, key, async {
            let filters = [FieldFilter::date_from(start), FieldFilter::date_until(end)];
            Ok(self.store.fetch_all(&filters, &SortSpec::by_date()).await?)
        })
        .await
    }

    // ==================
    // Reference values
    // ==================

    /// Complete distinct set; years descending, everything else ascending
    pub async fn distinct(&self, field: ExamField) -> QueryResult<Vec<String>> {
        if !REFERENCE_FIELDS.contains(&field) {
            return Err(QueryError::validation(format!(
                "'{}' has no reference values",
                field
            )));
        }
        let key = CacheKey::builder("exams.distinct")
            .value("field", field)
            .build();
        self.cached(CacheTier::Long, key, async {
            let mut values = self.store.distinct(field).await?;
            values.sort();
            values.dedup();
            if field == ExamField::Year {
                values.reverse();
            }
            Ok(values)
        })
        .await
    }

    /// Exams per degree, most frequent first
    pub async fn counts_by_degree(&self) -> QueryResult<Vec<ValueCount>> {
        let compute = self.counts(ExamField::Degree, |a, b| {
            b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value))
        });
        self.cached(CacheTier::Long, CacheKey::of("exams.counts_by_degree"), compute)
            .await
    }

    /// Exams per year, latest year first
    pub async fn counts_by_year(&self) -> QueryResult<Vec<ValueCount>> {
        let compute = self.counts(ExamField::Year, |a, b| b.value.cmp(&a.value));
        self.cached(CacheTier::Long, CacheKey::of("exams.counts_by_year"), compute)
            .await
    }

    async fn counts<C>(&self, field: ExamField, order: C) -> QueryResult<Vec<ValueCount>>
    where
        C: Fn(&ValueCount, &ValueCount) -> Ordering,
    {
        let mut counts: Vec<ValueCount> = self
            .store
            .count_by(field)
            .await?
            .into_iter()
            .map(|(value, count)| ValueCount { value, count })
            .collect();
        counts.sort_by(order);
        Ok(counts)
    }

    // ==================
    // Single entity and writes (uncached)
    // ==================

    pub async fn get_by_id(&self, id: i64) -> QueryResult<Option<Exam>> {
        Ok(self.store.get(id).await?)
    }

    pub async fn create(&self, exam: NewExam) -> QueryResult<Exam> {
        validate(&exam)?;
        let created = self.store.insert(exam).await?;
        tracing::info!(id = created.id, subject = %created.subject, "exam created");
        Ok(created)
    }

    /// `None` when the exam does not exist
    pub async fn update(&self, id: i64, exam: NewExam) -> QueryResult<Option<Exam>> {
        validate(&exam)?;
        let updated = self.store.update(id, exam).await?;
        if updated.is_some() {
            tracing::info!(id, "exam updated");
        }
        Ok(updated)
    }

    /// `false` when the exam does not exist
    pub async fn delete(&self, id: i64) -> QueryResult<bool> {
        if !self.store.exists(id).await? {
            return Ok(false);
        }
        let deleted = self.store.delete(id).await?;
        if deleted {
            tracing::info!(id, "exam deleted");
        }
        Ok(deleted)
    }
}

fn required<'a>(name: &str, value: &'a str) -> QueryResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        Err(QueryError::validation(format!("{} must not be blank", name)))
    } else {
        Ok(value)
    }
}

fn validate(exam: &NewExam) -> QueryResult<()> {
    let blank = exam.blank_fields();
    if blank.is_empty() {
        Ok(())
    } else {
        Err(QueryError::validation(format!(
            "missing required fields: {}",
            blank.join(", ")
        )))
    }
}

impl std::fmt::Debug for PagedQueryRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagedQueryRouter")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::cache::CacheConfig;
    use crate::clock::ManualClock;
    use crate::store::InMemoryExamStore;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn exam(id: i64, subject: &str, degree: &str, year: &str, date: &str) -> Exam {
        Exam {
            id,
            subject: subject.to_string(),
            degree: degree.to_string(),
            year: year.to_string(),
            semester: "A".to_string(),
            date: at(date),
            room: None,
            school: "ETSINF".to_string(),
        }
    }

    fn setup(exams: Vec<Exam>) -> (PagedQueryRouter, Arc<InMemoryExamStore>) {
        let store = Arc::new(InMemoryExamStore::with_exams(exams));
        let clock: SharedClock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap(),
        ));
        let cache = Arc::new(QueryCache::with_clock(
            &CacheConfig::default(),
            Arc::clone(&clock),
        ));
        let dyn_store: Arc<dyn ExamStore> = store.clone();
        let search = SearchExecutor::for_store(Arc::clone(&dyn_store), Arc::clone(&cache));
        (
            PagedQueryRouter::with_parts(dyn_store, cache, search, clock),
            store,
        )
    }

    fn dataset() -> Vec<Exam> {
        vec![
            exam(1, "Redes", "GII", "3", "2025-02-01 09:00"),
            exam(2, "Algebra", "GII", "1", "2025-01-10 09:00"),
            exam(3, "Fisica", "GIB", "1", "2025-01-20 09:00"),
        ]
    }

    #[tokio::test]
    async fn test_second_read_is_a_hit() {
        let (router, store) = setup(dataset());
        let spec = QuerySpec::default();
        let first = router.list(&spec).await.unwrap();
        let second = router.list(&spec).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.counters().fetches(), 1);
        assert_eq!(router.cache().stats(CacheTier::Short).hits, 1);
    }

    #[tokio::test]
    async fn test_upcoming_uses_clock() {
        let (router, _) = setup(dataset());
        let ids: Vec<_> = router.upcoming().await.unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn test_date_range_rejects_reversed_bounds() {
        let (router, _) = setup(dataset());
        let err = router
            .date_range(at("2025-02-01 00:00"), at("2025-01-01 00:00"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_counts_by_degree_order() {
        let (router, _) = setup(dataset());
        let counts = router.counts_by_degree().await.unwrap();
        assert_eq!(
            counts,
            vec![
                ValueCount {
                    value: "GII".to_string(),
                    count: 2
                },
                ValueCount {
                    value: "GIB".to_string(),
                    count: 1
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_distinct_rejects_non_reference_field() {
        let (router, _) = setup(dataset());
        assert!(router.distinct(ExamField::Date).await.is_err());
    }

    #[tokio::test]
    async fn test_create_validates_blank_fields() {
        let (router, _) = setup(vec![]);
        let payload = NewExam {
            subject: " ".to_string(),
            degree: "GII".to_string(),
            year: "1".to_string(),
            semester: "A".to_string(),
            date: at("2025-01-10 09:00"),
            room: None,
            school: "ETSINF".to_string(),
        };
        let err = router.create(payload).await.unwrap_err();
        assert!(matches!(err, QueryError::Validation(ref m) if m.contains("subject")));
    }

    #[tokio::test]
    async fn test_missing_entities_are_not_errors() {
        let (router, _) = setup(vec![]);
        assert_eq!(router.get_by_id(9).await.unwrap(), None);
        assert!(!router.delete(9).await.unwrap());
    }
}
