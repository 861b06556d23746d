//! # Query Specs
//!
//! Normalized shape of a paginated, filterable, sortable read request.

use super::errors::{QueryError, QueryResult};
use crate::store::{
    ExamField, FieldFilter, PageRequest, SortDirection, SortSpec, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};

/// Optional multi-criteria filters. Blank values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExamFilters {
    pub degree: Option<String>,
    pub year: Option<String>,
    pub semester: Option<String>,
}

fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ExamFilters {
    pub fn new(degree: Option<&str>, year: Option<&str>, semester: Option<&str>) -> Self {
        Self {
            degree: present(degree),
            year: present(year),
            semester: present(semester),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.degree.is_none() && self.year.is_none() && self.semester.is_none()
    }

    /// Equality predicates for the provided filters only
    pub fn to_field_filters(&self) -> Vec<FieldFilter> {
        [
            (ExamField::Degree, &self.degree),
            (ExamField::Year, &self.year),
            (ExamField::Semester, &self.semester),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_ref().map(|v| FieldFilter::eq(field, v.clone())))
        .collect()
    }
}

/// Validate a raw page index and clamp a raw size into `1..=MAX_PAGE_SIZE`
pub fn page_request(page: i64, size: i64) -> QueryResult<PageRequest> {
    let page = usize::try_from(page).map_err(|_| {
        QueryError::validation(format!("page index must be >= 0, got {}", page))
    })?;
    let size = size.clamp(1, MAX_PAGE_SIZE as i64) as usize;
    Ok(PageRequest::new(page, size))
}

/// Filters, ordering and page of one read request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub filters: ExamFilters,
    pub sort: SortSpec,
    pub page: PageRequest,
}

impl QuerySpec {
    pub fn new(page: i64, size: i64) -> QueryResult<Self> {
        Ok(Self {
            filters: ExamFilters::default(),
            sort: SortSpec::by_date(),
            page: page_request(page, size)?,
        })
    }

    /// Override ordering. Unknown fields are rejected; absent values keep
    /// ascending date.
    pub fn with_sort(mut self, field: Option<&str>, direction: Option<&str>) -> QueryResult<Self> {
        let field = match field.map(str::trim).filter(|f| !f.is_empty()) {
            Some(name) => ExamField::parse(name)
                .ok_or_else(|| QueryError::validation(format!("unknown sort field '{}'", name)))?,
            None => ExamField::Date,
        };
        let direction = direction.map(SortDirection::parse).unwrap_or_default();
        self.sort = SortSpec::new(field, direction);
        Ok(self)
    }

    pub fn with_filters(mut self, filters: ExamFilters) -> Self {
        self.filters = filters;
        self
    }
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            filters: ExamFilters::default(),
            sort: SortSpec::by_date(),
            page: PageRequest::new(0, DEFAULT_PAGE_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_page_rejected() {
        let err = QuerySpec::new(-1, 20).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_size_clamped_not_rejected() {
        assert_eq!(QuerySpec::new(0, 250).unwrap().page.size(), 100);
        assert_eq!(QuerySpec::new(0, -5).unwrap().page.size(), 1);
    }

    #[test]
    fn test_unknown_sort_field() {
        let err = QuerySpec::default()
            .with_sort(Some("password"), None)
            .unwrap_err();
        assert!(matches!(err, QueryError::Validation(_)));
    }

    #[test]
    fn test_sort_parsing() {
        let spec = QuerySpec::default()
            .with_sort(Some("subject"), Some("DESC"))
            .unwrap();
        assert_eq!(spec.sort, SortSpec::new(ExamField::Subject, SortDirection::Desc));

        let spec = QuerySpec::default().with_sort(None, None).unwrap();
        assert_eq!(spec.sort, SortSpec::by_date());
    }

    #[test]
    fn test_blank_filters_are_absent() {
        let filters = ExamFilters::new(Some(" "), None, Some("A"));
        assert_eq!(filters.degree, None);
        assert_eq!(filters.to_field_filters().len(), 1);
        assert!(ExamFilters::new(Some(""), Some("  "), None).is_empty());
    }
}
