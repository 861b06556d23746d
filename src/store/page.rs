//! # Pagination and Ordering

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::model::{Exam, ExamField};

/// Largest page a caller may request
pub const MAX_PAGE_SIZE: usize = 100;

/// Page size when none is given
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Zero-based page request. Size is always within `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: usize,
    size: usize,
}

impl PageRequest {
    /// Build a request, clamping `size` into `1..=MAX_PAGE_SIZE`
    pub fn new(page: usize, size: usize) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

/// One page of results plus totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Slice an already ordered result set
    pub fn from_ordered(all: Vec<T>, request: &PageRequest) -> Self {
        let total_elements = all.len();
        let items = all
            .into_iter()
            .skip(request.offset())
            .take(request.size())
            .collect();
        Self {
            items,
            page: request.page(),
            size: request.size(),
            total_elements,
            total_pages: total_elements.div_ceil(request.size()),
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `"desc"` (any case) is descending; everything else ascending
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Ordering of a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortSpec {
    pub field: ExamField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: ExamField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Ascending by date, the order every listing defaults to
    pub fn by_date() -> Self {
        Self::new(ExamField::Date, SortDirection::Asc)
    }

    /// Compare two exams; ties fall back to ascending id
    pub fn compare(&self, a: &Exam, b: &Exam) -> Ordering {
        let primary = match self.direction {
            SortDirection::Asc => self.field.compare(a, b),
            SortDirection::Desc => self.field.compare(a, b).reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    pub fn apply(&self, exams: &mut [Exam]) {
        exams.sort_by(|a, b| self.compare(a, b));
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::by_date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_clamped() {
        assert_eq!(PageRequest::new(0, 250).size(), MAX_PAGE_SIZE);
        assert_eq!(PageRequest::new(0, 0).size(), 1);
        assert_eq!(PageRequest::new(3, 20).offset(), 60);
    }

    #[test]
    fn test_clamping_is_idempotent() {
        let once = PageRequest::new(1, 250);
        let twice = PageRequest::new(once.page(), once.size());
        assert_eq!(once, twice);
        assert_eq!(once, PageRequest::new(1, 100));
    }

    #[test]
    fn test_page_totals() {
        let page = Page::from_ordered((0..45).collect::<Vec<_>>(), &PageRequest::new(2, 20));
        assert_eq!(page.items, (40..45).collect::<Vec<_>>());
        assert_eq!(page.total_elements, 45);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let page = Page::from_ordered(vec![1, 2, 3], &PageRequest::new(5, 20));
        assert!(page.is_empty());
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(SortDirection::parse("DESC"), SortDirection::Desc);
        assert_eq!(SortDirection::parse("asc"), SortDirection::Asc);
        assert_eq!(SortDirection::parse("sideways"), SortDirection::Asc);
    }
}
