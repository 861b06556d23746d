//! # Field Filters
//!
//! Predicates the data collection evaluates against exam records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::model::{Exam, ExamField};

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    /// Equals
    #[serde(rename = "eq")]
    Eq,

    /// Case-insensitive substring
    #[serde(rename = "icontains")]
    ContainsIgnoreCase,

    /// Greater than or equal
    #[serde(rename = "gte")]
    Gte,

    /// Less than or equal
    #[serde(rename = "lte")]
    Lte,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::ContainsIgnoreCase => "icontains",
            FilterOperator::Gte => "gte",
            FilterOperator::Lte => "lte",
        }
    }
}

/// Right-hand side of a filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Date(NaiveDateTime),
    Text(String),
}

/// A single field predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: ExamField,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl FieldFilter {
    pub fn new(field: ExamField, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            field,
            operator,
            value,
        }
    }

    /// Create an equality filter on a text column
    pub fn eq(field: ExamField, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Eq, FilterValue::Text(value.into()))
    }

    pub fn contains(field: ExamField, value: impl Into<String>) -> Self {
        Self::new(
            field,
            FilterOperator::ContainsIgnoreCase,
            FilterValue::Text(value.into()),
        )
    }

    pub fn date_from(start: NaiveDateTime) -> Self {
        Self::new(ExamField::Date, FilterOperator::Gte, FilterValue::Date(start))
    }

    pub fn date_until(end: NaiveDateTime) -> Self {
        Self::new(ExamField::Date, FilterOperator::Lte, FilterValue::Date(end))
    }

    /// Check if an exam matches this filter
    pub fn matches(&self, exam: &Exam) -> bool {
        match (&self.value, self.field) {
            (FilterValue::Date(value), ExamField::Date) => match self.operator {
                FilterOperator::Eq => exam.date == *value,
                FilterOperator::Gte => exam.date >= *value,
                FilterOperator::Lte => exam.date <= *value,
                FilterOperator::ContainsIgnoreCase => false,
            },
            (FilterValue::Text(value), field) => {
                let Some(actual) = field.text(exam) else {
                    return false;
                };
                match self.operator {
                    FilterOperator::Eq => actual == value,
                    FilterOperator::ContainsIgnoreCase => {
                        actual.to_lowercase().contains(&value.to_lowercase())
                    }
                    FilterOperator::Gte => actual >= value.as_str(),
                    FilterOperator::Lte => actual <= value.as_str(),
                }
            }
            // Date value against a text column
            (FilterValue::Date(_), _) => false,
        }
    }
}

/// True when every filter matches (an empty set matches everything)
pub fn matches_all(filters: &[FieldFilter], exam: &Exam) -> bool {
    filters.iter().all(|f| f.matches(exam))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn exam() -> Exam {
        Exam {
            id: 1,
            subject: "Estructuras de Datos".to_string(),
            degree: "GII".to_string(),
            year: "2".to_string(),
            semester: "A".to_string(),
            date: at("2025-01-20 15:00"),
            room: None,
            school: "ETSINF".to_string(),
        }
    }

    #[test]
    fn test_eq_is_exact() {
        assert!(FieldFilter::eq(ExamField::Degree, "GII").matches(&exam()));
        assert!(!FieldFilter::eq(ExamField::Degree, "gii").matches(&exam()));
    }

    #[test]
    fn test_contains_ignores_case() {
        assert!(FieldFilter::contains(ExamField::Subject, "DATOS").matches(&exam()));
        assert!(!FieldFilter::contains(ExamField::Subject, "redes").matches(&exam()));
    }

    #[test]
    fn test_date_bounds() {
        assert!(FieldFilter::date_from(at("2025-01-20 15:00")).matches(&exam()));
        assert!(!FieldFilter::date_from(at("2025-01-21 00:00")).matches(&exam()));
        assert!(FieldFilter::date_until(at("2025-01-31 00:00")).matches(&exam()));
    }

    #[test]
    fn test_missing_room_never_matches() {
        assert!(!FieldFilter::eq(ExamField::Room, "1G").matches(&exam()));
    }

    #[test]
    fn test_empty_filter_set_matches() {
        assert!(matches_all(&[], &exam()));
    }
}
