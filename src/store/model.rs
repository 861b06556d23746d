//! # Exam Records
//!
//! Entity, write payload and lightweight list projection.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A scheduled exam
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    pub id: i64,
    pub subject: String,
    pub degree: String,
    pub year: String,
    pub semester: String,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub room: Option<String>,
    pub school: String,
}

/// Create/update payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewExam {
    pub subject: String,
    pub degree: String,
    pub year: String,
    pub semester: String,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub room: Option<String>,
    pub school: String,
}

impl NewExam {
    /// Names of required fields that are blank
    pub fn blank_fields(&self) -> Vec<&'static str> {
        [
            ("subject", &self.subject),
            ("degree", &self.degree),
            ("year", &self.year),
            ("semester", &self.semester),
            ("school", &self.school),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn into_exam(self, id: i64) -> Exam {
        Exam {
            id,
            subject: self.subject,
            degree: self.degree,
            year: self.year,
            semester: self.semester,
            date: self.date,
            room: self.room,
            school: self.school,
        }
    }
}

/// List-view projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSummary {
    pub id: i64,
    pub subject: String,
    pub degree: String,
    pub date: NaiveDateTime,
    pub room: Option<String>,
}

impl From<Exam> for ExamSummary {
    fn from(exam: Exam) -> Self {
        Self {
            id: exam.id,
            subject: exam.subject,
            degree: exam.degree,
            date: exam.date,
            room: exam.room,
        }
    }
}

/// Addressable exam columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamField {
    Id,
    Subject,
    Degree,
    Year,
    Semester,
    Date,
    Room,
    School,
}

impl ExamField {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "id" => Some(Self::Id),
            "subject" => Some(Self::Subject),
            "degree" => Some(Self::Degree),
            "year" => Some(Self::Year),
            "semester" => Some(Self::Semester),
            "date" => Some(Self::Date),
            "room" => Some(Self::Room),
            "school" => Some(Self::School),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Subject => "subject",
            Self::Degree => "degree",
            Self::Year => "year",
            Self::Semester => "semester",
            Self::Date => "date",
            Self::Room => "room",
            Self::School => "school",
        }
    }

    /// Text value of a string column (None for id/date or an empty room)
    pub fn text<'a>(&self, exam: &'a Exam) -> Option<&'a str> {
        match self {
            Self::Subject => Some(&exam.subject),
            Self::Degree => Some(&exam.degree),
            Self::Year => Some(&exam.year),
            Self::Semester => Some(&exam.semester),
            Self::Room => exam.room.as_deref(),
            Self::School => Some(&exam.school),
            Self::Id | Self::Date => None,
        }
    }

    /// Compare two exams on this column
    pub fn compare(&self, a: &Exam, b: &Exam) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Date => a.date.cmp(&b.date),
            // Absent rooms sort after present ones
            Self::Room => match (&a.room, &b.room) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            _ => self.text(a).cmp(&self.text(b)),
        }
    }
}

impl fmt::Display for ExamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exam(id: i64, room: Option<&str>) -> Exam {
        Exam {
            id,
            subject: "Algebra".to_string(),
            degree: "GII".to_string(),
            year: "1".to_string(),
            semester: "A".to_string(),
            date: NaiveDateTime::parse_from_str("2025-01-10 09:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            room: room.map(str::to_string),
            school: "ETSINF".to_string(),
        }
    }

    #[test]
    fn test_field_parse() {
        assert_eq!(ExamField::parse("Date"), Some(ExamField::Date));
        assert_eq!(ExamField::parse(" degree "), Some(ExamField::Degree));
        assert_eq!(ExamField::parse("password"), None);
    }

    #[test]
    fn test_missing_room_sorts_last() {
        let a = exam(1, None);
        let b = exam(2, Some("1G"));
        assert_eq!(ExamField::Room.compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_blank_fields() {
        let mut payload = NewExam {
            subject: "Algebra".to_string(),
            degree: " ".to_string(),
            year: "1".to_string(),
            semester: "".to_string(),
            date: exam(1, None).date,
            room: None,
            school: "ETSINF".to_string(),
        };
        assert_eq!(payload.blank_fields(), vec!["degree", "semester"]);

        payload.degree = "GII".to_string();
        payload.semester = "B".to_string();
        assert!(payload.blank_fields().is_empty());
    }

    #[test]
    fn test_summary_projection() {
        let summary = ExamSummary::from(exam(7, Some("0.1")));
        assert_eq!(summary.id, 7);
        assert_eq!(summary.room.as_deref(), Some("0.1"));
    }
}
