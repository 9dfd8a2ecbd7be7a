//! Shared data model for the certificate editor
//!
//! The intake collaborator produces a validated [`FieldRecord`]; the editor
//! borrows it read-only for the duration of one session.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The record handed over by the intake form when the user starts a
/// certificate. Field order is load-bearing: the scannable code payload is
/// the serialized form of this struct, so the keys must serialize in this
/// exact order to keep the payload stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    /// Correlation id assigned by the intake form; not consumed by the editor.
    pub id: String,
    pub candidate_name: String,
    pub course_name: String,
    pub course_id: String,
    /// ISO date string, `YYYY-MM-DD`.
    pub start_date: String,
    /// ISO date string, `YYYY-MM-DD`.
    pub end_date: String,
    pub description: String,
}

impl FieldRecord {
    /// Display string for the Tenure overlay.
    pub fn tenure_text(&self) -> String {
        format!("{} to {}", self.start_date, self.end_date)
    }

    /// Entry contract of the editor: required fields present and the date
    /// range ordered. The editor itself never re-validates; this is what the
    /// intake form checks before handing the record over.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.candidate_name.trim().is_empty() {
            return Err(RecordError::MissingField("candidateName"));
        }
        if self.course_name.trim().is_empty() {
            return Err(RecordError::MissingField("courseName"));
        }
        if self.description.trim().is_empty() {
            return Err(RecordError::MissingField("description"));
        }

        let start = parse_date("startDate", &self.start_date)?;
        let end = parse_date("endDate", &self.end_date)?;
        if start > end {
            return Err(RecordError::DateOrder {
                start: self.start_date.clone(),
                end: self.end_date.clone(),
            });
        }

        Ok(())
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, RecordError> {
    if value.is_empty() {
        return Err(RecordError::MissingField(field));
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| RecordError::BadDate {
        field,
        value: value.to_string(),
    })
}

/// Why a record failed the intake contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} is not a valid date: {value:?}")]
    BadDate { field: &'static str, value: String },

    #[error("start date {start} cannot be after end date {end}")]
    DateOrder { start: String, end: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record() -> FieldRecord {
        FieldRecord {
            id: "a3f0".to_string(),
            candidate_name: "Ada Lovelace".to_string(),
            course_name: "Analytical Engines 101".to_string(),
            course_id: "AE-101".to_string(),
            start_date: "2024-01-08".to_string(),
            end_date: "2024-03-29".to_string(),
            description: "Completed with distinction".to_string(),
        }
    }

    #[test]
    fn serializes_with_original_key_order() {
        let json = serde_json::to_string(&record()).unwrap();
        let expected = concat!(
            "{\"id\":\"a3f0\",",
            "\"candidateName\":\"Ada Lovelace\",",
            "\"courseName\":\"Analytical Engines 101\",",
            "\"courseId\":\"AE-101\",",
            "\"startDate\":\"2024-01-08\",",
            "\"endDate\":\"2024-03-29\",",
            "\"description\":\"Completed with distinction\"}",
        );
        assert_eq!(json, expected);
    }

    #[test]
    fn round_trips_through_json() {
        let original = record();
        let json = serde_json::to_string(&original).unwrap();
        let back: FieldRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn tenure_text_joins_dates() {
        assert_eq!(record().tenure_text(), "2024-01-08 to 2024-03-29");
    }

    #[test]
    fn valid_record_passes() {
        assert_eq!(record().validate(), Ok(()));
    }

    #[test]
    fn blank_candidate_name_rejected() {
        let mut r = record();
        r.candidate_name = "   ".to_string();
        assert_eq!(r.validate(), Err(RecordError::MissingField("candidateName")));
    }

    #[test]
    fn missing_dates_rejected() {
        let mut r = record();
        r.start_date = String::new();
        assert_eq!(r.validate(), Err(RecordError::MissingField("startDate")));
    }

    #[test]
    fn garbage_date_rejected() {
        let mut r = record();
        r.end_date = "next tuesday".to_string();
        assert!(matches!(
            r.validate(),
            Err(RecordError::BadDate { field: "endDate", .. })
        ));
    }

    #[test]
    fn reversed_range_rejected() {
        let mut r = record();
        r.start_date = "2024-05-01".to_string();
        r.end_date = "2024-04-01".to_string();
        assert!(matches!(r.validate(), Err(RecordError::DateOrder { .. })));
    }

    #[test]
    fn equal_dates_allowed() {
        let mut r = record();
        r.end_date = r.start_date.clone();
        assert_eq!(r.validate(), Ok(()));
    }
}
