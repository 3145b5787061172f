//! Follow-up visit models.

use serde::{Deserialize, Serialize};

use super::patient::CLINIC_DATE_FORMAT;

/// A stored follow-up visit. Visits are never edited after insertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Visit {
    pub visit_id: i64,
    /// Owning patient's row id
    pub patient_id: i64,
    pub visit_date: String,
    /// Complaints or changes since the last visit
    pub complaints: String,
    pub new_modalities: String,
    /// Remedy and dose
    pub treatment: String,
}

/// A follow-up visit that has not been saved yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewVisit {
    pub patient_id: i64,
    pub visit_date: String,
    pub complaints: String,
    pub new_modalities: String,
    pub treatment: String,
}

/// A visit joined with its patient's name and case number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisitDetail {
    pub visit: Visit,
    pub patient_name: String,
    pub case_no: String,
}

/// Sort order for a patient's visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOrder {
    /// Oldest first (reports)
    Ascending,
    /// Newest first (history listing)
    Descending,
}

impl Visit {
    /// Visit date parsed as a calendar date, if it is in a recognised format.
    pub fn parsed_date(&self) -> Option<chrono::NaiveDate> {
        parse_visit_date(&self.visit_date)
    }
}

/// Parse a visit date in the clinic format, falling back to ISO dates.
pub fn parse_visit_date(text: &str) -> Option<chrono::NaiveDate> {
    let text = text.trim();
    chrono::NaiveDate::parse_from_str(text, CLINIC_DATE_FORMAT)
        .or_else(|_| chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .ok()
}

/// Sort visits chronologically. Insertion order breaks ties and visits with
/// unparseable dates go last.
pub fn sort_visits(visits: &mut [Visit], order: VisitOrder) {
    visits.sort_by_key(|v| (v.parsed_date().is_none(), v.parsed_date(), v.visit_id));
    if order == VisitOrder::Descending {
        visits.reverse();
    }
}
