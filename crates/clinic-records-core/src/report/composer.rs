//! Report composition: turns an intake record and its visits into an ordered
//! list of blocks. No geometry is decided here.

use serde::{Deserialize, Serialize};

use crate::case_number;
use crate::models::{IntakeRecord, Visit};

/// Rendered in place of missing or blank values.
pub const PLACEHOLDER: &str = "N/A";

/// Title of the follow-up section.
pub const VISIT_HISTORY_TITLE: &str = "VISIT HISTORY / FOLLOW-UPS";

/// A labelled value.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: String,
    pub value: String,
}

impl Field {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// One structural element of a report body.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Centred title line
    Title(String),
    SectionHeading(String),
    /// Free text, line breaks preserved
    Text(String),
    /// Rows of one or two label/value pairs
    FieldGrid(Vec<Vec<Field>>),
    /// Narrow label column beside a wide value column
    FieldTable(Vec<Field>),
    VisitHeading(String),
    /// Vertical gap in points
    Spacer(f32),
    PageBreak,
}

/// A composed report body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document title stored in the PDF metadata
    pub title: String,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn page_breaks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| matches!(block, Block::PageBreak))
            .count()
    }

    /// Text of the block following the section heading `heading`.
    pub fn section_text(&self, heading: &str) -> Option<&str> {
        let index = self
            .blocks
            .iter()
            .position(|block| matches!(block, Block::SectionHeading(h) if h == heading))?;
        match self.blocks.get(index + 1) {
            Some(Block::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Value of the first field labelled `label`, in grids or tables.
    pub fn field_value(&self, label: &str) -> Option<&str> {
        self.blocks.iter().find_map(|block| {
            let fields: Vec<&Field> = match block {
                Block::FieldGrid(rows) => rows.iter().flatten().collect(),
                Block::FieldTable(fields) => fields.iter().collect(),
                _ => return None,
            };
            fields
                .into_iter()
                .find(|field| field.label == label)
                .map(|field| field.value.as_str())
        })
    }

    pub fn visit_headings(&self) -> Vec<&str> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::VisitHeading(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// The four texts of one follow-up visit, as shown in a report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisitEntry {
    pub visit_date: String,
    pub complaints: String,
    pub new_modalities: String,
    pub treatment: String,
}

impl From<&Visit> for VisitEntry {
    fn from(visit: &Visit) -> Self {
        Self {
            visit_date: visit.visit_date.clone(),
            complaints: visit.complaints.clone(),
            new_modalities: visit.new_modalities.clone(),
            treatment: visit.treatment.clone(),
        }
    }
}

impl<A, B, C, D> From<(A, B, C, D)> for VisitEntry
where
    A: Into<String>,
    B: Into<String>,
    C: Into<String>,
    D: Into<String>,
{
    fn from((visit_date, complaints, new_modalities, treatment): (A, B, C, D)) -> Self {
        Self {
            visit_date: visit_date.into(),
            complaints: complaints.into(),
            new_modalities: new_modalities.into(),
            treatment: treatment.into(),
        }
    }
}

/// `value` trimmed, or [`PLACEHOLDER`] when missing or blank.
pub fn display_value(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

struct Composer<'a> {
    record: &'a IntakeRecord,
    blocks: Vec<Block>,
}

impl<'a> Composer<'a> {
    fn value(&self, key: &str) -> String {
        display_value(self.record.get(key))
    }

    fn field(&self, label: &str, key: &str) -> Field {
        Field::new(label, self.value(key))
    }

    fn heading(&mut self, text: &str) {
        self.blocks.push(Block::SectionHeading(text.to_string()));
    }

    fn text_section(&mut self, heading: &str, key: &str) {
        self.heading(heading);
        let text = self.value(key);
        self.blocks.push(Block::Text(text));
    }

    fn grid_section(&mut self, heading: &str, rows: &[&[(&str, &str)]]) {
        self.heading(heading);
        let rows: Vec<Vec<Field>> = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|(label, key)| self.field(label, key))
                    .collect::<Vec<_>>()
            })
            .collect();
        self.blocks.push(Block::FieldGrid(rows));
        self.blocks.push(Block::Spacer(5.0));
    }
}

/// Compose the full report body for `record` and its visits, oldest first.
pub fn compose(record: &IntakeRecord, visits: &[VisitEntry]) -> Document {
    let name = display_value(record.get("name"));
    let case_no = display_value(Some(&case_number::decode(record.text("case_no").trim())));

    let mut c = Composer {
        record,
        blocks: Vec::new(),
    };

    c.blocks.push(Block::Spacer(15.0));
    c.blocks.push(Block::Title(format!(
        "PATIENT INTAKE RECORD: {name} (Case No: {case_no})"
    )));
    c.blocks.push(Block::Spacer(2.0));

    c.grid_section(
        "Preliminary Data",
        &[
            &[("Date", "date"), ("Age", "age")],
            &[("Name", "name"), ("Gender", "gender")],
            &[("Address", "address")],
        ],
    );

    c.text_section("Chief Complaints (C/O)", "co");
    c.text_section("Onset and Duration", "onset_duration");

    c.grid_section(
        "Personal History",
        &[
            &[("Habit", "habit"), ("Diet", "diet")],
            &[("Appetite", "appetite"), ("Bowel", "bowel")],
        ],
    );

    c.text_section("Family History", "family_history");
    c.text_section("Past History", "past_history");

    c.grid_section(
        "Homoeopathic Generalities",
        &[
            &[("Mind", "mind"), ("Sleep", "sleep")],
            &[("Desire", "desire"), ("Aversion", "aversion")],
        ],
    );

    c.grid_section(
        "Physical Examination & Initial Treatment",
        &[
            &[("Wt", "wt"), ("B.P.", "bp")],
            &[("Pulse", "pulse"), ("Temp", "temp")],
        ],
    );
    c.text_section("Systemic Examination", "systemic_exam");
    c.text_section("Modalities (P.E.)", "modalities_pe");
    c.text_section("Diagnosis", "diagnosis");
    c.text_section("Initial Treatment", "treatment");

    if !visits.is_empty() {
        c.blocks.push(Block::PageBreak);
        c.blocks.push(Block::Title(VISIT_HISTORY_TITLE.to_string()));
        c.blocks.push(Block::Spacer(25.0));

        for (i, visit) in visits.iter().enumerate() {
            c.blocks.push(Block::VisitHeading(format!(
                "Visit {}: {}",
                i + 1,
                display_value(Some(&visit.visit_date))
            )));
            c.blocks.push(Block::FieldTable(vec![
                Field::new("Complaints/Changes", display_value(Some(&visit.complaints))),
                Field::new("New Modalities", display_value(Some(&visit.new_modalities))),
                Field::new("Treatment (Remedy/Dose)", display_value(Some(&visit.treatment))),
            ]));
            c.blocks.push(Block::Spacer(8.0));
        }
    }

    Document {
        title: format!("{name} - Case {case_no}"),
        blocks: c.blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> IntakeRecord {
        IntakeRecord::from_iter([
            ("name", "Asha Patil"),
            ("case_no", "00042"),
            ("co", "Headache\nWorse in morning"),
            ("diagnosis", "   "),
            ("age", "34"),
        ])
    }

    #[test]
    fn test_title_shows_decoded_case_number() {
        let doc = compose(&record(), &[]);
        assert!(doc
            .blocks
            .contains(&Block::Title("PATIENT INTAKE RECORD: Asha Patil (Case No: 42)".into())));
    }

    #[test]
    fn test_blank_values_render_placeholder() {
        let doc = compose(&record(), &[]);
        assert_eq!(doc.section_text("Diagnosis"), Some(PLACEHOLDER));
        assert_eq!(doc.section_text("Past History"), Some(PLACEHOLDER));
        assert_eq!(doc.field_value("Gender"), Some(PLACEHOLDER));
        assert_eq!(doc.field_value("Age"), Some("34"));
    }

    #[test]
    fn test_multi_line_value_is_kept() {
        let doc = compose(&record(), &[]);
        assert_eq!(
            doc.section_text("Chief Complaints (C/O)"),
            Some("Headache\nWorse in morning")
        );
    }

    #[test]
    fn test_sections_in_order() {
        let doc = compose(&record(), &[]);
        let headings: Vec<&str> = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::SectionHeading(h) => Some(h.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            headings,
            vec![
                "Preliminary Data",
                "Chief Complaints (C/O)",
                "Onset and Duration",
                "Personal History",
                "Family History",
                "Past History",
                "Homoeopathic Generalities",
                "Physical Examination & Initial Treatment",
                "Systemic Examination",
                "Modalities (P.E.)",
                "Diagnosis",
                "Initial Treatment",
            ]
        );
    }

    #[test]
    fn test_no_visits_no_visit_section() {
        let doc = compose(&record(), &[]);
        assert_eq!(doc.page_breaks(), 0);
        assert!(doc.visit_headings().is_empty());
        assert!(!doc
            .blocks
            .contains(&Block::Title(VISIT_HISTORY_TITLE.to_string())));
    }

    #[test]
    fn test_visits_follow_one_page_break() {
        let visits = vec![
            VisitEntry::from(("05-01-2025", "Better", "", "Bell 200")),
            VisitEntry::from(("12-01-2025", "", "", "SL")),
        ];
        let doc = compose(&record(), &visits);

        assert_eq!(doc.page_breaks(), 1);
        assert_eq!(
            doc.visit_headings(),
            vec!["Visit 1: 05-01-2025", "Visit 2: 12-01-2025"]
        );
        let tables: Vec<&Vec<Field>> = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::FieldTable(f) => Some(f),
                _ => None,
            })
            .collect();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0][2].value, "Bell 200");
        assert_eq!(tables[1][0].value, PLACEHOLDER);
    }

    #[test]
    fn test_missing_case_number() {
        let record = IntakeRecord::from_iter([("name", "Asha")]);
        let doc = compose(&record, &[]);
        assert!(doc
            .blocks
            .contains(&Block::Title("PATIENT INTAKE RECORD: Asha (Case No: N/A)".into())));
    }
}
