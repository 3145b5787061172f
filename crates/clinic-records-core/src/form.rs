//! Data-entry forms.
//!
//! The intake and follow-up screens are modelled as ordered lists of
//! [`FormField`]s. Every field kind exposes the same `read`/`write` pair, so
//! collecting a form never needs to know what kind of input produced a value.

use thiserror::Error;

use crate::case_number;
use crate::models::{today, NewVisit, Patient, INTAKE_FIELDS};

/// Options offered by the gender selector.
pub const GENDER_OPTIONS: [&str; 2] = ["M", "F"];

/// Validation and collection errors. The messages are shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Name and Case No are required fields for a new record!")]
    MissingIntakeFields,

    #[error("Visit Date and Treatment are required for a follow-up record.")]
    MissingFollowUpFields,

    #[error("Please save the patient's initial intake first.")]
    NoPatientSelected,

    #[error("Unknown form field: {0}")]
    UnknownField(String),
}

pub type FormResult<T> = Result<T, FormError>;

/// A single input on a form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    /// One-line entry
    SingleLine(String),
    /// Free text that may span several lines
    MultiLine(String),
    /// Selection from a fixed list; free text is still accepted
    Choice {
        options: Vec<String>,
        selected: String,
    },
}

impl FormField {
    pub fn single_line() -> Self {
        FormField::SingleLine(String::new())
    }

    pub fn multi_line() -> Self {
        FormField::MultiLine(String::new())
    }

    pub fn choice(options: &[&str]) -> Self {
        FormField::Choice {
            options: options.iter().map(|o| o.to_string()).collect(),
            selected: String::new(),
        }
    }

    /// Current value, trimmed.
    pub fn read(&self) -> String {
        match self {
            FormField::SingleLine(value) | FormField::MultiLine(value) => value.trim().to_string(),
            FormField::Choice { selected, .. } => selected.trim().to_string(),
        }
    }

    /// Replace the current value.
    pub fn write(&mut self, text: &str) {
        match self {
            FormField::SingleLine(value) => {
                // Single-line inputs cannot hold a line break.
                *value = text.replace(['\r', '\n'], " ");
            }
            FormField::MultiLine(value) => *value = text.to_string(),
            FormField::Choice { selected, .. } => *selected = text.to_string(),
        }
    }

    pub fn clear(&mut self) {
        self.write("");
    }

    /// Options for a choice field, empty otherwise.
    pub fn options(&self) -> &[String] {
        match self {
            FormField::Choice { options, .. } => options,
            _ => &[],
        }
    }
}

/// Field kind used for each intake key.
fn intake_field(key: &str) -> FormField {
    match key {
        "gender" => FormField::choice(&GENDER_OPTIONS),
        "date" | "case_no" | "name" | "age" | "address" | "wt" | "bp" | "pulse" | "temp" => {
            FormField::single_line()
        }
        _ => FormField::multi_line(),
    }
}

/// Ordered fields shared by both forms.
#[derive(Debug, Clone, PartialEq)]
struct Fields {
    entries: Vec<(&'static str, FormField)>,
}

impl Fields {
    fn get(&self, key: &str) -> Option<&FormField> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, f)| f)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut FormField> {
        self.entries
            .iter_mut()
            .find(|(k, _)| *k == key)
            .map(|(_, f)| f)
    }

    fn set(&mut self, key: &str, value: &str) -> FormResult<()> {
        let field = self
            .get_mut(key)
            .ok_or_else(|| FormError::UnknownField(key.to_string()))?;
        field.write(value);
        Ok(())
    }

    fn read(&self, key: &str) -> String {
        self.get(key).map(FormField::read).unwrap_or_default()
    }
}

/// The intake form: identity, history, generalities and examination.
#[derive(Debug, Clone, PartialEq)]
pub struct IntakeForm {
    fields: Fields,
}

impl Default for IntakeForm {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeForm {
    /// Empty form with today's date filled in.
    pub fn new() -> Self {
        let entries = INTAKE_FIELDS
            .iter()
            .map(|key| (*key, intake_field(key)))
            .collect();
        let mut form = Self {
            fields: Fields { entries },
        };
        form.reset();
        form
    }

    /// Form loaded from a saved patient; the case number is shown unpadded.
    ///
    /// Surplus leading zeros are dropped too: a stored "0000012" shows as
    /// "12", so saving the form back stores the canonical "00012".
    pub fn from_patient(patient: &Patient) -> Self {
        let mut form = Self::new();
        for (key, field) in form.fields.entries.iter_mut() {
            if let Some(value) = patient.field(*key) {
                field.write(value);
            }
        }
        if let Some(case_no) = form.fields.get_mut("case_no") {
            case_no.write(&case_number::decode(&patient.case_no));
        }
        form
    }

    /// Clear every field and restore today's date.
    pub fn reset(&mut self) {
        for (_, field) in self.fields.entries.iter_mut() {
            field.clear();
        }
        if let Some(date) = self.fields.get_mut("date") {
            date.write(&today());
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> FormResult<()> {
        self.fields.set(key, value)
    }

    pub fn read(&self, key: &str) -> String {
        self.fields.read(key)
    }

    pub fn field(&self, key: &str) -> Option<&FormField> {
        self.fields.get(key)
    }

    /// Name and case number must both be present.
    pub fn validate(&self) -> FormResult<()> {
        if self.read("name").is_empty() || self.read("case_no").is_empty() {
            return Err(FormError::MissingIntakeFields);
        }
        Ok(())
    }

    /// Validate and gather the form into an unsaved patient with the case
    /// number in canonical form.
    pub fn collect(&self) -> FormResult<Patient> {
        self.validate()?;
        let mut patient = Patient::default();
        for (key, field) in &self.fields.entries {
            let mut value = field.read();
            if *key == "case_no" {
                value = case_number::encode(&value);
            }
            patient.set_field(key, value);
        }
        Ok(patient)
    }
}

/// Follow-up keys in entry order.
pub const FOLLOW_UP_FIELDS: [&str; 4] = ["visit_date", "complaints", "new_modalities", "treatment"];

/// The follow-up visit form.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowUpForm {
    fields: Fields,
}

impl Default for FollowUpForm {
    fn default() -> Self {
        Self::new()
    }
}

impl FollowUpForm {
    /// Empty form with today's date filled in.
    pub fn new() -> Self {
        let entries = FOLLOW_UP_FIELDS
            .iter()
            .map(|key| {
                let field = if *key == "visit_date" {
                    FormField::single_line()
                } else {
                    FormField::multi_line()
                };
                (*key, field)
            })
            .collect();
        let mut form = Self {
            fields: Fields { entries },
        };
        form.reset();
        form
    }

    /// Clear the notes and restore today's date.
    pub fn reset(&mut self) {
        for (_, field) in self.fields.entries.iter_mut() {
            field.clear();
        }
        if let Some(date) = self.fields.get_mut("visit_date") {
            date.write(&today());
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> FormResult<()> {
        self.fields.set(key, value)
    }

    pub fn read(&self, key: &str) -> String {
        self.fields.read(key)
    }

    /// Visit date and treatment must both be present.
    pub fn validate(&self) -> FormResult<()> {
        if self.read("visit_date").is_empty() || self.read("treatment").is_empty() {
            return Err(FormError::MissingFollowUpFields);
        }
        Ok(())
    }

    /// Validate and gather the form into a visit for the given patient.
    pub fn collect(&self, patient_id: Option<i64>) -> FormResult<NewVisit> {
        let patient_id = patient_id.ok_or(FormError::NoPatientSelected)?;
        self.validate()?;
        Ok(NewVisit {
            patient_id,
            visit_date: self.read("visit_date"),
            complaints: self.read("complaints"),
            new_modalities: self.read("new_modalities"),
            treatment: self.read("treatment"),
        })
    }
}
