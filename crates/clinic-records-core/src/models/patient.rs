//! Patient models.

use serde::{Deserialize, Serialize};

use super::intake::IntakeRecord;
use crate::case_number;

/// Date format used throughout the clinic (e.g. `19-10-2026`).
pub const CLINIC_DATE_FORMAT: &str = "%d-%m-%Y";

/// Today's date in the clinic's date format.
pub fn today() -> String {
    chrono::Local::now().format(CLINIC_DATE_FORMAT).to_string()
}

/// A patient's intake record.
///
/// `case_no` always holds the canonical (zero-padded) form once the record has
/// passed through [`crate::form::IntakeForm::collect`] or
/// [`Patient::from_intake_record`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Row id, `None` until the record is first saved
    pub id: Option<i64>,
    /// Intake date
    pub date: String,
    /// Canonical case number
    pub case_no: String,
    pub name: String,
    pub age: String,
    pub address: String,
    pub gender: String,
    /// Chief complaints (C/O)
    pub co: String,
    pub onset_duration: String,
    pub habit: String,
    pub diet: String,
    pub appetite: String,
    pub bowel: String,
    pub family_history: String,
    pub past_history: String,
    pub mind: String,
    pub sleep: String,
    pub desire: String,
    pub aversion: String,
    /// Weight
    pub wt: String,
    /// Blood pressure
    pub bp: String,
    pub pulse: String,
    pub temp: String,
    pub systemic_exam: String,
    /// Modalities noted during physical examination
    pub modalities_pe: String,
    pub diagnosis: String,
    /// Initial treatment
    pub treatment: String,
}

impl Patient {
    /// Create a new unsaved patient with the required fields.
    ///
    /// The case number is encoded to its canonical form.
    pub fn new(name: String, case_no: &str) -> Self {
        Self {
            date: today(),
            case_no: case_number::encode(case_no),
            name,
            ..Default::default()
        }
    }

    /// Case number as it should be shown to a user.
    pub fn display_case_no(&self) -> String {
        case_number::decode(&self.case_no)
    }

    /// Read an intake field by its column name.
    pub fn field(&self, key: &str) -> Option<&str> {
        let value = match key {
            "date" => &self.date,
            "case_no" => &self.case_no,
            "name" => &self.name,
            "age" => &self.age,
            "address" => &self.address,
            "gender" => &self.gender,
            "co" => &self.co,
            "onset_duration" => &self.onset_duration,
            "habit" => &self.habit,
            "diet" => &self.diet,
            "appetite" => &self.appetite,
            "bowel" => &self.bowel,
            "family_history" => &self.family_history,
            "past_history" => &self.past_history,
            "mind" => &self.mind,
            "sleep" => &self.sleep,
            "desire" => &self.desire,
            "aversion" => &self.aversion,
            "wt" => &self.wt,
            "bp" => &self.bp,
            "pulse" => &self.pulse,
            "temp" => &self.temp,
            "systemic_exam" => &self.systemic_exam,
            "modalities_pe" => &self.modalities_pe,
            "diagnosis" => &self.diagnosis,
            "treatment" => &self.treatment,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Write an intake field by its column name. Returns `false` for unknown keys.
    pub fn set_field(&mut self, key: &str, value: String) -> bool {
        let slot = match key {
            "date" => &mut self.date,
            "case_no" => &mut self.case_no,
            "name" => &mut self.name,
            "age" => &mut self.age,
            "address" => &mut self.address,
            "gender" => &mut self.gender,
            "co" => &mut self.co,
            "onset_duration" => &mut self.onset_duration,
            "habit" => &mut self.habit,
            "diet" => &mut self.diet,
            "appetite" => &mut self.appetite,
            "bowel" => &mut self.bowel,
            "family_history" => &mut self.family_history,
            "past_history" => &mut self.past_history,
            "mind" => &mut self.mind,
            "sleep" => &mut self.sleep,
            "desire" => &mut self.desire,
            "aversion" => &mut self.aversion,
            "wt" => &mut self.wt,
            "bp" => &mut self.bp,
            "pulse" => &mut self.pulse,
            "temp" => &mut self.temp,
            "systemic_exam" => &mut self.systemic_exam,
            "modalities_pe" => &mut self.modalities_pe,
            "diagnosis" => &mut self.diagnosis,
            "treatment" => &mut self.treatment,
            _ => return false,
        };
        *slot = value;
        true
    }

    /// Flatten into a field-key → text mapping (stored case number form).
    pub fn to_intake_record(&self) -> IntakeRecord {
        let mut record = IntakeRecord::new();
        for key in super::intake::INTAKE_FIELDS {
            if let Some(value) = self.field(key) {
                record.insert(key, value);
            }
        }
        record
    }

    /// Build an unsaved patient from a mapping. Unknown keys are ignored and
    /// the case number is encoded.
    pub fn from_intake_record(record: &IntakeRecord) -> Self {
        let mut patient = Patient::default();
        for (key, value) in record.iter() {
            patient.set_field(key, value.trim().to_string());
        }
        patient.case_no = case_number::encode(&patient.case_no);
        patient
    }
}

/// One row of a search or browse listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientSummary {
    pub id: i64,
    /// Case number; stored form when read from the database
    pub case_no: String,
    pub name: String,
    pub date: String,
    pub age: String,
    pub gender: String,
}

impl PatientSummary {
    /// Same row with the case number decoded for display.
    pub fn for_display(mut self) -> Self {
        self.case_no = case_number::decode(&self.case_no);
        self
    }
}
