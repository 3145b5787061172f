//! Flat intake record exchanged with the report composer and the shell.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Intake field keys in storage order.
pub const INTAKE_FIELDS: [&str; 26] = [
    "date",
    "case_no",
    "name",
    "age",
    "address",
    "gender",
    "co",
    "onset_duration",
    "habit",
    "diet",
    "appetite",
    "bowel",
    "family_history",
    "past_history",
    "mind",
    "sleep",
    "desire",
    "aversion",
    "wt",
    "bp",
    "pulse",
    "temp",
    "systemic_exam",
    "modalities_pe",
    "diagnosis",
    "treatment",
];

/// Check whether `key` names an intake field.
pub fn is_intake_field(key: &str) -> bool {
    INTAKE_FIELDS.contains(&key)
}

/// Mapping from intake field key to text. Absent keys read as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct IntakeRecord {
    fields: BTreeMap<String, String>,
}

impl IntakeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Value for `key`, or `""` when absent.
    pub fn text(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a JSON object of string values.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IntakeRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = IntakeRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}
