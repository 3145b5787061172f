//! SQLite schema definition.

/// Complete database schema for the clinic.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patients (one intake record per person)
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL DEFAULT '',
    case_no TEXT NOT NULL DEFAULT '',            -- zero-padded canonical form
    name TEXT NOT NULL DEFAULT '',
    age TEXT NOT NULL DEFAULT '',
    address TEXT NOT NULL DEFAULT '',
    gender TEXT NOT NULL DEFAULT '',
    co TEXT NOT NULL DEFAULT '',
    onset_duration TEXT NOT NULL DEFAULT '',
    habit TEXT NOT NULL DEFAULT '',
    diet TEXT NOT NULL DEFAULT '',
    appetite TEXT NOT NULL DEFAULT '',
    bowel TEXT NOT NULL DEFAULT '',
    family_history TEXT NOT NULL DEFAULT '',
    past_history TEXT NOT NULL DEFAULT '',
    mind TEXT NOT NULL DEFAULT '',
    sleep TEXT NOT NULL DEFAULT '',
    desire TEXT NOT NULL DEFAULT '',
    aversion TEXT NOT NULL DEFAULT '',
    wt TEXT NOT NULL DEFAULT '',
    bp TEXT NOT NULL DEFAULT '',
    pulse TEXT NOT NULL DEFAULT '',
    temp TEXT NOT NULL DEFAULT '',
    systemic_exam TEXT NOT NULL DEFAULT '',
    modalities_pe TEXT NOT NULL DEFAULT '',
    diagnosis TEXT NOT NULL DEFAULT '',
    treatment TEXT NOT NULL DEFAULT ''
);

-- Sorting and searching use the padded text directly, no numeric casts.
CREATE INDEX IF NOT EXISTS idx_patients_case_no ON patients(case_no);
CREATE INDEX IF NOT EXISTS idx_patients_name ON patients(name);

-- ============================================================================
-- Follow-up visits (append-only, removed only with their patient)
-- ============================================================================

CREATE TABLE IF NOT EXISTS visits (
    visit_id INTEGER PRIMARY KEY AUTOINCREMENT,
    patient_id INTEGER NOT NULL REFERENCES patients(id) ON DELETE CASCADE,
    visit_date TEXT NOT NULL DEFAULT '',
    complaints TEXT NOT NULL DEFAULT '',
    new_modalities TEXT NOT NULL DEFAULT '',
    treatment TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_visits_patient ON visits(patient_id);
"#;

/// Column renamed in older databases: `final_diagnosis` became `treatment`.
pub const LEGACY_TREATMENT_COLUMN: &str = "final_diagnosis";
