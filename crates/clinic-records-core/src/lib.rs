//! Clinic Records Core Library
//!
//! Local patient records for a single practitioner: intake forms, follow-up
//! visits and printable case reports, stored in SQLite.
//!
//! # Architecture
//!
//! ```text
//!   IntakeForm / FollowUpForm
//!             │ validate + collect
//!             ▼
//!   case_number::encode ("42" → "00042")
//!             │
//!             ▼
//!   ┌─────────────────────┐      rolling copies      ┌──────────────┐
//!   │  Database (SQLite)  │ ───────────────────────► │  db_backups/ │
//!   └─────────┬───────────┘                          └──────────────┘
//!             │ case_number::decode ("00042" → "42")
//!             ├──────────────────────┐
//!             ▼                      ▼
//!     search / browse          ReportComposer
//!     (Pagination)      compose → layout → render_pdf
//!                                    │
//!                                    ▼
//!                          <name>_<case>_Full_Record.pdf
//! ```
//!
//! Case numbers are stored zero-padded so text ordering in SQL matches
//! numeric ordering; everything shown to a user is decoded first.
//!
//! # Modules
//!
//! - [`case_number`]: canonical zero-padded case numbers
//! - [`db`]: SQLite storage, legacy migration and backups
//! - [`form`]: intake and follow-up forms with validation
//! - [`models`]: domain types (Patient, Visit, IntakeRecord)
//! - [`pagination`]: page arithmetic for the record listing
//! - [`report`]: report composition, layout and PDF output
//! - [`config`]: runtime configuration

pub mod case_number;
pub mod config;
pub mod db;
pub mod form;
pub mod models;
pub mod pagination;
pub mod report;

use std::path::{Path, PathBuf};

pub use config::{ClinicConfig, ConfigError};
pub use db::{Database, DbError};
pub use form::{FollowUpForm, FormError, FormField, IntakeForm};
pub use models::{
    IntakeRecord, NewVisit, Patient, PatientSummary, Visit, VisitDetail, VisitOrder,
};
pub use pagination::{Page, Pagination};
pub use report::{ClinicHeader, ReportComposer, ReportError, ReportSummary, VisitEntry};

// =========================================================================
// Error Type
// =========================================================================

#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error(transparent)]
    Database(#[from] DbError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type ClinicResult<T> = Result<T, ClinicError>;

// =========================================================================
// Service Facade
// =========================================================================

/// A patient's full record: the stored row, its intake mapping with the
/// case number decoded, and visits oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    pub patient: Patient,
    pub intake: IntakeRecord,
    pub visits: Vec<Visit>,
}

/// Entry point for every user action.
pub struct ClinicRecords {
    db: Database,
    config: ClinicConfig,
    composer: ReportComposer,
}

impl ClinicRecords {
    /// Open the database named in `config` and take a startup backup.
    pub fn open(config: ClinicConfig) -> ClinicResult<Self> {
        config.validate()?;
        let db = Database::open(&config.database_path)?;
        tracing::info!(path = %config.database_path.display(), "Database opened");
        let records = Self::with_database(db, config);
        records.auto_backup();
        Ok(records)
    }

    /// In-memory store; never backed up automatically.
    pub fn open_in_memory(config: ClinicConfig) -> ClinicResult<Self> {
        config.validate()?;
        Ok(Self::with_database(Database::open_in_memory()?, config))
    }

    pub fn with_database(db: Database, config: ClinicConfig) -> Self {
        let composer = ReportComposer::new(config.header.clone());
        Self {
            db,
            config,
            composer,
        }
    }

    pub fn config(&self) -> &ClinicConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    // =====================================================================
    // Writes
    // =====================================================================

    /// Save a new intake. Returns the new patient id.
    pub fn save_intake(&self, form: &IntakeForm) -> ClinicResult<i64> {
        let patient = form.collect()?;
        let id = self.db.insert_patient(&patient)?;
        tracing::info!(id, case_no = %patient.case_no, "Patient saved");
        self.auto_backup();
        Ok(id)
    }

    /// Overwrite the intake of an existing patient.
    pub fn update_intake(&self, id: i64, form: &IntakeForm) -> ClinicResult<()> {
        let patient = form.collect()?;
        if !self.db.update_patient(id, &patient)? {
            return Err(ClinicError::NotFound(format!("patient {id}")));
        }
        tracing::info!(id, "Patient updated");
        self.auto_backup();
        Ok(())
    }

    /// Record a follow-up visit. `patient_id` is `None` when no patient has
    /// been saved or loaded yet.
    pub fn save_followup(&self, patient_id: Option<i64>, form: &FollowUpForm) -> ClinicResult<i64> {
        let visit = form.collect(patient_id)?;
        let visit_id = match self.db.insert_visit(&visit) {
            Ok(id) => id,
            Err(DbError::NotFound(what)) => return Err(ClinicError::NotFound(what)),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(patient_id = visit.patient_id, visit_id, "Follow-up saved");
        self.auto_backup();
        Ok(visit_id)
    }

    /// Delete a patient and all of their visits.
    pub fn delete_patient(&self, id: i64) -> ClinicResult<()> {
        if !self.db.delete_patient(id)? {
            return Err(ClinicError::NotFound(format!("patient {id}")));
        }
        tracing::info!(id, "Patient deleted");
        self.auto_backup();
        Ok(())
    }

    // =====================================================================
    // Reads
    // =====================================================================

    /// Substring search on case number or name, ordered by case number.
    pub fn search(&self, query: &str) -> ClinicResult<Vec<PatientSummary>> {
        let rows = self.db.search_patients(query.trim())?;
        Ok(rows.into_iter().map(PatientSummary::for_display).collect())
    }

    /// One page of all patients. Out-of-range pages are clamped.
    pub fn browse(&self, page: u64) -> ClinicResult<Page<PatientSummary>> {
        let total = self.db.count_patients()?;
        let pagination = Pagination::new(total, self.config.records_per_page, page);
        let items = self
            .db
            .list_patients_page(pagination.per_page, pagination.offset())?
            .into_iter()
            .map(PatientSummary::for_display)
            .collect();
        Ok(Page { items, pagination })
    }

    fn require_patient(&self, id: i64) -> ClinicResult<Patient> {
        self.db
            .get_patient(id)?
            .ok_or_else(|| ClinicError::NotFound(format!("patient {id}")))
    }

    pub fn patient_record(&self, id: i64) -> ClinicResult<PatientRecord> {
        let patient = self.require_patient(id)?;
        let mut intake = patient.to_intake_record();
        intake.insert("case_no", patient.display_case_no());
        let visits = self.db.list_visits(id, VisitOrder::Ascending)?;
        Ok(PatientRecord {
            patient,
            intake,
            visits,
        })
    }

    /// Intake form pre-filled for editing an existing patient.
    pub fn intake_form(&self, id: i64) -> ClinicResult<IntakeForm> {
        Ok(IntakeForm::from_patient(&self.require_patient(id)?))
    }

    /// Visits of a patient, newest first.
    pub fn visit_history(&self, id: i64) -> ClinicResult<Vec<Visit>> {
        self.require_patient(id)?;
        Ok(self.db.list_visits(id, VisitOrder::Descending)?)
    }

    /// A single visit with its patient's name and decoded case number.
    pub fn visit_detail(&self, visit_id: i64) -> ClinicResult<VisitDetail> {
        let mut detail = self
            .db
            .get_visit(visit_id)?
            .ok_or_else(|| ClinicError::NotFound(format!("visit {visit_id}")))?;
        detail.case_no = case_number::decode(&detail.case_no);
        Ok(detail)
    }

    // =====================================================================
    // Reports and backups
    // =====================================================================

    /// Default report location for a patient.
    pub fn default_report_path(&self, patient: &Patient) -> PathBuf {
        self.config
            .export_dir
            .join(report::default_report_filename(&patient.name, &patient.display_case_no()))
    }

    /// Render a patient's report to `destination`, or to the default
    /// location in the export directory.
    pub fn export_report(&self, id: i64, destination: Option<&Path>) -> ClinicResult<ReportSummary> {
        let record = self.patient_record(id)?;
        let destination = match destination {
            Some(path) => path.to_path_buf(),
            None => self.default_report_path(&record.patient),
        };
        let visits: Vec<VisitEntry> = record.visits.iter().map(VisitEntry::from).collect();
        Ok(self
            .composer
            .export(Some(&record.intake), &visits, &destination)?)
    }

    /// Take a backup now.
    pub fn backup(&self) -> ClinicResult<PathBuf> {
        Ok(self
            .db
            .backup_to(&self.config.backup_dir, self.config.backups_to_keep)?)
    }

    /// Backup after a write. Failures are logged, never returned.
    fn auto_backup(&self) {
        if !self.config.auto_backup || self.db.path().is_none() {
            return;
        }
        if let Err(e) = self.backup() {
            tracing::warn!(error = %e, "Automatic backup failed");
        }
    }
}
