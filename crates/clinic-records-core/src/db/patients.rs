//! Patient database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbResult};
use crate::models::{Patient, PatientSummary};

const PATIENT_COLUMNS: &str = "id, date, case_no, name, age, address, gender, co, onset_duration, \
     habit, diet, appetite, bowel, family_history, past_history, \
     mind, sleep, desire, aversion, wt, bp, pulse, temp, \
     systemic_exam, modalities_pe, diagnosis, treatment";

const SUMMARY_COLUMNS: &str = "id, case_no, name, date, age, gender";

/// Read a text column, treating NULL (older databases) as empty.
fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

fn patient_from_row(row: &Row<'_>) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: Some(row.get(0)?),
        date: text(row, 1)?,
        case_no: text(row, 2)?,
        name: text(row, 3)?,
        age: text(row, 4)?,
        address: text(row, 5)?,
        gender: text(row, 6)?,
        co: text(row, 7)?,
        onset_duration: text(row, 8)?,
        habit: text(row, 9)?,
        diet: text(row, 10)?,
        appetite: text(row, 11)?,
        bowel: text(row, 12)?,
        family_history: text(row, 13)?,
        past_history: text(row, 14)?,
        mind: text(row, 15)?,
        sleep: text(row, 16)?,
        desire: text(row, 17)?,
        aversion: text(row, 18)?,
        wt: text(row, 19)?,
        bp: text(row, 20)?,
        pulse: text(row, 21)?,
        temp: text(row, 22)?,
        systemic_exam: text(row, 23)?,
        modalities_pe: text(row, 24)?,
        diagnosis: text(row, 25)?,
        treatment: text(row, 26)?,
    })
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<PatientSummary> {
    Ok(PatientSummary {
        id: row.get(0)?,
        case_no: text(row, 1)?,
        name: text(row, 2)?,
        date: text(row, 3)?,
        age: text(row, 4)?,
        gender: text(row, 5)?,
    })
}

impl Database {
    /// Insert a new patient and return its row id.
    ///
    /// The case number is stored as given; callers pass the canonical form.
    pub fn insert_patient(&self, patient: &Patient) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO patients (
                date, case_no, name, age, address, gender, co, onset_duration,
                habit, diet, appetite, bowel, family_history, past_history,
                mind, sleep, desire, aversion,
                wt, bp, pulse, temp, systemic_exam, modalities_pe, diagnosis,
                treatment
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26
            )
            "#,
            params![
                patient.date,
                patient.case_no,
                patient.name,
                patient.age,
                patient.address,
                patient.gender,
                patient.co,
                patient.onset_duration,
                patient.habit,
                patient.diet,
                patient.appetite,
                patient.bowel,
                patient.family_history,
                patient.past_history,
                patient.mind,
                patient.sleep,
                patient.desire,
                patient.aversion,
                patient.wt,
                patient.bp,
                patient.pulse,
                patient.temp,
                patient.systemic_exam,
                patient.modalities_pe,
                patient.diagnosis,
                patient.treatment,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Update an existing patient in place. Returns `false` if no row matched.
    pub fn update_patient(&self, id: i64, patient: &Patient) -> DbResult<bool> {
        let rows_affected = self.conn.execute(
            r#"
            UPDATE patients SET
                date = ?2, case_no = ?3, name = ?4, age = ?5, address = ?6,
                gender = ?7, co = ?8, onset_duration = ?9, habit = ?10,
                diet = ?11, appetite = ?12, bowel = ?13, family_history = ?14,
                past_history = ?15, mind = ?16, sleep = ?17, desire = ?18,
                aversion = ?19, wt = ?20, bp = ?21, pulse = ?22, temp = ?23,
                systemic_exam = ?24, modalities_pe = ?25, diagnosis = ?26,
                treatment = ?27
            WHERE id = ?1
            "#,
            params![
                id,
                patient.date,
                patient.case_no,
                patient.name,
                patient.age,
                patient.address,
                patient.gender,
                patient.co,
                patient.onset_duration,
                patient.habit,
                patient.diet,
                patient.appetite,
                patient.bowel,
                patient.family_history,
                patient.past_history,
                patient.mind,
                patient.sleep,
                patient.desire,
                patient.aversion,
                patient.wt,
                patient.bp,
                patient.pulse,
                patient.temp,
                patient.systemic_exam,
                patient.modalities_pe,
                patient.diagnosis,
                patient.treatment,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a patient by row id.
    pub fn get_patient(&self, id: i64) -> DbResult<Option<Patient>> {
        self.conn
            .query_row(
                &format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = ?"),
                [id],
                patient_from_row,
            )
            .optional()
            .map_err(Into::into)
    }

    /// Search by case number or name (substring match), ordered by case number.
    ///
    /// Matching runs against the stored form, so "12" finds "00012".
    pub fn search_patients(&self, query: &str) -> DbResult<Vec<PatientSummary>> {
        let pattern = format!("%{}%", query.trim());
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM patients
            WHERE case_no LIKE ?1 OR name LIKE ?1
            ORDER BY case_no ASC, id ASC
            "#
        ))?;

        let rows = stmt.query_map([pattern], summary_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Total number of patients.
    pub fn count_patients(&self) -> DbResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(id) FROM patients", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// One page of patients ordered by case number.
    pub fn list_patients_page(&self, limit: u64, offset: u64) -> DbResult<Vec<PatientSummary>> {
        let mut stmt = self.conn.prepare(&format!(
            r#"
            SELECT {SUMMARY_COLUMNS}
            FROM patients
            ORDER BY case_no ASC, id ASC
            LIMIT ?1 OFFSET ?2
            "#
        ))?;

        let rows = stmt.query_map(params![limit as i64, offset as i64], summary_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Delete a patient together with all of its visits.
    pub fn delete_patient(&self, id: i64) -> DbResult<bool> {
        // Databases created before the cascade constraint still need the
        // explicit visit delete.
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM visits WHERE patient_id = ?", [id])?;
        let rows_affected = tx.execute("DELETE FROM patients WHERE id = ?", [id])?;
        tx.commit()?;
        Ok(rows_affected > 0)
    }
}
