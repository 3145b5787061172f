//! Follow-up visit operations.
//!
//! Visits are append-only: there is no update path, and rows disappear only
//! when their patient is deleted.

use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{sort_visits, NewVisit, Visit, VisitDetail, VisitOrder};

fn visit_from_row(row: &Row<'_>) -> rusqlite::Result<Visit> {
    Ok(Visit {
        visit_id: row.get(0)?,
        patient_id: row.get(1)?,
        visit_date: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        complaints: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        new_modalities: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        treatment: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
    })
}

impl Database {
    /// Record a follow-up visit and return its id.
    pub fn insert_visit(&self, visit: &NewVisit) -> DbResult<i64> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM patients WHERE id = ?)",
            [visit.patient_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DbError::NotFound(format!("patient {}", visit.patient_id)));
        }

        self.conn.execute(
            r#"
            INSERT INTO visits (patient_id, visit_date, complaints, new_modalities, treatment)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                visit.patient_id,
                visit.visit_date,
                visit.complaints,
                visit.new_modalities,
                visit.treatment,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All visits of a patient in chronological order.
    pub fn list_visits(&self, patient_id: i64, order: VisitOrder) -> DbResult<Vec<Visit>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT visit_id, patient_id, visit_date, complaints, new_modalities, treatment
            FROM visits
            WHERE patient_id = ?
            ORDER BY visit_id ASC
            "#,
        )?;

        let rows = stmt.query_map([patient_id], visit_from_row)?;
        let mut visits = rows.collect::<Result<Vec<_>, _>>()?;
        // Dates are DD-MM-YYYY text, which does not sort chronologically in SQL.
        sort_visits(&mut visits, order);
        Ok(visits)
    }

    /// A single visit with its patient's name and stored case number.
    pub fn get_visit(&self, visit_id: i64) -> DbResult<Option<VisitDetail>> {
        self.conn
            .query_row(
                r#"
                SELECT v.visit_id, v.patient_id, v.visit_date, v.complaints,
                       v.new_modalities, v.treatment, p.name, p.case_no
                FROM visits v
                JOIN patients p ON v.patient_id = p.id
                WHERE v.visit_id = ?
                "#,
                [visit_id],
                |row| {
                    Ok(VisitDetail {
                        visit: visit_from_row(row)?,
                        patient_name: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
                        case_no: row.get::<_, Option<String>>(7)?.unwrap_or_default(),
                    })
                },
            )
            .optional()
            .map_err(Into::into)
    }

    /// Number of visits recorded for a patient.
    pub fn count_visits(&self, patient_id: i64) -> DbResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(visit_id) FROM visits WHERE patient_id = ?",
            [patient_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Patient;

    fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_patient(&Patient::new("Asha".into(), "12")).unwrap();
        (db, id)
    }

    fn new_visit(patient_id: i64, date: &str, treatment: &str) -> NewVisit {
        NewVisit {
            patient_id,
            visit_date: date.into(),
            complaints: "Better".into(),
            new_modalities: String::new(),
            treatment: treatment.into(),
        }
    }

    #[test]
    fn test_insert_and_get_visit() {
        let (db, id) = setup();
        let visit_id = db.insert_visit(&new_visit(id, "05-01-2025", "Bell 200")).unwrap();

        let detail = db.get_visit(visit_id).unwrap().unwrap();
        assert_eq!(detail.visit.patient_id, id);
        assert_eq!(detail.visit.treatment, "Bell 200");
        assert_eq!(detail.patient_name, "Asha");
        assert_eq!(detail.case_no, "00012");
    }

    #[test]
    fn test_insert_visit_for_missing_patient() {
        let (db, id) = setup();
        let result = db.insert_visit(&new_visit(id + 1, "05-01-2025", "Bell 200"));
        assert!(matches!(result, Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_list_visits_ordering() {
        let (db, id) = setup();
        db.insert_visit(&new_visit(id, "10-02-2025", "second")).unwrap();
        db.insert_visit(&new_visit(id, "20-01-2025", "first")).unwrap();
        db.insert_visit(&new_visit(id, "01-03-2025", "third")).unwrap();

        let ascending = db.list_visits(id, VisitOrder::Ascending).unwrap();
        let treatments: Vec<&str> = ascending.iter().map(|v| v.treatment.as_str()).collect();
        assert_eq!(treatments, vec!["first", "second", "third"]);

        let descending = db.list_visits(id, VisitOrder::Descending).unwrap();
        assert_eq!(descending[0].treatment, "third");
        assert_eq!(db.count_visits(id).unwrap(), 3);
    }

    #[test]
    fn test_delete_patient_cascades_visits() {
        let (db, id) = setup();
        let visit_id = db.insert_visit(&new_visit(id, "05-01-2025", "Bell 200")).unwrap();

        db.delete_patient(id).unwrap();

        assert!(db.get_visit(visit_id).unwrap().is_none());
        assert_eq!(db.count_visits(id).unwrap(), 0);
    }
}
