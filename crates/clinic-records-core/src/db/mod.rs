//! Database layer for clinic records.

mod backup;
mod patients;
mod schema;
mod visits;

pub use backup::*;
pub use schema::*;

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record not found: {0}")]
    NotFound(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        let db = Self {
            conn,
            path: Some(path.as_ref().to_path_buf()),
        };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn, path: None };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema and migrate older layouts.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        self.migrate_legacy_columns()?;
        Ok(())
    }

    /// Rename the pre-release `final_diagnosis` column to `treatment`.
    fn migrate_legacy_columns(&self) -> DbResult<()> {
        let columns = self.column_names("patients")?;
        if columns.iter().any(|c| c == LEGACY_TREATMENT_COLUMN)
            && !columns.iter().any(|c| c == "treatment")
        {
            self.conn.execute_batch(
                "ALTER TABLE patients RENAME COLUMN final_diagnosis TO treatment",
            )?;
            tracing::info!("Renamed legacy column final_diagnosis to treatment");
        }
        Ok(())
    }

    fn column_names(&self, table: &str) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!("PRAGMA table_info({table})"))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// File backing this database, `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
        assert!(db.unwrap().path().is_none());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        // Check that tables exist
        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"patients".to_string()));
        assert!(tables.contains(&"visits".to_string()));
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let db = Database::open_in_memory().unwrap();
        let enabled: i64 = db
            .conn()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_legacy_column_renamed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE patients (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    date TEXT, case_no TEXT, name TEXT, final_diagnosis TEXT
                );
                INSERT INTO patients (case_no, name, final_diagnosis)
                VALUES ('00001', 'Asha', 'Nux vom 30');",
            )
            .unwrap();
        }

        let db = Database::open(&path).unwrap();
        let columns = db.column_names("patients").unwrap();
        assert!(columns.contains(&"treatment".to_string()));
        assert!(!columns.contains(&"final_diagnosis".to_string()));

        let treatment: String = db
            .conn()
            .query_row("SELECT treatment FROM patients", [], |row| row.get(0))
            .unwrap();
        assert_eq!(treatment, "Nux vom 30");
    }
}
