//! Rolling database backups.
//!
//! Backups are full copies taken with SQLite's online backup API and named
//! `patients_backup_<YYYYmmdd_HHMMSS>.db`, so sorting file names sorts them by
//! age. Only the newest `keep` files are retained.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::DatabaseName;

use super::{Database, DbResult};

/// File name prefix of every backup.
pub const BACKUP_PREFIX: &str = "patients_backup_";

/// Timestamp embedded in backup file names.
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Default number of backups to keep.
pub const DEFAULT_BACKUPS_KEPT: usize = 10;

fn is_backup_file(name: &str) -> bool {
    name.starts_with(BACKUP_PREFIX) && name.ends_with(".db")
}

impl Database {
    /// Copy the database into `dir` and prune old backups.
    pub fn backup_to(&self, dir: &Path, keep: usize) -> DbResult<PathBuf> {
        fs::create_dir_all(dir)?;

        let stamp = chrono::Local::now().format(BACKUP_TIMESTAMP_FORMAT);
        let dest = dir.join(format!("{BACKUP_PREFIX}{stamp}.db"));
        self.conn.backup(DatabaseName::Main, &dest, None)?;

        let removed = prune_backups(dir, keep)?;
        tracing::info!(path = %dest.display(), removed, "Database backed up");
        Ok(dest)
    }
}

/// Backup files in `dir`, oldest first.
pub fn list_backups(dir: &Path) -> DbResult<Vec<PathBuf>> {
    let mut backups = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if is_backup_file(&name.to_string_lossy()) && entry.file_type()?.is_file() {
            backups.push(entry.path());
        }
    }
    backups.sort();
    Ok(backups)
}

/// Delete all but the newest `keep` backups. Returns how many were removed.
pub fn prune_backups(dir: &Path, keep: usize) -> DbResult<usize> {
    let backups = list_backups(dir)?;
    let excess = backups.len().saturating_sub(keep);
    for old in &backups[..excess] {
        fs::remove_file(old)?;
    }
    Ok(excess)
}
