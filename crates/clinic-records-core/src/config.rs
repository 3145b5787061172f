//! Runtime configuration.
//!
//! Configuration is resolved once at startup (file, then environment
//! overrides) and handed to [`crate::ClinicRecords`]. Nothing in the core
//! reads environment variables after that.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::DEFAULT_BACKUPS_KEPT;
use crate::pagination::DEFAULT_RECORDS_PER_PAGE;
use crate::report::ClinicHeader;

/// Overrides the database path.
pub const ENV_DATABASE_PATH: &str = "CLINIC_RECORDS_DB";
/// Overrides the backup directory.
pub const ENV_BACKUP_DIR: &str = "CLINIC_RECORDS_BACKUP_DIR";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicConfig {
    pub database_path: PathBuf,
    pub backup_dir: PathBuf,
    pub backups_to_keep: usize,
    pub records_per_page: u64,
    /// Back up after every write
    pub auto_backup: bool,
    /// Where reports go when no destination is given
    pub export_dir: PathBuf,
    pub header: ClinicHeader,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("patients.db"),
            backup_dir: PathBuf::from("db_backups"),
            backups_to_keep: DEFAULT_BACKUPS_KEPT,
            records_per_page: DEFAULT_RECORDS_PER_PAGE,
            auto_backup: true,
            export_dir: PathBuf::from("."),
            header: ClinicHeader::default(),
        }
    }
}

impl ClinicConfig {
    /// Load from a JSON file, or defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides. `lookup` is normally `std::env::var(..).ok()`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());
        if let Some(db) = non_empty(ENV_DATABASE_PATH) {
            self.database_path = PathBuf::from(db);
        }
        if let Some(dir) = non_empty(ENV_BACKUP_DIR) {
            self.backup_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.records_per_page == 0 {
            return Err(ConfigError::Invalid(
                "records_per_page must be at least 1".into(),
            ));
        }
        if self.backups_to_keep == 0 {
            return Err(ConfigError::Invalid(
                "backups_to_keep must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
