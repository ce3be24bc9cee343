use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "GTASK_DATA_DIR";

const DEFAULT_DATA_DIR: &str = "G Task";
const DEFAULT_FILE_NAME: &str = "tasks.xml";
const DEFAULT_BACKUP_PREFIX: &str = "tasks_backup_";

/// Location of the task file and its backups.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding the task file and backups.
    pub data_dir: PathBuf,
    /// Primary task file name inside `data_dir`.
    pub file_name: String,
    /// Prefix of backup files written next to the primary file.
    pub backup_prefix: String,
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            backup_prefix: DEFAULT_BACKUP_PREFIX.to_string(),
        }
    }

    /// Reads the data directory from `GTASK_DATA_DIR`, falling back to
    /// `./G Task`.
    pub fn from_env() -> Self {
        if let Ok(raw) = std::env::var(DATA_DIR_ENV) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Self::new(trimmed);
            }
        }
        Self::default()
    }

    /// Full path of the primary task file.
    pub fn task_file(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::StoreConfig;
    use std::path::PathBuf;

    #[test]
    fn defaults_point_at_tasks_xml() {
        let config = StoreConfig::new("/data");
        assert_eq!(config.task_file(), PathBuf::from("/data/tasks.xml"));
        assert_eq!(config.backup_prefix, "tasks_backup_");
        assert_eq!(StoreConfig::default().data_dir, PathBuf::from("G Task"));
    }
}
