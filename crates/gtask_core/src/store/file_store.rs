use super::backup::backup_file_name;
use super::config::StoreConfig;
use super::{StoreError, StoreResult};
use crate::codec::{decode, encode, Decoded, EMPTY_DOCUMENT};
use crate::model::tree::TaskTree;
use chrono::Local;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Result of one save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Primary task file that was written.
    pub path: PathBuf,
    /// Backup of the previous content; `None` when no primary file existed.
    pub backup: Option<PathBuf>,
    pub bytes_written: usize,
}

/// Task file store rooted at one data directory.
#[derive(Debug, Clone)]
pub struct TaskStore {
    config: StoreConfig,
}

impl TaskStore {
    /// Opens a store, creating the data directory when missing.
    pub fn open(config: StoreConfig) -> StoreResult<Self> {
        std::fs::create_dir_all(config.data_dir())
            .map_err(|err| StoreError::io(config.data_dir(), err))?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn task_file(&self) -> PathBuf {
        self.config.task_file()
    }

    /// Loads and decodes the task file, seeding it first when missing.
    ///
    /// # Side effects
    /// - Writes `EMPTY_DOCUMENT` when the task file does not exist.
    /// - Emits `tasks_load` logging events with duration and status.
    pub fn load(&self) -> StoreResult<Decoded> {
        let started_at = Instant::now();
        let path = self.task_file();
        info!("event=tasks_load module=store status=start");

        match self.read_and_decode(&path) {
            Ok(decoded) => {
                info!(
                    "event=tasks_load module=store status=ok duration_ms={} version={} nodes={} tasks={} defaulted_attributes={}",
                    started_at.elapsed().as_millis(),
                    decoded.version,
                    decoded.tree.node_count(),
                    decoded.tree.task_count(),
                    decoded.defaulted_attributes
                );
                Ok(decoded)
            }
            Err(err) => {
                error!(
                    "event=tasks_load module=store status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Backs up the current task file, then writes the encoded tree.
    ///
    /// The write itself is not atomic.
    pub fn save(&self, tree: &TaskTree) -> StoreResult<SaveOutcome> {
        let started_at = Instant::now();
        let path = self.task_file();
        info!("event=tasks_save module=store status=start");

        let result = self.backup(&path).and_then(|backup| {
            let output = encode(tree);
            std::fs::write(&path, output.as_bytes())
                .map_err(|err| StoreError::io(&path, err))?;
            Ok(SaveOutcome {
                path: path.clone(),
                backup,
                bytes_written: output.len(),
            })
        });

        match &result {
            Ok(outcome) => info!(
                "event=tasks_save module=store status=ok duration_ms={} bytes={} backup={}",
                started_at.elapsed().as_millis(),
                outcome.bytes_written,
                outcome.backup.is_some()
            ),
            Err(err) => error!(
                "event=tasks_save module=store status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn read_and_decode(&self, path: &Path) -> StoreResult<Decoded> {
        if !path.exists() {
            std::fs::write(path, EMPTY_DOCUMENT).map_err(|err| StoreError::io(path, err))?;
            info!("event=tasks_seed module=store status=ok");
        }
        let bytes = std::fs::read(path).map_err(|err| StoreError::io(path, err))?;
        Ok(decode(&bytes)?)
    }

    fn backup(&self, path: &Path) -> StoreResult<Option<PathBuf>> {
        if !path.exists() {
            return Ok(None);
        }
        let target = self.next_backup_path();
        std::fs::copy(path, &target).map_err(|err| StoreError::io(&target, err))?;
        Ok(Some(target))
    }

    fn next_backup_path(&self) -> PathBuf {
        let name = backup_file_name(&self.config.backup_prefix, Local::now());
        let candidate = self.config.data_dir().join(&name);
        if !candidate.exists() {
            return candidate;
        }

        // Two saves within one second: keep both backups.
        let stem = name.trim_end_matches(".xml");
        (1..)
            .map(|attempt| self.config.data_dir().join(format!("{stem}_{attempt}.xml")))
            .find(|path| !path.exists())
            .unwrap_or(candidate)
    }
}
