//! File-backed persistence for the task tree.
//!
//! # Responsibility
//! - Resolve the data directory and task file from configuration.
//! - Seed a minimal document on first run, then load and decode it.
//! - Back up the previous file before every save.
//!
//! # Invariants
//! - A missing task file is not an error; it is created from
//!   `EMPTY_DOCUMENT`.
//! - Every save that finds an existing primary file leaves one new backup.
//! - Backups are never pruned.

mod backup;
mod config;
mod file_store;

pub use backup::backup_file_name;
pub use config::{StoreConfig, DATA_DIR_ENV};
pub use file_store::{SaveOutcome, TaskStore};

use crate::codec::CodecError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Result type used by store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from task store operations.
#[derive(Debug)]
pub enum StoreError {
    /// File-system failure on the named path.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Stored document could not be decoded.
    Codec(CodecError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "`{}`: {source}", path.display()),
            Self::Codec(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Codec(err) => Some(err),
        }
    }
}

impl From<CodecError> for StoreError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}
