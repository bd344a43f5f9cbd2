//! Single-slot backup of the backing file.

use super::codec::parent_dir;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Backup errors.
#[derive(Debug, Error)]
pub enum BackupError {
    /// The backup slot is empty.
    #[error("No backup available")]
    NoBackupAvailable,
    /// Copying or moving the backup failed.
    #[error("backup I/O failure: {0}")]
    Io(#[from] io::Error),
}

/// Maintains at most one snapshot of the backing file.
///
/// Callers must hold the store lock; the manager does no locking itself.
#[derive(Debug, Clone)]
pub struct BackupManager {
    primary: PathBuf,
    backup: PathBuf,
}

impl BackupManager {
    /// Creates a manager backing up `primary` into `backup`.
    pub fn new(primary: impl Into<PathBuf>, backup: impl Into<PathBuf>) -> Self {
        Self {
            primary: primary.into(),
            backup: backup.into(),
        }
    }

    /// Path of the backup slot.
    #[must_use]
    pub fn backup_path(&self) -> &Path {
        &self.backup
    }

    /// Whether the backup slot is populated.
    #[must_use]
    pub fn has_backup(&self) -> bool {
        self.backup.is_file()
    }

    /// Copies the backing file into the backup slot, replacing any previous
    /// backup. If the backing file does not exist the slot is emptied and
    /// `false` is returned.
    ///
    /// # Errors
    /// Returns [`BackupError::Io`] if the copy fails.
    pub fn snapshot(&self) -> Result<bool, BackupError> {
        let mut source = match File::open(&self.primary) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.clear()?;
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        let mut temp = tempfile::NamedTempFile::new_in(parent_dir(&self.backup))?;
        io::copy(&mut source, temp.as_file_mut())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.backup).map_err(|e| e.error)?;

        debug!(backup = %self.backup.display(), "backup snapshot written");
        Ok(true)
    }

    /// Empties the backup slot.
    fn clear(&self) -> Result<(), BackupError> {
        match fs::remove_file(&self.backup) {
            Ok(()) => {
                debug!(backup = %self.backup.display(), "stale backup removed");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Moves the backup over the backing file, emptying the slot.
    ///
    /// # Errors
    /// Returns [`BackupError::NoBackupAvailable`] if the slot is empty.
    pub fn restore(&self) -> Result<(), BackupError> {
        match fs::rename(&self.backup, &self.primary) {
            Ok(()) => {
                debug!(primary = %self.primary.display(), "backup restored");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(BackupError::NoBackupAvailable),
            Err(e) => Err(e.into()),
        }
    }
}
