//! File-backed account table with cross-process locking and a single-slot
//! backup.
//!
//! Every operation re-reads the backing file; nothing is cached between
//! calls. Mutations run the cycle
//!
//! ```text
//! acquire lock → snapshot backup → load → mutate → persist → release lock
//! ```
//!
//! under an OS advisory lock on `<path>.lock`, so they are serialized across
//! threads and processes in lock-acquisition order. Reads take no lock; the
//! file is always replaced by atomic rename, so a reader sees a complete
//! table, though possibly one that is about to be superseded.

mod backup;
mod codec;
pub mod lock;
mod observer;


pub use backup::{BackupError, BackupManager};
pub use observer::{Operation, StoreObserver, TracingObserver};

use crate::models::Record;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Default time to wait for the store lock.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with this user already exists.
    #[error("Record already exists for user: {0}")]
    DuplicateKey(String),
    /// No record with this user exists.
    #[error("Record not found for user: {0}")]
    NotFound(String),
    /// The record itself is unusable.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    /// The lock was not acquired within the timeout.
    #[error("Timed out after {waited:?} waiting for lock {}", .path.display())]
    LockTimeout {
        /// Lock sentinel path.
        path: PathBuf,
        /// How long the caller waited.
        waited: Duration,
    },
    /// Reading or writing the table failed.
    #[error("Storage I/O failure: {0}")]
    Io(#[from] io::Error),
    /// The table file could not be decoded or encoded.
    #[error("Malformed table file: {0}")]
    Format(String),
    /// Backup slot failure.
    #[error(transparent)]
    Backup(#[from] BackupError),
}

/// Store tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Maximum time a mutation waits for the lock.
    pub lock_timeout: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }
}

/// The account table.
#[derive(Debug, Clone)]
pub struct RecordStore {
    path: PathBuf,
    lock_path: PathBuf,
    backups: BackupManager,
    options: StoreOptions,
    observer: Arc<dyn StoreObserver>,
}

impl RecordStore {
    /// Opens the table at `path`, creating an empty one if missing.
    ///
    /// The backup slot lives at `<path>.bak` and the lock sentinel at
    /// `<path>.lock`.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created, the lock cannot
    /// be taken or the empty table cannot be written.
    pub fn open(path: impl Into<PathBuf>, options: StoreOptions) -> Result<Self, StoreError> {
        Self::open_with_observer(path, options, Arc::new(TracingObserver))
    }

    /// Opens the table with a custom observer.
    ///
    /// # Errors
    /// See [`RecordStore::open`].
    pub fn open_with_observer(
        path: impl Into<PathBuf>,
        options: StoreOptions,
        observer: Arc<dyn StoreObserver>,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        let lock_path = sibling(&path, ".lock");
        let backups = BackupManager::new(path.clone(), sibling(&path, ".bak"));

        let store = Self {
            path,
            lock_path,
            backups,
            options,
            observer,
        };

        let initialized = store.observe(Operation::Open, || {
            fs::create_dir_all(codec::parent_dir(&store.path))?;
            let _guard = store.lock()?;
            if store.path.exists() {
                return Ok(false);
            }
            codec::write_table(&store.path, &[])?;
            Ok(true)
        })?;

        if initialized {
            info!(path = %store.path.display(), "created empty account table");
        }
        Ok(store)
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the lock sentinel.
    #[must_use]
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Path of the backup slot.
    #[must_use]
    pub fn backup_path(&self) -> &Path {
        self.backups.backup_path()
    }

    /// Whether a backup is available for [`RecordStore::restore_backup`].
    #[must_use]
    pub fn has_backup(&self) -> bool {
        self.backups.has_backup()
    }

    /// Returns the current table.
    ///
    /// Takes no lock.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] or [`StoreError::Format`].
    pub fn list(&self) -> Result<Vec<Record>, StoreError> {
        self.observe(Operation::List, || codec::read_table(&self.path))
    }

    /// Appends `record`.
    ///
    /// # Errors
    /// Returns [`StoreError::DuplicateKey`] if `record.user` already exists.
    pub fn create(&self, record: Record) -> Result<(), StoreError> {
        validate_record(&record)?;
        self.mutate(Operation::Create, |table| {
            if table.iter().any(|r| r.user == record.user) {
                return Err(StoreError::DuplicateKey(record.user));
            }
            table.push(record);
            Ok(())
        })
    }

    /// Replaces the row for `user` with `record`. The key itself may change
    /// to `record.user`, as long as that does not collide with another row.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if `user` does not exist, or
    /// [`StoreError::DuplicateKey`] if the new key belongs to another row.
    pub fn update(&self, user: &str, record: Record) -> Result<(), StoreError> {
        validate_record(&record)?;
        self.mutate(Operation::Update, |table| {
            let index = table
                .iter()
                .position(|r| r.user == user)
                .ok_or_else(|| StoreError::NotFound(user.to_string()))?;
            if record.user != user && table.iter().any(|r| r.user == record.user) {
                return Err(StoreError::DuplicateKey(record.user));
            }
            table[index] = record;
            Ok(())
        })
    }

    /// Removes the row for `user`.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if `user` does not exist.
    pub fn delete(&self, user: &str) -> Result<(), StoreError> {
        self.mutate(Operation::Delete, |table| {
            let index = table
                .iter()
                .position(|r| r.user == user)
                .ok_or_else(|| StoreError::NotFound(user.to_string()))?;
            table.remove(index);
            Ok(())
        })
    }

    /// Replaces the table with the backup taken before the most recent
    /// mutation and empties the backup slot.
    ///
    /// # Errors
    /// Returns [`StoreError::Backup`] with [`BackupError::NoBackupAvailable`]
    /// if the slot is empty.
    pub fn restore_backup(&self) -> Result<(), StoreError> {
        self.observe(Operation::RestoreBackup, || {
            let _guard = self.lock()?;
            self.backups.restore()?;
            Ok(())
        })
    }

    fn lock(&self) -> Result<lock::LockGuard, StoreError> {
        lock::acquire(
            &self.lock_path,
            self.options.lock_timeout,
            Arc::clone(&self.observer),
        )
    }

    fn mutate<F>(&self, operation: Operation, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Vec<Record>) -> Result<(), StoreError>,
    {
        self.observe(operation, || {
            let _guard = self.lock()?;
            self.backups.snapshot()?;
            let mut table = codec::read_table(&self.path)?;
            apply(&mut table)?;
            codec::write_table(&self.path, &table)
        })
    }

    fn observe<T, F>(&self, operation: Operation, run: F) -> Result<T, StoreError>
    where
        F: FnOnce() -> Result<T, StoreError>,
    {
        let result = run();
        if let Err(error) = &result {
            self.observer.operation_failed(operation, error);
        }
        result
    }
}

fn validate_record(record: &Record) -> Result<(), StoreError> {
    if record.user.trim().is_empty() {
        return Err(StoreError::InvalidRecord(
            "user must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// `path` with `suffix` appended to its file name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}
