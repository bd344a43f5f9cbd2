//! Observability hook for store lock and error events.

use super::StoreError;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Store operation, used to label observer events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Opening the store.
    Open,
    /// Listing records.
    List,
    /// Creating a record.
    Create,
    /// Updating a record.
    Update,
    /// Deleting a record.
    Delete,
    /// Restoring the backup slot.
    RestoreBackup,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::List => write!(f, "list"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::RestoreBackup => write!(f, "restore_backup"),
        }
    }
}

/// Receives lock and error events from a [`RecordStore`](super::RecordStore).
///
/// All methods default to no-ops.
pub trait StoreObserver: Send + Sync + fmt::Debug {
    /// The exclusive lock was acquired after waiting `waited`.
    fn lock_acquired(&self, _lock_path: &Path, _waited: Duration) {}

    /// The exclusive lock was released after being held for `held`.
    fn lock_released(&self, _lock_path: &Path, _held: Duration) {}

    /// An operation failed.
    fn operation_failed(&self, _operation: Operation, _error: &StoreError) {}
}

/// Observer that emits `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl StoreObserver for TracingObserver {
    fn lock_acquired(&self, lock_path: &Path, waited: Duration) {
        debug!(lock = %lock_path.display(), ?waited, "store lock acquired");
    }

    fn lock_released(&self, lock_path: &Path, held: Duration) {
        debug!(lock = %lock_path.display(), ?held, "store lock released");
    }

    fn operation_failed(&self, operation: Operation, error: &StoreError) {
        warn!(%operation, %error, "store operation failed");
    }
}
