//! Cross-process exclusive lock on a sentinel file.
//!
//! The lock is an OS advisory lock (`flock` on Unix, `LockFileEx` on
//! Windows) taken on a dedicated sentinel path next to the backing file.
//! Every open of the sentinel gets its own lock handle, so the lock
//! serializes threads of one process as well as separate processes.

use super::StoreError;
use super::observer::StoreObserver;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// First retry delay while the lock is contended.
const INITIAL_BACKOFF: Duration = Duration::from_millis(2);

/// Upper bound for the retry delay.
const MAX_BACKOFF: Duration = Duration::from_millis(100);

/// Held exclusive lock. Released on drop.
#[derive(Debug)]
pub struct LockGuard {
    file: File,
    path: PathBuf,
    acquired_at: Instant,
    observer: Arc<dyn StoreObserver>,
}

impl LockGuard {
    /// Sentinel path this guard holds.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.file);
        self.observer
            .lock_released(&self.path, self.acquired_at.elapsed());
    }
}

/// Acquires the exclusive lock on `path`, retrying with capped exponential
/// backoff until `timeout` elapses.
///
/// The sentinel is created if missing; nothing else is touched, so a timed
/// out caller leaves no trace.
///
/// # Errors
/// Returns [`StoreError::LockTimeout`] if the lock is still held elsewhere
/// when the timeout expires, or [`StoreError::Io`] if the sentinel cannot be
/// opened or locked.
pub fn acquire(
    path: &Path,
    timeout: Duration,
    observer: Arc<dyn StoreObserver>,
) -> Result<LockGuard, StoreError> {
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(path)?;

    let started = Instant::now();
    let deadline = started + timeout;
    let contended = fs2::lock_contended_error();
    let mut backoff = INITIAL_BACKOFF;

    loop {
        match fs2::FileExt::try_lock_exclusive(&file) {
            Ok(()) => {
                let waited = started.elapsed();
                observer.lock_acquired(path, waited);
                return Ok(LockGuard {
                    file,
                    path: path.to_path_buf(),
                    acquired_at: Instant::now(),
                    observer,
                });
            }
            Err(e) if e.raw_os_error() == contended.raw_os_error() => {}
            Err(e) => return Err(StoreError::Io(e)),
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(StoreError::LockTimeout {
                path: path.to_path_buf(),
                waited: now - started,
            });
        }
        thread::sleep(backoff.min(deadline - now));
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}
