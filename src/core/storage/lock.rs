//! Per-band and collection-index advisory locks (spec.md §4.6, §5).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{ArcMutexGuard, Mutex, RawMutex};

use crate::core::errors::{BandVaultError, StorageError};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Registry of per-band locks, keyed by the band folder's absolute path.
///
/// Locks are purely in-process: the service is a single process, so this is
/// enough to totally order writes to one band's metadata file (spec.md §5).
pub struct LockRegistry {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn entry(&self, key: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        locks.entry(key.to_path_buf()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Acquires the lock for `band_path`, waiting up to `timeout`. Holds the
    /// lock for as long as the returned `BandLockGuard` lives.
    pub fn acquire(&self, band_path: &Path, timeout: Duration) -> Result<BandLockGuard, BandVaultError> {
        let mutex = self.entry(band_path);
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(guard) = Mutex::try_lock_arc(&mutex) {
                return Ok(BandLockGuard { _guard: guard });
            }
            if Instant::now() >= deadline {
                return Err(BandVaultError::Storage(StorageError::Lock(format!(
                    "timed out acquiring lock for '{}'",
                    band_path.display()
                ))));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

impl Default for LockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds a band locked for the duration of a read-modify-write cycle;
/// releases on drop.
pub struct BandLockGuard {
    _guard: ArcMutexGuard<RawMutex, ()>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_acquisitions_succeed() {
        let registry = LockRegistry::new();
        let path = PathBuf::from("/tmp/band-a");
        let guard = registry.acquire(&path, Duration::from_millis(50)).unwrap();
        drop(guard);
        assert!(registry.acquire(&path, Duration::from_millis(50)).is_ok());
    }

    #[test]
    fn concurrent_acquisition_times_out() {
        let registry = LockRegistry::new();
        let path = PathBuf::from("/tmp/band-b");
        let mutex = registry.entry(&path);
        let _held = mutex.lock();
        let result = registry.acquire(&path, Duration::from_millis(20));
        assert!(result.is_err());
    }
}
