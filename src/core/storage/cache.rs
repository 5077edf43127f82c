//! In-memory read-through cache for per-band metadata (spec.md §4.6).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use parking_lot::Mutex;

use crate::core::domain::band::Band;

struct CacheEntry {
    band: Band,
    mtime: SystemTime,
    cached_at: SystemTime,
}

/// Keyed by band folder path. A cached entry is valid as long as it is
/// younger than the configured TTL *and* the file's mtime hasn't advanced
/// past what was cached.
pub struct MetadataCache {
    ttl: Duration,
    entries: Mutex<HashMap<PathBuf, CacheEntry>>,
}

impl MetadataCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// A TTL of zero disables the cache entirely (spec.md §6.4: `CACHE_DURATION_DAYS=0`).
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn get(&self, band_path: &Path, current_mtime: SystemTime) -> Option<Band> {
        if self.ttl.is_zero() {
            return None;
        }
        let entries = self.entries.lock();
        let entry = entries.get(band_path)?;
        if entry.mtime != current_mtime {
            return None;
        }
        if entry.cached_at.elapsed().unwrap_or(Duration::MAX) > self.ttl {
            return None;
        }
        Some(entry.band.clone())
    }

    pub fn put(&self, band_path: &Path, band: Band, mtime: SystemTime) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.lock().insert(
            band_path.to_path_buf(),
            CacheEntry {
                band,
                mtime,
                cached_at: SystemTime::now(),
            },
        );
    }

    /// Drops the cached entry for `band_path`, forcing the next read to hit disk.
    pub fn invalidate(&self, band_path: &Path) {
        self.entries.lock().remove(band_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::band::Band;

    #[test]
    fn stale_mtime_misses() {
        let cache = MetadataCache::new(Duration::from_secs(3600));
        let path = PathBuf::from("/music/Pink Floyd");
        let t0 = SystemTime::now();
        cache.put(&path, Band::new("Pink Floyd"), t0);
        let t1 = t0 + Duration::from_secs(1);
        assert!(cache.get(&path, t1).is_none());
        assert!(cache.get(&path, t0).is_some());
    }

    #[test]
    fn disabled_cache_never_hits() {
        let cache = MetadataCache::disabled();
        let path = PathBuf::from("/music/Rush");
        let t0 = SystemTime::now();
        cache.put(&path, Band::new("Rush"), t0);
        assert!(cache.get(&path, t0).is_none());
    }
}
