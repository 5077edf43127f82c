//! Atomic read/write of the collection-wide `.collection_index.json` (spec.md §4.6, §4.7).

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::core::config::COLLECTION_INDEX_FILENAME;
use crate::core::domain::index::CollectionIndex;
use crate::core::errors::{BandVaultError, StorageError};

fn index_path(root: &Path) -> PathBuf {
    root.join(COLLECTION_INDEX_FILENAME)
}

/// Loads the collection index, or `CollectionIndex::default()` if it hasn't
/// been written yet — the index is always re-derivable from per-band files.
pub fn load(root: &Path) -> Result<CollectionIndex, BandVaultError> {
    let path = index_path(root);
    if !path.exists() {
        return Ok(CollectionIndex::default());
    }
    let mut contents = String::new();
    File::open(&path)?.read_to_string(&mut contents)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Writes the collection index atomically via a `.tmp` file and rename.
pub fn save(root: &Path, index: &CollectionIndex) -> Result<(), BandVaultError> {
    let path = index_path(root);
    let tmp = path.with_extension("json.tmp");

    let serialized = serde_json::to_string_pretty(index)
        .map_err(|e| BandVaultError::Storage(StorageError::Write(e.to_string())))?;

    {
        let mut file = File::create(&tmp)
            .map_err(|e| BandVaultError::Storage(StorageError::Write(e.to_string())))?;
        file.write_all(serialized.as_bytes())
            .map_err(|e| BandVaultError::Storage(StorageError::Write(e.to_string())))?;
        file.sync_all()
            .map_err(|e| BandVaultError::Storage(StorageError::Write(e.to_string())))?;
    }

    std::fs::rename(&tmp, &path).map_err(|e| BandVaultError::Storage(StorageError::Write(e.to_string())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::index::BandIndexEntry;
    use chrono::Utc;

    #[test]
    fn missing_index_loads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let index = load(dir.path()).unwrap();
        assert_eq!(index.bands.len(), 0);
    }

    #[test]
    fn round_trips_a_saved_index() {
        let dir = tempfile::tempdir().unwrap();
        let index = CollectionIndex::rebuild(vec![BandIndexEntry {
            band_name: "Rush".to_string(),
            folder_path: "Rush".to_string(),
            albums_count: 1,
            local_albums: 1,
            missing_albums: 0,
            has_metadata: true,
            has_analysis: false,
            last_updated: Utc::now(),
            last_scanned: Utc::now(),
        }]);
        save(dir.path(), &index).unwrap();
        let loaded = load(dir.path()).unwrap();
        assert_eq!(loaded.bands.len(), 1);
        assert_eq!(loaded.stats.total_bands, 1);
    }
}
