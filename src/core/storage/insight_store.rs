//! Atomic read/write of `<root>/.collection_insight.json`.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::core::domain::index::CollectionInsight;
use crate::core::errors::{BandVaultError, StorageError};

const FILENAME: &str = ".collection_insight.json";

fn insight_path(root: &Path) -> PathBuf {
    root.join(FILENAME)
}

pub fn load(root: &Path) -> Result<Option<CollectionInsight>, BandVaultError> {
    let path = insight_path(root);
    if !path.exists() {
        return Ok(None);
    }
    let mut contents = String::new();
    File::open(&path)?.read_to_string(&mut contents)?;
    Ok(Some(serde_json::from_str(&contents)?))
}

pub fn save(root: &Path, insight: &CollectionInsight) -> Result<(), BandVaultError> {
    let path = insight_path(root);
    let tmp = path.with_extension("json.tmp");

    let serialized = serde_json::to_string_pretty(insight)
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
    use chrono::Utc;

    #[test]
    fn round_trips_an_insight() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(dir.path()).unwrap().is_none());
        let insight = CollectionInsight {
            summary: Some("growing steadily".to_string()),
            highlights: vec!["added 3 live albums".to_string()],
            generated_at: Utc::now(),
        };
        save(dir.path(), &insight).unwrap();
        let loaded = load(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.summary.as_deref(), Some("growing steadily"));
    }
}
