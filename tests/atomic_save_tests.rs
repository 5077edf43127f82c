//! End-to-end: a corrupted primary metadata file (as if a write was
//! interrupted after the rename but before a later one completed) is
//! recovered from its `.bak` rather than failing the whole collection.

use bandvault::core::storage::{BandMetadataPatch, Storage};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn corrupt_band_file_recovers_from_backup_on_next_load() {
    let root = TempDir::new().unwrap();
    let storage = Storage::new(root.path().to_path_buf(), Duration::from_secs(30 * 86_400), Duration::from_secs(5));

    storage
        .save_band_metadata(
            "Pink Floyd",
            BandMetadataPatch {
                origin: Some("Cambridge, England".to_string()),
                ..Default::default()
            },
            true,
        )
        .unwrap();
    storage
        .save_band_metadata(
            "Pink Floyd",
            BandMetadataPatch {
                origin: Some("London, England".to_string()),
                ..Default::default()
            },
            true,
        )
        .unwrap();

    let metadata_file = root.path().join("Pink Floyd").join(".band_metadata.json");
    std::fs::write(&metadata_file, b"{not valid json").unwrap();

    let storage = Storage::new(root.path().to_path_buf(), Duration::ZERO, Duration::from_secs(5));
    let recovered = storage.load_band("Pink Floyd").unwrap().unwrap();
    assert_eq!(recovered.origin.as_deref(), Some("Cambridge, England"));
}

#[test]
fn corrupt_primary_with_no_backup_is_a_storage_error() {
    let root = TempDir::new().unwrap();
    let storage = Storage::new(root.path().to_path_buf(), Duration::from_secs(30 * 86_400), Duration::from_secs(5));
    storage.save_band_metadata("Rush", BandMetadataPatch::default(), true).unwrap();

    let band_folder = root.path().join("Rush");
    std::fs::write(band_folder.join(".band_metadata.json"), b"not json").unwrap();

    let storage = Storage::new(root.path().to_path_buf(), Duration::ZERO, Duration::from_secs(5));
    let result = storage.load_band("Rush");
    assert!(result.is_err());
}
