//! End-to-end: a stored album name with accents/case differing from its
//! on-disk folder name is matched, not duplicated or left missing.

use bandvault::core::domain::album::Album;
use bandvault::core::storage::{BandMetadataPatch, Storage};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn touch(path: &std::path::Path) {
    fs::write(path, b"").unwrap();
}

#[test]
fn diacritic_and_case_variants_reconcile_to_one_album() {
    let root = TempDir::new().unwrap();
    let band = root.path().join("Stereolab");
    fs::create_dir_all(&band).unwrap();

    let storage = Storage::new(root.path().to_path_buf(), Duration::from_secs(30 * 86_400), Duration::from_secs(5));

    let mut stored_missing = Album::new("Émotions");
    stored_missing.missing = true;
    storage
        .save_band_metadata(
            "Stereolab",
            BandMetadataPatch {
                albums_missing: Some(vec![stored_missing]),
                ..Default::default()
            },
            true,
        )
        .unwrap();

    let album_dir = band.join("2001 - emotions");
    fs::create_dir_all(&album_dir).unwrap();
    touch(&album_dir.join("01.flac"));

    storage.scan(true, 1, 100).unwrap();

    let band = storage.load_band("Stereolab").unwrap().unwrap();
    assert_eq!(band.albums.len(), 1, "the on-disk folder should match the stored entry, not duplicate it");
    assert!(band.albums_missing.is_empty());
    assert_eq!(band.albums[0].album_name, "Émotions", "reconciliation keeps the stored spelling");
}
