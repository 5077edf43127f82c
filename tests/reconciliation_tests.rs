//! End-to-end: an album folder that disappears between scans is
//! reconciled into `albums_missing` rather than silently dropped.

use bandvault::core::storage::Storage;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn touch(path: &std::path::Path) {
    fs::write(path, b"").unwrap();
}

#[test]
fn removed_album_folder_becomes_missing_on_rescan() {
    let root = TempDir::new().unwrap();
    let band = root.path().join("Rush");
    let a = band.join("1976 - 2112");
    let b = band.join("1981 - Moving Pictures");
    fs::create_dir_all(&a).unwrap();
    fs::create_dir_all(&b).unwrap();
    touch(&a.join("01.mp3"));
    touch(&b.join("01.mp3"));

    let storage = Storage::new(root.path().to_path_buf(), Duration::from_secs(30 * 86_400), Duration::from_secs(5));
    storage.scan(true, 1, 100).unwrap();

    let band_before = storage.load_band("Rush").unwrap().unwrap();
    assert_eq!(band_before.albums.len(), 2);
    assert_eq!(band_before.albums_missing.len(), 0);

    fs::remove_dir_all(&b).unwrap();

    let outcome = storage.scan(true, 1, 100).unwrap();
    assert_eq!(outcome.bands_scanned, 1);

    let band_after = storage.load_band("Rush").unwrap().unwrap();
    assert_eq!(band_after.albums.len(), 1);
    assert_eq!(band_after.albums[0].album_name, "2112");
    assert_eq!(band_after.albums_missing.len(), 1);
    assert_eq!(band_after.albums_missing[0].album_name, "Moving Pictures");
    assert!(band_after.albums_missing[0].missing);
    assert!(band_after.albums_missing[0].folder_path.is_none());

    let index = storage.rebuild_index().unwrap();
    let entry = index.bands.iter().find(|e| e.band_name == "Rush").unwrap();
    assert_eq!(entry.local_albums, 1);
    assert_eq!(entry.missing_albums, 1);
}

#[test]
fn reappearing_album_folder_is_restored_from_missing() {
    let root = TempDir::new().unwrap();
    let band = root.path().join("Rush");
    let a = band.join("1976 - 2112");
    fs::create_dir_all(&a).unwrap();
    touch(&a.join("01.mp3"));

    let storage = Storage::new(root.path().to_path_buf(), Duration::from_secs(30 * 86_400), Duration::from_secs(5));
    storage.scan(true, 1, 100).unwrap();

    let b = band.join("1981 - Moving Pictures");
    fs::create_dir_all(&b).unwrap();
    touch(&b.join("01.mp3"));
    storage.scan(true, 1, 100).unwrap();

    fs::remove_dir_all(&b).unwrap();
    storage.scan(true, 1, 100).unwrap();
    let missing_now = storage.load_band("Rush").unwrap().unwrap();
    assert_eq!(missing_now.albums_missing.len(), 1);

    fs::create_dir_all(&b).unwrap();
    touch(&b.join("01.mp3"));
    storage.scan(true, 1, 100).unwrap();

    let restored = storage.load_band("Rush").unwrap().unwrap();
    assert_eq!(restored.albums.len(), 2);
    assert!(restored.albums_missing.is_empty());
}
