//! End-to-end: an incremental scan only re-visits bands whose folder or
//! metadata changed since the last scan, and still picks up a brand-new band.

use bandvault::core::storage::Storage;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn touch(path: &std::path::Path) {
    fs::write(path, b"").unwrap();
}

#[test]
fn incremental_scan_skips_untouched_bands() {
    let root = TempDir::new().unwrap();
    let floyd = root.path().join("Pink Floyd").join("1973 - The Dark Side of the Moon");
    let rush = root.path().join("Rush").join("1976 - 2112");
    fs::create_dir_all(&floyd).unwrap();
    fs::create_dir_all(&rush).unwrap();
    touch(&floyd.join("01.flac"));
    touch(&rush.join("01.mp3"));

    let storage = Storage::new(root.path().to_path_buf(), Duration::from_secs(30 * 86_400), Duration::from_secs(5));
    let first = storage.scan(true, 2, 100).unwrap();
    assert_eq!(first.bands_scanned, 2);
    assert_eq!(first.bands_skipped, 0);

    let second = storage.scan(false, 2, 100).unwrap();
    assert_eq!(second.bands_scanned, 0, "nothing changed since the first scan");
    assert_eq!(second.bands_skipped, 2);
    assert_eq!(second.index.bands.len(), 2);
}

#[test]
fn incremental_scan_picks_up_a_new_band_and_skips_the_rest() {
    let root = TempDir::new().unwrap();
    let floyd = root.path().join("Pink Floyd").join("1973 - The Dark Side of the Moon");
    fs::create_dir_all(&floyd).unwrap();
    touch(&floyd.join("01.flac"));

    let storage = Storage::new(root.path().to_path_buf(), Duration::from_secs(30 * 86_400), Duration::from_secs(5));
    storage.scan(true, 2, 100).unwrap();

    let rush = root.path().join("Rush").join("1976 - 2112");
    fs::create_dir_all(&rush).unwrap();
    touch(&rush.join("01.mp3"));

    let outcome = storage.scan(false, 2, 100).unwrap();
    assert_eq!(outcome.bands_scanned, 1);
    assert_eq!(outcome.bands_skipped, 1);
    assert_eq!(outcome.index.bands.len(), 2);
}
