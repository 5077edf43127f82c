//! End-to-end: scanning an enhanced-structure band folder produces a
//! fully classified `Band` with a consistent structure report.

use bandvault::core::domain::band::StructureType;
use bandvault::core::storage::Storage;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn touch(path: &std::path::Path) {
    fs::write(path, b"").unwrap();
}

#[test]
fn scans_enhanced_structure_band_into_full_metadata() {
    let root = TempDir::new().unwrap();
    let band = root.path().join("Pink Floyd");
    let album = band.join("Album").join("1973 - The Dark Side of the Moon");
    let live = band.join("Live").join("1988 - Delicate Sound of Thunder");
    fs::create_dir_all(&album).unwrap();
    fs::create_dir_all(&live).unwrap();
    touch(&album.join("01.flac"));
    touch(&album.join("02.flac"));
    touch(&live.join("01.flac"));

    let storage = Storage::new(root.path().to_path_buf(), Duration::from_secs(30 * 86_400), Duration::from_secs(5));
    let outcome = storage.scan(true, 2, 100).unwrap();

    assert_eq!(outcome.bands_scanned, 1);
    assert_eq!(outcome.index.bands.len(), 1);
    assert_eq!(outcome.index.bands[0].band_name, "Pink Floyd");
    assert_eq!(outcome.index.bands[0].local_albums, 2);
    assert_eq!(outcome.index.bands[0].missing_albums, 0);

    let loaded = storage.load_band("Pink Floyd").unwrap().unwrap();
    assert_eq!(loaded.albums.len(), 2);
    assert_eq!(
        loaded.folder_structure.as_ref().unwrap().structure_type,
        StructureType::Enhanced
    );
    for album in &loaded.albums {
        assert!(album.compliance.is_some());
        assert!(album.folder_path.is_some());
        assert!(!album.missing);
    }
}

#[test]
fn default_structure_band_has_no_type_folders() {
    let root = TempDir::new().unwrap();
    let band = root.path().join("Rush");
    let album = band.join("1976 - 2112");
    fs::create_dir_all(&album).unwrap();
    touch(&album.join("01.mp3"));

    let storage = Storage::new(root.path().to_path_buf(), Duration::from_secs(30 * 86_400), Duration::from_secs(5));
    storage.scan(true, 1, 100).unwrap();

    let loaded = storage.load_band("Rush").unwrap().unwrap();
    assert_eq!(loaded.albums.len(), 1);
    assert_eq!(loaded.albums[0].year.as_deref(), Some("1976"));
    assert_eq!(loaded.albums[0].album_name, "2112");
}
