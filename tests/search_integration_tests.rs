//! End-to-end: advanced search composes filters across bands discovered by
//! a real scan and ratings saved afterward through `save_band_analyze`.

use bandvault::core::domain::album::{AlbumType, ComplianceLevel};
use bandvault::core::domain::band::{AlbumAnalysis, BandAnalysis};
use bandvault::core::services::query::{self, AlbumSearchQuery};
use bandvault::core::storage::Storage;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn touch(path: &std::path::Path) {
    fs::write(path, b"").unwrap();
}

#[test]
fn advanced_search_combines_type_year_and_rating_filters() {
    let root = TempDir::new().unwrap();

    let floyd_live = root.path().join("Pink Floyd").join("Live").join("1988 - Delicate Sound of Thunder");
    let floyd_album = root.path().join("Pink Floyd").join("Album").join("1973 - The Dark Side of the Moon");
    let rush_album = root.path().join("Rush").join("1976 - 2112");
    fs::create_dir_all(&floyd_live).unwrap();
    fs::create_dir_all(&floyd_album).unwrap();
    fs::create_dir_all(&rush_album).unwrap();
    touch(&floyd_live.join("01.flac"));
    touch(&floyd_album.join("01.flac"));
    touch(&floyd_album.join("02.flac"));
    touch(&rush_album.join("01.mp3"));

    let storage = Storage::new(root.path().to_path_buf(), Duration::from_secs(30 * 86_400), Duration::from_secs(5));
    storage.scan(true, 2, 100).unwrap();

    storage
        .save_band_analyze(
            "Pink Floyd",
            BandAnalysis {
                review: Some("A landmark live show.".to_string()),
                rate: Some(9),
                similar_bands: vec!["Rush".to_string()],
                albums: vec![AlbumAnalysis {
                    album_name: "Delicate Sound of Thunder".to_string(),
                    review: None,
                    rate: Some(9),
                }],
            },
            false,
        )
        .unwrap();

    let bands = storage.load_all_bands().unwrap();

    let query = AlbumSearchQuery {
        type_in: Some(vec![AlbumType::Live]),
        year_min: Some("1980".to_string()),
        year_max: Some("1999".to_string()),
        rating_min: Some(8),
        ..Default::default()
    };
    let hits = query::advanced_search_albums(&bands, &query);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].band_name, "Pink Floyd");
    assert_eq!(hits[0].album.album_name, "Delicate Sound of Thunder");
    assert_eq!(hits[0].rating, Some(9));

    let no_rating_query = AlbumSearchQuery {
        band_name_contains: Some("rush".to_string()),
        ..Default::default()
    };
    let rush_hits = query::advanced_search_albums(&bands, &no_rating_query);
    assert_eq!(rush_hits.len(), 1);
    assert_eq!(rush_hits[0].rating, None);

    let compliance_query = AlbumSearchQuery {
        compliance_level_in: Some(vec![ComplianceLevel::Excellent, ComplianceLevel::Good]),
        present_only: true,
        ..Default::default()
    };
    let compliant_hits = query::advanced_search_albums(&bands, &compliance_query);
    assert!(compliant_hits.iter().all(|h| !h.album.missing));
}
