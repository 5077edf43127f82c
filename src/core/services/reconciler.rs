//! Merges scanned filesystem state with stored metadata (spec.md §4.5).

use std::collections::HashSet;

use crate::core::domain::album::{Album, AlbumCompliance, AlbumType};
use crate::core::domain::band::StructureType;
use crate::core::services::normalization::{edit_distance, normalize_album_name};

/// One album folder found on disk by the Scanner, with its derived fields
/// already computed (Parser + type resolution + Compliance Scorer).
#[derive(Debug, Clone)]
pub struct PhysicalAlbum {
    pub album_name: String,
    pub year: Option<String>,
    pub album_type: AlbumType,
    pub edition: Option<String>,
    pub genres: Vec<String>,
    pub tracks_count: Option<u32>,
    pub duration: Option<String>,
    pub folder_path: String,
    pub compliance: AlbumCompliance,
}

/// Output of reconciling one band's physical albums against its previously
/// stored metadata. `missing_recommendations` pairs each missing album's
/// name with a recommended folder path to create it at — it is advisory
/// and not persisted on `Album` itself, since `compliance`/`folder_path`
/// are defined only for local albums.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationResult {
    pub albums: Vec<Album>,
    pub albums_missing: Vec<Album>,
    pub missing_recommendations: Vec<(String, String)>,
}

/// Reconciles discovered `physical` albums against `stored` metadata
/// (the band's previous `albums` ∪ `albums_missing`, in original order).
pub fn reconcile(
    physical: Vec<PhysicalAlbum>,
    stored: Vec<Album>,
    structure_type: StructureType,
) -> ReconciliationResult {
    let mut consumed: HashSet<usize> = HashSet::new();
    let mut result = ReconciliationResult::default();

    for stored_album in &stored {
        let stored_key = normalize_album_name(&stored_album.album_name);

        let mut candidates: Vec<usize> = physical
            .iter()
            .enumerate()
            .filter(|(i, p)| !consumed.contains(i) && normalize_album_name(&p.album_name) == stored_key)
            .map(|(i, _)| i)
            .collect();

        candidates.sort_by_key(|&i| edit_distance(&physical[i].album_name, &stored_album.album_name));

        match candidates.first() {
            Some(&best) => {
                consumed.insert(best);
                let p = &physical[best];
                result.albums.push(Album {
                    album_name: stored_album.album_name.clone(),
                    year: stored_album.year.clone().or_else(|| p.year.clone()),
                    album_type: p.album_type,
                    edition: p.edition.clone().or_else(|| stored_album.edition.clone()),
                    edition_canonical: None,
                    genres: if stored_album.genres.is_empty() {
                        p.genres.clone()
                    } else {
                        stored_album.genres.clone()
                    },
                    tracks_count: p.tracks_count.or(stored_album.tracks_count),
                    duration: stored_album.duration.clone(),
                    missing: false,
                    folder_path: Some(p.folder_path.clone()),
                    compliance: Some(p.compliance.clone()),
                    gallery: stored_album.gallery.clone(),
                });
            }
            None => {
                let recommended = recommended_missing_path(stored_album, structure_type);
                result
                    .missing_recommendations
                    .push((stored_album.album_name.clone(), recommended));
                result.albums_missing.push(Album {
                    album_name: stored_album.album_name.clone(),
                    year: stored_album.year.clone(),
                    album_type: stored_album.album_type,
                    edition: stored_album.edition.clone(),
                    edition_canonical: stored_album.edition_canonical.clone(),
                    genres: stored_album.genres.clone(),
                    tracks_count: stored_album.tracks_count,
                    duration: stored_album.duration.clone(),
                    missing: true,
                    folder_path: None,
                    compliance: None,
                    gallery: stored_album.gallery.clone(),
                });
            }
        }
    }

    for (i, p) in physical.iter().enumerate() {
        if consumed.contains(&i) {
            continue;
        }
        result.albums.push(Album {
            album_name: p.album_name.clone(),
            year: p.year.clone(),
            album_type: p.album_type,
            edition: p.edition.clone(),
            edition_canonical: None,
            genres: p.genres.clone(),
            tracks_count: p.tracks_count,
            duration: p.duration.clone(),
            missing: false,
            folder_path: Some(p.folder_path.clone()),
            compliance: Some(p.compliance.clone()),
            gallery: Vec::new(),
        });
    }

    result
}

fn recommended_missing_path(album: &Album, structure_type: StructureType) -> String {
    let mut segments = Vec::new();
    if structure_type == StructureType::Enhanced {
        segments.push(album.album_type.folder_name().to_string());
    }
    let mut name = match &album.year {
        Some(year) => format!("{year} - "),
        None => "YYYY - ".to_string(),
    };
    name.push_str(&album.album_name);
    if let Some(edition) = &album.edition {
        name.push_str(&format!(" ({edition})"));
    }
    segments.push(name);
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::album::ComplianceLevel;

    fn physical(name: &str, folder_path: &str) -> PhysicalAlbum {
        PhysicalAlbum {
            album_name: name.to_string(),
            year: Some("1973".to_string()),
            album_type: AlbumType::Album,
            edition: None,
            genres: Vec::new(),
            tracks_count: Some(2),
            duration: None,
            folder_path: folder_path.to_string(),
            compliance: AlbumCompliance {
                score: 100,
                level: ComplianceLevel::Excellent,
                issues: Vec::new(),
                recommended_path: None,
            },
        }
    }

    #[test]
    fn matches_across_case_difference() {
        let stored = vec![Album::new("The Dark Side Of The Moon")];
        let result = reconcile(
            vec![physical("the dark side of the moon", "1973 - the dark side of the moon")],
            stored,
            StructureType::Default,
        );
        assert_eq!(result.albums.len(), 1);
        assert_eq!(result.albums[0].album_name, "The Dark Side Of The Moon");
        assert!(result.albums_missing.is_empty());
    }

    #[test]
    fn stored_album_without_physical_match_is_missing() {
        let stored = vec![
            Album::new("The Wall"),
            Album::new("Animals"),
            Album::new("The Final Cut"),
        ];
        let result = reconcile(
            vec![physical("The Wall", "1979 - The Wall"), physical("Animals", "1977 - Animals")],
            stored,
            StructureType::Default,
        );
        assert_eq!(result.albums.len(), 2);
        assert_eq!(result.albums_missing.len(), 1);
        assert_eq!(result.albums_missing[0].album_name, "The Final Cut");
    }

    #[test]
    fn unmatched_physical_album_becomes_new_local_album() {
        let result = reconcile(vec![physical("New Release", "2024 - New Release")], vec![], StructureType::Default);
        assert_eq!(result.albums.len(), 1);
        assert_eq!(result.albums[0].album_name, "New Release");
    }
}
