//! Filtering, sorting, and pagination over bands and albums (spec.md §4.9).

use serde::Serialize;

use crate::core::domain::album::{Album, AlbumType, ComplianceLevel};
use crate::core::domain::band::{Band, StructureType};
use crate::core::domain::index::BandIndexEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Name,
    AlbumsCount,
    Completion,
    LastUpdated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default)]
pub struct BandListFilters {
    pub search: Option<String>,
    pub has_metadata: Option<bool>,
    pub has_analysis: Option<bool>,
    pub filter_album_type: Option<AlbumType>,
    pub filter_compliance_level: Option<ComplianceLevel>,
    pub filter_structure_type: Option<StructureType>,
    pub min_rating: Option<u8>,
    pub min_albums: Option<usize>,
    pub has_missing: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct BandListQuery {
    pub page: usize,
    pub page_size: usize,
    pub sort_by: SortBy,
    pub order: SortOrder,
    pub filters: BandListFilters,
}

impl Default for BandListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 50,
            sort_by: SortBy::Name,
            order: SortOrder::Asc,
            filters: BandListFilters::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PagedBandList {
    pub entries: Vec<BandIndexEntry>,
    pub page: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub total_pages: usize,
}

/// Completion percentage for a single band, for `sort_by = completion`.
fn band_completion(entry: &BandIndexEntry) -> f64 {
    if entry.albums_count == 0 {
        100.0
    } else {
        (entry.albums_count - entry.missing_albums) as f64 / entry.albums_count as f64 * 100.0
    }
}

fn matches_filters(band: &Band, entry: &BandIndexEntry, filters: &BandListFilters) -> bool {
    if let Some(search) = &filters.search {
        if !band.band_name.to_lowercase().contains(&search.to_lowercase()) {
            return false;
        }
    }
    if let Some(want) = filters.has_metadata {
        if entry.has_metadata != want {
            return false;
        }
    }
    if let Some(want) = filters.has_analysis {
        if entry.has_analysis != want {
            return false;
        }
    }
    if let Some(album_type) = filters.filter_album_type {
        let has_type = band
            .albums
            .iter()
            .chain(band.albums_missing.iter())
            .any(|a| a.album_type == album_type);
        if !has_type {
            return false;
        }
    }
    if let Some(level) = filters.filter_compliance_level {
        let has_level = band
            .albums
            .iter()
            .any(|a| a.compliance.as_ref().is_some_and(|c| c.level == level));
        if !has_level {
            return false;
        }
    }
    if let Some(structure_type) = filters.filter_structure_type {
        if band.folder_structure.as_ref().map(|s| s.structure_type) != Some(structure_type) {
            return false;
        }
    }
    if let Some(min_rating) = filters.min_rating {
        if band.analyze.as_ref().and_then(|a| a.rate).unwrap_or(0) < min_rating {
            return false;
        }
    }
    if let Some(min_albums) = filters.min_albums {
        if entry.albums_count < min_albums {
            return false;
        }
    }
    if let Some(want_missing) = filters.has_missing {
        let has_missing = entry.missing_albums > 0;
        if has_missing != want_missing {
            return false;
        }
    }
    true
}

/// Filters, sorts, and paginates over the joined (Band, BandIndexEntry) view
/// the Storage layer assembles for the Query Engine.
pub fn get_band_list(bands: &[(Band, BandIndexEntry)], query: &BandListQuery) -> PagedBandList {
    let mut matched: Vec<&BandIndexEntry> = bands
        .iter()
        .filter(|(band, entry)| matches_filters(band, entry, &query.filters))
        .map(|(_, entry)| entry)
        .collect();

    matched.sort_by(|a, b| {
        let primary = match query.sort_by {
            SortBy::Name => a.band_name.cmp(&b.band_name),
            SortBy::AlbumsCount => a.albums_count.cmp(&b.albums_count),
            SortBy::Completion => band_completion(a)
                .partial_cmp(&band_completion(b))
                .unwrap_or(std::cmp::Ordering::Equal),
            SortBy::LastUpdated => a.last_updated.cmp(&b.last_updated),
        };
        let primary = if query.order == SortOrder::Desc {
            primary.reverse()
        } else {
            primary
        };
        primary.then_with(|| a.band_name.cmp(&b.band_name))
    });

    let total_count = matched.len();
    let page_size = query.page_size.max(1);
    let total_pages = total_count.div_ceil(page_size).max(1);
    let page = query.page.max(1);

    let start = (page - 1) * page_size;
    let entries: Vec<BandIndexEntry> = matched
        .into_iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    PagedBandList {
        entries,
        page,
        page_size,
        total_count,
        total_pages,
    }
}

/// The 13 parameters of `advanced_search_albums` (spec.md §4.9).
#[derive(Debug, Clone, Default)]
pub struct AlbumSearchQuery {
    pub band_name_contains: Option<String>,
    pub album_name_contains: Option<String>,
    pub type_in: Option<Vec<AlbumType>>,
    pub edition_contains: Option<String>,
    pub year_min: Option<String>,
    pub year_max: Option<String>,
    pub tracks_min: Option<u32>,
    pub tracks_max: Option<u32>,
    pub rating_min: Option<u8>,
    pub rating_max: Option<u8>,
    pub compliance_level_in: Option<Vec<ComplianceLevel>>,
    pub missing_only: bool,
    pub present_only: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct AlbumSearchHit {
    pub band_name: String,
    pub album: Album,
    pub rating: Option<u8>,
}

fn album_rating(band: &Band, album: &Album) -> Option<u8> {
    let analyze = band.analyze.as_ref()?;
    let key = crate::core::services::normalization::normalize_album_name(&album.album_name);
    analyze
        .albums
        .iter()
        .find(|a| crate::core::services::normalization::normalize_album_name(&a.album_name) == key)
        .and_then(|a| a.rate)
}

fn album_matches(band: &Band, album: &Album, rating: Option<u8>, query: &AlbumSearchQuery) -> bool {
    if let Some(needle) = &query.band_name_contains {
        if !band.band_name.to_lowercase().contains(&needle.to_lowercase()) {
            return false;
        }
    }
    if let Some(needle) = &query.album_name_contains {
        if !album.album_name.to_lowercase().contains(&needle.to_lowercase()) {
            return false;
        }
    }
    if let Some(types) = &query.type_in {
        if !types.contains(&album.album_type) {
            return false;
        }
    }
    if let Some(needle) = &query.edition_contains {
        match &album.edition {
            Some(edition) if edition.to_lowercase().contains(&needle.to_lowercase()) => {}
            _ => return false,
        }
    }
    if let Some(year_min) = &query.year_min {
        match album.year.as_deref().and_then(|y| y.parse::<u32>().ok()) {
            Some(year) if year >= year_min.parse().unwrap_or(0) => {}
            _ => return false,
        }
    }
    if let Some(year_max) = &query.year_max {
        match album.year.as_deref().and_then(|y| y.parse::<u32>().ok()) {
            Some(year) if year <= year_max.parse().unwrap_or(u32::MAX) => {}
            _ => return false,
        }
    }
    if let Some(tracks_min) = query.tracks_min {
        if album.tracks_count.unwrap_or(0) < tracks_min {
            return false;
        }
    }
    if let Some(tracks_max) = query.tracks_max {
        if album.tracks_count.unwrap_or(u32::MAX) > tracks_max {
            return false;
        }
    }
    if let Some(rating_min) = query.rating_min {
        if rating.unwrap_or(0) < rating_min {
            return false;
        }
    }
    if let Some(rating_max) = query.rating_max {
        if rating.unwrap_or(u8::MAX) > rating_max {
            return false;
        }
    }
    if let Some(levels) = &query.compliance_level_in {
        match album.compliance.as_ref() {
            Some(compliance) if levels.contains(&compliance.level) => {}
            _ => return false,
        }
    }
    if query.missing_only && !album.missing {
        return false;
    }
    if query.present_only && album.missing {
        return false;
    }
    true
}

/// Searches albums across every given band; AND-composes all 13 filters.
/// Stable sort: ties break by `band_name` then `album_name` then `year`.
pub fn advanced_search_albums(bands: &[Band], query: &AlbumSearchQuery) -> Vec<AlbumSearchHit> {
    let mut hits: Vec<AlbumSearchHit> = Vec::new();

    for band in bands {
        for album in band.albums.iter().chain(band.albums_missing.iter()) {
            let rating = album_rating(band, album);
            if album_matches(band, album, rating, query) {
                hits.push(AlbumSearchHit {
                    band_name: band.band_name.clone(),
                    album: album.clone(),
                    rating,
                });
            }
        }
    }

    hits.sort_by(|a, b| {
        a.band_name
            .cmp(&b.band_name)
            .then_with(|| a.album.album_name.cmp(&b.album.album_name))
            .then_with(|| a.album.year.cmp(&b.album.year))
    });

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(name: &str, albums_count: usize, missing: usize) -> BandIndexEntry {
        BandIndexEntry {
            band_name: name.to_string(),
            folder_path: name.to_string(),
            albums_count,
            local_albums: albums_count - missing,
            missing_albums: missing,
            has_metadata: true,
            has_analysis: false,
            last_updated: Utc::now(),
            last_scanned: Utc::now(),
        }
    }

    #[test]
    fn search_filters_by_substring() {
        let bands = vec![
            (Band::new("Pink Floyd"), entry("Pink Floyd", 3, 0)),
            (Band::new("Rush"), entry("Rush", 2, 0)),
        ];
        let mut query = BandListQuery::default();
        query.filters.search = Some("floyd".to_string());
        let result = get_band_list(&bands, &query);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].band_name, "Pink Floyd");
    }

    #[test]
    fn pagination_splits_results() {
        let bands: Vec<_> = (0..5)
            .map(|i| {
                let name = format!("Band {i}");
                (Band::new(&name), entry(&name, 1, 0))
            })
            .collect();
        let query = BandListQuery {
            page: 2,
            page_size: 2,
            ..Default::default()
        };
        let result = get_band_list(&bands, &query);
        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.total_pages, 3);
    }

    #[test]
    fn advanced_search_matches_type_and_year_range() {
        let mut band = Band::new("Pink Floyd");
        let mut album = Album::new("Delicate Sound of Thunder");
        album.album_type = AlbumType::Live;
        album.year = Some("1988".to_string());
        album.folder_path = Some("Live/1988 - Delicate Sound of Thunder".to_string());
        band.albums.push(album);
        band.analyze = Some(crate::core::domain::band::BandAnalysis {
            review: None,
            rate: None,
            similar_bands: Vec::new(),
            albums: vec![crate::core::domain::band::AlbumAnalysis {
                album_name: "Delicate Sound of Thunder".to_string(),
                review: None,
                rate: Some(8),
            }],
        });

        let query = AlbumSearchQuery {
            type_in: Some(vec![AlbumType::Live]),
            year_min: Some("1980".to_string()),
            year_max: Some("1989".to_string()),
            rating_min: Some(7),
            ..Default::default()
        };

        let hits = advanced_search_albums(&[band], &query);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].album.album_name, "Delicate Sound of Thunder");
    }
}
