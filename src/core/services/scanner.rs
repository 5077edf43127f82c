//! Discovers bands and albums on disk and scans each band (spec.md §4.4).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::warn;
use rayon::prelude::*;

use crate::core::domain::album::{Album, AlbumType};
use crate::core::domain::band::Band;
use crate::core::logging::log_scan_progress;
use crate::core::services::compliance_scorer::{self, ComplianceContext};
use crate::core::services::folder_parser;
use crate::core::services::reconciler::{self, PhysicalAlbum};
use crate::core::services::structure_analyzer::{self, AlbumFolderObservation};

/// Case-insensitive recognized music file extensions.
const MUSIC_EXTENSIONS: &[&str] = &["mp3", "flac", "wav", "aac", "m4a", "ogg", "wma", "mp4", "m4p"];

/// Folders never considered as bands, even if they contain album-shaped subfolders.
const EXCLUDED_FOLDERS: &[&str] = &["lost+found", "$recycle.bin", "system volume information"];

const FORBIDDEN_CHARS: &[char] = &[':', '?', '*', '|', '"', '<', '>'];

/// Progress events are only emitted for scans touching more than this many bands.
const PROGRESS_THRESHOLD: usize = 50;

fn is_music_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| MUSIC_EXTENSIONS.iter().any(|m| m.eq_ignore_ascii_case(e)))
}

fn is_excluded(name: &str) -> bool {
    name.starts_with('.') || EXCLUDED_FOLDERS.iter().any(|e| e.eq_ignore_ascii_case(name))
}

fn forbidden_char_count(name: &str) -> usize {
    name.chars().filter(|c| FORBIDDEN_CHARS.contains(c)).count()
}

/// Counts recognized music files directly inside `dir` (no recursion).
/// `Err` means `dir` itself could not be read (e.g. permission denied),
/// distinct from `Ok(0)` meaning it was read and found empty.
fn direct_music_file_count(dir: &Path) -> std::io::Result<usize> {
    Ok(std::fs::read_dir(dir)?
        .flatten()
        .filter(|e| e.path().is_file() && is_music_file(&e.path()))
        .count())
}

fn directory_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

/// A single album folder found under one band, before reconciliation.
struct DiscoveredAlbum {
    folder_name: String,
    type_folder: Option<String>,
    relative_path: String,
    track_count: usize,
    /// Set when the folder's contents could not be read (permission denied
    /// or another IO error), rather than genuinely containing no music files.
    unreadable: bool,
}

/// Walks a band folder for album folders, recursing exactly one level into
/// any folder named for a recognized type.
fn discover_album_folders(band_path: &Path) -> Vec<DiscoveredAlbum> {
    let mut found = Vec::new();

    let Ok(entries) = std::fs::read_dir(band_path) else {
        return found;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = directory_name(&path);
        if is_excluded(&name) {
            continue;
        }

        if let Some(album_type) = AlbumType::parse(&name) {
            let Ok(sub_entries) = std::fs::read_dir(&path) else {
                continue;
            };
            for sub in sub_entries.flatten() {
                let sub_path = sub.path();
                if !sub_path.is_dir() {
                    continue;
                }
                let sub_name = directory_name(&sub_path);
                if is_excluded(&sub_name) {
                    continue;
                }
                let (track_count, unreadable) = match direct_music_file_count(&sub_path) {
                    Ok(0) => continue,
                    Ok(count) => (count, false),
                    Err(_) => (0, true),
                };
                found.push(DiscoveredAlbum {
                    folder_name: sub_name,
                    type_folder: Some(album_type.folder_name().to_string()),
                    relative_path: format!("{name}/{}", directory_name(&sub_path)),
                    track_count,
                    unreadable,
                });
            }
            continue;
        }

        let (track_count, unreadable) = match direct_music_file_count(&path) {
            Ok(0) => continue,
            Ok(count) => (count, false),
            Err(_) => (0, true),
        };
        found.push(DiscoveredAlbum {
            folder_name: name.clone(),
            type_folder: None,
            relative_path: name,
            track_count,
            unreadable,
        });
    }

    found
}

/// True iff `band_path` contains at least one album folder.
fn has_album_folder(band_path: &Path) -> bool {
    !discover_album_folders(band_path).is_empty()
}

/// Immediate subdirectories of `root` that qualify as band folders.
pub fn discover_band_folders(root: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };

    let mut bands: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.is_dir()
                && !is_excluded(&directory_name(p))
                && has_album_folder(p)
        })
        .collect();
    bands.sort();
    bands
}

/// Classifies one discovered album folder into a `PhysicalAlbum`, running
/// the Folder Parser and Compliance Scorer against the band's structure type.
fn classify_album(
    discovered: &DiscoveredAlbum,
    structure_type: crate::core::domain::band::StructureType,
) -> Result<PhysicalAlbum, String> {
    let parsed = folder_parser::parse_folder_name(&discovered.folder_name, discovered.type_folder.as_deref())
        .map_err(|e| e.to_string())?;

    let album_type = folder_parser::resolve_album_type(parsed.album_type_hint, discovered.track_count);

    let unparenthesized_edition = parsed.edition.is_none() && folder_parser::contains_edition_keyword(&parsed.album_name);
    let type_keyword_in_name = folder_parser::has_type_keyword(&parsed.album_name);
    let under_correct_type_folder = match &discovered.type_folder {
        Some(tf) => AlbumType::parse(tf) == Some(album_type),
        None => !type_keyword_in_name,
    };

    let ctx = ComplianceContext {
        album_name: &parsed.album_name,
        year: parsed.year.as_deref(),
        edition: parsed.edition.as_deref(),
        album_type,
        structure_type,
        has_year_prefix: parsed.year.is_some(),
        type_keyword_in_name,
        under_correct_type_folder,
        edition_in_parentheses: !unparenthesized_edition,
        forbidden_char_count: forbidden_char_count(&discovered.folder_name),
        is_empty: discovered.track_count == 0,
    };
    let compliance = compliance_scorer::score_album(&ctx);

    Ok(PhysicalAlbum {
        album_name: parsed.album_name,
        year: parsed.year,
        album_type,
        edition: parsed.edition,
        genres: Vec::new(),
        tracks_count: Some(discovered.track_count as u32),
        duration: None,
        folder_path: discovered.relative_path.clone(),
        compliance,
    })
}

/// A placeholder album for a folder that could not be classified or read,
/// so a single bad folder doesn't drop the album from the collection
/// entirely — it surfaces as a critical-compliance entry instead.
fn placeholder_album(discovered: &DiscoveredAlbum, issue: &str) -> PhysicalAlbum {
    PhysicalAlbum {
        album_name: discovered.folder_name.clone(),
        year: None,
        album_type: AlbumType::Album,
        edition: None,
        genres: Vec::new(),
        tracks_count: Some(0),
        duration: None,
        folder_path: discovered.relative_path.clone(),
        compliance: crate::core::domain::album::AlbumCompliance {
            score: 0,
            level: crate::core::domain::album::ComplianceLevel::Critical,
            issues: vec![issue.to_string()],
            recommended_path: None,
        },
    }
}

/// Result of scanning exactly one band folder.
pub struct BandScanResult {
    pub band_name: String,
    pub folder_path: String,
    pub band: Band,
    pub warnings: Vec<String>,
}

/// Scans one band folder: structure analysis, album discovery and
/// classification, then reconciliation against `existing` (if present).
pub fn scan_band(band_path: &Path, band_name: &str, existing: Option<Band>) -> BandScanResult {
    let mut warnings = Vec::new();
    let discovered = discover_album_folders(band_path);

    // First pass: a provisional structure type from year-prefix/type-folder
    // shape alone, since the Compliance Scorer needs it for each album and
    // the Structure Analyzer needs each album's final classification.
    let provisional_observations: Vec<AlbumFolderObservation> = discovered
        .iter()
        .map(|d| AlbumFolderObservation {
            type_folder: d.type_folder.clone(),
            has_year_prefix: folder_parser::parse_folder_name(&d.folder_name, d.type_folder.as_deref())
                .map(|p| p.year.is_some())
                .unwrap_or(false),
            edition: None,
            has_forbidden_chars: forbidden_char_count(&d.folder_name) > 0,
        })
        .collect();
    let provisional_structure = structure_analyzer::analyze_structure(&provisional_observations);

    let mut physical = Vec::new();
    for d in &discovered {
        if d.unreadable {
            warnings.push(format!("{}: permission denied or IO error reading album folder", d.folder_name));
            physical.push(placeholder_album(d, "placeholder: folder contents could not be read (IO error)"));
            continue;
        }
        match classify_album(d, provisional_structure.structure_type) {
            Ok(album) => physical.push(album),
            Err(e) => {
                warnings.push(format!("{}: {e}", d.folder_name));
                physical.push(placeholder_album(d, "placeholder: could not classify this folder"));
            }
        }
    }

    // Recompute the final structure report from each album's resolved type
    // and edition, now that classification has completed.
    let final_observations: Vec<AlbumFolderObservation> = discovered
        .iter()
        .zip(physical.iter())
        .map(|(d, p)| AlbumFolderObservation {
            type_folder: d.type_folder.clone(),
            has_year_prefix: p.year.is_some(),
            edition: p.edition.clone(),
            has_forbidden_chars: forbidden_char_count(&d.folder_name) > 0,
        })
        .collect();
    let structure = structure_analyzer::analyze_structure(&final_observations);

    let stored_albums: Vec<Album> = existing
        .as_ref()
        .map(|b| b.albums.iter().chain(b.albums_missing.iter()).cloned().collect())
        .unwrap_or_default();

    let reconciliation = reconciler::reconcile(physical, stored_albums, structure.structure_type);
    for (name, path) in &reconciliation.missing_recommendations {
        warnings.push(format!("missing album '{name}': recommended path '{path}'"));
    }

    let mut band = existing.unwrap_or_else(|| Band::new(band_name));
    band.band_name = band_name.to_string();
    band.albums = reconciliation.albums;
    band.albums_missing = reconciliation.albums_missing;
    band.folder_structure = Some(structure);
    band.last_updated = Utc::now();

    BandScanResult {
        band_name: band_name.to_string(),
        folder_path: directory_name(band_path),
        band,
        warnings,
    }
}

pub struct CollectionScanResult {
    pub bands: Vec<BandScanResult>,
    pub scanned_count: usize,
    pub skipped_count: usize,
}

fn run_scan(
    root: &Path,
    existing: &HashMap<String, Band>,
    band_paths: Vec<PathBuf>,
    max_workers: usize,
) -> Vec<BandScanResult> {
    let _ = rayon::ThreadPoolBuilder::new().num_threads(max_workers).build_global();

    let total = band_paths.len();
    let completed = AtomicUsize::new(0);
    let started = Instant::now();
    let emit_progress = total > PROGRESS_THRESHOLD;

    band_paths
        .into_par_iter()
        .map(|band_path| {
            let band_name = directory_name(&band_path);
            let existing_band = existing.get(&band_name).cloned();
            let result = scan_band(&band_path, &band_name, existing_band);

            if emit_progress {
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if done % 10 == 0 || done == total {
                    let elapsed = started.elapsed().as_secs_f64();
                    let eta = if done > 0 {
                        elapsed / done as f64 * (total - done) as f64
                    } else {
                        0.0
                    };
                    log_scan_progress(done, total, eta);
                }
            }
            if !result.warnings.is_empty() {
                warn!(target: "bandvault", "{} warnings scanning '{}'", result.warnings.len(), band_name);
            }
            result
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

/// Scans every band under `root`.
pub fn full_scan(root: &Path, existing: &HashMap<String, Band>, max_workers: usize) -> CollectionScanResult {
    let band_paths = discover_band_folders(root);
    let scanned_count = band_paths.len();
    let bands = run_scan(root, existing, band_paths, max_workers);
    CollectionScanResult {
        bands,
        scanned_count,
        skipped_count: 0,
    }
}

/// Decides whether a band needs rescanning: absent from the index, or its
/// folder/metadata file mtime is newer than `last_scan_time`.
fn should_rescan(
    band_path: &Path,
    metadata_path: &Path,
    indexed: bool,
    last_scan_time: DateTime<Utc>,
) -> bool {
    if !indexed {
        return true;
    }
    let newer_than = |path: &Path| -> bool {
        std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(DateTime::<Utc>::from)
            .is_some_and(|mtime| mtime > last_scan_time)
    };
    newer_than(band_path) || newer_than(metadata_path)
}

/// Scans only bands whose folder or metadata file changed since `last_scan_time`.
pub fn incremental_scan(
    root: &Path,
    existing: &HashMap<String, Band>,
    last_scan_time: DateTime<Utc>,
    max_workers: usize,
) -> CollectionScanResult {
    let all_bands = discover_band_folders(root);
    let mut to_scan = Vec::new();
    let mut skipped_count = 0;

    for band_path in all_bands {
        let band_name = directory_name(&band_path);
        let metadata_path = band_path.join(".band_metadata.json");
        let indexed = existing.contains_key(&band_name);
        if should_rescan(&band_path, &metadata_path, indexed, last_scan_time) {
            to_scan.push(band_path);
        } else {
            skipped_count += 1;
        }
    }

    let scanned_count = to_scan.len();
    let bands = run_scan(root, existing, to_scan, max_workers);
    CollectionScanResult {
        bands,
        scanned_count,
        skipped_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn discovers_enhanced_structure_band() {
        let dir = tempfile::tempdir().unwrap();
        let band = dir.path().join("Pink Floyd");
        let album = band.join("Album").join("1973 - The Dark Side of the Moon");
        let live = band.join("Live").join("1988 - Delicate Sound of Thunder");
        fs::create_dir_all(&album).unwrap();
        fs::create_dir_all(&live).unwrap();
        touch(&album.join("01.mp3"));
        touch(&album.join("02.mp3"));
        touch(&live.join("01.mp3"));

        let bands = discover_band_folders(dir.path());
        assert_eq!(bands.len(), 1);

        let result = scan_band(&bands[0], "Pink Floyd", None);
        assert_eq!(result.band.albums.len(), 2);
        assert_eq!(
            result.band.folder_structure.as_ref().unwrap().structure_type,
            crate::core::domain::band::StructureType::Enhanced
        );
    }

    #[test]
    fn excludes_dotfiles_and_metadata_only_folders() {
        let dir = tempfile::tempdir().unwrap();
        let hidden = dir.path().join(".hidden");
        fs::create_dir_all(&hidden).unwrap();
        assert!(discover_band_folders(dir.path()).is_empty());
    }
}
