//! Durable persistence: per-band metadata, the collection index, the
//! read-through cache, and per-band locking (spec.md §4.6).

pub mod band_store;
pub mod cache;
pub mod index_store;
pub mod insight_store;
pub mod lock;

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::Utc;
use serde::Serialize;

use crate::core::domain::album::Album;
use crate::core::domain::band::{Band, BandAnalysis};
use crate::core::domain::index::{BandIndexEntry, CollectionIndex, CollectionInsight};
use crate::core::domain::schema_version::recompute_derived_fields;
use crate::core::errors::BandVaultError;
use crate::core::services::scanner::{self, CollectionScanResult};
use crate::core::services::validator::{self, ValidationReport};
use cache::MetadataCache;
use lock::LockRegistry;

/// Caller-supplied fields for `save_band_metadata`; a field left `None`
/// leaves the existing stored value (if any) untouched.
#[derive(Debug, Clone, Default)]
pub struct BandMetadataPatch {
    pub formed: Option<String>,
    pub genres: Option<Vec<String>>,
    pub origin: Option<String>,
    pub members: Option<Vec<String>>,
    pub description: Option<String>,
    pub albums: Option<Vec<Album>>,
    pub albums_missing: Option<Vec<Album>>,
    pub analyze: Option<BandAnalysis>,
    pub gallery: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub bands_scanned: usize,
    pub bands_skipped: usize,
    pub warnings: Vec<String>,
    pub index: CollectionIndex,
}

/// Wire result for every save operation (spec.md §6.2).
#[derive(Debug, Clone, Serialize)]
pub struct SaveResult {
    pub band_name: String,
    pub band: Band,
}

/// Owns the filesystem root and every durable-state concern: locks, cache,
/// per-band files, and the collection index.
pub struct Storage {
    root: PathBuf,
    locks: LockRegistry,
    cache: MetadataCache,
    lock_timeout: Duration,
}

impl Storage {
    pub fn new(root: PathBuf, cache_ttl: Duration, lock_timeout: Duration) -> Self {
        Self {
            root,
            locks: LockRegistry::new(),
            cache: MetadataCache::new(cache_ttl),
            lock_timeout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn band_folder(&self, band_name: &str) -> PathBuf {
        self.root.join(band_name)
    }

    fn folder_mtime(folder: &Path) -> SystemTime {
        std::fs::metadata(band_store::metadata_path(folder))
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH)
    }

    /// Loads one band's metadata, consulting the cache first.
    pub fn load_band(&self, band_name: &str) -> Result<Option<Band>, BandVaultError> {
        let folder = self.band_folder(band_name);
        let mtime = Self::folder_mtime(&folder);
        if let Some(band) = self.cache.get(&folder, mtime) {
            return Ok(Some(band));
        }
        let loaded = band_store::load(&folder)?;
        if let Some(band) = &loaded {
            self.cache.put(&folder, band.clone(), mtime);
        }
        Ok(loaded)
    }

    /// Loads every band named in the collection index.
    pub fn load_all_bands(&self) -> Result<Vec<Band>, BandVaultError> {
        let index = index_store::load(&self.root)?;
        index
            .bands
            .iter()
            .filter_map(|entry| self.load_band(&entry.band_name).transpose())
            .collect()
    }

    /// Loads the joined `(Band, BandIndexEntry)` view the Query Engine needs
    /// for `get_band_list` filters that require full band records.
    pub fn load_band_list_view(&self) -> Result<Vec<(Band, BandIndexEntry)>, BandVaultError> {
        let index = index_store::load(&self.root)?;
        let mut joined = Vec::with_capacity(index.bands.len());
        for entry in index.bands {
            if let Some(band) = self.load_band(&entry.band_name)? {
                joined.push((band, entry));
            }
        }
        Ok(joined)
    }

    fn index_entry_for(&self, band_name: &str, folder: &Path, band: &Band, previous: Option<&BandIndexEntry>) -> BandIndexEntry {
        BandIndexEntry {
            band_name: band_name.to_string(),
            folder_path: folder
                .strip_prefix(&self.root)
                .unwrap_or(folder)
                .to_string_lossy()
                .into_owned(),
            albums_count: band.albums_count(),
            local_albums: band.local_albums_count(),
            missing_albums: band.missing_albums_count(),
            has_metadata: true,
            has_analysis: band.analyze.is_some(),
            last_updated: band.last_updated,
            last_scanned: previous.map(|p| p.last_scanned).unwrap_or(band.last_updated),
        }
    }

    fn upsert_index_entry(&self, entry: BandIndexEntry) -> Result<(), BandVaultError> {
        self.upsert_index_entries(vec![entry])
    }

    /// Merges several index entries and rewrites the index file once, so a
    /// scan touching many bands doesn't pay a full index load/save per band.
    fn upsert_index_entries(&self, entries: Vec<BandIndexEntry>) -> Result<(), BandVaultError> {
        let mut index = index_store::load(&self.root)?;
        for entry in entries {
            index.bands.retain(|b| b.band_name != entry.band_name);
            index.bands.push(entry);
        }
        index.bands.sort_by(|a, b| a.band_name.cmp(&b.band_name));
        let rebuilt = CollectionIndex::rebuild(index.bands);
        index_store::save(&self.root, &rebuilt)?;
        Ok(())
    }

    /// Runs a full or incremental scan, persists every changed band, and
    /// rebuilds the collection index. Index rewrites are batched in groups
    /// of `batch_size` bands rather than once per band.
    pub fn scan(&self, force_full_scan: bool, max_workers: usize, batch_size: usize) -> Result<ScanOutcome, BandVaultError> {
        let existing_index = index_store::load(&self.root)?;
        let mut existing_bands = std::collections::HashMap::new();
        for entry in &existing_index.bands {
            if let Some(band) = self.load_band(&entry.band_name)? {
                existing_bands.insert(entry.band_name.clone(), band);
            }
        }

        let result: CollectionScanResult = if force_full_scan || existing_index.bands.is_empty() {
            scanner::full_scan(&self.root, &existing_bands, max_workers)
        } else {
            let last_scan_time = existing_index
                .bands
                .iter()
                .map(|b| b.last_scanned)
                .max()
                .unwrap_or_else(Utc::now);
            scanner::incremental_scan(&self.root, &existing_bands, last_scan_time, max_workers)
        };

        let batch_size = batch_size.max(1);
        let mut warnings = Vec::new();
        let mut pending_entries = Vec::with_capacity(batch_size);
        for band_result in &result.bands {
            let folder = self.band_folder(&band_result.band_name);
            band_store::save(&folder, &band_result.band)?;
            self.cache.invalidate(&folder);
            let previous = existing_index.bands.iter().find(|b| b.band_name == band_result.band_name);
            let entry = self.index_entry_for(&band_result.band_name, &folder, &band_result.band, previous);
            pending_entries.push(entry);
            warnings.extend(band_result.warnings.iter().cloned());

            if pending_entries.len() >= batch_size {
                self.upsert_index_entries(std::mem::take(&mut pending_entries))?;
            }
        }
        if !pending_entries.is_empty() {
            self.upsert_index_entries(pending_entries)?;
        }

        let index = index_store::load(&self.root)?;
        crate::core::logging::log_scan_operation(&self.root, result.scanned_count, result.skipped_count);

        Ok(ScanOutcome {
            bands_scanned: result.scanned_count,
            bands_skipped: result.skipped_count,
            warnings,
            index,
        })
    }

    fn merge_patch(existing: Option<Band>, band_name: &str, patch: BandMetadataPatch, preserve_analyze: bool) -> Band {
        let mut band = existing.unwrap_or_else(|| Band::new(band_name));
        if let Some(formed) = patch.formed {
            band.formed = Some(formed);
        }
        if let Some(genres) = patch.genres {
            band.genres = genres;
        }
        if let Some(origin) = patch.origin {
            band.origin = Some(origin);
        }
        if let Some(members) = patch.members {
            band.members = members;
        }
        if let Some(description) = patch.description {
            band.description = Some(description);
        }
        if let Some(albums) = patch.albums {
            band.albums = albums;
        }
        if let Some(albums_missing) = patch.albums_missing {
            band.albums_missing = albums_missing;
        }
        if let Some(gallery) = patch.gallery {
            band.gallery = gallery;
        }
        match patch.analyze {
            Some(mut analyze) => {
                validator::normalize_ratings(&mut analyze);
                band.analyze = Some(analyze);
            }
            None if !preserve_analyze => band.analyze = None,
            None => {}
        }
        band.last_updated = Utc::now();
        band
    }

    /// Validates a prospective merge without writing anything — realizes
    /// the Validator's dry-run mode, since validation is already a pure
    /// function of the merged record.
    pub fn validate_band_metadata(&self, band_name: &str, patch: BandMetadataPatch) -> Result<ValidationReport, BandVaultError> {
        let existing = self.load_band(band_name)?;
        let merged = Self::merge_patch(existing, band_name, patch, true);
        let report = validator::validate_band(&merged);
        crate::core::logging::log_validation_operation(band_name, report.errors.len(), report.warnings.len());
        Ok(report)
    }

    /// Read-modify-write cycle under the band's lock: merge, validate, write,
    /// then refresh the cache and index entry.
    pub fn save_band_metadata(&self, band_name: &str, patch: BandMetadataPatch, preserve_analyze: bool) -> Result<Band, BandVaultError> {
        let folder = self.band_folder(band_name);
        let _guard = self.locks.acquire(&folder, self.lock_timeout)?;

        let existing = band_store::load(&folder)?;
        let previous_entry = index_store::load(&self.root)?
            .bands
            .into_iter()
            .find(|b| b.band_name == band_name);

        let mut merged = Self::merge_patch(existing, band_name, patch, preserve_analyze);
        recompute_derived_fields(&mut merged);
        let report = validator::validate_band(&merged);
        if !report.is_valid() {
            let messages: Vec<String> = report.errors.iter().map(|e| format!("{}: {}", e.field, e.message)).collect();
            return Err(BandVaultError::Validation(messages.join("; ")));
        }

        band_store::save(&folder, &merged)?;
        let mtime = Self::folder_mtime(&folder);
        self.cache.put(&folder, merged.clone(), mtime);

        let entry = self.index_entry_for(band_name, &folder, &merged, previous_entry.as_ref());
        self.upsert_index_entry(entry)?;

        crate::core::logging::log_metadata_write(band_name, true);
        Ok(merged)
    }

    /// Saves editorial analysis for a band. When `analyze_missing_albums` is
    /// false, rejects annotations naming an album that is currently missing
    /// (you cannot meaningfully review audio you don't have).
    pub fn save_band_analyze(&self, band_name: &str, analysis: BandAnalysis, analyze_missing_albums: bool) -> Result<Band, BandVaultError> {
        if !analyze_missing_albums {
            let existing = self.load_band(band_name)?.ok_or_else(|| BandVaultError::NotFound(band_name.to_string()))?;
            let missing_keys: std::collections::HashSet<String> = existing
                .albums_missing
                .iter()
                .map(|a| crate::core::services::normalization::normalize_album_name(&a.album_name))
                .collect();
            for annotation in &analysis.albums {
                let key = crate::core::services::normalization::normalize_album_name(&annotation.album_name);
                if missing_keys.contains(&key) {
                    return Err(BandVaultError::Validation(format!(
                        "'{}' is a missing album; pass analyze_missing_albums=true to annotate it",
                        annotation.album_name
                    )));
                }
            }
        }

        let patch = BandMetadataPatch {
            analyze: Some(analysis),
            ..Default::default()
        };
        self.save_band_metadata(band_name, patch, true)
    }

    pub fn save_collection_insight(&self, insight: CollectionInsight) -> Result<(), BandVaultError> {
        insight_store::save(&self.root, &insight)
    }

    pub fn load_collection_insight(&self) -> Result<Option<CollectionInsight>, BandVaultError> {
        insight_store::load(&self.root)
    }

    pub fn rebuild_index(&self) -> Result<CollectionIndex, BandVaultError> {
        index_store::load(&self.root)
    }
}
