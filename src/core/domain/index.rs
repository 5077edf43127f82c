//! Collection-wide index and statistics (spec.md §4.7).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BandIndexEntry {
    pub band_name: String,
    pub folder_path: String,
    pub albums_count: usize,
    pub local_albums: usize,
    pub missing_albums: usize,
    pub has_metadata: bool,
    pub has_analysis: bool,
    pub last_updated: DateTime<Utc>,
    pub last_scanned: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CollectionStats {
    pub total_bands: usize,
    pub total_albums: usize,
    pub total_missing_albums: usize,
    pub completion_percentage: f64,
    /// Set when `total_albums == 0` — §9 Open Question 2: completion is
    /// reported as 100% but flagged undefined rather than silently implying
    /// a fully-complete collection.
    #[serde(default)]
    pub completion_undefined: bool,
    pub bands_with_metadata: usize,
    pub bands_with_analysis: usize,
    pub avg_albums_per_band: f64,
    pub median_albums_per_band: f64,
    pub min_albums_per_band: usize,
    pub max_albums_per_band: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CollectionIndex {
    pub bands: Vec<BandIndexEntry>,
    pub stats: CollectionStats,
}

/// Collection-wide editorial annotation, analogous to `BandAnalysis` but
/// scoped to the whole library rather than a single band. Persisted
/// separately from the index since it is caller-authored, not scan-derived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionInsight {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl CollectionIndex {
    pub fn rebuild(entries: Vec<BandIndexEntry>) -> CollectionIndex {
        let stats = compute_stats(&entries);
        CollectionIndex {
            bands: entries,
            stats,
        }
    }
}

fn compute_stats(entries: &[BandIndexEntry]) -> CollectionStats {
    let total_bands = entries.len();
    let total_albums: usize = entries.iter().map(|e| e.albums_count).sum();
    let total_missing_albums: usize = entries.iter().map(|e| e.missing_albums).sum();
    let bands_with_metadata = entries.iter().filter(|e| e.has_metadata).count();
    let bands_with_analysis = entries.iter().filter(|e| e.has_analysis).count();

    let (completion_percentage, completion_undefined) = if total_albums == 0 {
        (100.0, true)
    } else {
        (
            (total_albums - total_missing_albums) as f64 / total_albums as f64 * 100.0,
            false,
        )
    };

    let mut counts: Vec<usize> = entries.iter().map(|e| e.albums_count).collect();
    counts.sort_unstable();

    let avg_albums_per_band = if total_bands == 0 {
        0.0
    } else {
        total_albums as f64 / total_bands as f64
    };
    let median_albums_per_band = median(&counts);
    let min_albums_per_band = counts.first().copied().unwrap_or(0);
    let max_albums_per_band = counts.last().copied().unwrap_or(0);

    CollectionStats {
        total_bands,
        total_albums,
        total_missing_albums,
        completion_percentage,
        completion_undefined,
        bands_with_metadata,
        bands_with_analysis,
        avg_albums_per_band,
        median_albums_per_band,
        min_albums_per_band,
        max_albums_per_band,
    }
}

fn median(sorted: &[usize]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2] as f64
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) as f64 / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, local: usize, missing: usize) -> BandIndexEntry {
        BandIndexEntry {
            band_name: name.to_string(),
            folder_path: name.to_string(),
            albums_count: local + missing,
            local_albums: local,
            missing_albums: missing,
            has_metadata: true,
            has_analysis: false,
            last_updated: Utc::now(),
            last_scanned: Utc::now(),
        }
    }

    #[test]
    fn empty_index_reports_undefined_completion() {
        let idx = CollectionIndex::rebuild(vec![]);
        assert_eq!(idx.stats.completion_percentage, 100.0);
        assert!(idx.stats.completion_undefined);
    }

    #[test]
    fn computes_completion_and_median() {
        let idx = CollectionIndex::rebuild(vec![entry("A", 2, 1), entry("B", 3, 0), entry("C", 1, 1)]);
        assert_eq!(idx.stats.total_albums, 8);
        assert_eq!(idx.stats.total_missing_albums, 2);
        assert_eq!(idx.stats.completion_percentage, 75.0);
        assert!(!idx.stats.completion_undefined);
        assert_eq!(idx.stats.median_albums_per_band, 3.0);
    }
}
