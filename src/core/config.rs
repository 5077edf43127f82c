//! Application-wide configuration constants.

/// Default number of parallel band-scan workers (spec.md §5).
pub const DEFAULT_MAX_SCAN_WORKERS: usize = 4;

/// Default number of bands flushed to disk per batch during a full scan.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Default TTL, in days, for the collection-index read cache.
pub const DEFAULT_CACHE_DURATION_DAYS: i64 = 30;

/// Default wait before a per-band file lock acquisition gives up.
pub const DEFAULT_LOCK_TIMEOUT_SECONDS: u64 = 5;

/// Default wait before a whole-collection operation (full scan, analytics) gives up.
pub const DEFAULT_OPERATION_TIMEOUT_SECONDS: u64 = 30;

/// Maximum allowed track count on a single album.
pub const MAX_TRACKS_COUNT: u32 = 999;

/// Minimum valid release year.
pub const MIN_YEAR: u32 = 1000;

/// Maximum valid release year.
pub const MAX_YEAR: u32 = 3000;

/// Name of the per-band metadata file written under each band folder.
pub const BAND_METADATA_FILENAME: &str = ".band_metadata.json";

/// Name of the collection-wide index file written at the library root.
pub const COLLECTION_INDEX_FILENAME: &str = ".collection_index.json";
