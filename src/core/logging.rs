//! Logging utilities for the collection indexing service.

use log::LevelFilter;
use std::path::Path;

/// Initializes application logging at the given default level, honoring `RUST_LOG`.
pub fn init_logging(level: LevelFilter) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.to_string())).init();
}

/// Logs the outcome of a full or incremental scan.
pub fn log_scan_operation(root: &Path, bands_scanned: usize, bands_skipped: usize) {
    log::info!(
        "scanned {bands_scanned} band(s), skipped {bands_skipped} under {}",
        root.display()
    );
}

/// Logs a band metadata read.
pub fn log_metadata_read(band_name: &str, success: bool) {
    if success {
        log::debug!("read metadata for '{band_name}'");
    } else {
        log::warn!("failed to read metadata for '{band_name}'");
    }
}

/// Logs a band metadata write.
pub fn log_metadata_write(band_name: &str, success: bool) {
    if success {
        log::info!("wrote metadata for '{band_name}'");
    } else {
        log::error!("failed to write metadata for '{band_name}'");
    }
}

/// Logs the outcome of validating one band.
pub fn log_validation_operation(band_name: &str, errors_count: usize, warnings_count: usize) {
    if errors_count > 0 || warnings_count > 0 {
        log::warn!("validation for '{band_name}': {errors_count} errors, {warnings_count} warnings");
    } else {
        log::info!("validation passed for '{band_name}'");
    }
}

/// Logs progress during a long-running scan, emitted every 10 bands past the threshold.
pub fn log_scan_progress(done: usize, total: usize, eta_seconds: f64) {
    log::info!("scanned {done}/{total} bands (eta {eta_seconds:.0}s)");
}

/// Logs an error with additional context.
pub fn log_error_with_context(context: &str, error: &dyn std::error::Error) {
    log::error!("error in {context}: {error}");
}
