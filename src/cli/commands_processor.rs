use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Commands;
use crate::core::config::{
    DEFAULT_BATCH_SIZE, DEFAULT_CACHE_DURATION_DAYS, DEFAULT_LOCK_TIMEOUT_SECONDS, DEFAULT_MAX_SCAN_WORKERS,
};
use crate::core::services::analytics::analyze_collection;
use crate::core::services::query::{self, AlbumSearchQuery, BandListQuery};
use crate::core::storage::{BandMetadataPatch, Storage};

fn storage_for(root: PathBuf) -> Storage {
    let cache_ttl = Duration::from_secs(DEFAULT_CACHE_DURATION_DAYS.max(0) as u64 * 86_400);
    Storage::new(root, cache_ttl, Duration::from_secs(DEFAULT_LOCK_TIMEOUT_SECONDS))
}

fn print_result<T: serde::Serialize + std::fmt::Debug>(value: &T, json: bool) {
    if json {
        match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("error serializing result: {e}"),
        }
    } else {
        println!("{value:#?}");
    }
}

/// Handle the parsed CLI command.
pub fn handle_command(command: Commands) -> Result<(), i32> {
    match command {
        Commands::Scan { root, full, json } => handle_scan(root, full, json),
        Commands::List { root, search, page, page_size, json } => handle_list(root, search, page, page_size, json),
        Commands::Validate { root, band_name, json } => handle_validate(root, band_name, json),
        Commands::Search { root, band, album, missing_only, json } => handle_search(root, band, album, missing_only, json),
        Commands::Analyze { root, json } => handle_analyze(root, json),
    }
}

fn handle_scan(root: PathBuf, full: bool, json: bool) -> Result<(), i32> {
    let storage = storage_for(root);
    match storage.scan(full, DEFAULT_MAX_SCAN_WORKERS, DEFAULT_BATCH_SIZE) {
        Ok(outcome) => {
            print_result(&outcome, json);
            Ok(())
        }
        Err(e) => {
            eprintln!("{e}");
            Err(1)
        }
    }
}

fn handle_list(root: PathBuf, search: Option<String>, page: usize, page_size: usize, json: bool) -> Result<(), i32> {
    let storage = storage_for(root);
    let query = BandListQuery {
        page,
        page_size,
        filters: query::BandListFilters { search, ..Default::default() },
        ..Default::default()
    };
    match storage.load_band_list_view() {
        Ok(joined) => {
            let result = query::get_band_list(&joined, &query);
            print_result(&result, json);
            Ok(())
        }
        Err(e) => {
            eprintln!("{e}");
            Err(1)
        }
    }
}

fn handle_validate(root: PathBuf, band_name: String, json: bool) -> Result<(), i32> {
    let storage = storage_for(root);
    match storage.validate_band_metadata(&band_name, BandMetadataPatch::default()) {
        Ok(report) => {
            print_result(&report, json);
            if report.is_valid() { Ok(()) } else { Err(1) }
        }
        Err(e) => {
            eprintln!("{e}");
            Err(1)
        }
    }
}

fn handle_search(root: PathBuf, band: Option<String>, album: Option<String>, missing_only: bool, json: bool) -> Result<(), i32> {
    let storage = storage_for(root);
    let query = AlbumSearchQuery {
        band_name_contains: band,
        album_name_contains: album,
        missing_only,
        ..Default::default()
    };
    match storage.load_all_bands() {
        Ok(bands) => {
            let hits = query::advanced_search_albums(&bands, &query);
            print_result(&hits, json);
            Ok(())
        }
        Err(e) => {
            eprintln!("{e}");
            Err(1)
        }
    }
}

fn handle_analyze(root: PathBuf, json: bool) -> Result<(), i32> {
    let storage = storage_for(root);
    match storage.load_all_bands() {
        Ok(bands) => {
            let analytics = analyze_collection(&bands);
            print_result(&analytics, json);
            Ok(())
        }
        Err(e) => {
            eprintln!("{e}");
            Err(1)
        }
    }
}
