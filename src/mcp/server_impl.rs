use std::time::Duration;

use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::{tool, tool_router, ErrorData as McpError};

use crate::core::errors::BandVaultError;
use crate::core::services::analytics::analyze_collection;
use crate::core::services::query::{
    self, AlbumSearchQuery, BandListFilters, BandListQuery, SortBy, SortOrder,
};
use crate::core::storage::{BandMetadataPatch, SaveResult};
use crate::mcp::call_tool_result::CallToolResultExt;
use crate::mcp::params::{
    AdvancedSearchAlbumsParams, AnalyzeCollectionInsightsParams, BandMetadataParams,
    GetBandListParams, SaveBandAnalyzeParams, SaveBandMetadataParams, SaveCollectionInsightParams,
    ScanMusicFoldersParams, ValidateBandMetadataParams,
};
use crate::mcp::server::BandVaultServer;

fn to_json_pretty<T: serde::Serialize>(value: &T) -> Result<String, McpError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| McpError::invalid_params(format!("JSON serialization error: {e}"), None))
}

fn patch_from_params(metadata: BandMetadataParams) -> BandMetadataPatch {
    BandMetadataPatch {
        formed: metadata.formed,
        genres: metadata.genres,
        origin: metadata.origin,
        members: metadata.members,
        description: metadata.description,
        albums: metadata.albums,
        albums_missing: metadata.albums_missing,
        analyze: None,
        gallery: metadata.gallery,
    }
}

fn parse_sort_by(s: Option<String>) -> SortBy {
    match s.as_deref() {
        Some("albums_count") => SortBy::AlbumsCount,
        Some("completion") => SortBy::Completion,
        Some("last_updated") => SortBy::LastUpdated,
        _ => SortBy::Name,
    }
}

fn parse_order(s: Option<String>) -> SortOrder {
    match s.as_deref() {
        Some("desc") => SortOrder::Desc,
        _ => SortOrder::Asc,
    }
}

/// Runs a blocking storage call off the async executor and bounds it by
/// `timeout`, so one slow band folder can't stall the whole server past the
/// configured `OPERATION_TIMEOUT_SECONDS`.
async fn run_with_timeout<T, F>(timeout: Duration, f: F) -> Result<T, BandVaultError>
where
    F: FnOnce() -> Result<T, BandVaultError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(timeout, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(result)) => result,
        Ok(Err(_)) => Err(BandVaultError::Other("storage task panicked".to_string())),
        Err(_) => Err(BandVaultError::Other(format!("operation exceeded the {timeout:?} timeout"))),
    }
}

#[tool_router]
impl BandVaultServer {
    #[tool(description = "Scan the music root for band/album folders, classify and reconcile each band, and update the collection index")]
    async fn scan_music_folders(
        &self,
        params: Parameters<ScanMusicFoldersParams>,
    ) -> Result<CallToolResult, McpError> {
        let force_full_scan = params.0.force_full_scan.unwrap_or(false) || params.0.force_rescan.unwrap_or(false);
        let storage = self.storage.clone();
        let max_scan_workers = self.config.max_scan_workers;
        let batch_size = self.config.batch_size;
        match run_with_timeout(self.config.operation_timeout, move || {
            storage.scan(force_full_scan, max_scan_workers, batch_size)
        })
        .await
        {
            Ok(outcome) => Ok(CallToolResult::success_text(to_json_pretty(&outcome)?)),
            Err(e) => Ok(CallToolResult::error_text(e.to_string())),
        }
    }

    #[tool(description = "List bands from the collection index with filtering, sorting, and pagination")]
    async fn get_band_list(
        &self,
        params: Parameters<GetBandListParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let query = BandListQuery {
            page: p.page.unwrap_or(1),
            page_size: p.page_size.unwrap_or(50),
            sort_by: parse_sort_by(p.sort_by),
            order: parse_order(p.order),
            filters: BandListFilters {
                search: p.search,
                has_metadata: p.filter_has_metadata,
                has_analysis: p.filter_has_analysis,
                filter_album_type: p.filter_album_type,
                filter_compliance_level: p.filter_compliance_level,
                filter_structure_type: p.filter_structure_type,
                min_rating: p.filter_min_rating,
                min_albums: p.filter_min_albums,
                has_missing: p.filter_has_missing,
            },
        };

        let storage = self.storage.clone();
        match run_with_timeout(self.config.operation_timeout, move || storage.load_band_list_view()).await {
            Ok(joined) => {
                let result = query::get_band_list(&joined, &query);
                Ok(CallToolResult::success_text(to_json_pretty(&result)?))
            }
            Err(e) => Ok(CallToolResult::error_text(e.to_string())),
        }
    }

    #[tool(description = "Merge caller-supplied fields into a band's stored metadata and write it atomically")]
    async fn save_band_metadata(
        &self,
        params: Parameters<SaveBandMetadataParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let patch = patch_from_params(p.metadata);
        let preserve_analyze = p.preserve_analyze.unwrap_or(true);
        let band_name = p.band_name;

        let storage = self.storage.clone();
        let band_name_for_call = band_name.clone();
        match run_with_timeout(self.config.operation_timeout, move || {
            storage.save_band_metadata(&band_name_for_call, patch, preserve_analyze)
        })
        .await
        {
            Ok(band) => {
                let result = SaveResult { band_name, band };
                Ok(CallToolResult::success_text(to_json_pretty(&result)?))
            }
            Err(e) => Ok(CallToolResult::error_text(e.to_string())),
        }
    }

    #[tool(description = "Save editorial review/rating analysis for a band")]
    async fn save_band_analyze(
        &self,
        params: Parameters<SaveBandAnalyzeParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let analyze_missing_albums = p.analyze_missing_albums.unwrap_or(false);
        let band_name = p.band_name;

        let storage = self.storage.clone();
        let band_name_for_call = band_name.clone();
        match run_with_timeout(self.config.operation_timeout, move || {
            storage.save_band_analyze(&band_name_for_call, p.analysis, analyze_missing_albums)
        })
        .await
        {
            Ok(band) => {
                let result = SaveResult { band_name, band };
                Ok(CallToolResult::success_text(to_json_pretty(&result)?))
            }
            Err(e) => Ok(CallToolResult::error_text(e.to_string())),
        }
    }

    #[tool(description = "Save a collection-wide editorial summary")]
    async fn save_collection_insight(
        &self,
        params: Parameters<SaveCollectionInsightParams>,
    ) -> Result<CallToolResult, McpError> {
        let insight = crate::core::domain::CollectionInsight {
            summary: params.0.insight.summary,
            highlights: params.0.insight.highlights.unwrap_or_default(),
            generated_at: chrono::Utc::now(),
        };
        let storage = self.storage.clone();
        match run_with_timeout(self.config.operation_timeout, move || storage.save_collection_insight(insight)).await {
            Ok(()) => Ok(CallToolResult::success_text("{\"success\":true}".to_string())),
            Err(e) => Ok(CallToolResult::error_text(e.to_string())),
        }
    }

    #[tool(description = "Validate a prospective metadata merge without writing anything")]
    async fn validate_band_metadata(
        &self,
        params: Parameters<ValidateBandMetadataParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let patch = patch_from_params(p.metadata);
        let band_name = p.band_name;

        let storage = self.storage.clone();
        match run_with_timeout(self.config.operation_timeout, move || storage.validate_band_metadata(&band_name, patch)).await {
            Ok(report) => Ok(CallToolResult::success_text(to_json_pretty(&report)?)),
            Err(e) => Ok(CallToolResult::error_text(e.to_string())),
        }
    }

    #[tool(description = "Search across every band's albums with up to 13 AND-composed filters")]
    async fn advanced_search_albums(
        &self,
        params: Parameters<AdvancedSearchAlbumsParams>,
    ) -> Result<CallToolResult, McpError> {
        let p = params.0;
        let query = AlbumSearchQuery {
            band_name_contains: p.band_name_contains,
            album_name_contains: p.album_name_contains,
            type_in: p.type_in,
            edition_contains: p.edition_contains,
            year_min: p.year_min,
            year_max: p.year_max,
            tracks_min: p.tracks_min,
            tracks_max: p.tracks_max,
            rating_min: p.rating_min,
            rating_max: p.rating_max,
            compliance_level_in: p.compliance_level_in,
            missing_only: p.missing_only.unwrap_or(false),
            present_only: p.present_only.unwrap_or(false),
        };

        let storage = self.storage.clone();
        match run_with_timeout(self.config.operation_timeout, move || storage.load_all_bands()).await {
            Ok(bands) => {
                let hits = query::advanced_search_albums(&bands, &query);
                Ok(CallToolResult::success_text(to_json_pretty(&hits)?))
            }
            Err(e) => Ok(CallToolResult::error_text(e.to_string())),
        }
    }

    #[tool(description = "Compute collection-wide analytics: type distribution, diversity, compliance, and maturity")]
    async fn analyze_collection_insights(
        &self,
        _params: Parameters<AnalyzeCollectionInsightsParams>,
    ) -> Result<CallToolResult, McpError> {
        let storage = self.storage.clone();
        match run_with_timeout(self.config.operation_timeout, move || storage.load_all_bands()).await {
            Ok(bands) => {
                let analytics = analyze_collection(&bands);
                Ok(CallToolResult::success_text(to_json_pretty(&analytics)?))
            }
            Err(e) => Ok(CallToolResult::error_text(e.to_string())),
        }
    }
}
