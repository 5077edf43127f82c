//! Wire-level parameter shapes for the eight operations (spec.md §6.2).
//! Each mirrors a domain type field-for-field so `schemars` can derive an
//! accurate tool schema without hand-written JSON Schema.

use crate::core::domain::{Album, AlbumType, BandAnalysis, ComplianceLevel, StructureType};

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ScanMusicFoldersParams {
    pub(crate) force_rescan: Option<bool>,
    pub(crate) force_full_scan: Option<bool>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct GetBandListParams {
    pub(crate) page: Option<usize>,
    pub(crate) page_size: Option<usize>,
    pub(crate) sort_by: Option<String>,
    pub(crate) order: Option<String>,
    pub(crate) search: Option<String>,
    pub(crate) filter_has_metadata: Option<bool>,
    pub(crate) filter_has_analysis: Option<bool>,
    pub(crate) filter_album_type: Option<AlbumType>,
    pub(crate) filter_compliance_level: Option<ComplianceLevel>,
    pub(crate) filter_structure_type: Option<StructureType>,
    pub(crate) filter_min_rating: Option<u8>,
    pub(crate) filter_min_albums: Option<usize>,
    pub(crate) filter_has_missing: Option<bool>,
}

/// Caller-supplied band fields; a field left absent leaves the stored value
/// untouched (spec.md §4.6 merge semantics).
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct BandMetadataParams {
    pub(crate) formed: Option<String>,
    pub(crate) genres: Option<Vec<String>>,
    pub(crate) origin: Option<String>,
    pub(crate) members: Option<Vec<String>>,
    pub(crate) description: Option<String>,
    pub(crate) albums: Option<Vec<Album>>,
    pub(crate) albums_missing: Option<Vec<Album>>,
    pub(crate) gallery: Option<Vec<String>>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct SaveBandMetadataParams {
    pub(crate) band_name: String,
    pub(crate) metadata: BandMetadataParams,
    pub(crate) preserve_analyze: Option<bool>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct SaveBandAnalyzeParams {
    pub(crate) band_name: String,
    pub(crate) analysis: BandAnalysis,
    pub(crate) analyze_missing_albums: Option<bool>,
}

/// `generated_at` is stamped by the server on save, never caller-supplied.
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct CollectionInsightParams {
    pub(crate) summary: Option<String>,
    pub(crate) highlights: Option<Vec<String>>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct SaveCollectionInsightParams {
    pub(crate) insight: CollectionInsightParams,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ValidateBandMetadataParams {
    pub(crate) band_name: String,
    pub(crate) metadata: BandMetadataParams,
}

/// The 13 parameters of `advanced_search_albums` (spec.md §4.9).
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AdvancedSearchAlbumsParams {
    pub(crate) band_name_contains: Option<String>,
    pub(crate) album_name_contains: Option<String>,
    pub(crate) type_in: Option<Vec<AlbumType>>,
    pub(crate) edition_contains: Option<String>,
    pub(crate) year_min: Option<String>,
    pub(crate) year_max: Option<String>,
    pub(crate) tracks_min: Option<u32>,
    pub(crate) tracks_max: Option<u32>,
    pub(crate) rating_min: Option<u8>,
    pub(crate) rating_max: Option<u8>,
    pub(crate) compliance_level_in: Option<Vec<ComplianceLevel>>,
    pub(crate) missing_only: Option<bool>,
    pub(crate) present_only: Option<bool>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AnalyzeCollectionInsightsParams {}
