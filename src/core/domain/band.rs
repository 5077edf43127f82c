//! Band, analysis, and folder-structure domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::domain::album::Album;
use crate::core::domain::schema_version::current_schema_version;

/// The organizational pattern detected for a band's folder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, schemars::JsonSchema)]
pub enum StructureType {
    Default,
    Enhanced,
    Mixed,
    Legacy,
    Unknown,
}

impl Default for StructureType {
    fn default() -> Self {
        StructureType::Unknown
    }
}

/// How closely a band's albums follow its dominant structure pattern.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConsistencyLevel {
    Consistent,
    MostlyConsistent,
    Inconsistent,
    Poor,
    Unknown,
}

impl Default for ConsistencyLevel {
    fn default() -> Self {
        ConsistencyLevel::Unknown
    }
}

impl ConsistencyLevel {
    pub fn from_score(score: u8) -> ConsistencyLevel {
        match score {
            90..=100 => ConsistencyLevel::Consistent,
            70..=89 => ConsistencyLevel::MostlyConsistent,
            50..=69 => ConsistencyLevel::Inconsistent,
            30..=49 => ConsistencyLevel::Poor,
            _ => ConsistencyLevel::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct FolderStructure {
    pub structure_type: StructureType,
    pub consistency: ConsistencyLevel,
    pub consistency_score: u8,
    pub structure_score: u8,
    pub albums_analyzed: u32,
    pub albums_with_year_prefix: u32,
    pub albums_without_year_prefix: u32,
    pub albums_with_type_folders: u32,
    pub type_folders_found: Vec<String>,
    pub recommendations: Vec<String>,
    pub issues: Vec<String>,
    #[serde(default)]
    pub analysis_metadata: serde_json::Map<String, serde_json::Value>,
}

/// A per-album annotation within a `BandAnalysis`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
pub struct AlbumAnalysis {
    pub album_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<u8>,
}

/// Editorial annotation for a band: review, rating, similar artists, and
/// per-album annotations. Entirely separate from scan-derived data so that
/// rescans never clobber it (see Storage's `preserve_analyze`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, schemars::JsonSchema)]
pub struct BandAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<u8>,
    #[serde(default)]
    pub similar_bands: Vec<String>,
    #[serde(default)]
    pub albums: Vec<AlbumAnalysis>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Band {
    pub band_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formed: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub albums: Vec<Album>,
    #[serde(default)]
    pub albums_missing: Vec<Album>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyze: Option<BandAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_structure: Option<FolderStructure>,
    pub last_updated: DateTime<Utc>,
    #[serde(default = "current_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub gallery: Vec<String>,
}

impl Band {
    pub fn new(band_name: impl Into<String>) -> Self {
        Self {
            band_name: band_name.into(),
            formed: None,
            genres: Vec::new(),
            origin: None,
            members: Vec::new(),
            description: None,
            albums: Vec::new(),
            albums_missing: Vec::new(),
            analyze: None,
            folder_structure: None,
            last_updated: Utc::now(),
            schema_version: current_schema_version(),
            gallery: Vec::new(),
        }
    }

    pub fn albums_count(&self) -> usize {
        self.albums.len() + self.albums_missing.len()
    }

    pub fn local_albums_count(&self) -> usize {
        self.albums.len()
    }

    pub fn missing_albums_count(&self) -> usize {
        self.albums_missing.len()
    }

    /// All invariants from spec.md §3/§8 that must hold for a band record to
    /// be considered structurally sound, independent of field-level validation.
    pub fn check_invariants(&self) -> Result<(), String> {
        for album in &self.albums {
            if album.missing {
                return Err(format!(
                    "album '{}' is in `albums` but marked missing",
                    album.album_name
                ));
            }
            if album.folder_path.is_none() {
                return Err(format!(
                    "local album '{}' has no folder_path",
                    album.album_name
                ));
            }
        }
        for album in &self.albums_missing {
            if !album.missing {
                return Err(format!(
                    "album '{}' is in `albums_missing` but not marked missing",
                    album.album_name
                ));
            }
            if album.folder_path.is_some() {
                return Err(format!(
                    "missing album '{}' carries a folder_path",
                    album.album_name
                ));
            }
        }

        let mut seen: HashMap<String, &str> = HashMap::new();
        for album in self.albums.iter().chain(self.albums_missing.iter()) {
            let key = crate::core::services::normalization::normalize_album_name(&album.album_name);
            if let Some(prior) = seen.insert(key.clone(), if album.missing { "missing" } else { "local" }) {
                let current = if album.missing { "missing" } else { "local" };
                if prior != current {
                    return Err(format!(
                        "album '{}' appears in both albums and albums_missing after normalization",
                        album.album_name
                    ));
                }
            }
        }

        Ok(())
    }
}
