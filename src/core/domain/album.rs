//! Album and compliance domain types.

use serde::{Deserialize, Serialize};

/// The eight recognized album release types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, schemars::JsonSchema)]
pub enum AlbumType {
    Album,
    Compilation,
    #[serde(rename = "EP")]
    Ep,
    Live,
    Single,
    Demo,
    Instrumental,
    Split,
}

impl Default for AlbumType {
    fn default() -> Self {
        AlbumType::Album
    }
}

impl AlbumType {
    pub const ALL: [AlbumType; 8] = [
        AlbumType::Album,
        AlbumType::Compilation,
        AlbumType::Ep,
        AlbumType::Live,
        AlbumType::Single,
        AlbumType::Demo,
        AlbumType::Instrumental,
        AlbumType::Split,
    ];

    /// The folder name used for this type under an "enhanced" band structure.
    pub fn folder_name(&self) -> &'static str {
        match self {
            AlbumType::Album => "Album",
            AlbumType::Compilation => "Compilation",
            AlbumType::Ep => "EP",
            AlbumType::Live => "Live",
            AlbumType::Single => "Single",
            AlbumType::Demo => "Demo",
            AlbumType::Instrumental => "Instrumental",
            AlbumType::Split => "Split",
        }
    }

    /// Parses a type folder / keyword name back into an `AlbumType`, case-insensitively.
    pub fn parse(s: &str) -> Option<AlbumType> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.folder_name().to_lowercase() == s)
    }
}

/// Compliance grade for a single local album folder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, schemars::JsonSchema)]
pub enum ComplianceLevel {
    Critical,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ComplianceLevel {
    /// Maps a 0..=100 score to its level per the thresholds in the scorer spec.
    pub fn from_score(score: u8) -> ComplianceLevel {
        match score {
            90..=100 => ComplianceLevel::Excellent,
            75..=89 => ComplianceLevel::Good,
            60..=74 => ComplianceLevel::Fair,
            40..=59 => ComplianceLevel::Poor,
            _ => ComplianceLevel::Critical,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, schemars::JsonSchema)]
pub struct AlbumCompliance {
    pub score: u8,
    pub level: ComplianceLevel,
    pub issues: Vec<String>,
    pub recommended_path: Option<String>,
}

impl Default for ComplianceLevel {
    fn default() -> Self {
        ComplianceLevel::Critical
    }
}

/// A single album, local or missing, belonging to a band.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, schemars::JsonSchema)]
pub struct Album {
    pub album_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(default)]
    pub album_type: AlbumType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    /// Derived from `edition` against the recognized edition vocabulary; never
    /// hand-edited, always recomputed from `edition` on load (§9 Open Question 1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edition_canonical: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracks_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default)]
    pub missing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance: Option<AlbumCompliance>,
    #[serde(default)]
    pub gallery: Vec<String>,
}

impl Album {
    pub fn new(album_name: impl Into<String>) -> Self {
        Self {
            album_name: album_name.into(),
            year: None,
            album_type: AlbumType::Album,
            edition: None,
            edition_canonical: None,
            genres: Vec::new(),
            tracks_count: None,
            duration: None,
            missing: false,
            folder_path: None,
            compliance: None,
            gallery: Vec::new(),
        }
    }

    /// True when this album's fields obey the "local albums carry a folder_path
    /// and compliance, missing albums carry neither" invariant.
    pub fn is_structurally_valid(&self) -> bool {
        if self.missing {
            self.folder_path.is_none()
        } else {
            self.folder_path.is_some()
        }
    }
}
