//! Classifies a band's folder organization pattern (spec.md §4.2).

use serde_json::{Map, Value};

use crate::core::domain::band::{ConsistencyLevel, FolderStructure, StructureType};

/// One discovered album folder, as observed by the Scanner before it is
/// handed to the Structure Analyzer.
#[derive(Debug, Clone)]
pub struct AlbumFolderObservation {
    /// Name of the type folder the album lives under, if any (enhanced structure).
    pub type_folder: Option<String>,
    pub has_year_prefix: bool,
    pub edition: Option<String>,
    pub has_forbidden_chars: bool,
}

/// Analyzes every album folder discovered for one band and produces its
/// `FolderStructure` classification.
pub fn analyze_structure(albums: &[AlbumFolderObservation]) -> FolderStructure {
    let total = albums.len() as u32;
    if total == 0 {
        return FolderStructure::default();
    }

    let with_type_folders = albums.iter().filter(|a| a.type_folder.is_some()).count() as u32;
    let with_year_prefix = albums.iter().filter(|a| a.has_year_prefix).count() as u32;
    let without_year_prefix = total - with_year_prefix;
    let with_forbidden_chars = albums.iter().filter(|a| a.has_forbidden_chars).count() as u32;

    let type_folder_ratio = with_type_folders as f64 / total as f64;
    let year_prefix_ratio = with_year_prefix as f64 / total as f64;

    let structure_type = if type_folder_ratio >= 0.8 {
        StructureType::Enhanced
    } else if year_prefix_ratio >= 0.8 {
        StructureType::Default
    } else if type_folder_ratio > 0.2 && year_prefix_ratio > 0.2 {
        StructureType::Mixed
    } else if year_prefix_ratio < 0.3 {
        StructureType::Legacy
    } else {
        StructureType::Unknown
    };

    let dominant_fraction = match structure_type {
        StructureType::Enhanced => type_folder_ratio,
        StructureType::Default => year_prefix_ratio,
        StructureType::Mixed => (type_folder_ratio + year_prefix_ratio) / 2.0,
        StructureType::Legacy => 1.0 - year_prefix_ratio,
        StructureType::Unknown => 0.0,
    };

    let no_forbidden_fraction = 1.0 - (with_forbidden_chars as f64 / total as f64);

    let consistency_score = (70.0 * dominant_fraction
        + 15.0 * year_prefix_ratio
        + 15.0 * no_forbidden_fraction)
        .round()
        .clamp(0.0, 100.0) as u8;

    let consistency = ConsistencyLevel::from_score(consistency_score);

    let adjustment: i16 = match structure_type {
        StructureType::Enhanced => 5,
        StructureType::Default | StructureType::Mixed => 0,
        StructureType::Legacy | StructureType::Unknown => -10,
    };
    let structure_score = (consistency_score as i16 + adjustment).clamp(0, 100) as u8;

    let mut type_folders_found: Vec<String> = albums
        .iter()
        .filter_map(|a| a.type_folder.clone())
        .collect();
    type_folders_found.sort();
    type_folders_found.dedup();

    let mut recommendations = Vec::new();
    let mut issues = Vec::new();

    if type_folder_ratio > 0.0 && type_folder_ratio < 0.8 {
        recommendations.push(format!(
            "Move {} albums into type folders",
            total - with_type_folders
        ));
        issues.push(format!("{} albums outside type folders", total - with_type_folders));
    }

    if year_prefix_ratio > 0.0 && year_prefix_ratio < 1.0 {
        recommendations.push(format!("Add year prefix to {without_year_prefix} album folders"));
    }
    if without_year_prefix > 0 {
        issues.push(format!("{without_year_prefix} albums have no year prefix"));
    }

    let mut distinct_editions: Vec<&str> = albums
        .iter()
        .filter_map(|a| a.edition.as_deref())
        .collect();
    distinct_editions.sort_unstable();
    distinct_editions.dedup();
    if distinct_editions.len() > 1 {
        recommendations.push("Standardize edition suffix style".to_string());
    }

    let mut analysis_metadata = Map::new();
    analysis_metadata.insert("type_folder_ratio".to_string(), Value::from(type_folder_ratio));
    analysis_metadata.insert("year_prefix_ratio".to_string(), Value::from(year_prefix_ratio));

    FolderStructure {
        structure_type,
        consistency,
        consistency_score,
        structure_score,
        albums_analyzed: total,
        albums_with_year_prefix: with_year_prefix,
        albums_without_year_prefix: without_year_prefix,
        albums_with_type_folders: with_type_folders,
        type_folders_found,
        recommendations,
        issues,
        analysis_metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(type_folder: Option<&str>, has_year: bool) -> AlbumFolderObservation {
        AlbumFolderObservation {
            type_folder: type_folder.map(str::to_string),
            has_year_prefix: has_year,
            edition: None,
            has_forbidden_chars: false,
        }
    }

    #[test]
    fn fully_enhanced_structure_scores_high() {
        let albums = vec![obs(Some("Album"), true), obs(Some("Live"), true)];
        let structure = analyze_structure(&albums);
        assert_eq!(structure.structure_type, StructureType::Enhanced);
        assert!(structure.consistency_score >= 90);
    }

    #[test]
    fn default_structure_without_type_folders() {
        let albums = vec![obs(None, true), obs(None, true), obs(None, true)];
        let structure = analyze_structure(&albums);
        assert_eq!(structure.structure_type, StructureType::Default);
    }

    #[test]
    fn legacy_structure_with_no_years() {
        let albums = vec![obs(None, false), obs(None, false)];
        let structure = analyze_structure(&albums);
        assert_eq!(structure.structure_type, StructureType::Legacy);
    }
}
