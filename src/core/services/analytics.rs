//! Collection-wide analytics: type distribution, diversity, compliance,
//! maturity, and health (spec.md §4.10).

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::core::domain::album::{AlbumType, ComplianceLevel};
use crate::core::domain::band::Band;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TypeDistributionEntry {
    pub album_type: AlbumType,
    pub total_count: usize,
    pub bands_with_type: usize,
    pub percentage: f64,
    /// decade (e.g. "1980s") → count
    pub by_decade: HashMap<String, usize>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiversityReport {
    pub bands_with_four_or_more_types: usize,
    /// album type → band names lacking that type
    pub missing_opportunities: HashMap<String, Vec<String>>,
    pub mean_types_per_band: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ComplianceDistribution {
    pub by_level: HashMap<String, usize>,
    pub mean_consistency_score: f64,
    pub median_consistency_score: f64,
    pub stdev_consistency_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaturityLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
    Master,
}

pub fn maturity_level(score: f64) -> MaturityLevel {
    match score {
        s if s >= 80.0 => MaturityLevel::Master,
        s if s >= 60.0 => MaturityLevel::Expert,
        s if s >= 40.0 => MaturityLevel::Advanced,
        s if s >= 20.0 => MaturityLevel::Intermediate,
        _ => MaturityLevel::Beginner,
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CollectionAnalytics {
    pub type_distribution: Vec<TypeDistributionEntry>,
    pub diversity: DiversityReport,
    pub compliance_distribution: ComplianceDistribution,
    pub maturity_score: f64,
    pub maturity_level_name: &'static str,
    pub health_score: f64,
}

fn decade_of(year: &str) -> Option<String> {
    if year.len() != 4 {
        return None;
    }
    let prefix = &year[..3];
    Some(format!("{prefix}0s"))
}

fn type_distribution(bands: &[Band]) -> Vec<TypeDistributionEntry> {
    let total_albums: usize = bands.iter().map(|b| b.albums_count()).sum();

    AlbumType::ALL
        .iter()
        .map(|&album_type| {
            let mut total_count = 0;
            let mut bands_with_type = 0;
            let mut by_decade: HashMap<String, usize> = HashMap::new();

            for band in bands {
                let mut has_type = false;
                for album in band.albums.iter().chain(band.albums_missing.iter()) {
                    if album.album_type == album_type {
                        total_count += 1;
                        has_type = true;
                        if let Some(year) = &album.year {
                            if let Some(decade) = decade_of(year) {
                                *by_decade.entry(decade).or_insert(0) += 1;
                            }
                        }
                    }
                }
                if has_type {
                    bands_with_type += 1;
                }
            }

            let percentage = if total_albums == 0 {
                0.0
            } else {
                total_count as f64 / total_albums as f64 * 100.0
            };

            TypeDistributionEntry {
                album_type,
                total_count,
                bands_with_type,
                percentage,
                by_decade,
            }
        })
        .collect()
}

fn diversity(bands: &[Band]) -> DiversityReport {
    let mut bands_with_four_or_more_types = 0;
    let mut missing_opportunities: HashMap<String, Vec<String>> = HashMap::new();
    let mut total_types = 0usize;

    for album_type in AlbumType::ALL {
        missing_opportunities.insert(album_type.folder_name().to_string(), Vec::new());
    }

    for band in bands {
        let types: HashSet<AlbumType> = band
            .albums
            .iter()
            .chain(band.albums_missing.iter())
            .map(|a| a.album_type)
            .collect();
        total_types += types.len();
        if types.len() >= 4 {
            bands_with_four_or_more_types += 1;
        }
        for album_type in AlbumType::ALL {
            if !types.contains(&album_type) {
                missing_opportunities
                    .get_mut(album_type.folder_name())
                    .unwrap()
                    .push(band.band_name.clone());
            }
        }
    }

    let mean_types_per_band = if bands.is_empty() {
        0.0
    } else {
        total_types as f64 / bands.len() as f64
    };

    DiversityReport {
        bands_with_four_or_more_types,
        missing_opportunities,
        mean_types_per_band,
    }
}

fn stdev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

fn compliance_distribution(bands: &[Band]) -> ComplianceDistribution {
    let mut by_level: HashMap<String, usize> = HashMap::new();
    for level in [
        ComplianceLevel::Excellent,
        ComplianceLevel::Good,
        ComplianceLevel::Fair,
        ComplianceLevel::Poor,
        ComplianceLevel::Critical,
    ] {
        by_level.insert(format!("{level:?}"), 0);
    }
    for band in bands {
        for album in &band.albums {
            if let Some(compliance) = &album.compliance {
                *by_level.entry(format!("{:?}", compliance.level)).or_insert(0) += 1;
            }
        }
    }

    let mut scores: Vec<f64> = bands
        .iter()
        .filter_map(|b| b.folder_structure.as_ref().map(|s| s.consistency_score as f64))
        .collect();
    scores.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let mean = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };

    ComplianceDistribution {
        by_level,
        mean_consistency_score: mean,
        median_consistency_score: median(&scores),
        stdev_consistency_score: stdev(&scores, mean),
    }
}

fn completeness_fraction(bands: &[Band]) -> f64 {
    let local: usize = bands.iter().map(|b| b.local_albums_count()).sum();
    let total: usize = bands.iter().map(|b| b.albums_count()).sum();
    if total == 0 {
        100.0
    } else {
        local as f64 / total as f64 * 100.0
    }
}

fn metadata_component(bands: &[Band]) -> f64 {
    if bands.is_empty() {
        return 0.0;
    }
    let with_metadata = bands.iter().filter(|b| !b.albums.is_empty() || !b.albums_missing.is_empty()).count();
    let with_analysis = bands.iter().filter(|b| b.analyze.is_some()).count();
    let frac_metadata = with_metadata as f64 / bands.len() as f64;
    let frac_analysis = with_analysis as f64 / bands.len() as f64;
    (frac_metadata + frac_analysis) / 2.0 * 100.0
}

fn structure_component(bands: &[Band]) -> f64 {
    let scores: Vec<f64> = bands
        .iter()
        .filter_map(|b| b.folder_structure.as_ref().map(|s| s.structure_score as f64))
        .collect();
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

fn size_component(bands: &[Band]) -> f64 {
    if bands.is_empty() {
        return 0.0;
    }
    (bands.len() as f64).log10() / 500f64.log10() * 100.0
}

fn diversity_component(bands: &[Band]) -> f64 {
    diversity(bands).mean_types_per_band * 12.5
}

/// Computes the full collection analytics report over every loaded band.
pub fn analyze_collection(bands: &[Band]) -> CollectionAnalytics {
    let size = size_component(bands).min(100.0);
    let diversity_score = diversity_component(bands).min(100.0);
    let structure_score = structure_component(bands);
    let metadata_score = metadata_component(bands);
    let completeness_score = completeness_fraction(bands);

    let maturity_score = 0.30 * size + 0.25 * diversity_score + 0.20 * structure_score
        + 0.15 * metadata_score
        + 0.10 * completeness_score;

    let health_score = (structure_score + completeness_score + diversity_score + metadata_score) / 4.0;

    let level = maturity_level(maturity_score);
    let maturity_level_name = match level {
        MaturityLevel::Beginner => "Beginner",
        MaturityLevel::Intermediate => "Intermediate",
        MaturityLevel::Advanced => "Advanced",
        MaturityLevel::Expert => "Expert",
        MaturityLevel::Master => "Master",
    };

    CollectionAnalytics {
        type_distribution: type_distribution(bands),
        diversity: diversity(bands),
        compliance_distribution: compliance_distribution(bands),
        maturity_score,
        maturity_level_name,
        health_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::album::Album;

    #[test]
    fn empty_collection_has_zero_maturity() {
        let analytics = analyze_collection(&[]);
        assert_eq!(analytics.maturity_score, 0.0);
        assert_eq!(analytics.maturity_level_name, "Beginner");
    }

    #[test]
    fn type_distribution_counts_albums() {
        let mut band = Band::new("Pink Floyd");
        let mut album = Album::new("The Wall");
        album.album_type = AlbumType::Album;
        album.folder_path = Some("1979 - The Wall".to_string());
        band.albums.push(album);

        let analytics = analyze_collection(&[band]);
        let entry = analytics
            .type_distribution
            .iter()
            .find(|e| e.album_type == AlbumType::Album)
            .unwrap();
        assert_eq!(entry.total_count, 1);
        assert_eq!(entry.bands_with_type, 1);
    }

    #[test]
    fn maturity_level_thresholds() {
        assert_eq!(maturity_level(85.0), MaturityLevel::Master);
        assert_eq!(maturity_level(65.0), MaturityLevel::Expert);
        assert_eq!(maturity_level(45.0), MaturityLevel::Advanced);
        assert_eq!(maturity_level(25.0), MaturityLevel::Intermediate);
        assert_eq!(maturity_level(5.0), MaturityLevel::Beginner);
    }
}
