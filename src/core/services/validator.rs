//! Schema and cross-field validation for band metadata (spec.md §4.8).
//!
//! Pure and side-effect free: since it never writes anything, calling it for
//! a "dry run" is just calling it and discarding the caller's write step.

use regex::Regex;
use serde::Serialize;

use crate::core::domain::album::{Album, AlbumType, ComplianceLevel};
use crate::core::domain::band::{Band, BandAnalysis};
use crate::core::services::normalization::normalize_album_name;

/// `rate == 0` means "no rating" on input; strip it to absent before the
/// range check ever sees it so a caller clearing a rating isn't rejected.
pub fn normalize_ratings(analysis: &mut BandAnalysis) {
    analysis.rate = analysis.rate.filter(|&r| r != 0);
    for album in analysis.albums.iter_mut() {
        album.rate = album.rate.filter(|&r| r != 0);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
            severity: Severity::Error,
        });
    }

    fn warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
            severity: Severity::Warning,
        });
    }
}

fn year_pattern() -> Regex {
    Regex::new(r"^\d{4}$").unwrap()
}

fn duration_pattern() -> Regex {
    Regex::new(r"^\d+min$").unwrap()
}

/// Validates one band record end to end: field rules, then cross-field
/// consistency. Never mutates `band`.
pub fn validate_band(band: &Band) -> ValidationReport {
    let mut report = ValidationReport::default();

    let trimmed_name = band.band_name.trim();
    if trimmed_name.is_empty() || trimmed_name.len() > 200 {
        report.error("band_name", "must be non-empty and at most 200 characters");
    }

    if let Some(formed) = &band.formed {
        if !year_pattern().is_match(formed) {
            report.error("formed", format!("'{formed}' is not a 4-digit year"));
        }
    }

    for (index, album) in band.albums.iter().enumerate() {
        validate_album(&mut report, &format!("albums[{index}]"), album, true);
    }
    for (index, album) in band.albums_missing.iter().enumerate() {
        validate_album(&mut report, &format!("albums_missing[{index}]"), album, false);
    }

    check_album_overlap(&mut report, band);

    if let Some(structure) = &band.folder_structure {
        if structure.consistency_score > 100 {
            report.error("folder_structure.consistency_score", "must be within 0..=100");
        }
        if structure.structure_score > 100 {
            report.error("folder_structure.structure_score", "must be within 0..=100");
        }
    }

    if let Some(analyze) = &band.analyze {
        if let Some(rate) = analyze.rate {
            if !(1..=10).contains(&rate) {
                report.error("analyze.rate", "must be between 1 and 10");
            }
        }

        let known: Vec<String> = band
            .albums
            .iter()
            .chain(band.albums_missing.iter())
            .map(|a| normalize_album_name(&a.album_name))
            .collect();

        for (index, annotation) in analyze.albums.iter().enumerate() {
            if let Some(rate) = annotation.rate {
                if !(1..=10).contains(&rate) {
                    report.error(format!("analyze.albums[{index}].rate"), "must be between 1 and 10");
                }
            }
            let key = normalize_album_name(&annotation.album_name);
            if !known.contains(&key) {
                report.error(
                    format!("analyze.albums[{index}].album_name"),
                    format!("'{}' does not match any known album", annotation.album_name),
                );
            }
        }

        check_rating_consistency(&mut report, band);
    }

    report
}

fn validate_album(report: &mut ValidationReport, path: &str, album: &Album, expect_local: bool) {
    let trimmed = album.album_name.trim();
    if trimmed.is_empty() || trimmed.len() > 200 {
        report.error(format!("{path}.album_name"), "must be non-empty and at most 200 characters");
    }

    if let Some(year) = &album.year {
        if !year_pattern().is_match(year) {
            report.error(format!("{path}.year"), format!("'{year}' is not a 4-digit year"));
        }
    }

    if let Some(edition) = &album.edition {
        if edition.len() > 100 {
            report.error(format!("{path}.edition"), "must be at most 100 characters");
        }
    }

    if let Some(tracks_count) = album.tracks_count {
        if tracks_count > 999 {
            report.error(format!("{path}.tracks_count"), "must be between 0 and 999");
        }
    }

    if let Some(duration) = &album.duration {
        if !duration_pattern().is_match(duration) {
            report.error(format!("{path}.duration"), format!("'{duration}' does not match ^\\d+min$"));
        }
    }

    if AlbumType::parse(album.album_type.folder_name()).is_none() {
        report.error(format!("{path}.type"), "not one of the eight recognized album types");
    }

    if expect_local {
        if album.missing {
            report.error(format!("{path}.missing"), "album in `albums` must not be marked missing");
        }
        if album.folder_path.is_none() {
            report.error(format!("{path}.folder_path"), "local album must carry a folder_path");
        }
        if let Some(compliance) = &album.compliance {
            if compliance.score > 100 {
                report.error(format!("{path}.compliance.score"), "must be within 0..=100");
            }
            if !matches!(
                compliance.level,
                ComplianceLevel::Excellent
                    | ComplianceLevel::Good
                    | ComplianceLevel::Fair
                    | ComplianceLevel::Poor
                    | ComplianceLevel::Critical
            ) {
                report.error(format!("{path}.compliance.level"), "not one of the five recognized levels");
            }
        }
    } else {
        if !album.missing {
            report.error(format!("{path}.missing"), "album in `albums_missing` must be marked missing");
        }
        if album.folder_path.is_some() {
            report.error(format!("{path}.folder_path"), "missing album must not carry a folder_path");
        }
    }
}

fn check_album_overlap(report: &mut ValidationReport, band: &Band) {
    let mut seen = std::collections::HashMap::new();
    for album in band.albums.iter().chain(band.albums_missing.iter()) {
        let key = normalize_album_name(&album.album_name);
        if let Some(_) = seen.insert(key, ()) {
            report.error(
                "albums",
                format!("'{}' appears in both albums and albums_missing after normalization", album.album_name),
            );
        }
    }
}

fn check_rating_consistency(report: &mut ValidationReport, band: &Band) {
    let Some(analyze) = &band.analyze else { return };
    let Some(band_rate) = analyze.rate else { return };

    let album_rates: Vec<u8> = analyze.albums.iter().filter_map(|a| a.rate).collect();
    if album_rates.is_empty() {
        return;
    }

    let mean = album_rates.iter().map(|&r| r as f64).sum::<f64>() / album_rates.len() as f64;
    if (band_rate as f64 - mean).abs() > 2.0 {
        report.warning(
            "analyze.rate",
            format!("band rating {band_rate} differs from album-average rating {mean:.1} by more than 2"),
        );
    }

    let max = *album_rates.iter().max().unwrap();
    let min = *album_rates.iter().min().unwrap();
    if band_rate > max + 1 {
        report.warning("analyze.rate", format!("band rating {band_rate} exceeds the highest album rating {max} by more than 1"));
    }
    if (band_rate as i16) < (min as i16) - 1 {
        report.warning("analyze.rate", format!("band rating {band_rate} is below the lowest album rating {min} by more than 1"));
    }
}
