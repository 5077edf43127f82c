//! Scores a single album folder against its band's structure (spec.md §4.3).

use crate::core::domain::album::{AlbumCompliance, AlbumType, ComplianceLevel};
use crate::core::domain::band::StructureType;

/// Per-album facts the Scanner has already gathered, handed to the scorer.
#[derive(Debug, Clone)]
pub struct ComplianceContext<'a> {
    pub album_name: &'a str,
    pub year: Option<&'a str>,
    pub edition: Option<&'a str>,
    pub album_type: AlbumType,
    pub structure_type: StructureType,
    pub has_year_prefix: bool,
    pub type_keyword_in_name: bool,
    pub under_correct_type_folder: bool,
    pub edition_in_parentheses: bool,
    pub forbidden_char_count: usize,
    pub is_empty: bool,
}

/// Deduction values are source-indicative, tunable as long as level
/// ordering is preserved (§9 Open Question 3).
const MISSING_YEAR_PREFIX_DEDUCTION: i16 = 25;
const MISPLACED_TYPE_KEYWORD_DEDUCTION: i16 = 15;
const EDITION_NOT_PARENTHESIZED_DEDUCTION: i16 = 10;
const FORBIDDEN_CHAR_DEDUCTION_PER_OCCURRENCE: i16 = 10;
const FORBIDDEN_CHAR_DEDUCTION_CAP: i16 = 30;
const EMPTY_ALBUM_DEDUCTION: i16 = 40;

/// Scores one album folder, returning its grade, issue list, and the
/// recommended canonical path for its band's structure type.
pub fn score_album(ctx: &ComplianceContext) -> AlbumCompliance {
    let mut score: i16 = 100;
    let mut issues = Vec::new();

    if !ctx.has_year_prefix {
        score -= MISSING_YEAR_PREFIX_DEDUCTION;
        issues.push("missing year prefix".to_string());
    }

    if ctx.type_keyword_in_name
        && ctx.structure_type == StructureType::Enhanced
        && !ctx.under_correct_type_folder
    {
        score -= MISPLACED_TYPE_KEYWORD_DEDUCTION;
        issues.push("type keyword in name but not placed under the matching type folder".to_string());
    }

    if ctx.edition.is_some() && !ctx.edition_in_parentheses {
        score -= EDITION_NOT_PARENTHESIZED_DEDUCTION;
        issues.push("edition not enclosed in parentheses".to_string());
    }

    if ctx.forbidden_char_count > 0 {
        let deduction = (ctx.forbidden_char_count as i16 * FORBIDDEN_CHAR_DEDUCTION_PER_OCCURRENCE)
            .min(FORBIDDEN_CHAR_DEDUCTION_CAP);
        score -= deduction;
        issues.push(format!(
            "{} forbidden character(s) in folder name",
            ctx.forbidden_char_count
        ));
    }

    if ctx.is_empty {
        score -= EMPTY_ALBUM_DEDUCTION;
        issues.push("album folder contains no music files".to_string());
    }

    let score = score.clamp(0, 100) as u8;
    let level = ComplianceLevel::from_score(score);
    let recommended_path = Some(build_recommended_path(ctx));

    AlbumCompliance {
        score,
        level,
        issues,
        recommended_path,
    }
}

fn build_recommended_path(ctx: &ComplianceContext) -> String {
    let mut segments = Vec::new();
    if ctx.structure_type == StructureType::Enhanced {
        segments.push(ctx.album_type.folder_name().to_string());
    }

    let mut name = match ctx.year {
        Some(year) => format!("{year} - "),
        None => "YYYY - ".to_string(),
    };
    name.push_str(ctx.album_name);
    if let Some(edition) = ctx.edition {
        name.push_str(&format!(" ({edition})"));
    }
    segments.push(name);
    segments.join("/")
}
