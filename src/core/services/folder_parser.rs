//! Parses album folder names into `{year, name, edition, type}` (spec.md §4.1).

use regex::Regex;

use crate::core::domain::album::AlbumType;
use crate::core::errors::BandVaultError;

/// Edition vocabulary recognized case-insensitively; anything else surviving
/// as parenthetical content is kept verbatim.
const RECOGNIZED_EDITIONS: &[&str] = &[
    "Deluxe Edition",
    "Limited Edition",
    "Demo Version",
    "Deluxe",
    "Limited",
    "Anniversary",
    "Remastered",
    "Special",
    "Collector's",
    "Instrumental",
];

const LIVE_KEYWORDS: &[&str] = &[
    "live", "concert", "unplugged", "acoustic", "in concert", "live at", "live in", "live from",
];
const COMPILATION_KEYWORDS: &[&str] = &[
    "greatest hits",
    "best of",
    "collection",
    "anthology",
    "compilation",
    "hits",
    "complete",
    "essential",
];
const EP_KEYWORDS: &[&str] = &["ep", "e.p."];
const SINGLE_KEYWORDS: &[&str] = &["single"];
const DEMO_KEYWORDS: &[&str] = &[
    "demo",
    "demos",
    "early recordings",
    "unreleased",
    "rough mixes",
    "rehearsal",
    "pre-production",
];
const INSTRUMENTAL_KEYWORDS: &[&str] = &["instrumental", "instrumentals"];
const SPLIT_KEYWORDS: &[&str] = &["split", "vs.", "vs", "versus", "with"];

/// The fields extracted from a single album folder name.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFolderName {
    pub album_name: String,
    pub year: Option<String>,
    pub edition: Option<String>,
    pub album_type_hint: Option<AlbumType>,
}

/// Parses `folder_name` (optionally alongside the enhanced-structure parent
/// folder it lives under) into year/name/edition/type-hint fields. Fails
/// only when the trimmed input is empty.
pub fn parse_folder_name(
    folder_name: &str,
    parent_folder_name: Option<&str>,
) -> Result<ParsedFolderName, BandVaultError> {
    let trimmed = folder_name.trim();
    if trimmed.is_empty() {
        return Err(BandVaultError::Parse("folder name is empty".to_string()));
    }

    let pattern = Regex::new(r"^(\d{4})\s*-\s*(.+?)(?:\s*\(([^)]+)\))?$").unwrap();

    let (year, album_name, parenthetical) = match pattern.captures(trimmed) {
        Some(caps) => (
            caps.get(1).map(|m| m.as_str().to_string()),
            caps.get(2).unwrap().as_str().trim().to_string(),
            caps.get(3).map(|m| m.as_str().trim().to_string()),
        ),
        None => (None, trimmed.to_string(), None),
    };

    let mut edition = None;
    let mut album_type_hint = None;

    if let Some(content) = parenthetical {
        if let Some(t) = AlbumType::parse(&content) {
            album_type_hint = Some(t);
        } else if let Some(canonical) = canonical_edition(&content) {
            edition = Some(canonical);
        } else {
            edition = Some(content);
        }
    }

    if album_type_hint.is_none() {
        album_type_hint = detect_type_keyword(&album_name).or_else(|| detect_type_keyword(trimmed));
    }

    if let Some(parent) = parent_folder_name {
        if let Some(t) = AlbumType::parse(parent.trim()) {
            album_type_hint = Some(t);
        }
    }

    Ok(ParsedFolderName {
        album_name,
        year,
        edition,
        album_type_hint,
    })
}

/// Normalizes free-form edition text against the recognized vocabulary
/// (case-insensitive, exact match); returns `None` when unrecognized, in
/// which case callers preserve the raw text verbatim (§9 Open Question 1).
pub fn canonical_edition(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    RECOGNIZED_EDITIONS
        .iter()
        .find(|e| e.eq_ignore_ascii_case(trimmed))
        .map(|s| s.to_string())
}

/// True when `text` contains one of the recognized edition keywords, used by
/// the Scanner to flag an edition mentioned outside parentheses (compliance
/// deduction) even though the Parser itself only extracts `edition` from a
/// parenthetical suffix.
pub fn contains_edition_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    RECOGNIZED_EDITIONS.iter().any(|e| lower.contains(&e.to_lowercase()))
}

/// True when `text` matches any recognized album-type keyword.
pub fn has_type_keyword(text: &str) -> bool {
    detect_type_keyword(text).is_some()
}

/// Resolves the final album type once the folder's track count is known:
/// a keyword/parent-folder hint always wins; otherwise falls back to the
/// track-count heuristic (1 → Single, 2..7 → EP, else Album).
pub fn resolve_album_type(hint: Option<AlbumType>, track_count: usize) -> AlbumType {
    hint.unwrap_or_else(|| match track_count {
        1 => AlbumType::Single,
        2..=7 => AlbumType::Ep,
        _ => AlbumType::Album,
    })
}

fn detect_type_keyword(text: &str) -> Option<AlbumType> {
    let lower = text.to_lowercase();
    if contains_any(&lower, LIVE_KEYWORDS) {
        return Some(AlbumType::Live);
    }
    if contains_any(&lower, COMPILATION_KEYWORDS) {
        return Some(AlbumType::Compilation);
    }
    if contains_word(&lower, EP_KEYWORDS) {
        return Some(AlbumType::Ep);
    }
    if contains_any(&lower, SINGLE_KEYWORDS) {
        return Some(AlbumType::Single);
    }
    if contains_any(&lower, DEMO_KEYWORDS) {
        return Some(AlbumType::Demo);
    }
    if contains_any(&lower, INSTRUMENTAL_KEYWORDS) {
        return Some(AlbumType::Instrumental);
    }
    if contains_word(&lower, SPLIT_KEYWORDS) {
        return Some(AlbumType::Split);
    }
    None
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Like `contains_any` but requires the needle to sit on a word boundary, so
/// short tokens like "ep" or "vs" don't match inside unrelated words.
fn contains_word(haystack: &str, needles: &[&str]) -> bool {
    let words: Vec<&str> = haystack
        .split(|c: char| !c.is_alphanumeric() && c != '.')
        .filter(|s| !s.is_empty())
        .collect();
    needles.iter().any(|n| words.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_year_name_edition() {
        let parsed = parse_folder_name("1973 - The Dark Side of the Moon (Deluxe Edition)", None).unwrap();
        assert_eq!(parsed.year.as_deref(), Some("1973"));
        assert_eq!(parsed.album_name, "The Dark Side of the Moon");
        assert_eq!(parsed.edition.as_deref(), Some("Deluxe Edition"));
    }

    #[test]
    fn legacy_name_with_no_year() {
        let parsed = parse_folder_name("The Wall", None).unwrap();
        assert_eq!(parsed.year, None);
        assert_eq!(parsed.album_name, "The Wall");
    }

    #[test]
    fn empty_input_is_parse_error() {
        assert!(parse_folder_name("   ", None).is_err());
    }

    #[test]
    fn detects_live_keyword() {
        let parsed = parse_folder_name("1988 - Delicate Sound of Thunder (Live)", None).unwrap();
        assert_eq!(parsed.album_type_hint, Some(AlbumType::Live));
    }

    #[test]
    fn parent_folder_overrides_keyword() {
        let parsed = parse_folder_name("1999 - Some Compilation", Some("Album")).unwrap();
        assert_eq!(parsed.album_type_hint, Some(AlbumType::Album));
    }

    #[test]
    fn unrecognized_parenthetical_preserved_verbatim() {
        let parsed = parse_folder_name("2001 - Something (Japan Import)", None).unwrap();
        assert_eq!(parsed.edition.as_deref(), Some("Japan Import"));
    }

    #[test]
    fn track_count_heuristic_single() {
        assert_eq!(resolve_album_type(None, 1), AlbumType::Single);
        assert_eq!(resolve_album_type(None, 5), AlbumType::Ep);
        assert_eq!(resolve_album_type(None, 12), AlbumType::Album);
    }
}
