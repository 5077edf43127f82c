//! Name normalization used by the Reconciler and invariant checks (spec.md §4.5).

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

const TRAILING_TYPE_SUFFIXES: &[&str] = &[
    "live",
    "demo",
    "ep",
    "single",
    "compilation",
    "instrumental",
];

/// Normalizes an album name for matching purposes: lowercase, NFD-decompose
/// and strip combining marks, drop non-word/non-space characters, collapse
/// whitespace, fold `&`/"part" variants, then strip a trailing type suffix.
pub fn normalize_album_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let decomposed: String = lowered.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let folded = fold_variants(&decomposed);

    let non_word = Regex::new(r"[^\w\s]").unwrap();
    let stripped = non_word.replace_all(&folded, "");

    let whitespace = Regex::new(r"\s+").unwrap();
    let collapsed = whitespace.replace_all(stripped.trim(), " ").to_string();

    strip_trailing_type_suffix(&collapsed)
}

fn fold_variants(s: &str) -> String {
    let s = s.replace(" & ", " and ");
    s.replace(" pt ", " part ")
}

fn strip_trailing_type_suffix(s: &str) -> String {
    for suffix in TRAILING_TYPE_SUFFIXES {
        if let Some(stripped) = s.strip_suffix(suffix) {
            let stripped = stripped.trim_end();
            if !stripped.is_empty() && stripped.len() < s.len() {
                return stripped.to_string();
            }
        }
    }
    s.to_string()
}

/// Edit distance between two raw (unnormalized) names, used to break ties
/// when several physical albums normalize to the same stored name.
pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_and_whitespace_insensitive() {
        assert_eq!(
            normalize_album_name("The Dark Side Of The Moon"),
            normalize_album_name("the   dark side of the moon")
        );
    }

    #[test]
    fn accents_are_stripped() {
        assert_eq!(normalize_album_name("Émotions"), normalize_album_name("Emotions"));
    }

    #[test]
    fn ampersand_and_and_fold_together() {
        assert_eq!(
            normalize_album_name("Rock & Roll"),
            normalize_album_name("Rock and Roll")
        );
    }

    #[test]
    fn trailing_type_suffix_stripped() {
        assert_eq!(normalize_album_name("Unplugged Live"), normalize_album_name("Unplugged"));
    }

    #[test]
    fn edit_distance_picks_closest() {
        assert!(edit_distance("The Wall", "The Wall") < edit_distance("The Wall", "The Walls"));
    }
}
