//! Search query formatting.
//!
//! Peers name files inconsistently, so the query keeps only the words most
//! likely to appear in a filename: no punctuation, no accents, and no
//! "feat."/"remix"-style tails on the title.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::model::TrackDescriptor;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid non-word pattern"));

static TITLE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(feat|ft|featuring|remix|remastered|deluxe)\b")
        .expect("valid suffix pattern")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// Build the search text for a track. Never fails; empty fields give a
/// shorter (possibly empty) query.
pub fn format(track: &TrackDescriptor) -> String {
    let artist = strip_diacritics(&strip_punctuation(&track.artist));
    let title = strip_diacritics(&strip_punctuation(&track.title));
    let title = truncate_suffix(&title);

    let joined = format!("{artist} {title}");
    WHITESPACE.replace_all(joined.trim(), " ").into_owned()
}

fn strip_punctuation(text: &str) -> String {
    NON_WORD.replace_all(text, " ").into_owned()
}

/// Decompose, drop combining marks, then fold to ASCII.
///
/// Letters with no ASCII decomposition (`ð`, `ø`) are dropped too, unless
/// that would leave nothing searchable, as with non-Latin scripts.
fn strip_diacritics(text: &str) -> String {
    let decomposed: String = text.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    let ascii: String = decomposed.chars().filter(char::is_ascii).collect();

    let folded = if ascii.chars().any(char::is_alphanumeric)
        || !decomposed.chars().any(char::is_alphanumeric)
    {
        ascii
    } else {
        decomposed
    };
    // Compatibility decomposition can introduce punctuation (e.g. "㈠" -> "(一)")
    strip_punctuation(&folded)
}

fn truncate_suffix(title: &str) -> &str {
    match TITLE_SUFFIX.find(title) {
        Some(m) => &title[..m.start()],
        None => title,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn query(artist: &str, title: &str) -> String {
        format(&TrackDescriptor::new(artist, title))
    }

    #[test]
    fn test_accents_and_remaster_suffix_removed() {
        let q = query("Sigur Rós", "Popplagið (Remastered)");
        assert_eq!(q, "Sigur Ros Popplagi");
        assert!(q.is_ascii());
        assert!(!q.to_lowercase().contains("remastered"));
    }

    #[test]
    fn test_feat_suffix_removed() {
        assert_eq!(query("Daft Punk", "Get Lucky (feat. Pharrell Williams)"), "Daft Punk Get Lucky");
        assert_eq!(query("A", "Song ft. B"), "A Song");
        assert_eq!(query("A", "Song - Radio Remix"), "A Song Radio");
        assert_eq!(query("A", "Album Track (Deluxe Edition)"), "A Album Track");
    }

    #[test]
    fn test_suffix_must_be_whole_word() {
        assert_eq!(query("Muse", "Left Behind"), "Muse Left Behind");
        assert_eq!(query("Artist", "Featherweight"), "Artist Featherweight");
    }

    #[test]
    fn test_suffix_only_applies_to_title() {
        assert_eq!(query("Remix Artist", "Tune"), "Remix Artist Tune");
    }

    #[test]
    fn test_punctuation_becomes_space() {
        assert_eq!(query("AC/DC", "T.N.T."), "AC DC T N T");
        assert_eq!(query("Guns N' Roses", "Don't Cry"), "Guns N Roses Don t Cry");
    }

    #[test]
    fn test_non_latin_script_survives() {
        assert_eq!(query("坂本龍一", "戦場のメリークリスマス"), "坂本龍一 戦場のメリークリスマス");
    }

    #[test]
    fn test_empty_fields_are_allowed() {
        assert_eq!(query("", "Title"), "Title");
        assert_eq!(query("Artist", ""), "Artist");
        assert_eq!(query("", ""), "");
        assert_eq!(query("Artist", "feat. Someone"), "Artist");
    }

    proptest! {
        #[test]
        fn prop_format_never_panics_and_has_no_punctuation(
            artist in "\\PC{0,40}",
            title in "\\PC{0,40}",
        ) {
            let q = query(&artist, &title);
            prop_assert!(!NON_WORD.is_match(&q), "punctuation left in {:?}", q);
            prop_assert_eq!(q.trim(), q.as_str());
            prop_assert!(!q.contains("  "));
        }

        #[test]
        fn prop_latin_output_has_no_combining_marks(
            artist in "[a-zA-Zàáâäãåèéêëìíîïòóôöõùúûüñç ]{1,30}",
            title in "[a-zA-Zàáâäãåèéêëìíîïòóôöõùúûüñç ]{1,30}",
        ) {
            let q = query(&artist, &title);
            prop_assert!(q.is_ascii(), "non-ascii left in {:?}", q);
        }
    }
}
