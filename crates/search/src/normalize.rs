//! Place-name normalization.
//!
//! Gazetteer keys and user queries go through the same normalization so
//! lookups compare like with like.

use unicode_segmentation::UnicodeSegmentation;

/// Trailing characters dropped from a place name.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '"', '\'', ')', ']'];

/// Normalize a free-form place name into a lookup key.
///
/// Keeps only the segment before the first comma, trims, strips trailing
/// punctuation, collapses inner whitespace and lowercases.
///
/// ```
/// use geotag_search::normalize_place_name;
///
/// assert_eq!(normalize_place_name("  New   York City.  "), "new york city");
/// assert_eq!(normalize_place_name("Paris, France"), "paris");
/// ```
pub fn normalize_place_name(input: &str) -> String {
    let head = input.split(',').next().unwrap_or_default();
    let stripped = head.trim().trim_end_matches(TRAILING_PUNCTUATION).trim_end();

    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Split a structured address on commas, dropping empty segments.
///
/// ```
/// use geotag_search::address_segments;
///
/// let parts = address_segments("350 Fifth Ave, New York City, USA");
/// assert_eq!(parts, vec!["350 Fifth Ave", "New York City", "USA"]);
/// ```
pub fn address_segments(input: &str) -> Vec<&str> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Unicode-aware word tokenization, lowercased.
pub fn tokenize(text: &str) -> Vec<String> {
    text.unicode_words().map(str::to_lowercase).collect()
}

/// True when every word of `needle` appears as a whole word in `haystack`,
/// in order and adjacent.
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    let hay = tokenize(haystack);
    let words = tokenize(needle);

    if words.is_empty() || words.len() > hay.len() {
        return false;
    }

    hay.windows(words.len()).any(|w| w == words.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_and_lowercases() {
        assert_eq!(normalize_place_name("LONDON"), "london");
        assert_eq!(normalize_place_name("\tSan \n Francisco "), "san francisco");
    }

    #[test]
    fn test_normalize_strips_trailing_punctuation() {
        assert_eq!(normalize_place_name("Tokyo!!"), "tokyo");
        assert_eq!(normalize_place_name("St. Louis."), "st. louis");
    }

    #[test]
    fn test_normalize_keeps_first_comma_segment() {
        assert_eq!(normalize_place_name("Berlin, Germany"), "berlin");
        assert_eq!(normalize_place_name(", Germany"), "");
    }

    #[test]
    fn test_address_segments() {
        assert!(address_segments(" , ").is_empty());
        assert_eq!(address_segments("a,,b"), vec!["a", "b"]);
    }

    #[test]
    fn test_tokenize_handles_unicode() {
        assert_eq!(tokenize("São Paulo, Brasil"), vec!["são", "paulo", "brasil"]);
    }

    #[test]
    fn test_contains_phrase_whole_words() {
        assert!(contains_phrase("We met in New York last spring", "new york"));
        assert!(!contains_phrase("Newark airport", "new"));
        assert!(!contains_phrase("anything", ""));
    }
}
