//! Fuzzy matching algorithms.

/// Calculate Levenshtein edit distance between two strings.
///
/// Classic dynamic-programming recurrence over characters (not bytes),
/// keeping only two rows of the matrix.
///
/// # Arguments
/// * `a` - First string
/// * `b` - Second string
///
/// # Returns
/// Number of single-character edits needed to transform a into b
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();

    if m == 0 { return n; }
    if n == 0 { return m; }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Normalized similarity in `[0, 1]`: `1 - distance / max(len(a), len(b))`.
///
/// Two empty strings are identical (1.0). Lengths are counted in characters.
///
/// ```
/// use geotag_search::levenshtein_similarity;
///
/// assert_eq!(levenshtein_similarity("london", "london"), 1.0);
/// assert!((levenshtein_similarity("londn", "london") - 5.0 / 6.0).abs() < 1e-9);
/// ```
pub fn levenshtein_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(a, b) as f64 / max_len as f64
}

/// Check if text contains all characters of query in order.
///
/// Characters need not be consecutive.
pub fn fuzzy_match(text: &str, query: &str) -> bool {
    let mut text_chars = text.chars();

    query
        .chars()
        .all(|query_char| text_chars.any(|c| c == query_char))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_levenshtein_same() {
        assert_eq!(levenshtein_distance("paris", "paris"), 0);
    }

    #[test]
    fn test_levenshtein_edits() {
        assert_eq!(levenshtein_distance("tokyo", "tokio"), 1);
        assert_eq!(levenshtein_distance("berln", "berlin"), 1);
        assert_eq!(levenshtein_distance("berlin", "berln"), 1);
        assert_eq!(levenshtein_distance("", "abc"), 3);
    }

    #[test]
    fn test_levenshtein_counts_chars_not_bytes() {
        assert_eq!(levenshtein_distance("são paulo", "sao paulo"), 1);
        assert!((levenshtein_similarity("são paulo", "sao paulo") - 8.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(levenshtein_similarity("", ""), 1.0);
        assert_eq!(levenshtein_similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_fuzzy_match() {
        assert!(fuzzy_match("new york city", "nyc"));
        assert!(!fuzzy_match("paris", "sp"));
        assert!(fuzzy_match("paris", "paris"));
    }

    proptest! {
        #[test]
        fn prop_similarity_identity(s in "[a-z ]{0,24}") {
            prop_assert_eq!(levenshtein_similarity(&s, &s), 1.0);
        }

        #[test]
        fn prop_similarity_symmetric(a in "[a-z ]{0,16}", b in "[a-z ]{0,16}") {
            prop_assert_eq!(levenshtein_similarity(&a, &b), levenshtein_similarity(&b, &a));
        }

        #[test]
        fn prop_similarity_in_unit_interval(a in "\\PC{0,16}", b in "\\PC{0,16}") {
            let s = levenshtein_similarity(&a, &b);
            prop_assert!((0.0..=1.0).contains(&s));
        }
    }
}
