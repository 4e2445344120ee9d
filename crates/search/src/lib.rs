//! Place-name matching for geotag geocoding.
//!
//! This crate provides:
//! - Levenshtein edit distance and normalized similarity
//! - Place-name normalization and Unicode-aware tokenization
//! - Match scoring of queries against gazetteer keys

mod error;
mod fuzzy;
mod normalize;
mod relevance;

pub use error::{Result, SearchError, SearchErrorCode};
pub use fuzzy::{fuzzy_match, levenshtein_distance, levenshtein_similarity};
pub use normalize::{address_segments, contains_phrase, normalize_place_name, tokenize};
pub use relevance::{
    best_place_match, score_place_match, MatchKind, PlaceMatch, DEFAULT_SIMILARITY_THRESHOLD,
};

/// Normalize a query, failing when nothing is left to match on.
///
/// ```
/// use geotag_search::normalized_query;
///
/// assert_eq!(normalized_query(" Rome. ").unwrap(), "rome");
/// assert!(normalized_query(" ,Italy").is_err());
/// ```
pub fn normalized_query(input: &str) -> Result<String> {
    let key = normalize_place_name(input);
    if key.is_empty() {
        return Err(SearchError::InvalidQuery(input.to_string()));
    }
    Ok(key)
}
