//! Match scoring between a place-name query and a gazetteer key.
//!
//! Both inputs are expected to be normalized already (see
//! [`normalize_place_name`](crate::normalize_place_name)).

use crate::levenshtein_similarity;
use serde::{Deserialize, Serialize};

/// Default minimum similarity for a fuzzy match.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;

/// How a query matched a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Edit-distance similarity above the threshold
    Similar = 10,
    /// One string contains the other
    Contains = 20,
    /// Identical
    Exact = 30,
}

/// Scored match of a query against one key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaceMatch {
    /// Kind of match
    pub kind: MatchKind,
    /// Score in `[0, 1]`
    pub score: f64,
}

/// Score `query` against `key`.
///
/// Every non-exact match must reach `threshold` similarity. Among those,
/// containment in either direction is reported as [`MatchKind::Contains`].
/// Empty inputs never match.
///
/// ```
/// use geotag_search::{score_place_match, MatchKind};
///
/// let m = score_place_match("london", "londn", 0.6).unwrap();
/// assert_eq!(m.kind, MatchKind::Similar);
/// assert!(score_place_match("london", "tokyo", 0.6).is_none());
/// ```
pub fn score_place_match(key: &str, query: &str, threshold: f64) -> Option<PlaceMatch> {
    if key.is_empty() || query.is_empty() {
        return None;
    }

    if key == query {
        return Some(PlaceMatch { kind: MatchKind::Exact, score: 1.0 });
    }

    let similarity = levenshtein_similarity(key, query);
    if similarity < threshold {
        return None;
    }

    let kind = if key.contains(query) || query.contains(key) {
        MatchKind::Contains
    } else {
        MatchKind::Similar
    };
    Some(PlaceMatch { kind, score: similarity })
}

/// Best match of `query` among `keys`, with its index.
///
/// Higher score wins; on equal score the stronger kind wins, then the
/// earliest key.
pub fn best_place_match<'a, I>(keys: I, query: &str, threshold: f64) -> Option<(usize, PlaceMatch)>
where
    I: IntoIterator<Item = &'a str>,
{
    keys.into_iter()
        .enumerate()
        .filter_map(|(i, key)| score_place_match(key, query, threshold).map(|m| (i, m)))
        .fold(None, |best: Option<(usize, PlaceMatch)>, (i, m)| match best {
            Some((_, b)) if (b.score, b.kind) >= (m.score, m.kind) => best,
            _ => Some((i, m)),
        })
}
