//! Candidate deduplication.

use crate::ExtractedCoordinate;

/// Whether two candidates describe the same written or measured position.
///
/// Identical non-empty snippets always match. Positions are only compared
/// when neither side is a placeholder, so unconverted 0,0 values never
/// collapse into each other.
pub fn is_duplicate(a: &ExtractedCoordinate, b: &ExtractedCoordinate, epsilon: f64) -> bool {
    let a_text = a.extracted_text.trim();
    if !a_text.is_empty() && a_text == b.extracted_text.trim() {
        return true;
    }

    !a.is_placeholder() && !b.is_placeholder() && a.coordinate().approx_eq(&b.coordinate(), epsilon)
}

/// Collapse duplicates, keeping the more confident candidate of each group.
///
/// Output follows the order in which each group was first seen. On equal
/// confidence the earlier candidate wins, so extractor priority decides.
pub fn dedup_candidates(
    candidates: Vec<ExtractedCoordinate>,
    epsilon: f64,
) -> Vec<ExtractedCoordinate> {
    let mut kept: Vec<ExtractedCoordinate> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        match kept.iter_mut().find(|k| is_duplicate(k, &candidate, epsilon)) {
            Some(existing) if candidate.confidence > existing.confidence => *existing = candidate,
            Some(_) => {}
            None => kept.push(candidate),
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Accuracy, CoordinateFormat, CoordinateSource};
    use proptest::prelude::*;

    fn candidate(lat: f64, lon: f64, confidence: f64, text: &str) -> ExtractedCoordinate {
        ExtractedCoordinate::new(
            lat,
            lon,
            CoordinateSource::Regex,
            CoordinateFormat::DecimalDegrees,
            Accuracy::Exact,
            confidence,
            text,
        )
    }

    fn placeholder(text: &str) -> ExtractedCoordinate {
        ExtractedCoordinate::new(
            0.0,
            0.0,
            CoordinateSource::Regex,
            CoordinateFormat::Mgrs,
            Accuracy::Unknown,
            0.5,
            text,
        )
    }

    #[test]
    fn test_keeps_higher_confidence() {
        let out = dedup_candidates(
            vec![
                candidate(40.7128, -74.0060, 0.8, "40.7128, -74.0060"),
                candidate(40.71281, -74.00601, 0.98, "40°42'46\"N 74°00'22\"W"),
            ],
            1e-4,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].confidence, 0.98);
    }

    #[test]
    fn test_tie_keeps_first() {
        let out = dedup_candidates(
            vec![candidate(1.0, 1.0, 0.8, "first"), candidate(1.0, 1.0, 0.8, "second")],
            1e-4,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].extracted_text, "first");
    }

    #[test]
    fn test_same_snippet_is_duplicate() {
        let out = dedup_candidates(
            vec![
                candidate(10.0, 10.0, 0.5, "Tokyo, Japan"),
                candidate(10.5, 10.5, 0.7, "Tokyo, Japan"),
            ],
            1e-4,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].latitude, 10.5);
    }

    #[test]
    fn test_placeholders_compare_by_snippet_only() {
        let out = dedup_candidates(
            vec![
                placeholder("18TWL8562811322"),
                placeholder("33UXP0450000500"),
                placeholder("18TWL8562811322"),
            ],
            1e-4,
        );
        assert_eq!(out.len(), 2);

        let near_null_island = candidate(0.00001, 0.00001, 0.9, "0.00001, 0.00001");
        let out = dedup_candidates(vec![placeholder("18TWL8562811322"), near_null_island], 1e-4);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_distinct_points_survive_in_order() {
        let out = dedup_candidates(
            vec![
                candidate(1.0, 1.0, 0.8, "a"),
                candidate(2.0, 2.0, 0.9, "b"),
                candidate(3.0, 3.0, 0.7, "c"),
            ],
            1e-4,
        );
        let texts: Vec<_> = out.iter().map(|c| c.extracted_text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    proptest! {
        #[test]
        fn prop_duplicate_pair_collapses_to_max(
            lat in -89.0f64..89.0, lon in -179.0f64..179.0,
            c1 in 0.0f64..=1.0, c2 in 0.0f64..=1.0,
        ) {
            let out = dedup_candidates(
                vec![candidate(lat, lon, c1, "x"), candidate(lat, lon, c2, "y")],
                1e-4,
            );
            prop_assert_eq!(out.len(), 1);
            prop_assert_eq!(out[0].confidence, c1.max(c2));
        }
    }
}
