//! Distance ranking over collections of located items.
//!
//! Used by reverse geocoding to find the closest gazetteer entry; large
//! collections are ranked in parallel when the `parallel` feature is on.

use crate::{haversine_distance, Coordinate};
use serde::{Deserialize, Serialize};

/// Anything that sits at a single coordinate.
pub trait Located {
    /// Position of the item
    fn coordinate(&self) -> Coordinate;
}

impl Located for Coordinate {
    fn coordinate(&self) -> Coordinate {
        *self
    }
}

/// Distance from the query point to one item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    /// Index of the item in the input slice
    pub index: usize,
    /// Great-circle distance in kilometers
    pub distance: f64,
}

/// Calculate distances from `from` to every item, in input order.
///
/// # Example
/// ```
/// use geotag_geo::{calculate_distances, Coordinate};
///
/// let points = vec![Coordinate::new(52.52, 13.405), Coordinate::new(48.8566, 2.3522)];
/// let results = calculate_distances(&Coordinate::new(50.0, 10.0), &points);
/// assert_eq!(results.len(), 2);
/// assert_eq!(results[1].index, 1);
/// ```
pub fn calculate_distances<T: Located + Sync>(
    from: &Coordinate,
    items: &[T],
) -> Vec<DistanceResult> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        items
            .par_iter()
            .enumerate()
            .map(|(index, item)| distance_to(from, index, item))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| distance_to(from, index, item))
            .collect()
    }
}

/// Find the closest item. Ties keep the earliest item.
///
/// Returns `None` for an empty slice.
pub fn nearest<'a, T: Located + Sync>(from: &Coordinate, items: &'a [T]) -> Option<(&'a T, f64)> {
    calculate_distances(from, items)
        .into_iter()
        .filter(|r| !r.distance.is_nan())
        .fold(None::<DistanceResult>, |best, r| match best {
            Some(b) if b.distance <= r.distance => Some(b),
            _ => Some(r),
        })
        .map(|r| (&items[r.index], r.distance))
}

/// Items within `radius_km`, closest first.
pub fn within_radius<T: Located + Sync>(
    from: &Coordinate,
    items: &[T],
    radius_km: f64,
) -> Vec<DistanceResult> {
    let mut results = calculate_distances(from, items);

    results.retain(|r| r.distance <= radius_km);
    results.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    results
}

#[inline]
fn distance_to<T: Located>(from: &Coordinate, index: usize, item: &T) -> DistanceResult {
    DistanceResult {
        index,
        distance: haversine_distance(from, &item.coordinate()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Place {
        name: &'static str,
        at: Coordinate,
    }

    impl Located for Place {
        fn coordinate(&self) -> Coordinate {
            self.at
        }
    }

    fn places() -> Vec<Place> {
        vec![
            Place { name: "Berlin", at: Coordinate::new(52.5200, 13.4050) },
            Place { name: "Paris", at: Coordinate::new(48.8566, 2.3522) },
            Place { name: "London", at: Coordinate::new(51.5074, -0.1278) },
        ]
    }

    #[test]
    fn test_nearest_picks_closest() {
        let items = places();
        // Frankfurt
        let (place, distance) = nearest(&Coordinate::new(50.1109, 8.6821), &items).unwrap();
        assert_eq!(place.name, "Berlin");
        assert!(distance > 400.0 && distance < 450.0, "{distance}");
    }

    #[test]
    fn test_nearest_empty() {
        let items: Vec<Place> = Vec::new();
        assert!(nearest(&Coordinate::new(0.0, 0.0), &items).is_none());
    }

    #[test]
    fn test_within_radius_sorted() {
        let items = places();
        let results = within_radius(&Coordinate::new(50.1109, 8.6821), &items, 600.0);

        assert!(results.iter().all(|r| r.distance <= 600.0));
        for window in results.windows(2) {
            assert!(window[0].distance <= window[1].distance);
        }
        assert!(!results.iter().any(|r| items[r.index].name == "London"));
    }

    #[test]
    fn test_coordinates_are_located() {
        let points = vec![Coordinate::new(1.0, 1.0), Coordinate::new(0.0, 0.1)];
        let (closest, _) = nearest(&Coordinate::new(0.0, 0.0), &points).unwrap();
        assert_eq!(*closest, Coordinate::new(0.0, 0.1));
    }
}
