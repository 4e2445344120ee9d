//! Static gazetteer of well-known places.
//!
//! Entries are indexed by normalized name and alias on first use.

use geotag_geo::{Coordinate, Located};
use geotag_search::normalize_place_name;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One named place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazetteerEntry {
    /// Canonical display name
    pub name: String,
    /// Alternative spellings and abbreviations, matched exactly
    pub aliases: Vec<String>,
    /// Representative point
    pub coordinate: Coordinate,
    /// City, if the entry is a city
    pub city: Option<String>,
    /// State, province or region
    pub region: Option<String>,
    /// Country name
    pub country: Option<String>,
}

impl GazetteerEntry {
    /// Build a city entry.
    pub fn city(
        name: &str,
        latitude: f64,
        longitude: f64,
        region: Option<&str>,
        country: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            coordinate: Coordinate::new(latitude, longitude),
            city: Some(name.to_string()),
            region: region.map(str::to_string),
            country: Some(country.to_string()),
        }
    }

    /// Add aliases.
    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases.extend(aliases.iter().map(|a| a.to_string()));
        self
    }

    /// Name followed by region and country, comma-joined.
    pub fn formatted_address(&self) -> String {
        std::iter::once(self.name.as_str())
            .chain(self.region.as_deref().filter(|r| *r != self.name))
            .chain(self.country.as_deref().filter(|c| *c != self.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Located for GazetteerEntry {
    fn coordinate(&self) -> Coordinate {
        self.coordinate
    }
}

/// Indexed collection of places.
#[derive(Debug, Clone)]
pub struct Gazetteer {
    entries: Vec<GazetteerEntry>,
    /// Normalized canonical names, parallel to `entries`
    keys: Vec<String>,
    /// Normalized name or alias to entry index
    exact: HashMap<String, usize>,
}

static BUILTIN: Lazy<Gazetteer> = Lazy::new(|| Gazetteer::new(builtin_entries()));

impl Gazetteer {
    /// Index a list of entries. Earlier entries win on key collisions.
    pub fn new(entries: Vec<GazetteerEntry>) -> Self {
        let keys: Vec<String> = entries.iter().map(|e| normalize_place_name(&e.name)).collect();
        let mut exact = HashMap::new();

        for (index, entry) in entries.iter().enumerate() {
            exact.entry(keys[index].clone()).or_insert(index);
            for alias in &entry.aliases {
                exact.entry(normalize_place_name(alias)).or_insert(index);
            }
        }

        Self { entries, keys, exact }
    }

    /// The built-in world-cities table.
    pub fn builtin() -> &'static Gazetteer {
        &BUILTIN
    }

    /// All entries, in insertion order.
    pub fn entries(&self) -> &[GazetteerEntry] {
        &self.entries
    }

    /// Normalized canonical names, index-aligned with [`entries`](Self::entries).
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    /// Exact lookup by already-normalized key (name or alias).
    pub fn get(&self, key: &str) -> Option<&GazetteerEntry> {
        self.exact.get(key).map(|&i| &self.entries[i])
    }

    /// Entry by position.
    pub fn entry(&self, index: usize) -> Option<&GazetteerEntry> {
        self.entries.get(index)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn builtin_entries() -> Vec<GazetteerEntry> {
    vec![
        GazetteerEntry::city("New York City", 40.7128, -74.0060, Some("New York"), "United States")
            .with_aliases(&["NYC", "New York", "Manhattan"]),
        GazetteerEntry::city("Los Angeles", 34.0522, -118.2437, Some("California"), "United States")
            .with_aliases(&["LA"]),
        GazetteerEntry::city(
            "San Francisco",
            37.7749,
            -122.4194,
            Some("California"),
            "United States",
        )
            .with_aliases(&["SF"]),
        GazetteerEntry::city("Chicago", 41.8781, -87.6298, Some("Illinois"), "United States"),
        GazetteerEntry::city(
            "Washington",
            38.9072,
            -77.0369,
            Some("District of Columbia"),
            "United States",
        )
            .with_aliases(&["Washington DC", "Washington D.C."]),
        GazetteerEntry::city("Toronto", 43.6532, -79.3832, Some("Ontario"), "Canada"),
        GazetteerEntry::city("Mexico City", 19.4326, -99.1332, Some("Mexico City"), "Mexico")
            .with_aliases(&["CDMX"]),
        GazetteerEntry::city("Rio de Janeiro", -22.9068, -43.1729, Some("Rio de Janeiro"), "Brazil")
            .with_aliases(&["Rio"]),
        GazetteerEntry::city("London", 51.5074, -0.1278, Some("England"), "United Kingdom"),
        GazetteerEntry::city("Paris", 48.8566, 2.3522, Some("Ile-de-France"), "France"),
        GazetteerEntry::city("Berlin", 52.5200, 13.4050, Some("Berlin"), "Germany"),
        GazetteerEntry::city("Madrid", 40.4168, -3.7038, Some("Community of Madrid"), "Spain"),
        GazetteerEntry::city("Rome", 41.9028, 12.4964, Some("Lazio"), "Italy")
            .with_aliases(&["Roma"]),
        GazetteerEntry::city("Moscow", 55.7558, 37.6173, Some("Moscow"), "Russia"),
        GazetteerEntry::city("Cairo", 30.0444, 31.2357, Some("Cairo Governorate"), "Egypt"),
        GazetteerEntry::city("Cape Town", -33.9249, 18.4241, Some("Western Cape"), "South Africa"),
        GazetteerEntry::city("Dubai", 25.2048, 55.2708, Some("Dubai"), "United Arab Emirates"),
        GazetteerEntry::city("Mumbai", 19.0760, 72.8777, Some("Maharashtra"), "India")
            .with_aliases(&["Bombay"]),
        GazetteerEntry::city("Beijing", 39.9042, 116.4074, Some("Beijing"), "China")
            .with_aliases(&["Peking"]),
        GazetteerEntry::city("Singapore", 1.3521, 103.8198, None, "Singapore"),
        GazetteerEntry::city("Tokyo", 35.6762, 139.6503, Some("Tokyo"), "Japan"),
        GazetteerEntry::city("Sydney", -33.8688, 151.2093, Some("New South Wales"), "Australia"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_indexed() {
        let g = Gazetteer::builtin();
        assert!(g.len() >= 20);
        assert_eq!(g.get("new york city").unwrap().name, "New York City");
        assert_eq!(g.get("nyc").unwrap().name, "New York City");
        assert_eq!(g.get("washington d.c").unwrap().name, "Washington");
        assert!(g.get("atlantis").is_none());
    }

    #[test]
    fn test_builtin_coordinates_are_valid() {
        for entry in Gazetteer::builtin().entries() {
            assert!(entry.coordinate.is_valid(), "{}", entry.name);
        }
    }

    #[test]
    fn test_keys_align_with_entries() {
        let g = Gazetteer::builtin();
        for (key, entry) in g.keys().zip(g.entries()) {
            assert_eq!(key, normalize_place_name(&entry.name));
        }
    }

    #[test]
    fn test_formatted_address_skips_repeats() {
        let g = Gazetteer::builtin();
        assert_eq!(g.get("singapore").unwrap().formatted_address(), "Singapore");
        assert_eq!(g.get("berlin").unwrap().formatted_address(), "Berlin, Germany");
        assert_eq!(g.get("paris").unwrap().formatted_address(), "Paris, Ile-de-France, France");
    }

    #[test]
    fn test_first_entry_wins_collisions() {
        const US: &str = "United States";
        let g = Gazetteer::new(vec![
            GazetteerEntry::city("Springfield", 39.7817, -89.6501, Some("Illinois"), US),
            GazetteerEntry::city("Springfield", 42.1015, -72.5898, Some("Massachusetts"), US),
        ]);
        assert_eq!(g.get("springfield").unwrap().region.as_deref(), Some("Illinois"));
    }
}
