//! Location names from embedded XMP packets.
//!
//! Photo tools write the place a picture was taken into XMP as
//! `photoshop:City`, `photoshop:State`, `photoshop:Country` and
//! `Iptc4xmpCore:Location`, either as attributes or as child elements.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const PACKET_START: &[u8] = b"<x:xmpmeta";
const PACKET_END: &[u8] = b"</x:xmpmeta>";

static CITY: Lazy<Regex> = Lazy::new(|| property_regex("photoshop:City"));
static STATE: Lazy<Regex> = Lazy::new(|| property_regex("photoshop:State"));
static COUNTRY: Lazy<Regex> = Lazy::new(|| property_regex("photoshop:Country"));
static SUBLOCATION: Lazy<Regex> = Lazy::new(|| property_regex("Iptc4xmpCore:Location"));

fn property_regex(name: &str) -> Regex {
    let name = regex::escape(name);
    Regex::new(&format!(r#"{name}\s*=\s*"([^"]*)"|<{name}>([^<]*)</{name}>"#))
        .expect("XMP property pattern")
}

/// Place names found in an XMP packet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmpLocation {
    /// Sublocation, e.g. a landmark or street
    pub location: Option<String>,
    /// City
    pub city: Option<String>,
    /// State or province
    pub state: Option<String>,
    /// Country name
    pub country: Option<String>,
}

impl XmpLocation {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.country.is_none()
    }

    /// Comma-joined name, most specific first.
    ///
    /// ```
    /// use geotag_image::XmpLocation;
    ///
    /// let loc = XmpLocation {
    ///     city: Some("Paris".into()),
    ///     country: Some("France".into()),
    ///     ..Default::default()
    /// };
    /// assert_eq!(loc.display_name().as_deref(), Some("Paris, France"));
    /// ```
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.location, &self.city, &self.state, &self.country]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .collect();

        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

/// Find the XMP packet in raw file bytes and read its location fields.
///
/// Returns `None` when there is no packet or it names no place.
pub fn read_xmp_location(data: &[u8]) -> Option<XmpLocation> {
    let packet = packet(data)?;
    let text = String::from_utf8_lossy(packet);

    let location = XmpLocation {
        location: capture(&SUBLOCATION, &text),
        city: capture(&CITY, &text),
        state: capture(&STATE, &text),
        country: capture(&COUNTRY, &text),
    };

    (!location.is_empty()).then_some(location)
}

fn packet(data: &[u8]) -> Option<&[u8]> {
    let start = find(data, PACKET_START)?;
    let end = find(&data[start..], PACKET_END)? + start + PACKET_END.len();
    Some(&data[start..end])
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    let caps = re.captures(text)?;
    let value = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(body: &str) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8, 0xFF, 0xE1, 0x00, 0x10];
        data.extend_from_slice(b"http://ns.adobe.com/xap/1.0/\0");
        let packet = format!(r#"<x:xmpmeta xmlns:x="adobe:ns:meta/">{body}</x:xmpmeta>"#);
        data.extend_from_slice(packet.as_bytes());
        data.extend_from_slice(&[0xFF, 0xD9]);
        data
    }

    #[test]
    fn test_attribute_form() {
        let data =
            wrap(r#"<rdf:Description photoshop:City="Lisbon" photoshop:Country="Portugal"/>"#);
        let loc = read_xmp_location(&data).unwrap();

        assert_eq!(loc.city.as_deref(), Some("Lisbon"));
        assert_eq!(loc.country.as_deref(), Some("Portugal"));
        assert_eq!(loc.state, None);
        assert_eq!(loc.display_name().as_deref(), Some("Lisbon, Portugal"));
    }

    #[test]
    fn test_element_form() {
        let data = wrap(
            "<rdf:Description><Iptc4xmpCore:Location>Belem Tower</Iptc4xmpCore:Location>\
             <photoshop:City>Lisbon</photoshop:City></rdf:Description>",
        );
        let loc = read_xmp_location(&data).unwrap();

        assert_eq!(loc.display_name().as_deref(), Some("Belem Tower, Lisbon"));
    }

    #[test]
    fn test_no_packet() {
        assert!(read_xmp_location(&[0xFF, 0xD8, 0xFF, 0xD9]).is_none());
    }

    #[test]
    fn test_blank_values_ignored() {
        let data = wrap(r#"<rdf:Description photoshop:City="  "/>"#);
        assert!(read_xmp_location(&data).is_none());
    }
}
