//! Coordinate grammar: finds written coordinates in free text.
//!
//! Recognized notations, tried in this order:
//!
//! | Notation | Example | Confidence | Accuracy |
//! |----------|---------|------------|----------|
//! | DMS | `40°42'46"N, 74°00'22"W` | 0.95 | exact |
//! | DDM | `40°42.767'N, 74°00.367'W` | 0.90 | exact |
//! | UTM | `18T 585628 4511322` | 0.85 | approximate |
//! | MGRS | `18T WL 85628 11322` | 0.50 | unknown (not converted) |
//! | Decimal | `lat: 40.7128, lon: -74.0060` | 0.80 | by precision |
//!
//! A match overlapping text already claimed by an earlier notation is
//! ignored. Nearby mentions of "gps" or "coordinates" add 0.1 to the
//! confidence, "location" adds 0.05. Anything outside latitude/longitude
//! bounds is dropped.

use crate::model::meta;
use crate::{
    Accuracy, CoordinateFormat, CoordinateSource, ExtractedCoordinate, ExtractionInput, Extractor,
    Result,
};
use async_trait::async_trait;
use geotag_geo::notation::METERS_PER_DEGREE;
use geotag_geo::{
    ddm_to_decimal, dms_to_decimal, utm_to_decimal_approx, Axis, Coordinate, Hemisphere,
    UtmReference,
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::ops::Range;

/// Base confidence for degrees-minutes-seconds.
pub const DMS_CONFIDENCE: f64 = 0.95;
/// Base confidence for degrees-decimal-minutes.
pub const DDM_CONFIDENCE: f64 = 0.90;
/// Base confidence for UTM.
pub const UTM_CONFIDENCE: f64 = 0.85;
/// Base confidence for MGRS.
pub const MGRS_CONFIDENCE: f64 = 0.5;
/// Base confidence for decimal degrees.
pub const DECIMAL_CONFIDENCE: f64 = 0.8;

/// Bytes of surrounding text inspected for keyword boosts.
const CONTEXT_WINDOW: usize = 100;

/// Decimal places needed before a decimal-degree pair counts as exact.
const EXACT_DECIMALS: usize = 4;

const DEGREE_MARK: &str = r"(?:°|º|˚|\s?deg\s?|d)";
const MINUTE_MARK: &str = r"(?:'|′|’|m)";
const SECOND_MARK: &str = r#"(?:"|″|”|''|s)"#;

static DMS: Lazy<Regex> = Lazy::new(|| {
    let part = format!(
        r"(\d{{1,3}}){DEGREE_MARK}\s*(\d{{1,2}})\s*{MINUTE_MARK}\s*(\d{{1,2}}(?:\.\d+)?)\s*{SECOND_MARK}?\s*([NSEWnsew])\b"
    );
    Regex::new(&format!(r"{part}\s*[,;/]?\s*{part}")).expect("DMS pattern")
});

static DDM: Lazy<Regex> = Lazy::new(|| {
    let part = format!(
        r"(\d{{1,3}}){DEGREE_MARK}\s*(\d{{1,2}}\.\d+)\s*{MINUTE_MARK}?\s*([NSEWnsew])\b"
    );
    Regex::new(&format!(r"{part}\s*[,;/]?\s*{part}")).expect("DDM pattern")
});

static UTM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(\d{1,2})\s?([C-HJ-NP-X])\s+(\d{6,7}(?:\.\d+)?)\s*(?:m?E)?\s+(\d{6,8}(?:\.\d+)?)\s*(?:m?N)?\b",
    )
    .expect("UTM pattern")
});

static MGRS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2}[C-HJ-NP-X])\s?([A-HJ-NP-Z][A-HJ-NP-V])\s?(\d{1,5}(?:\s?\d{1,5})?)\b")
        .expect("MGRS pattern")
});

const LAT_LABEL: &str = r"lat(?:itude)?";
const LON_LABEL: &str = r"(?:longitude|long|lon|lng)";

static DD_LABELED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b{LAT_LABEL}\s*[:=]\s*(-?\d{{1,2}}(?:\.\d+)?)\s*°?\s*[,;]?\s*{LON_LABEL}\s*[:=]\s*(-?\d{{1,3}}(?:\.\d+)?)"
    ))
    .expect("labeled decimal pattern")
});

// Longitude written first; group 1 is the longitude.
static DD_LABELED_LON_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b{LON_LABEL}\s*[:=]\s*(-?\d{{1,3}}(?:\.\d+)?)\s*°?\s*[,;]?\s*{LAT_LABEL}\s*[:=]\s*(-?\d{{1,2}}(?:\.\d+)?)"
    ))
    .expect("longitude-first labeled decimal pattern")
});

static DD_GPS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bgps\s*[:=]?\s*(-?\d{1,2}(?:\.\d+)?)\s*°?\s*,\s*(-?\d{1,3}(?:\.\d+)?)")
        .expect("GPS decimal pattern")
});

static DD_PAREN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(\s*(-?\d{1,2}\.\d+)\s*,\s*(-?\d{1,3}\.\d+)\s*\)")
        .expect("parenthesized decimal pattern")
});

// No lookbehind in `regex`: the leading group stands in for a left boundary
// and is excluded from the span.
static DD_BARE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[\s\[:=])(-?\d{1,2}\.\d{3,})\s*,\s*(-?\d{1,3}\.\d{3,})")
        .expect("bare decimal pattern")
});

/// A converted match before confidence and metadata are attached.
struct Reading {
    latitude: f64,
    longitude: f64,
    accuracy: Accuracy,
    radius: Option<f64>,
    extra: Vec<(&'static str, Value)>,
}

impl Reading {
    fn new(latitude: f64, longitude: f64, accuracy: Accuracy, radius: Option<f64>) -> Self {
        Self { latitude, longitude, accuracy, radius, extra: Vec::new() }
    }
}

struct Rule {
    regex: &'static Lazy<Regex>,
    format: CoordinateFormat,
    confidence: f64,
    method: &'static str,
    convert: fn(&Captures<'_>) -> Option<Reading>,
    /// Span starts at this capture group instead of the whole match
    span_group: Option<usize>,
}

const LABELED_METHOD: &str = "regex:decimal-degrees:labeled";

fn rules() -> [Rule; 9] {
    use CoordinateFormat::*;

    let decimal = |regex: &'static Lazy<Regex>,
                   method: &'static str,
                   convert: fn(&Captures<'_>) -> Option<Reading>,
                   span_group: Option<usize>| Rule {
        regex,
        format: DecimalDegrees,
        confidence: DECIMAL_CONFIDENCE,
        method,
        convert,
        span_group,
    };

    [
        Rule {
            regex: &DMS,
            format: DegreesMinutesSeconds,
            confidence: DMS_CONFIDENCE,
            method: "regex:dms",
            convert: convert_dms,
            span_group: None,
        },
        Rule {
            regex: &DDM,
            format: DegreesDecimalMinutes,
            confidence: DDM_CONFIDENCE,
            method: "regex:ddm",
            convert: convert_ddm,
            span_group: None,
        },
        Rule {
            regex: &UTM,
            format: Utm,
            confidence: UTM_CONFIDENCE,
            method: "regex:utm",
            convert: convert_utm,
            span_group: None,
        },
        Rule {
            regex: &MGRS,
            format: Mgrs,
            confidence: MGRS_CONFIDENCE,
            method: "regex:mgrs",
            convert: convert_mgrs,
            span_group: None,
        },
        decimal(&DD_LABELED, LABELED_METHOD, convert_decimal, None),
        decimal(&DD_LABELED_LON_FIRST, LABELED_METHOD, convert_decimal_lon_first, None),
        decimal(&DD_GPS, "regex:decimal-degrees:gps", convert_decimal, None),
        decimal(&DD_PAREN, "regex:decimal-degrees:parenthesized", convert_decimal, None),
        decimal(&DD_BARE, "regex:decimal-degrees", convert_decimal, Some(1)),
    ]
}

/// Find every coordinate written in `text`, in reading order.
///
/// Never fails: malformed or out-of-range matches are skipped.
///
/// ```
/// use geotag_extract::grammar::parse_coordinates;
///
/// let found = parse_coordinates("GPS: 40.7128, -74.0060");
/// assert_eq!(found.len(), 1);
/// assert!((found[0].latitude - 40.7128).abs() < 1e-9);
/// ```
pub fn parse_coordinates(text: &str) -> Vec<ExtractedCoordinate> {
    let mut claimed: Vec<Range<usize>> = Vec::new();
    let mut found: Vec<(usize, ExtractedCoordinate)> = Vec::new();

    for rule in rules() {
        for caps in rule.regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let start = rule
                .span_group
                .and_then(|g| caps.get(g))
                .map_or(whole.start(), |m| m.start());
            let span = start..whole.end();

            if claimed.iter().any(|c| c.start < span.end && span.start < c.end) {
                continue;
            }

            let Some(reading) = (rule.convert)(&caps) else { continue };
            let placeholder = reading.accuracy == Accuracy::Unknown;
            if !placeholder && !Coordinate::new(reading.latitude, reading.longitude).is_valid() {
                continue;
            }

            let snippet = &text[span.clone()];
            let confidence = (rule.confidence + context_boost(text, &span)).min(1.0);

            let mut coordinate = ExtractedCoordinate::new(
                reading.latitude,
                reading.longitude,
                CoordinateSource::Regex,
                rule.format,
                reading.accuracy,
                confidence,
                snippet.trim(),
            )
            .with_meta(meta::RAW_TEXT, snippet)
            .with_meta(meta::EXTRACTION_METHOD, rule.method);

            if let Some(radius) = reading.radius {
                coordinate = coordinate.with_radius(radius);
            }
            for (key, value) in reading.extra {
                coordinate = coordinate.with_meta(key, value);
            }

            claimed.push(span.clone());
            found.push((span.start, coordinate));
        }
    }

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, c)| c).collect()
}

/// Keyword boost from the text around a match.
fn context_boost(text: &str, span: &Range<usize>) -> f64 {
    let mut start = span.start.saturating_sub(CONTEXT_WINDOW);
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (span.end + CONTEXT_WINDOW).min(text.len());
    while !text.is_char_boundary(end) {
        end += 1;
    }

    let window = text[start..end].to_lowercase();
    if window.contains("gps") || window.contains("coordinates") {
        0.1
    } else if window.contains("location") {
        0.05
    } else {
        0.0
    }
}

fn number(caps: &Captures<'_>, group: usize) -> Option<f64> {
    caps.get(group)?.as_str().parse().ok()
}

fn decimals(caps: &Captures<'_>, group: usize) -> usize {
    caps.get(group)
        .and_then(|m| m.as_str().split_once('.'))
        .map_or(0, |(_, fraction)| fraction.len())
}

fn hemisphere(caps: &Captures<'_>, group: usize) -> Option<Hemisphere> {
    caps.get(group)?.as_str().chars().next().and_then(Hemisphere::from_char)
}

/// One half of a DMS/DDM pair.
struct Half {
    value: f64,
    hemisphere: Hemisphere,
    precision: usize,
}

/// Order two halves as (latitude, longitude); both on one axis is invalid.
fn order(first: Half, second: Half) -> Option<(Half, Half)> {
    match (first.hemisphere.axis(), second.hemisphere.axis()) {
        (Axis::Latitude, Axis::Longitude) => Some((first, second)),
        (Axis::Longitude, Axis::Latitude) => Some((second, first)),
        _ => None,
    }
}

fn dms_half(caps: &Captures<'_>, base: usize) -> Option<Half> {
    let degrees = number(caps, base)?;
    let minutes = number(caps, base + 1)?;
    let seconds = number(caps, base + 2)?;
    let hemisphere = hemisphere(caps, base + 3)?;

    if minutes >= 60.0 || seconds >= 60.0 {
        return None;
    }

    Some(Half {
        value: dms_to_decimal(degrees, minutes, seconds, hemisphere),
        hemisphere,
        precision: decimals(caps, base + 2),
    })
}

fn ddm_half(caps: &Captures<'_>, base: usize) -> Option<Half> {
    let degrees = number(caps, base)?;
    let minutes = number(caps, base + 1)?;
    let hemisphere = hemisphere(caps, base + 2)?;

    if minutes >= 60.0 {
        return None;
    }

    Some(Half {
        value: ddm_to_decimal(degrees, minutes, hemisphere),
        hemisphere,
        precision: decimals(caps, base + 1),
    })
}

fn convert_dms(caps: &Captures<'_>) -> Option<Reading> {
    let (lat, lon) = order(dms_half(caps, 1)?, dms_half(caps, 5)?)?;
    let precision = lat.precision.min(lon.precision) as i32;
    let radius = METERS_PER_DEGREE / 3600.0 / 10f64.powi(precision);
    Some(Reading::new(lat.value, lon.value, Accuracy::Exact, Some(radius)))
}

fn convert_ddm(caps: &Captures<'_>) -> Option<Reading> {
    let (lat, lon) = order(ddm_half(caps, 1)?, ddm_half(caps, 4)?)?;
    let precision = lat.precision.min(lon.precision) as i32;
    let radius = METERS_PER_DEGREE / 60.0 / 10f64.powi(precision);
    Some(Reading::new(lat.value, lon.value, Accuracy::Exact, Some(radius)))
}

fn convert_utm(caps: &Captures<'_>) -> Option<Reading> {
    let zone: u8 = caps.get(1)?.as_str().parse().ok()?;
    let band = caps.get(2)?.as_str().chars().next()?;
    let utm = UtmReference { zone, band, easting: number(caps, 3)?, northing: number(caps, 4)? };

    let at = utm_to_decimal_approx(&utm).ok()?;
    let mut reading = Reading::new(at.latitude, at.longitude, Accuracy::Approximate, None);
    reading.extra.push(("utmZone", Value::from(format!("{zone}{band}"))));
    Some(reading)
}

fn convert_mgrs(caps: &Captures<'_>) -> Option<Reading> {
    let grid_zone = caps.get(1)?.as_str();
    let square = caps.get(2)?.as_str();
    let digits: String = caps.get(3)?.as_str().chars().filter(char::is_ascii_digit).collect();

    if digits.len() < 2 || digits.len() % 2 != 0 {
        return None;
    }

    let mut reading = Reading::new(0.0, 0.0, Accuracy::Unknown, None);
    reading.extra.push((meta::REQUIRES_CONVERSION, Value::Bool(true)));
    reading.extra.push(("gridZone", Value::from(grid_zone)));
    reading.extra.push(("squareId", Value::from(square)));
    reading.extra.push(("gridDigits", Value::from(digits)));
    Some(reading)
}

fn convert_decimal(caps: &Captures<'_>) -> Option<Reading> {
    decimal_pair(caps, 1, 2)
}

fn convert_decimal_lon_first(caps: &Captures<'_>) -> Option<Reading> {
    decimal_pair(caps, 2, 1)
}

fn decimal_pair(caps: &Captures<'_>, lat_group: usize, lon_group: usize) -> Option<Reading> {
    let latitude = number(caps, lat_group)?;
    let longitude = number(caps, lon_group)?;
    let precision = decimals(caps, lat_group).min(decimals(caps, lon_group));

    let accuracy = if precision >= EXACT_DECIMALS {
        Accuracy::Exact
    } else {
        Accuracy::Approximate
    };
    let radius = METERS_PER_DEGREE / 10f64.powi(precision as i32);

    Some(Reading::new(latitude, longitude, accuracy, Some(radius)))
}

/// The grammar parser as an [`Extractor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateGrammar;

#[async_trait]
impl Extractor for CoordinateGrammar {
    fn name(&self) -> &'static str {
        "grammar"
    }

    fn is_applicable(&self, input: &ExtractionInput) -> bool {
        !input.is_image() && !input.text.trim().is_empty()
    }

    async fn extract(&self, input: &ExtractionInput) -> Result<Vec<ExtractedCoordinate>> {
        Ok(parse_coordinates(&input.text))
    }
}
