//! Coordinate extraction for geotag.
//!
//! This crate provides:
//! - A coordinate grammar for decimal degrees, DMS, DDM, UTM and MGRS text
//! - An EXIF/XMP metadata reader for images
//! - An opt-in heuristic extractor backed by a [`Geocoder`](geotag_geocode::Geocoder)
//! - The [`Orchestrator`] that runs them, deduplicates, backfills addresses and persists
//! - The [`GeoTagService`] for verification and deactivation
//!
//! # Example
//!
//! ```
//! use geotag_extract::grammar::parse_coordinates;
//! use geotag_extract::{Accuracy, CoordinateFormat};
//!
//! let found = parse_coordinates("Meet at 40°42'46\"N, 74°00'22\"W");
//! assert_eq!(found[0].original_format, CoordinateFormat::DegreesMinutesSeconds);
//! assert_eq!(found[0].accuracy, Accuracy::Exact);
//! ```

#![warn(missing_docs)]

pub mod dedup;
mod error;
mod extractor;
pub mod grammar;
pub mod heuristic;
pub mod jitter;
pub mod metadata;
pub mod model;
pub mod orchestrator;
pub mod service;
pub mod store;

pub use error::{ExtractError, ExtractErrorCode, Result};
pub use extractor::{ExtractionInput, Extractor};
pub use model::{
    Accuracy, Actor, Address, CoordinateFormat, CoordinateSource, CreateGeoTagDto, ExtractOptions,
    ExtractedCoordinate, GeoTag, Metadata, NewGeoTag,
};
pub use orchestrator::{Collaborators, ExtractionStage, Orchestrator};
pub use service::GeoTagService;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::grammar::{parse_coordinates, CoordinateGrammar};
    pub use crate::heuristic::HeuristicExtractor;
    pub use crate::jitter::{JitterSource, NoJitter, RandomJitter, SeededJitter};
    pub use crate::metadata::MetadataReader;
    pub use crate::store::{
        AuditSink, Document, DocumentContent, DocumentStore, GeoTagStore, InMemoryAuditSink,
        InMemoryDocumentStore, InMemoryGeoTagStore,
    };
    pub use crate::{
        Accuracy, Actor, Collaborators, CoordinateFormat, CoordinateSource, CreateGeoTagDto,
        ExtractError, ExtractOptions, ExtractedCoordinate, Extractor, GeoTag, GeoTagService,
        Orchestrator, Result,
    };
}
