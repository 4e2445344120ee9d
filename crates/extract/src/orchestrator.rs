//! Extraction orchestrator.
//!
//! Runs the configured extractors over one document, deduplicates the
//! candidates, backfills addresses and persists the result:
//!
//! ```text
//! NotExtracted ─┬─> Skipped                       (active tags, no force)
//!               └─> Extracting -> Deduplicating -> ReverseGeocoding -> Persisting -> Done
//! ```

use crate::dedup::dedup_candidates;
use crate::grammar::CoordinateGrammar;
use crate::heuristic::HeuristicExtractor;
use crate::metadata::MetadataReader;
use crate::model::{meta, Address};
use crate::store::{AuditSink, DocumentStore, GeoTagStore};
use crate::{
    Accuracy, Actor, CoordinateFormat, CoordinateSource, CreateGeoTagDto, ExtractError,
    ExtractOptions, ExtractedCoordinate, ExtractionInput, Extractor, GeoTag, NewGeoTag, Result,
};
use chrono::Utc;
use geotag_core::audit::{AuditAction, AuditEvent};
use geotag_core::config::ConfigSchema;
use geotag_core::validation::Validator;
use geotag_geocode::Geocoder;
use geotag_telemetry::{metrics, Timer};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a document is in its extraction run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    /// Run accepted, nothing done yet
    NotExtracted,
    /// Active tags exist and re-extraction was not forced
    Skipped,
    /// Extractors running
    Extracting,
    /// Collapsing duplicate candidates
    Deduplicating,
    /// Backfilling addresses
    ReverseGeocoding,
    /// Writing geo-tags
    Persisting,
    /// Finished
    Done,
}

fn enter(document_id: &str, stage: ExtractionStage) {
    debug!(document_id, stage = ?stage, "extraction stage");
}

/// External services the orchestrator talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Resolves document ids to content
    pub documents: Arc<dyn DocumentStore>,
    /// Persists geo-tags
    pub tags: Arc<dyn GeoTagStore>,
    /// Receives audit events
    pub audit: Arc<dyn AuditSink>,
    /// Forward and reverse geocoding
    pub geocoder: Arc<dyn Geocoder>,
}

/// Runs extractors in a fixed order and persists what they find.
pub struct Orchestrator {
    documents: Arc<dyn DocumentStore>,
    tags: Arc<dyn GeoTagStore>,
    audit: Arc<dyn AuditSink>,
    geocoder: Arc<dyn Geocoder>,
    extractors: Vec<Arc<dyn Extractor>>,
    dedup_epsilon: f64,
}

impl Orchestrator {
    /// Orchestrator over an explicit, ordered extractor list.
    pub fn new(collaborators: Collaborators, extractors: Vec<Arc<dyn Extractor>>) -> Self {
        Self {
            documents: collaborators.documents,
            tags: collaborators.tags,
            audit: collaborators.audit,
            geocoder: collaborators.geocoder,
            extractors,
            dedup_epsilon: ConfigSchema::default().extraction.dedup_epsilon,
        }
    }

    /// Metadata reader, then grammar parser, then the opt-in heuristic extractor.
    pub fn with_default_extractors(collaborators: Collaborators, config: &ConfigSchema) -> Self {
        let heuristic = HeuristicExtractor::new(collaborators.geocoder.clone())
            .with_settings(&config.heuristic);
        let extractors: Vec<Arc<dyn Extractor>> = vec![
            Arc::new(MetadataReader),
            Arc::new(CoordinateGrammar),
            Arc::new(heuristic),
        ];

        Self::new(collaborators, extractors).with_dedup_epsilon(config.extraction.dedup_epsilon)
    }

    /// Degrees within which two positions count as the same.
    pub fn with_dedup_epsilon(mut self, epsilon: f64) -> Self {
        self.dedup_epsilon = epsilon;
        self
    }

    /// Extractor names in run order.
    pub fn extractor_names(&self) -> Vec<&'static str> {
        self.extractors.iter().map(|e| e.name()).collect()
    }

    /// Extract coordinates from a document and persist them as geo-tags.
    ///
    /// Returns the document's existing active tags untouched when there are
    /// any and `force_reextraction` is off. A forced run deactivates them
    /// only once at least one new tag has been saved. An unknown document surfaces
    /// [`ExtractError::NotFound`]; unreadable content, or every attempted
    /// extractor failing, surfaces [`ExtractError::ExtractionFailed`]. A
    /// coordinate that fails to save is logged and left out of the result.
    pub async fn extract_and_store_coordinates(
        &self,
        document_id: &str,
        actor: &Actor,
        options: &ExtractOptions,
    ) -> Result<Vec<GeoTag>> {
        let _timer = Timer::start("extraction.duration_ms");
        metrics().increment("extraction.runs");
        enter(document_id, ExtractionStage::NotExtracted);

        let document = self.documents.resolve(document_id).await?;

        let existing: Vec<GeoTag> = self
            .tags
            .find_by_document(document_id)
            .await?
            .into_iter()
            .filter(|t| t.is_active)
            .collect();

        if !existing.is_empty() && !options.force_reextraction {
            enter(document_id, ExtractionStage::Skipped);
            self.emit(
                AuditEvent::new(AuditAction::ExtractionSkipped, document_id)
                    .with_actor(actor.id.as_str())
                    .with_detail("existing_tags", existing.len()),
            )
            .await;
            return Ok(existing);
        }

        let content = match document.read_content().await {
            Ok(content) => content,
            Err(err) => {
                let reason = format!("content unreadable: {err}");
                return Err(self.fail(document_id, actor, reason).await);
            }
        };
        let input = ExtractionInput::new(
            document.id.clone(),
            content,
            document.mime_type.clone(),
            document.original_name.clone(),
        );

        enter(document_id, ExtractionStage::Extracting);
        let candidates = match self.run_extractors(&input, options).await {
            Ok(candidates) => candidates,
            Err(err) => return Err(self.fail(document_id, actor, err.to_string()).await),
        };

        enter(document_id, ExtractionStage::Deduplicating);
        let found = candidates.len();
        let mut candidates: Vec<ExtractedCoordinate> =
            dedup_candidates(candidates, self.dedup_epsilon)
                .into_iter()
                .filter(|c| c.confidence >= options.min_confidence)
                .collect();
        metrics().increment_by("extraction.candidates", candidates.len() as u64);
        debug!(document_id, found, kept = candidates.len(), "candidates deduplicated");

        if options.reverse_geocode {
            enter(document_id, ExtractionStage::ReverseGeocoding);
            let needs_address = candidates
                .iter_mut()
                .filter(|c| !c.is_placeholder() && !c.has_address());
            for candidate in needs_address {
                self.backfill_address(candidate).await;
            }
        }

        enter(document_id, ExtractionStage::Persisting);
        let mut saved = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let new_tag = NewGeoTag {
                document_id: document_id.to_string(),
                coordinate: candidate,
                extracted_by: actor.clone(),
            };

            match self.tags.save(new_tag).await {
                Ok(tag) => {
                    metrics().increment("extraction.persisted");
                    self.emit(extracted_event(&tag, actor)).await;
                    saved.push(tag);
                }
                Err(err) => {
                    metrics().increment("extraction.persist_failures");
                    warn!(document_id, error = %err, "skipping coordinate that failed to persist");
                }
            }
        }

        // Previous tags stay active unless something replaced them.
        if options.force_reextraction && !saved.is_empty() {
            self.deactivate_all(existing, actor).await;
        }

        enter(document_id, ExtractionStage::Done);
        info!(document_id, count = saved.len(), "coordinates extracted");
        Ok(saved)
    }

    /// Manual entry, bypassing the extractors.
    ///
    /// Bounds are checked before anything else. The address is backfilled by
    /// reverse geocoding when none is given.
    pub async fn create_geo_tag(&self, dto: CreateGeoTagDto, actor: &Actor) -> Result<GeoTag> {
        let validation = Validator::new()
            .required("document_id", &dto.document_id)
            .latitude("latitude", dto.latitude)
            .longitude("longitude", dto.longitude)
            .custom("altitude", || {
                dto.altitude
                    .filter(|a| !a.is_finite())
                    .map(|_| "Must be a finite number of meters".to_string())
            })
            .custom("accuracy_radius", || {
                dto.accuracy_radius
                    .filter(|r| !r.is_finite() || *r < 0.0)
                    .map(|_| "Must be a non-negative number of meters".to_string())
            })
            .validate();

        if !validation.is_valid() {
            let reasons: Vec<String> =
                validation.errors().iter().map(ToString::to_string).collect();
            return Err(ExtractError::Validation(reasons.join("; ")));
        }

        let document = self.documents.resolve(&dto.document_id).await?;

        let text = dto
            .extracted_text
            .unwrap_or_else(|| format!("{}, {}", dto.latitude, dto.longitude));
        let mut coordinate = ExtractedCoordinate::new(
            dto.latitude,
            dto.longitude,
            CoordinateSource::Manual,
            CoordinateFormat::DecimalDegrees,
            dto.accuracy.unwrap_or(Accuracy::Exact),
            1.0,
            text,
        )
        .with_altitude(dto.altitude)
        .with_address(dto.address)
        .with_meta(meta::EXTRACTION_METHOD, "manual");

        if let Some(radius) = dto.accuracy_radius {
            coordinate = coordinate.with_radius(radius);
        }
        if !coordinate.is_placeholder() && !coordinate.has_address() {
            self.backfill_address(&mut coordinate).await;
        }

        let tag = self
            .tags
            .save(NewGeoTag {
                document_id: document.id,
                coordinate,
                extracted_by: actor.clone(),
            })
            .await?;

        self.emit(
            AuditEvent::new(AuditAction::GeoTagCreated, tag.id.to_string())
                .with_actor(actor.id.as_str())
                .with_detail("document_id", tag.document_id.as_str())
                .with_detail("latitude", tag.coordinate.latitude)
                .with_detail("longitude", tag.coordinate.longitude),
        )
        .await;

        info!(document_id = %tag.document_id, geo_tag_id = %tag.id, "geo-tag created manually");
        Ok(tag)
    }

    async fn run_extractors(
        &self,
        input: &ExtractionInput,
        options: &ExtractOptions,
    ) -> Result<Vec<ExtractedCoordinate>> {
        let mut candidates = Vec::new();
        let mut attempted = 0usize;
        let mut last_failure = None;
        let mut failures = 0usize;

        for extractor in &self.extractors {
            let name = extractor.name();

            if extractor.requires_opt_in() && !options.use_ai {
                debug!(
                    document_id = %input.document_id,
                    extractor = name,
                    "opt-in extractor not enabled"
                );
                continue;
            }
            if !extractor.is_applicable(input) {
                continue;
            }

            attempted += 1;
            match extractor.extract(input).await {
                Ok(found) => {
                    debug!(
                        document_id = %input.document_id,
                        extractor = name,
                        count = found.len(),
                        "extractor finished"
                    );
                    candidates.extend(found);
                }
                Err(err) => {
                    failures += 1;
                    metrics().increment("extraction.extractor_failures");
                    warn!(
                        document_id = %input.document_id,
                        extractor = name,
                        error = %err,
                        "extractor failed"
                    );
                    last_failure = Some(ExtractError::Extractor {
                        extractor: name,
                        reason: err.to_string(),
                    });
                }
            }
        }

        match last_failure {
            Some(err) if failures == attempted => Err(err),
            _ => Ok(candidates),
        }
    }

    async fn backfill_address(&self, coordinate: &mut ExtractedCoordinate) {
        match self.geocoder.reverse_geocode(coordinate.latitude, coordinate.longitude).await {
            Ok(Some(place)) => {
                coordinate.address = Address {
                    address: Some(place.address),
                    city: place.city,
                    region: place.region,
                    country: place.country,
                };
            }
            Ok(None) => {}
            Err(err) => {
                warn!(
                    latitude = coordinate.latitude,
                    longitude = coordinate.longitude,
                    error = %err,
                    "reverse geocoding failed"
                );
            }
        }
    }

    async fn deactivate_all(&self, tags: Vec<GeoTag>, actor: &Actor) {
        for mut tag in tags {
            tag.is_active = false;
            tag.updated_at = Utc::now();

            match self.tags.update(tag).await {
                Ok(tag) => {
                    self.emit(
                        AuditEvent::new(AuditAction::GeoTagDeactivated, tag.id.to_string())
                            .with_actor(actor.id.as_str())
                            .with_detail("document_id", tag.document_id.as_str())
                            .with_detail("reason", "re-extraction"),
                    )
                    .await;
                }
                Err(err) => warn!(error = %err, "could not deactivate previous geo-tag"),
            }
        }
    }

    /// Audit and wrap a whole-document failure.
    async fn fail(&self, document_id: &str, actor: &Actor, reason: String) -> ExtractError {
        warn!(document_id, reason = %reason, "extraction failed");
        self.emit(
            AuditEvent::new(AuditAction::ExtractionFailed, document_id)
                .with_actor(actor.id.as_str())
                .with_detail("reason", reason.as_str())
                .failed(),
        )
        .await;

        ExtractError::ExtractionFailed { document_id: document_id.to_string(), reason }
    }

    /// Fire-and-forget audit.
    async fn emit(&self, event: AuditEvent) {
        let action = event.action;
        if let Err(err) = self.audit.record(event).await {
            warn!(action = %action, error = %err, "audit event dropped");
        }
    }
}

fn extracted_event(tag: &GeoTag, actor: &Actor) -> AuditEvent {
    let c = &tag.coordinate;
    AuditEvent::new(AuditAction::CoordinateExtracted, tag.document_id.as_str())
        .with_actor(actor.id.as_str())
        .with_detail("document_id", tag.document_id.as_str())
        .with_detail("geo_tag_id", tag.id.to_string())
        .with_detail("latitude", c.latitude)
        .with_detail("longitude", c.longitude)
        .with_detail("source", serde_json::to_value(c.source).unwrap_or(Value::Null))
        .with_detail("accuracy", serde_json::to_value(c.accuracy).unwrap_or(Value::Null))
        .with_detail("confidence", c.confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Document, InMemoryAuditSink, InMemoryDocumentStore, InMemoryGeoTagStore};
    use crate::ExtractErrorCode;
    use async_trait::async_trait;
    use geotag_geocode::GazetteerGeocoder;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use uuid::Uuid;

    struct Harness {
        documents: Arc<InMemoryDocumentStore>,
        tags: Arc<InMemoryGeoTagStore>,
        audit: Arc<InMemoryAuditSink>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                documents: Arc::new(InMemoryDocumentStore::new()),
                tags: Arc::new(InMemoryGeoTagStore::new()),
                audit: Arc::new(InMemoryAuditSink::new()),
            }
        }

        fn collaborators(&self) -> Collaborators {
            Collaborators {
                documents: self.documents.clone(),
                tags: self.tags.clone(),
                audit: self.audit.clone(),
                geocoder: Arc::new(GazetteerGeocoder::new()),
            }
        }

        fn orchestrator(&self) -> Orchestrator {
            Orchestrator::with_default_extractors(self.collaborators(), &ConfigSchema::default())
        }

        fn text(&self, id: &str, text: &str) {
            self.documents.insert(Document::from_bytes(id, text, Some("text/plain")));
        }

        fn actions(&self) -> Vec<AuditAction> {
            self.audit.events().into_iter().map(|e| e.action).collect()
        }
    }

    /// Counts calls; can be made to fail.
    struct Counting {
        calls: AtomicUsize,
        opt_in: bool,
        fail: bool,
    }

    impl Counting {
        fn new(opt_in: bool, fail: bool) -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), opt_in, fail })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Extractor for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn is_applicable(&self, _input: &ExtractionInput) -> bool {
            true
        }

        fn requires_opt_in(&self) -> bool {
            self.opt_in
        }

        async fn extract(&self, _input: &ExtractionInput) -> Result<Vec<ExtractedCoordinate>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ExtractError::Validation("counting failure".into()));
            }
            Ok(Vec::new())
        }
    }

    /// Rejects coordinates north of 45°.
    struct PickyStore(InMemoryGeoTagStore);

    #[async_trait]
    impl GeoTagStore for PickyStore {
        async fn save(&self, tag: NewGeoTag) -> Result<GeoTag> {
            if tag.coordinate.latitude > 45.0 {
                return Err(ExtractError::Persist("constraint violated".into()));
            }
            self.0.save(tag).await
        }

        async fn find_by_document(&self, document_id: &str) -> Result<Vec<GeoTag>> {
            self.0.find_by_document(document_id).await
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<GeoTag>> {
            self.0.find_by_id(id).await
        }

        async fn update(&self, tag: GeoTag) -> Result<GeoTag> {
            self.0.update(tag).await
        }
    }

    /// Rejects every save once `offline` is set.
    #[derive(Default)]
    struct OutageStore {
        inner: InMemoryGeoTagStore,
        offline: AtomicBool,
    }

    #[async_trait]
    impl GeoTagStore for OutageStore {
        async fn save(&self, tag: NewGeoTag) -> Result<GeoTag> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(ExtractError::Persist("database unavailable".into()));
            }
            self.inner.save(tag).await
        }

        async fn find_by_document(&self, document_id: &str) -> Result<Vec<GeoTag>> {
            self.inner.find_by_document(document_id).await
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<GeoTag>> {
            self.inner.find_by_id(id).await
        }

        async fn update(&self, tag: GeoTag) -> Result<GeoTag> {
            self.inner.update(tag).await
        }
    }

    #[tokio::test]
    async fn test_extracts_and_audits() {
        let h = Harness::new();
        h.text("doc-1", "GPS: 40.7128, -74.0060");

        let tags = h
            .orchestrator()
            .extract_and_store_coordinates(
                "doc-1",
                &Actor::new("u1", "u1@example.com"),
                &ExtractOptions::default(),
            )
            .await
            .unwrap();

        assert_eq!(tags.len(), 1);
        let tag = &tags[0];
        assert_eq!(tag.document_id, "doc-1");
        assert_eq!(tag.extracted_by, "u1");
        assert!(tag.is_active);
        assert_eq!(tag.coordinate.address.address.as_deref(), Some("Near New York City"));
        assert_eq!(tag.coordinate.address.country.as_deref(), Some("United States"));

        let events = h.audit.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, AuditAction::CoordinateExtracted);
        assert_eq!(events[0].resource_id, "doc-1");
        assert_eq!(events[0].actor, "u1");
        assert_eq!(events[0].details["source"], "regex");
        assert_eq!(events[0].details["accuracy"], "exact");
        assert_eq!(events[0].details["latitude"], 40.7128);
    }

    #[tokio::test]
    async fn test_reverse_geocoding_can_be_disabled() {
        let h = Harness::new();
        h.text("doc-1", "GPS: 40.7128, -74.0060");
        let options = ExtractOptions { reverse_geocode: false, ..ExtractOptions::default() };

        let tags = h
            .orchestrator()
            .extract_and_store_coordinates("doc-1", &Actor::system(), &options)
            .await
            .unwrap();
        assert!(!tags[0].coordinate.has_address());
    }

    #[tokio::test]
    async fn test_unknown_document() {
        let h = Harness::new();
        let err = h
            .orchestrator()
            .extract_and_store_coordinates("nope", &Actor::system(), &ExtractOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ExtractErrorCode::NotFound);
        assert!(h.tags.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_content_fails_whole_document() {
        let h = Harness::new();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.txt");
        h.documents.insert(Document::from_path("doc-1", missing, Some("text/plain")));

        let err = h
            .orchestrator()
            .extract_and_store_coordinates("doc-1", &Actor::system(), &ExtractOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ExtractErrorCode::ExtractionFailed);
        assert_eq!(h.actions(), vec![AuditAction::ExtractionFailed]);
    }

    #[tokio::test]
    async fn test_existing_tags_skip_extraction() {
        let h = Harness::new();
        h.text("doc-1", "GPS: 40.7128, -74.0060");
        let orchestrator = h.orchestrator();
        let options = ExtractOptions::default();

        let first = orchestrator

            .extract_and_store_coordinates("doc-1", &Actor::system(), &options)

            .await

            .unwrap();
        let second = orchestrator
            .extract_and_store_coordinates("doc-1", &Actor::system(), &options)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(h.tags.len(), 1);
        assert_eq!(
            h.actions(),
            vec![AuditAction::CoordinateExtracted, AuditAction::ExtractionSkipped]
        );
    }

    #[tokio::test]
    async fn test_forced_reextraction_replaces_active_tags() {
        let h = Harness::new();
        h.text("doc-1", "GPS: 40.7128, -74.0060");
        let orchestrator = h.orchestrator();

        let first = orchestrator
            .extract_and_store_coordinates("doc-1", &Actor::system(), &ExtractOptions::default())
            .await
            .unwrap();
        let forced = ExtractOptions { force_reextraction: true, ..ExtractOptions::default() };
        let second = orchestrator
            .extract_and_store_coordinates("doc-1", &Actor::system(), &forced)
            .await
            .unwrap();

        assert_eq!(second.len(), 1);
        assert_ne!(first[0].id, second[0].id);

        let all = h.tags.find_by_document("doc-1").await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all.iter().filter(|t| t.is_active).count(), 1);
        assert!(h.actions().contains(&AuditAction::GeoTagDeactivated));
    }

    #[tokio::test]
    async fn test_forced_run_keeps_old_tags_when_nothing_saves() {
        let h = Harness::new();
        h.text("doc-1", "GPS: 40.7128, -74.0060");
        let store = Arc::new(OutageStore::default());
        let collaborators = Collaborators { tags: store.clone(), ..h.collaborators() };
        let orchestrator = Orchestrator::new(collaborators, vec![Arc::new(CoordinateGrammar)]);

        let first = orchestrator
            .extract_and_store_coordinates("doc-1", &Actor::system(), &ExtractOptions::default())
            .await
            .unwrap();
        assert_eq!(first.len(), 1);

        store.offline.store(true, Ordering::SeqCst);
        let forced = ExtractOptions { force_reextraction: true, ..ExtractOptions::default() };
        let second = orchestrator
            .extract_and_store_coordinates("doc-1", &Actor::system(), &forced)
            .await
            .unwrap();
        assert!(second.is_empty());

        let all = store.find_by_document("doc-1").await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].is_active);
        assert!(!h.actions().contains(&AuditAction::GeoTagDeactivated));
    }

    #[tokio::test]
    async fn test_opt_in_extractor_needs_use_ai() {
        let h = Harness::new();
        h.text("doc-1", "Nothing to see near the Eiffel Tower today.");
        let counting = Counting::new(true, false);
        let extractors: Vec<Arc<dyn Extractor>> = vec![Arc::new(CoordinateGrammar), counting.clone()];
        let orchestrator = Orchestrator::new(h.collaborators(), extractors);

        let options = ExtractOptions::default();
        orchestrator
            .extract_and_store_coordinates("doc-1", &Actor::system(), &options)
            .await
            .unwrap();
        assert_eq!(counting.calls(), 0);

        let options = ExtractOptions {
            use_ai: true,
            force_reextraction: true,
            ..ExtractOptions::default()
        };
        orchestrator
            .extract_and_store_coordinates("doc-1", &Actor::system(), &options)
            .await
            .unwrap();
        assert_eq!(counting.calls(), 1);
    }

    #[tokio::test]
    async fn test_heuristic_only_runs_when_enabled() {
        let h = Harness::new();
        h.text("doc-1", "Our team photo was taken at the Colosseum last spring.");
        let orchestrator = h.orchestrator();

        let without = orchestrator
            .extract_and_store_coordinates("doc-1", &Actor::system(), &ExtractOptions::default())
            .await
            .unwrap();
        assert!(without.is_empty());

        let options = ExtractOptions { use_ai: true, ..ExtractOptions::default() };
        let with = orchestrator
            .extract_and_store_coordinates("doc-1", &Actor::system(), &options)
            .await
            .unwrap();
        assert_eq!(with.len(), 1);
        assert_eq!(with[0].coordinate.source, CoordinateSource::HeuristicText);
    }

    #[tokio::test]
    async fn test_failing_extractor_is_isolated() {
        let h = Harness::new();
        h.text("doc-1", "GPS: 40.7128, -74.0060");
        let counting = Counting::new(false, true);
        let extractors: Vec<Arc<dyn Extractor>> = vec![counting.clone(), Arc::new(CoordinateGrammar)];
        let orchestrator = Orchestrator::new(h.collaborators(), extractors);

        let tags = orchestrator
            .extract_and_store_coordinates("doc-1", &Actor::system(), &ExtractOptions::default())
            .await
            .unwrap();
        assert_eq!(counting.calls(), 1);
        assert_eq!(tags.len(), 1);
    }

    #[tokio::test]
    async fn test_all_extractors_failing_is_extraction_failure() {
        let h = Harness::new();
        h.text("doc-1", "GPS: 40.7128, -74.0060");
        let orchestrator = Orchestrator::new(h.collaborators(), vec![Counting::new(false, true)]);

        let err = orchestrator
            .extract_and_store_coordinates("doc-1", &Actor::system(), &ExtractOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ExtractErrorCode::ExtractionFailed);
        assert!(err.to_string().contains("counting"));
    }

    #[tokio::test]
    async fn test_duplicates_keep_most_confident() {
        let h = Harness::new();
        h.text("doc-1", "GPS: 40.7128, -74.0060 (surveyed as 40°42'46.08\"N 74°00'21.6\"W)");

        let tags = h
            .orchestrator()
            .extract_and_store_coordinates("doc-1", &Actor::system(), &ExtractOptions::default())
            .await
            .unwrap();

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].coordinate.original_format, CoordinateFormat::DegreesMinutesSeconds);
        assert_eq!(tags[0].coordinate.confidence, 1.0);
    }

    #[tokio::test]
    async fn test_partial_persist_failure_skips_coordinate() {
        let h = Harness::new();
        h.text("doc-1", "Camp (40.7128, -74.0060) then (51.5074, -0.1278)");
        let collaborators = Collaborators {
            tags: Arc::new(PickyStore(InMemoryGeoTagStore::new())),
            ..h.collaborators()
        };
        let orchestrator = Orchestrator::new(collaborators, vec![Arc::new(CoordinateGrammar)]);

        let tags = orchestrator
            .extract_and_store_coordinates("doc-1", &Actor::system(), &ExtractOptions::default())
            .await
            .unwrap();

        assert_eq!(tags.len(), 1);
        assert!((tags[0].coordinate.latitude - 40.7128).abs() < 1e-9);
        assert_eq!(h.actions(), vec![AuditAction::CoordinateExtracted]);
    }

    #[tokio::test]
    async fn test_min_confidence_and_placeholders() {
        let h = Harness::new();
        h.text("doc-1", "Grid 18T WL 85628 11322");
        let orchestrator = h.orchestrator();

        let strict = ExtractOptions { min_confidence: 0.6, ..ExtractOptions::default() };
        let none = orchestrator
            .extract_and_store_coordinates("doc-1", &Actor::system(), &strict)
            .await
            .unwrap();
        assert!(none.is_empty());

        let tags = orchestrator
            .extract_and_store_coordinates("doc-1", &Actor::system(), &ExtractOptions::default())
            .await
            .unwrap();
        assert_eq!(tags.len(), 1);
        assert!(tags[0].coordinate.flag(meta::REQUIRES_CONVERSION));
        assert!(!tags[0].coordinate.has_address());
    }

    #[tokio::test]
    async fn test_create_geo_tag() {
        let h = Harness::new();
        h.text("doc-1", "no coordinates here");

        let tag = h
            .orchestrator()
            .create_geo_tag(
                CreateGeoTagDto::new("doc-1", 48.8566, 2.3522),
                &Actor::new("u2", "u2@example.com"),
            )
            .await
            .unwrap();

        assert_eq!(tag.coordinate.source, CoordinateSource::Manual);
        assert_eq!(tag.coordinate.accuracy, Accuracy::Exact);
        assert_eq!(tag.coordinate.confidence, 1.0);
        assert_eq!(tag.coordinate.address.city.as_deref(), Some("Paris"));
        assert_eq!(h.actions(), vec![AuditAction::GeoTagCreated]);
    }

    #[tokio::test]
    async fn test_create_geo_tag_keeps_given_address() {
        let h = Harness::new();
        h.text("doc-1", "note");
        let mut dto = CreateGeoTagDto::new("doc-1", 48.8566, 2.3522);
        dto.address.city = Some("Lutetia".into());

        let tag = h.orchestrator().create_geo_tag(dto, &Actor::system()).await.unwrap();
        assert_eq!(tag.coordinate.address.city.as_deref(), Some("Lutetia"));
        assert!(tag.coordinate.address.country.is_none());
    }

    #[tokio::test]
    async fn test_create_geo_tag_rejects_bad_input() {
        let h = Harness::new();
        h.text("doc-1", "note");
        let orchestrator = h.orchestrator();

        let err = orchestrator
            .create_geo_tag(CreateGeoTagDto::new("doc-1", 91.0, 0.0), &Actor::system())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ExtractErrorCode::Validation);
        assert!(err.to_string().contains("latitude"));

        let mut dto = CreateGeoTagDto::new("doc-1", 1.0, 1.0);
        dto.accuracy_radius = Some(-3.0);
        let err = orchestrator.create_geo_tag(dto, &Actor::system()).await.unwrap_err();
        assert_eq!(err.code(), ExtractErrorCode::Validation);

        let err = orchestrator
            .create_geo_tag(CreateGeoTagDto::new("ghost", 1.0, 1.0), &Actor::system())
            .await
            .unwrap_err();
        assert_eq!(err.code(), ExtractErrorCode::NotFound);

        assert!(h.tags.is_empty());
        assert!(h.audit.events().is_empty());
    }

    #[test]
    fn test_default_extractor_order() {
        let h = Harness::new();
        assert_eq!(h.orchestrator().extractor_names(), vec!["metadata", "grammar", "heuristic"]);
    }
}
