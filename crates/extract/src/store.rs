//! Collaborator interfaces: documents, geo-tag persistence and audit.
//!
//! The in-memory implementations back tests and embedded use.

use crate::{ExtractError, GeoTag, NewGeoTag, Result};
use async_trait::async_trait;
use chrono::Utc;
use geotag_core::audit::{AuditEvent, AuditLog};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Where a document's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentContent {
    /// Held in memory
    Bytes(Vec<u8>),
    /// On the local filesystem
    Path(PathBuf),
}

/// A resolved document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Identifier
    pub id: String,
    /// Content or its location
    pub content: DocumentContent,
    /// Declared MIME type
    pub mime_type: Option<String>,
    /// File name at upload time
    pub original_name: Option<String>,
}

impl Document {
    /// In-memory document.
    pub fn from_bytes(
        id: impl Into<String>,
        content: impl Into<Vec<u8>>,
        mime_type: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            content: DocumentContent::Bytes(content.into()),
            mime_type: mime_type.map(str::to_string),
            original_name: None,
        }
    }

    /// Document backed by a file.
    pub fn from_path(
        id: impl Into<String>,
        path: impl Into<PathBuf>,
        mime_type: Option<&str>,
    ) -> Self {
        let path = path.into();
        Self {
            id: id.into(),
            original_name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
            content: DocumentContent::Path(path),
            mime_type: mime_type.map(str::to_string),
        }
    }

    /// Set the original file name.
    pub fn with_original_name(mut self, name: impl Into<String>) -> Self {
        self.original_name = Some(name.into());
        self
    }

    /// Load the bytes.
    pub async fn read_content(&self) -> std::io::Result<Vec<u8>> {
        match &self.content {
            DocumentContent::Bytes(bytes) => Ok(bytes.clone()),
            DocumentContent::Path(path) => tokio::fs::read(path).await,
        }
    }
}

/// Resolves document ids.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Look up a document; unknown ids are [`ExtractError::NotFound`].
    async fn resolve(&self, document_id: &str) -> Result<Document>;
}

/// Durable geo-tag storage.
#[async_trait]
pub trait GeoTagStore: Send + Sync {
    /// Persist a new tag, assigning id and timestamps.
    async fn save(&self, tag: NewGeoTag) -> Result<GeoTag>;

    /// All tags of a document, active or not, in creation order.
    async fn find_by_document(&self, document_id: &str) -> Result<Vec<GeoTag>>;

    /// One tag by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<GeoTag>>;

    /// Replace a stored tag's verification and activity fields.
    async fn update(&self, tag: GeoTag) -> Result<GeoTag>;
}

/// Receives audit events.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Record one event.
    async fn record(&self, event: AuditEvent) -> Result<()>;
}

#[async_trait]
impl AuditSink for AuditLog {
    async fn record(&self, event: AuditEvent) -> Result<()> {
        self.log(event)
            .map(|_| ())
            .map_err(|e| ExtractError::Audit(e.to_string()))
    }
}

fn poisoned<T>(_: T) -> ExtractError {
    ExtractError::Persist("store lock poisoned".to_string())
}

/// Documents held in a map.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<String, Document>>,
}

impl InMemoryDocumentStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document.
    pub fn insert(&self, document: Document) {
        if let Ok(mut documents) = self.documents.write() {
            documents.insert(document.id.clone(), document);
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn resolve(&self, document_id: &str) -> Result<Document> {
        self.documents
            .read()
            .map_err(poisoned)?
            .get(document_id)
            .cloned()
            .ok_or_else(|| ExtractError::document_not_found(document_id))
    }
}

/// Geo-tags held in a vector, in creation order.
#[derive(Debug, Default)]
pub struct InMemoryGeoTagStore {
    tags: RwLock<Vec<GeoTag>>,
}

impl InMemoryGeoTagStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tags, including inactive ones.
    pub fn len(&self) -> usize {
        self.tags.read().map(|t| t.len()).unwrap_or(0)
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl GeoTagStore for InMemoryGeoTagStore {
    async fn save(&self, tag: NewGeoTag) -> Result<GeoTag> {
        let tag = tag.into_geo_tag(Utc::now());
        self.tags.write().map_err(poisoned)?.push(tag.clone());
        Ok(tag)
    }

    async fn find_by_document(&self, document_id: &str) -> Result<Vec<GeoTag>> {
        Ok(self
            .tags
            .read()
            .map_err(poisoned)?
            .iter()
            .filter(|t| t.document_id == document_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<GeoTag>> {
        Ok(self.tags.read().map_err(poisoned)?.iter().find(|t| t.id == id).cloned())
    }

    async fn update(&self, tag: GeoTag) -> Result<GeoTag> {
        let mut tags = self.tags.write().map_err(poisoned)?;
        let stored = tags
            .iter_mut()
            .find(|t| t.id == tag.id)
            .ok_or_else(|| ExtractError::geo_tag_not_found(tag.id))?;

        stored.verified_by = tag.verified_by;
        stored.verified_at = tag.verified_at;
        stored.is_verified = tag.is_verified;
        stored.is_active = tag.is_active;
        stored.updated_at = tag.updated_at;
        Ok(stored.clone())
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl InMemoryAuditSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events, oldest first.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn record(&self, event: AuditEvent) -> Result<()> {
        self.events
            .lock()
            .map_err(|_| ExtractError::Audit("audit lock poisoned".to_string()))?
            .push(event);
        Ok(())
    }
}
