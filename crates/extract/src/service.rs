//! Geo-tag lifecycle after creation: verification and soft deactivation.

use crate::store::{AuditSink, GeoTagStore};
use crate::{Actor, ExtractError, GeoTag, Result};
use chrono::Utc;
use geotag_core::audit::{AuditAction, AuditEvent};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Verification and deactivation of stored geo-tags.
///
/// Coordinate values are never touched; only the verification and activity
/// fields change.
#[derive(Clone)]
pub struct GeoTagService {
    tags: Arc<dyn GeoTagStore>,
    audit: Arc<dyn AuditSink>,
}

impl GeoTagService {
    /// Service over a store and an audit sink.
    pub fn new(tags: Arc<dyn GeoTagStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self { tags, audit }
    }

    /// Active geo-tags of a document.
    pub async fn document_geo_tags(&self, document_id: &str) -> Result<Vec<GeoTag>> {
        let tags = self.tags.find_by_document(document_id).await?;
        Ok(tags.into_iter().filter(|t| t.is_active).collect())
    }

    /// Mark a tag as verified by `actor`.
    ///
    /// Deactivated tags cannot be verified.
    pub async fn verify_geo_tag(&self, id: Uuid, actor: &Actor) -> Result<GeoTag> {
        let mut tag = self.load(id).await?;
        if !tag.is_active {
            return Err(ExtractError::Validation(format!("geo-tag {id} is deactivated")));
        }

        let now = Utc::now();
        tag.is_verified = true;
        tag.verified_by = Some(actor.id.clone());
        tag.verified_at = Some(now);
        tag.updated_at = now;

        let tag = self.tags.update(tag).await?;
        self.emit(AuditAction::GeoTagVerified, &tag, actor).await;
        info!(geo_tag_id = %tag.id, verified_by = %actor.id, "geo-tag verified");
        Ok(tag)
    }

    /// Soft-deactivate a tag. Deactivating an inactive tag changes nothing.
    pub async fn deactivate_geo_tag(&self, id: Uuid, actor: &Actor) -> Result<GeoTag> {
        let mut tag = self.load(id).await?;
        if !tag.is_active {
            return Ok(tag);
        }

        tag.is_active = false;
        tag.updated_at = Utc::now();

        let tag = self.tags.update(tag).await?;
        self.emit(AuditAction::GeoTagDeactivated, &tag, actor).await;
        info!(geo_tag_id = %tag.id, "geo-tag deactivated");
        Ok(tag)
    }

    async fn load(&self, id: Uuid) -> Result<GeoTag> {
        self.tags
            .find_by_id(id)
            .await?
            .ok_or_else(|| ExtractError::geo_tag_not_found(id))
    }

    async fn emit(&self, action: AuditAction, tag: &GeoTag, actor: &Actor) {
        let event = AuditEvent::new(action, tag.id.to_string())
            .with_actor(actor.id.as_str())
            .with_detail("document_id", tag.document_id.as_str());

        if let Err(err) = self.audit.record(event).await {
            warn!(action = %action, error = %err, "audit event dropped");
        }
    }
}
