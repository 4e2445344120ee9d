//! Audit logging for extraction events
//!
//! Provides a structured audit trail for:
//! - Coordinates extracted from documents
//! - Manually created geo-tags
//! - Verification and deactivation of geo-tags
//! - Failed or skipped extraction runs
//!
//! # Example
//!
//! ```rust,ignore
//! use geotag_core::audit::{AuditLog, AuditEvent, AuditAction};
//!
//! let audit = AuditLog::new()?;
//!
//! audit.log(
//!     AuditEvent::new(AuditAction::CoordinateExtracted, "doc-42")
//!         .with_actor("user-7")
//!         .with_detail("confidence", 0.95),
//! );
//! ```

use crate::config::AuditSettings;
use crate::error::Result;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;

static SESSION: Lazy<String> = Lazy::new(|| uuid::Uuid::new_v4().to_string());

/// Audit action types for categorizing events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuditAction {
    /// A coordinate was extracted from a document and persisted
    CoordinateExtracted,
    /// A geo-tag was created manually
    #[serde(rename = "geotag-created")]
    GeoTagCreated,
    /// A geo-tag was marked as verified
    #[serde(rename = "geotag-verified")]
    GeoTagVerified,
    /// A geo-tag was soft-deactivated
    #[serde(rename = "geotag-deactivated")]
    GeoTagDeactivated,
    /// Extraction of a whole document failed
    ExtractionFailed,
    /// Extraction was skipped because tags already exist
    ExtractionSkipped,
}

impl AuditAction {
    /// Wire name of the action, e.g. `coordinate-extracted`
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::CoordinateExtracted => "coordinate-extracted",
            AuditAction::GeoTagCreated => "geotag-created",
            AuditAction::GeoTagVerified => "geotag-verified",
            AuditAction::GeoTagDeactivated => "geotag-deactivated",
            AuditAction::ExtractionFailed => "extraction-failed",
            AuditAction::ExtractionSkipped => "extraction-skipped",
        }
    }

    /// Get the severity level of this action
    #[must_use]
    pub fn severity(&self) -> AuditSeverity {
        match self {
            AuditAction::ExtractionFailed => AuditSeverity::Medium,
            AuditAction::GeoTagDeactivated => AuditSeverity::Medium,
            _ => AuditSeverity::Low,
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audit severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    /// Informational events
    Low,
    /// Failures or destructive changes
    Medium,
    /// Security relevant events
    High,
}

/// Audit event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: String,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// Action type
    pub action: AuditAction,
    /// Severity level
    pub severity: AuditSeverity,
    /// Identifier of the affected resource (document or geo-tag)
    pub resource_id: String,
    /// Whether the action succeeded
    pub success: bool,
    /// Additional details
    pub details: BTreeMap<String, serde_json::Value>,
    /// User or process that triggered the event
    pub actor: String,
    /// Session ID for correlation
    pub session_id: String,
}

impl AuditEvent {
    /// Create a new audit event
    pub fn new(action: AuditAction, resource_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            action,
            severity: action.severity(),
            resource_id: resource_id.into(),
            success: true,
            details: BTreeMap::new(),
            actor: "system".to_string(),
            session_id: SESSION.clone(),
        }
    }

    /// Mark as failed
    #[must_use]
    pub fn failed(mut self) -> Self {
        self.success = false;
        self
    }

    /// Add a detail
    #[must_use]
    pub fn with_detail(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Merge a bag of details
    #[must_use]
    pub fn with_details<I, K>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = (K, serde_json::Value)>,
        K: Into<String>,
    {
        self.details
            .extend(details.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Set actor
    #[must_use]
    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = actor.into();
        self
    }
}

/// Audit log configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Log file path
    pub log_path: PathBuf,
    /// Minimum severity to log
    pub min_severity: AuditSeverity,
    /// Maximum log file size in bytes before rotation
    pub max_file_size: u64,
    /// Number of rotated files to keep
    pub max_files: usize,
    /// Log to stdout as well
    pub stdout: bool,
    /// JSON format (vs human-readable)
    pub json_format: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        let log_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("geotag")
            .join("audit.log");

        Self {
            log_path,
            min_severity: AuditSeverity::Low,
            max_file_size: 10 * 1024 * 1024, // 10MB
            max_files: 5,
            stdout: false,
            json_format: true,
        }
    }
}

impl From<&AuditSettings> for AuditConfig {
    fn from(settings: &AuditSettings) -> Self {
        let mut config = Self::default();
        if let Some(path) = &settings.log_path {
            config.log_path = PathBuf::from(path);
        }
        config.stdout = settings.stdout;
        config.json_format = settings.json_format;
        config
    }
}

/// Audit log writer
pub struct AuditLog {
    config: AuditConfig,
    writer: Mutex<Option<BufWriter<File>>>,
}

impl AuditLog {
    /// Create a new audit log
    pub fn new() -> Result<Self> {
        Self::with_config(AuditConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(config: AuditConfig) -> Result<Self> {
        if let Some(parent) = config.log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_path)?;

        Ok(Self {
            config,
            writer: Mutex::new(Some(BufWriter::new(file))),
        })
    }

    /// Create a no-op audit log (for testing)
    #[must_use]
    pub fn noop() -> Self {
        Self {
            config: AuditConfig::default(),
            writer: Mutex::new(None),
        }
    }

    /// Log an audit event
    ///
    /// Returns `Ok(false)` when the event was below the severity threshold.
    pub fn log(&self, event: AuditEvent) -> Result<bool> {
        if event.severity < self.config.min_severity {
            return Ok(false);
        }

        let line = if self.config.json_format {
            serde_json::to_string(&event)?
        } else {
            format!(
                "[{}] {} {} {} resource={} success={} actor={}",
                event.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
                format!("{:?}", event.severity).to_uppercase(),
                event.action,
                event.id,
                event.resource_id,
                event.success,
                event.actor,
            )
        };

        if let Ok(mut guard) = self.writer.lock() {
            if let Some(ref mut writer) = *guard {
                writeln!(writer, "{line}")?;
                writer.flush()?;
            }
        }

        if self.config.stdout {
            println!("{line}");
        }

        Ok(true)
    }

    /// Rotate log files if needed
    pub fn rotate_if_needed(&self) -> Result<bool> {
        let metadata = std::fs::metadata(&self.config.log_path)?;

        if metadata.len() < self.config.max_file_size {
            return Ok(false);
        }

        if let Ok(mut guard) = self.writer.lock() {
            *guard = None;
        }

        for i in (1..self.config.max_files).rev() {
            let from = self.config.log_path.with_extension(format!("log.{i}"));
            let to = self.config.log_path.with_extension(format!("log.{}", i + 1));
            if from.exists() {
                let _ = std::fs::rename(&from, &to);
            }
        }

        let rotated = self.config.log_path.with_extension("log.1");
        std::fs::rename(&self.config.log_path, &rotated)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.log_path)?;

        if let Ok(mut guard) = self.writer.lock() {
            *guard = Some(BufWriter::new(file));
        }

        Ok(true)
    }

    /// Get recent events (reads from file), newest first
    pub fn recent_events(&self, count: usize) -> Result<Vec<AuditEvent>> {
        let content = std::fs::read_to_string(&self.config.log_path)?;
        let events: Vec<AuditEvent> = content
            .lines()
            .rev()
            .filter_map(|line| serde_json::from_str(line).ok())
            .take(count)
            .collect();

        Ok(events)
    }

    /// Get all events recorded for one resource
    pub fn events_for_resource(&self, resource_id: &str) -> Result<Vec<AuditEvent>> {
        let content = std::fs::read_to_string(&self.config.log_path)?;
        let events: Vec<AuditEvent> = content
            .lines()
            .filter_map(|line| serde_json::from_str::<AuditEvent>(line).ok())
            .filter(|e| e.resource_id == resource_id)
            .collect();

        Ok(events)
    }
}
