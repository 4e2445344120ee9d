//! Core utilities for geotag extraction
//!
//! This crate provides shared functionality used by every geotag crate:
//!
//! - **Error handling**: Structured errors with codes, context, and recovery suggestions
//! - **Configuration**: TOML-based configuration with validation
//! - **Validation**: Fluent validators for inputs such as manual geo-tag entries
//! - **Audit logging**: JSON-lines audit trail for extraction events
//!
//! # Example
//!
//! ```rust,no_run
//! use geotag_core::config::Config;
//!
//! let config = Config::load(None).expect("config");
//! config.validate().expect("invalid configuration");
//! println!("fuzzy threshold: {}", config.schema.geocoding.fuzzy_threshold);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod audit;
pub mod config;
pub mod error;
pub mod validation;

pub use error::{Error, ErrorCode, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::audit::{AuditAction, AuditEvent, AuditLog, AuditSeverity};
    pub use crate::config::{Config, ConfigSchema};
    pub use crate::error::{Error, ErrorCode, Result};
    pub use crate::validation::{ValidationResult, Validator};
}
