//! Configuration loading and schema definitions
//!
//! Shared configuration types used by every geotag crate.

mod loader;
mod schema;

pub use loader::{Config, CONFIG_ENV_VAR};
pub use schema::*;
