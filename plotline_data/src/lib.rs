//! Shared data model for Plotline story documents.

pub mod defs;
pub mod migrate;
pub mod validate;

pub use defs::*;
pub use migrate::{MigrationError, migrate_document, migrate_story};
pub use validate::{ValidationIssue, scene_is_incomplete, validate_story};
