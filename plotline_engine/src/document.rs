//! Story JSON import and export.
//!
//! Import accepts any schema version this build knows, upgrades it, and fills in a story id
//! when the document has none. Export writes the current schema.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use plotline_data::{MigrationError, StoryDef, migrate_document};
use serde_json::Value;
use thiserror::Error;

use crate::idgen::new_story_id;
use crate::slug::sanitize_slug;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("'{0}' is not a .json file")]
    NotJson(PathBuf),
    #[error("malformed JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("not a story document: {0}")]
    Invalid(&'static str),
    #[error("story schema could not be upgraded: {0}")]
    Migration(#[from] MigrationError),
    #[error("story does not match the schema: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("i/o error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parse, check, and upgrade a story document.
///
/// # Errors
/// - [`DocumentError::Parse`] on malformed JSON
/// - [`DocumentError::Invalid`] if the root is not an object with a non-empty `title` and a `scenes` array
/// - [`DocumentError::Migration`] / [`DocumentError::Decode`] if the document cannot be upgraded or decoded
pub fn import_story_str(json: &str) -> Result<StoryDef, DocumentError> {
    let doc: Value = serde_json::from_str(json).map_err(DocumentError::Parse)?;
    check_shape(&doc)?;
    let doc = migrate_document(doc)?;
    let mut story: StoryDef = serde_json::from_value(doc).map_err(DocumentError::Decode)?;
    if story.id.as_deref().is_none_or(|id| id.trim().is_empty()) {
        let id = new_story_id();
        info!("story '{}' had no id; assigned {id}", story.title);
        story.id = Some(id);
    }
    info!(
        "imported story '{}' ({} scenes, {} values)",
        story.title,
        story.scenes.len(),
        story.global_values.len()
    );
    Ok(story)
}

/// Read and import a `.json` story file.
///
/// # Errors
/// - [`DocumentError::NotJson`] if the extension is not `.json`
/// - [`DocumentError::Io`] if the file cannot be read
/// - anything [`import_story_str`] returns
pub fn import_story_file(path: &Path) -> Result<StoryDef, DocumentError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        warn!("refusing to import '{}': not a .json file", path.display());
        return Err(DocumentError::NotJson(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    import_story_str(&text)
}

fn check_shape(doc: &Value) -> Result<(), DocumentError> {
    let Some(root) = doc.as_object() else {
        return Err(DocumentError::Invalid("root is not an object"));
    };
    match root.get("title").and_then(Value::as_str) {
        Some(title) if !title.trim().is_empty() => {},
        _ => return Err(DocumentError::Invalid("missing or empty \"title\"")),
    }
    if !root.get("scenes").is_some_and(Value::is_array) {
        return Err(DocumentError::Invalid("\"scenes\" is not an array"));
    }
    Ok(())
}

/// Serialize a story to JSON.
///
/// # Errors
/// - [`DocumentError::Decode`] if serialization fails (non-finite numbers)
pub fn export_story_string(story: &StoryDef, pretty: bool) -> Result<String, DocumentError> {
    let out = if pretty {
        serde_json::to_string_pretty(story)
    } else {
        serde_json::to_string(story)
    };
    out.map_err(DocumentError::Decode)
}

/// `<slug-of-title>.json`
pub fn export_file_name(story: &StoryDef) -> String {
    format!("{}.json", sanitize_slug(&story.title))
}

/// Write the story to `dir/<slug>.json`, creating `dir` if needed. Returns the written path.
///
/// # Errors
/// - [`DocumentError::Io`] if the directory or file cannot be written
pub fn export_story_to_dir(story: &StoryDef, dir: &Path, pretty: bool) -> Result<PathBuf, DocumentError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| DocumentError::Io { path, source }
    };
    fs::create_dir_all(dir).map_err(io_err(dir))?;
    let path = dir.join(export_file_name(story));
    let json = export_story_string(story, pretty)?;
    fs::write(&path, json).map_err(io_err(&path))?;
    info!("exported story '{}' to {}", story.title, path.display());
    Ok(path)
}
