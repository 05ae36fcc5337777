//! Versioned upgrades for stored story documents.
//!
//! Every document carries a `schemaVersion`. Documents written before versioning
//! existed have no version and are treated as version 0. Each upgrade step rewrites
//! the raw JSON from one version to the next, so the typed model in [`crate::defs`]
//! only ever has to understand the current shape.

use std::fmt;

use serde_json::{Map, Value};

use crate::{CURRENT_SCHEMA_VERSION, StoryDef};

/// Failure to upgrade a stored document.
#[derive(Debug)]
pub enum MigrationError {
    NotAnObject,
    BadVersion(String),
    UnsupportedVersion { found: u32 },
    Decode(serde_json::Error),
}

impl fmt::Display for MigrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationError::NotAnObject => write!(f, "story document root is not a JSON object"),
            MigrationError::BadVersion(raw) => write!(f, "schemaVersion is not a version number ({raw})"),
            MigrationError::UnsupportedVersion { found } => write!(
                f,
                "schemaVersion {found} is newer than the supported version {CURRENT_SCHEMA_VERSION}"
            ),
            MigrationError::Decode(err) => write!(f, "migrated document does not match the story model: {err}"),
        }
    }
}

impl std::error::Error for MigrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MigrationError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MigrationError {
    fn from(err: serde_json::Error) -> Self {
        MigrationError::Decode(err)
    }
}

type UpgradeStep = fn(&mut Map<String, Value>);

/// Upgrade steps indexed by the version they upgrade *from*.
const UPGRADES: [UpgradeStep; CURRENT_SCHEMA_VERSION as usize] = [upgrade_v0_nested_outcomes];

/// Read the stored schema version; a missing or null version means 0.
///
/// # Errors
/// Returns [`MigrationError::BadVersion`] if the field is present but not a small unsigned integer.
pub fn document_version(root: &Map<String, Value>) -> Result<u32, MigrationError> {
    match root.get("schemaVersion") {
        None | Some(Value::Null) => Ok(0),
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| MigrationError::BadVersion(v.to_string())),
    }
}

/// Upgrade a raw story document to [`CURRENT_SCHEMA_VERSION`].
///
/// Running this on an already-current document leaves it unchanged.
///
/// # Errors
/// Fails if the root is not an object, or the version is malformed or newer than this crate supports.
pub fn migrate_document(mut doc: Value) -> Result<Value, MigrationError> {
    let root = doc.as_object_mut().ok_or(MigrationError::NotAnObject)?;
    let version = document_version(root)?;
    if version > CURRENT_SCHEMA_VERSION {
        return Err(MigrationError::UnsupportedVersion { found: version });
    }

    for step in &UPGRADES[version as usize..] {
        step(root);
    }
    root.insert("schemaVersion".to_string(), Value::from(CURRENT_SCHEMA_VERSION));
    Ok(doc)
}

/// Run a typed story through [`migrate_document`].
///
/// # Errors
/// Propagates migration failures and (de)serialization errors.
pub fn migrate_story(story: StoryDef) -> Result<StoryDef, MigrationError> {
    let raw = serde_json::to_value(story)?;
    let migrated = migrate_document(raw)?;
    Ok(serde_json::from_value(migrated)?)
}

/// v0 -> v1: qte and dialogueTask elements stored `successSceneId` / `failureSceneId`
/// flat on the element. They now live in nested `success` / `failure` outcomes.
/// v0 elements could also lack `order`; they get their list position.
fn upgrade_v0_nested_outcomes(root: &mut Map<String, Value>) {
    let Some(Value::Array(scenes)) = root.get_mut("scenes") else {
        return;
    };
    for scene in scenes.iter_mut() {
        let Some(Value::Array(elements)) = scene.get_mut("elements") else {
            continue;
        };
        for (index, element) in elements.iter_mut().enumerate() {
            let Some(element) = element.as_object_mut() else {
                continue;
            };
            if !element.contains_key("order") {
                element.insert("order".to_string(), Value::from(index));
            }
            let branching = matches!(
                element.get("type").and_then(Value::as_str),
                Some("qte" | "dialogueTask")
            );
            if branching {
                fold_outcome(element, "successSceneId", "success");
                fold_outcome(element, "failureSceneId", "failure");
            }
        }
    }
}

fn fold_outcome(element: &mut Map<String, Value>, flat_key: &str, nested_key: &str) {
    let legacy = element.remove(flat_key);
    let nested = element
        .entry(nested_key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !nested.is_object() {
        *nested = Value::Object(Map::new());
    }
    let Value::Object(outcome) = nested else {
        return;
    };
    if let Some(Value::String(scene_id)) = legacy {
        if !scene_id.is_empty() && !outcome.contains_key("sceneId") {
            outcome.insert("sceneId".to_string(), Value::String(scene_id));
        }
    }
}
