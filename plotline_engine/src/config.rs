//! Tool configuration loaded from `plotline.toml`.
//!
//! Every key is optional. A missing or unreadable file, or one that fails to parse,
//! falls back to the defaults with a warning rather than stopping the tool.

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "plotline.toml";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotlineConfig {
    pub preview: PreviewConfig,
    pub export: ExportConfig,
    pub novel: NovelConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Minimum answer length accepted by the placeholder dialogue task judge.
    pub task_min_chars: usize,
    /// Column to wrap preview text at; `0` uses the terminal width.
    pub wrap_width: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            task_min_chars: 5,
            wrap_width: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub pretty: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NovelConfig {
    /// Regex for chapter heading lines. Unset uses the built-in pattern.
    pub chapter_heading: Option<String>,
}

/// Find the config file to use: an explicit path, then `./plotline.toml`,
/// then `<config dir>/plotline/plotline.toml`.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("plotline").join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

/// Load configuration from the resolved location, falling back to defaults.
pub fn resolve_config(explicit: Option<&Path>) -> PlotlineConfig {
    match resolve_config_path(explicit) {
        Some(path) => load_config(&path),
        None => {
            info!("no {CONFIG_FILE_NAME} found; using defaults");
            PlotlineConfig::default()
        },
    }
}

/// Loads configuration from a TOML file, falling back to defaults on error.
///
/// # Logging
/// - `info!` on successful load
/// - `warn!` if the file cannot be read or parsed
pub fn load_config(toml_path: &Path) -> PlotlineConfig {
    match try_load_config(toml_path) {
        Ok(config) => {
            info!("configuration loaded from '{}'", toml_path.display());
            config
        },
        Err(e) => {
            warn!(
                "Could not load configuration from '{}': {e:#}. Using defaults.",
                toml_path.display()
            );
            PlotlineConfig::default()
        },
    }
}

/// Attempts to load configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn try_load_config(toml_path: &Path) -> Result<PlotlineConfig> {
    let text = fs::read_to_string(toml_path)
        .with_context(|| format!("reading configuration from '{}'", toml_path.display()))?;
    toml::from_str(&text).with_context(|| format!("parsing configuration from '{}'", toml_path.display()))
}
