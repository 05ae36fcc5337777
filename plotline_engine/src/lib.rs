#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const PLOTLINE_VERSION: &str = env!("CARGO_PKG_VERSION");

// Story logic
pub mod condition;
pub mod gate;
pub mod graph;
pub mod preview;
pub mod qte;
pub mod titles;
pub mod values;

// Documents and import
pub mod document;
pub mod idgen;
pub mod jobs;
pub mod novel;
pub mod slug;

// Tooling
pub mod config;
pub mod play;
pub mod style;

// Re-exports for convenience
pub use condition::{evaluate_condition, evaluate_conditions};
pub use document::{DocumentError, export_story_string, import_story_file, import_story_str};
pub use gate::{Access, option_access, scene_access};
pub use graph::StoryGraph;
pub use preview::{Beat, Ending, PreviewError, PreviewSession};
pub use titles::earned_titles;
pub use values::ValueStore;
