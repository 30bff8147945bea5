//! Minify JavaScript, CSS and JSON files when they are saved.
//!
//! The library holds the decision layer of an editor add-on: it resolves the
//! effective configuration, decides whether and when a saved document is
//! minified, where the output goes, and whether the minify button is shown.
//! Editor facilities are reached through the traits of [`host`].

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod detect;
pub mod document;
pub mod extension;
pub mod host;
pub mod minify;
pub mod output_path;
pub mod settings;
pub mod trigger;
pub mod util;
pub mod visibility;
pub mod watch;

pub use config::{ConfigStore, EffectiveConfig, HideButton, MinifyOnSave};
pub use document::{Document, Language};
pub use extension::{EditorEvent, Extension};
pub use output_path::{resolve_output_path, OutputTemplate};
pub use watch::watch;
