//! Read raw settings.
//!
//! Settings are namespaced: the keys belonging to a namespace are found
//! either in a table named after it or as dotted top-level keys, as in
//! editor settings files:
//!
//! ```json
//! {
//!     "minify": { "hideButton": "auto" },
//!     "minify.onSaveDelay": 250
//! }
//! ```
//!
//! Dotted keys take precedence over the table.

use std::{
    path::{Path, PathBuf},
    sync::RwLock,
};

use serde_json::{Map, Value};
use thiserror::Error;

/// Raw settings of a namespace, as a mapping of key to value.
pub type RawSettings = Map<String, Value>;

/// List of errors for this module.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Error reading the settings file.
    #[error("failed to read settings file {path:?}")]
    Read {
        /// Path of the settings file.
        path: PathBuf,
        /// Source error.
        #[source]
        source: std::io::Error,
    },
    /// JSON syntax error.
    #[error("failed to parse JSON settings")]
    Json(#[from] serde_json::Error),
    /// TOML syntax error.
    #[error("failed to parse TOML settings")]
    Toml(#[from] toml::de::Error),
    /// YAML syntax error.
    #[error("failed to parse YAML settings")]
    Yaml(#[from] serde_yaml::Error),
    /// The file extension does not match any supported format.
    #[error("unknown settings file extension {0:?}")]
    UnknownExtension(PathBuf),
}

/// Provide raw settings.
pub trait SettingsProvider: Send + Sync {
    /// Read the raw settings of a namespace.
    fn read_raw(&self, namespace: &str) -> Result<RawSettings, SettingsError>;
}

impl<T> SettingsProvider for std::sync::Arc<T>
where
    T: SettingsProvider + ?Sized,
{
    fn read_raw(&self, namespace: &str) -> Result<RawSettings, SettingsError> {
        (**self).read_raw(namespace)
    }
}

/// Extract the settings of a namespace from a settings tree.
pub fn scope(root: &Value, namespace: &str) -> RawSettings {
    let mut settings = RawSettings::new();

    let Some(root) = root.as_object() else {
        return settings;
    };

    if let Some(Value::Object(table)) = root.get(namespace) {
        settings.extend(table.iter().map(|(key, value)| (key.clone(), value.clone())));
    }

    let prefix = format!("{namespace}.");

    for (key, value) in root {
        if let Some(key) = key.strip_prefix(&prefix) {
            settings.insert(key.to_owned(), value.clone());
        }
    }

    settings
}

/// Settings held in memory.
///
/// The tree can be replaced at runtime, which is useful to simulate edits of
/// the settings.
#[derive(Debug, Default)]
pub struct MemorySettings(RwLock<Value>);

impl MemorySettings {
    /// Create settings from a tree.
    pub fn new(root: Value) -> Self {
        Self(RwLock::new(root))
    }

    /// Replace the settings tree.
    pub fn set(&self, root: Value) {
        let mut guard = self.0.write().unwrap_or_else(|error| error.into_inner());
        *guard = root;
    }
}

impl SettingsProvider for MemorySettings {
    fn read_raw(&self, namespace: &str) -> Result<RawSettings, SettingsError> {
        let guard = self.0.read().unwrap_or_else(|error| error.into_inner());
        Ok(scope(&guard, namespace))
    }
}

/// Settings read from a JSON, TOML or YAML file.
///
/// The format is chosen according to the file extension. A missing file
/// holds no settings.
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    /// File names looked up by [`FileSettings::discover`].
    pub const FILE_NAMES: [&'static str; 4] =
        ["minify.json", "minify.toml", "minify.yaml", "minify.yml"];

    /// Create a provider reading the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Find a settings file in a directory.
    pub fn discover(dir: impl AsRef<Path>) -> Option<Self> {
        let dir = dir.as_ref();
        Self::FILE_NAMES
            .into_iter()
            .map(|file_name| dir.join(file_name))
            .find(|path| path.is_file())
            .map(Self::new)
    }

    /// Return the path of the settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the whole settings file.
    pub fn read_tree(&self) -> Result<Value, SettingsError> {
        if !self.path.exists() {
            return Ok(Value::Object(Map::new()));
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| SettingsError::Read {
            path: self.path.clone(),
            source,
        })?;

        parse_str(&self.path, &content)
    }
}

impl SettingsProvider for FileSettings {
    fn read_raw(&self, namespace: &str) -> Result<RawSettings, SettingsError> {
        Ok(scope(&self.read_tree()?, namespace))
    }
}

/// Parse settings according to the extension of `path`.
fn parse_str(path: &Path, content: &str) -> Result<Value, SettingsError> {
    let extension = path.extension().and_then(|extension| extension.to_str());

    match extension {
        Some("json") => Ok(serde_json::from_str(content)?),
        Some("toml") => Ok(toml::from_str(content)?),
        Some("yaml" | "yml") => {
            // An empty YAML document is null
            let value: Value = serde_yaml::from_str(content)?;
            Ok(if value.is_null() {
                Value::Object(Map::new())
            } else {
                value
            })
        },
        _ => Err(SettingsError::UnknownExtension(path.to_owned())),
    }
}
