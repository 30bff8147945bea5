//! Resolve the effective configuration.
//!
//! Raw settings are merged with defaults into an [`EffectiveConfig`]. Invalid
//! values never fail: they are logged and replaced by their default. Legacy
//! boolean values are mapped to their enum equivalent here, so no other
//! module looks at raw settings.

use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::{Arc, RwLock},
    time::Duration,
};

use serde::Serialize;
use serde_json::Value;

use crate::{
    output_path::{OutputTemplate, DEFAULT_POSTFIX},
    settings::{RawSettings, SettingsProvider},
};

/// Default settings namespace.
pub const NAMESPACE: &str = "minify";

/// Keys interpreted by the configuration. Other keys are passed through.
const KNOWN_KEYS: [&str; 10] = [
    "hideButton",
    "minifyOnSave",
    "onSaveDelay",
    "postfix",
    "jsPostfix",
    "cssPostfix",
    "jsonPostfix",
    "jsMinPath",
    "cssMinPath",
    "jsonMinPath",
];

/// When to hide the minify button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HideButton {
    /// Always show the button.
    Never,
    /// Never show the button.
    Always,
    /// Show the button for supported documents that are not minified.
    #[default]
    Auto,
}

impl HideButton {
    /// Parse a raw setting value.
    ///
    /// Legacy booleans map `true` to [`HideButton::Auto`] and `false` to
    /// [`HideButton::Never`].
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(true) => Some(Self::Auto),
            Value::Bool(false) => Some(Self::Never),
            Value::String(value) => match value.as_str() {
                "never" => Some(Self::Never),
                "always" => Some(Self::Always),
                "auto" => Some(Self::Auto),
                _ => None,
            },
            _ => None,
        }
    }
}

/// When to minify a document on save.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MinifyOnSave {
    /// Minify every supported document.
    Always,
    /// Minify only if the output file already exists.
    #[default]
    Exists,
    /// Never minify on save.
    Never,
}

impl MinifyOnSave {
    /// Parse a raw setting value.
    ///
    /// Legacy values map `false` and `"no"` to [`MinifyOnSave::Never`], `true`
    /// and `"yes"` to [`MinifyOnSave::Always`].
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(true) => Some(Self::Always),
            Value::Bool(false) => Some(Self::Never),
            Value::String(value) => match value.as_str() {
                "always" | "yes" => Some(Self::Always),
                "exists" => Some(Self::Exists),
                "never" | "no" => Some(Self::Never),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Configuration in force at a point in time.
///
/// A configuration is never modified once built: reloading produces a new
/// one.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveConfig {
    /// Visibility policy of the minify button.
    pub hide_button: HideButton,

    /// Minification policy on save.
    pub minify_on_save: MinifyOnSave,

    /// Delay before minifying on save, in milliseconds.
    ///
    /// `0` minifies immediately.
    pub on_save_delay: u64,

    /// Output path rules.
    #[serde(flatten)]
    pub output: OutputTemplate,

    /// Other settings, forwarded to the minifier as they are.
    #[serde(flatten)]
    pub options: BTreeMap<String, Value>,
}

impl EffectiveConfig {
    /// Build a configuration from raw settings.
    pub fn from_raw(raw: &RawSettings) -> Self {
        let defaults = Self::default();

        let options = raw
            .iter()
            .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Self {
            hide_button: setting(raw, "hideButton", HideButton::from_value)
                .unwrap_or(defaults.hide_button),
            minify_on_save: setting(raw, "minifyOnSave", MinifyOnSave::from_value)
                .unwrap_or(defaults.minify_on_save),
            on_save_delay: setting(raw, "onSaveDelay", parse_delay)
                .unwrap_or(defaults.on_save_delay),
            output: OutputTemplate {
                postfix: setting(raw, "postfix", parse_postfix)
                    .unwrap_or_else(|| DEFAULT_POSTFIX.to_owned()),
                js_postfix: setting(raw, "jsPostfix", parse_optional_postfix).flatten(),
                css_postfix: setting(raw, "cssPostfix", parse_optional_postfix).flatten(),
                json_postfix: setting(raw, "jsonPostfix", parse_optional_postfix).flatten(),
                js_min_path: setting(raw, "jsMinPath", parse_dir).flatten(),
                css_min_path: setting(raw, "cssMinPath", parse_dir).flatten(),
                json_min_path: setting(raw, "jsonMinPath", parse_dir).flatten(),
            },
            options,
        }
    }

    /// Return the delay before minifying on save, if any.
    pub fn save_delay(&self) -> Option<Duration> {
        Some(self.on_save_delay)
            .filter(|delay| *delay > 0)
            .map(Duration::from_millis)
    }
}

/// Read a setting, logging values that cannot be parsed.
///
/// Missing and `null` values are silently ignored.
fn setting<T>(raw: &RawSettings, key: &str, parse: impl Fn(&Value) -> Option<T>) -> Option<T> {
    let value = raw.get(key).filter(|value| !value.is_null())?;

    let result = parse(value);

    if result.is_none() {
        tracing::warn!("Invalid value {value} for setting {key:?}, using default");
    }

    result
}

fn parse_delay(value: &Value) -> Option<u64> {
    if let Some(delay) = value.as_u64() {
        return Some(delay);
    }

    // Accept `250.0`, drop the fractional part
    value
        .as_f64()
        .filter(|delay| delay.is_finite() && *delay >= 0.0)
        .map(|delay| delay as u64)
}

fn parse_postfix(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|postfix| !postfix.is_empty() && !postfix.contains(['/', '\\']))
        .map(str::to_owned)
}

/// An empty string stands for "not set".
fn parse_optional_postfix(value: &Value) -> Option<Option<String>> {
    match value.as_str()? {
        "" => Some(None),
        _ => parse_postfix(value).map(Some),
    }
}

/// An empty string stands for "not set".
fn parse_dir(value: &Value) -> Option<Option<PathBuf>> {
    match value.as_str()? {
        "" => Some(None),
        dir => Some(Some(PathBuf::from(dir))),
    }
}

/// Result of [`ConfigStore::load`].
#[derive(Debug, Clone)]
pub struct Reloaded {
    /// The new configuration.
    pub config: Arc<EffectiveConfig>,

    /// Whether the caller should tell the user the configuration has been
    /// reloaded.
    pub notify: bool,
}

/// Hold the current configuration.
///
/// Readers get a shared snapshot. Reloading swaps the snapshot as a whole,
/// snapshots already handed out keep their values.
pub struct ConfigStore {
    provider: Box<dyn SettingsProvider>,
    namespace: String,
    current: RwLock<Arc<EffectiveConfig>>,
}

impl std::fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigStore")
            .field("namespace", &self.namespace)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl ConfigStore {
    /// Create a store and load the configuration for the first time.
    pub fn new(provider: impl SettingsProvider + 'static, namespace: impl Into<String>) -> Self {
        let provider: Box<dyn SettingsProvider> = Box::new(provider);
        let namespace = namespace.into();
        let config = read_config(provider.as_ref(), &namespace);

        Self {
            provider,
            namespace,
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// Read the settings again and replace the current configuration.
    ///
    /// The store does not notify anyone: `force_notify` is handed back to the
    /// caller in [`Reloaded::notify`].
    pub fn load(&self, force_notify: bool) -> Reloaded {
        let config = Arc::new(read_config(self.provider.as_ref(), &self.namespace));

        let mut current = self
            .current
            .write()
            .unwrap_or_else(|error| error.into_inner());
        *current = Arc::clone(&config);

        tracing::debug!("Configuration reloaded: {config:?}");

        Reloaded {
            config,
            notify: force_notify,
        }
    }

    /// Return the current configuration.
    pub fn current(&self) -> Arc<EffectiveConfig> {
        let current = self
            .current
            .read()
            .unwrap_or_else(|error| error.into_inner());
        Arc::clone(&current)
    }

    /// Return the settings namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

/// Read settings, falling back to defaults if they cannot be read.
fn read_config(provider: &dyn SettingsProvider, namespace: &str) -> EffectiveConfig {
    match provider.read_raw(namespace) {
        Ok(raw) => EffectiveConfig::from_raw(&raw),
        Err(error) => {
            tracing::warn!("{:?}", anyhow::Error::from(error).context("using default settings"));
            EffectiveConfig::default()
        },
    }
}
