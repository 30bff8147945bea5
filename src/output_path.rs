//! Compute where minified files are written.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::{document::Language, util::path::PathExt};

/// Default suffix inserted before the file extension.
pub const DEFAULT_POSTFIX: &str = "min";

/// Rules deriving an output path from an input path.
///
/// The output file name is the input stem, followed by the postfix and the
/// input extension (e.g. `app.js` gives `app.min.js`). Each language may
/// override the postfix and the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputTemplate {
    /// Suffix inserted before the extension.
    pub postfix: String,

    /// Postfix for JavaScript files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub js_postfix: Option<String>,

    /// Postfix for CSS files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_postfix: Option<String>,

    /// Postfix for JSON files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_postfix: Option<String>,

    /// Output directory for JavaScript files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub js_min_path: Option<PathBuf>,

    /// Output directory for CSS files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_min_path: Option<PathBuf>,

    /// Output directory for JSON files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_min_path: Option<PathBuf>,
}

impl Default for OutputTemplate {
    fn default() -> Self {
        Self {
            postfix: DEFAULT_POSTFIX.to_owned(),
            js_postfix: None,
            css_postfix: None,
            json_postfix: None,
            js_min_path: None,
            css_min_path: None,
            json_min_path: None,
        }
    }
}

impl OutputTemplate {
    /// Return the postfix used for a language.
    pub fn postfix_for(&self, language: Option<Language>) -> &str {
        let postfix = match language {
            Some(Language::JavaScript) => self.js_postfix.as_deref(),
            Some(Language::Css) => self.css_postfix.as_deref(),
            Some(Language::Json) => self.json_postfix.as_deref(),
            None => None,
        };

        postfix.unwrap_or(&self.postfix)
    }

    /// Return the output directory configured for a language, if any.
    pub fn dir_for(&self, language: Option<Language>) -> Option<&Path> {
        match language? {
            Language::JavaScript => self.js_min_path.as_deref(),
            Language::Css => self.css_min_path.as_deref(),
            Language::Json => self.json_min_path.as_deref(),
        }
    }
}

/// Compute the output path of an input file.
///
/// The language is guessed from the input extension. Without a configured
/// output directory, the output sits next to the input. A relative output
/// directory is resolved against the directory of the input file.
///
/// This function does not access the file system.
pub fn resolve_output_path(input: impl AsRef<Path>, template: &OutputTemplate) -> PathBuf {
    let input = input.as_ref();
    let language = Language::from_path(input);
    let postfix = template.postfix_for(language);

    let Some(stem) = input.file_stem() else {
        // No file name (e.g. `/` or `..`)
        let mut output = input.as_os_str().to_owned();
        output.push(".");
        output.push(postfix);
        return PathBuf::from(output);
    };

    let mut file_name = OsString::from(stem);
    file_name.push(".");
    file_name.push(postfix);
    if let Some(extension) = input.extension() {
        file_name.push(".");
        file_name.push(extension);
    }

    let parent = input.parent().unwrap_or_else(|| Path::new(""));

    match template.dir_for(language) {
        Some(dir) => parent.join(dir).join(file_name).normalize(),
        None => parent.join(file_name),
    }
}
