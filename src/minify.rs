//! Minify JavaScript, CSS and JSON files.
//!
//! This module uses [`minify_js`], [`lightningcss`] and [`serde_json`] under
//! the hood.

use std::{fmt, path::PathBuf, string::FromUtf8Error, sync::Arc};

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use minify_js::{Session, TopLevelMode};
use thiserror::Error;

use crate::{
    config::EffectiveConfig,
    document::{Document, Language},
    host::{MinificationPipeline, Notifier, Selection},
    output_path::resolve_output_path,
};

/// List of errors for this module.
#[derive(Debug, Error)]
pub enum MinifyError {
    /// The document language cannot be minified.
    #[error("language {0:?} is not supported")]
    UnsupportedLanguage(String),
    /// CSS minifier error.
    #[error("{0}")]
    CssMinify(String),
    /// CSS parser error.
    #[error("{0}")]
    CssParser(String),
    /// CSS printer error.
    #[error("{0}")]
    CssPrinter(String),
    /// JavaScript syntax error.
    #[error("{0}")]
    JsSyntax(String),
    /// JSON syntax error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Error converting a string in UTF-8.
    #[error(transparent)]
    FromUtf8(#[from] FromUtf8Error),
    /// Error writing the output file.
    #[error("failed to write {path:?}")]
    Write {
        /// Output path.
        path: PathBuf,
        /// Source error.
        #[source]
        source: std::io::Error,
    },
}

/// Minify a CSS string.
pub fn minify_css(input: impl AsRef<str>) -> Result<String, MinifyError> {
    let input = input.as_ref();

    let mut style_sheet = StyleSheet::parse(input, ParserOptions::default())
        .map_err(|source| MinifyError::CssParser(source.to_string()))?;

    style_sheet
        .minify(MinifyOptions::default())
        .map_err(|source| MinifyError::CssMinify(source.to_string()))?;

    let result = style_sheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|source| MinifyError::CssPrinter(source.to_string()))?;

    Ok(result.code)
}

/// Minify a string of JavaScript code.
pub fn minify_js(input: impl AsRef<str>) -> Result<String, MinifyError> {
    let session = Session::new();
    let mut output = Vec::new();

    minify_js::minify(
        &session,
        TopLevelMode::Global,
        input.as_ref().as_bytes(),
        &mut output,
    )
    .map_err(|source| MinifyError::JsSyntax(source.to_string()))?;

    Ok(String::from_utf8(output)?)
}

/// Minify a JSON string.
pub fn minify_json(input: impl AsRef<str>) -> Result<String, MinifyError> {
    let value: serde_json::Value = serde_json::from_str(input.as_ref())?;
    Ok(serde_json::to_string(&value)?)
}

/// Minify text written in a supported language.
pub fn minify_text(language: Language, input: impl AsRef<str>) -> Result<String, MinifyError> {
    match language {
        Language::JavaScript => minify_js(input),
        Language::Css => minify_css(input),
        Language::Json => minify_json(input),
    }
}

/// Minify documents to files next to them.
///
/// Errors are logged and reported to the [`Notifier`].
#[derive(Clone)]
pub struct FileMinifier {
    notifier: Arc<dyn Notifier>,
}

impl fmt::Debug for FileMinifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileMinifier").finish_non_exhaustive()
    }
}

impl FileMinifier {
    /// Create a minifier reporting errors to `notifier`.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Minify a document and write it at its output path.
    ///
    /// Return the output path.
    pub fn minify_file(
        &self,
        document: &Document,
        config: &EffectiveConfig,
    ) -> Result<PathBuf, MinifyError> {
        let language = document
            .language()
            .ok_or_else(|| MinifyError::UnsupportedLanguage(document.language_id.clone()))?;

        let content = minify_text(language, &document.content)?;

        let output_path = resolve_output_path(&document.path, &config.output);

        if let Some(dir) = output_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| MinifyError::Write {
                path: dir.to_owned(),
                source,
            })?;
        }

        std::fs::write(&output_path, content).map_err(|source| MinifyError::Write {
            path: output_path.clone(),
            source,
        })?;

        Ok(output_path)
    }
}

impl MinificationPipeline for FileMinifier {
    fn minify(&self, document: &Document, config: &EffectiveConfig) {
        match self.minify_file(document, config) {
            Ok(output_path) => {
                tracing::info!("Minified {:?} to {:?}", document.path, output_path);
            },
            Err(error) => {
                let error =
                    anyhow::Error::from(error).context(format!("minifying {:?}", document.path));
                tracing::error!("{error:?}");
                self.notifier.error(&format!("{error:#}"));
            },
        }
    }

    fn minify_selection(&self, selection: &Selection, _config: &EffectiveConfig) -> Option<String> {
        let language = Language::from_id(&selection.language_id)?;

        minify_text(language, &selection.text)
            .inspect_err(|error| tracing::error!("minifying selection: {error}"))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::{minify_css, minify_js, minify_json, FileMinifier, MinifyError};
    use crate::{
        config::EffectiveConfig,
        document::Document,
        host::{MinificationPipeline, Notifier},
        output_path::OutputTemplate,
    };

    /// Record error messages.
    #[derive(Default)]
    struct Errors(Mutex<Vec<String>>);

    impl Notifier for Errors {
        fn info(&self, _message: &str) {}

        fn error(&self, message: &str) {
            self.0.lock().unwrap().push(message.to_owned());
        }
    }

    fn minifier() -> FileMinifier {
        FileMinifier::new(Arc::new(Errors::default()))
    }

    #[test]
    fn css() {
        // Length: 25
        const INPUT: &str = concat!(
            ".foo {\n",          //
            "  color: black;\n", //
            "}\n"
        );

        let result = minify_css(INPUT).unwrap();

        assert!(result.contains(".foo"));
        assert!(result.contains("color:"));
        assert!(!result.contains('\n'));
        assert!(result.len() <= 18);
    }

    #[test]
    fn js() {
        // Length: 41
        const INPUT: &str = concat!(
            "function foo() {\n",        //
            "  console.log(\"bar\");\n", //
            "}\n"
        );

        let result = minify_js(INPUT).unwrap();

        assert!(result.contains("foo"));
        assert!(result.contains("bar"));
        assert!(!result.contains('\n'));
        assert!(result.len() <= 36);
    }

    #[test]
    fn json() {
        const CASES: [(&str, &str); 3] = [
            ("{\n    \"a\": 1,\n    \"b\": [1, 2]\n}\n", r#"{"a":1,"b":[1,2]}"#),
            ("[ ]", "[]"),
            ("  \"text with  spaces\"  ", r#""text with  spaces""#),
        ];

        for (input, expected) in CASES {
            let result = minify_json(input).unwrap();
            assert_eq!(
                result, expected,
                "\nminify_json({input:?}) expected {expected:?} but received {result:?}"
            );
        }

        assert!(matches!(minify_json("{"), Err(MinifyError::Json(_))));
    }

    #[test]
    fn write_output_file() {
        let dir = assert_fs::TempDir::new().unwrap();
        let document = Document::new(dir.path().join("data.json"), "json", "{ \"a\": [ 1 ] }");
        let config = EffectiveConfig {
            output: OutputTemplate {
                json_min_path: Some("dist".into()),
                ..Default::default()
            },
            ..Default::default()
        };

        let output_path = minifier().minify_file(&document, &config).unwrap();

        assert_eq!(output_path, dir.path().join("dist/data.min.json"));
        assert_eq!(std::fs::read_to_string(output_path).unwrap(), r#"{"a":[1]}"#);
    }

    #[test]
    fn unsupported_language() {
        let document = Document::new("notes.txt", "plaintext", "hello");

        let result = minifier().minify_file(&document, &EffectiveConfig::default());

        assert!(matches!(result, Err(MinifyError::UnsupportedLanguage(_))));
    }

    #[test]
    fn errors_are_notified() {
        let dir = assert_fs::TempDir::new().unwrap();
        let errors = Arc::new(Errors::default());
        let minifier = FileMinifier::new(errors.clone());

        let document = Document::new(dir.path().join("app.js"), "javascript", "function (");
        minifier.minify(&document, &EffectiveConfig::default());

        let messages = errors.0.lock().unwrap().clone();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("app.js"), "\nunexpected message {messages:?}");
        assert!(!dir.path().join("app.min.js").exists());

        let document = Document::new(dir.path().join("ok.json"), "json", "[ 1 ]");
        minifier.minify(&document, &EffectiveConfig::default());

        assert_eq!(errors.0.lock().unwrap().len(), 1);
        assert!(dir.path().join("ok.min.json").is_file());
    }
}
