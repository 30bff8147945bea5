//! Documents handled by the editor.

use std::path::{Path, PathBuf};

/// Languages that can be minified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// JavaScript.
    JavaScript,
    /// CSS.
    Css,
    /// JSON.
    Json,
}

impl Language {
    /// All supported languages.
    pub const ALL: [Language; 3] = [Language::JavaScript, Language::Css, Language::Json];

    /// Return the editor language identifier.
    pub fn id(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::Css => "css",
            Self::Json => "json",
        }
    }

    /// Find the supported language for an editor language identifier.
    ///
    /// Identifiers are compared as reported by the editor, without case
    /// folding.
    pub fn from_id(id: impl AsRef<str>) -> Option<Self> {
        let id = id.as_ref();
        Self::ALL.into_iter().find(|language| language.id() == id)
    }

    /// Guess the language from a file extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        match path.as_ref().extension()?.to_str()? {
            "js" | "mjs" | "cjs" => Some(Self::JavaScript),
            "css" => Some(Self::Css),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// A text document open in the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Location of the document on disk.
    pub path: PathBuf,

    /// Editor language identifier (e.g. `javascript`).
    pub language_id: String,

    /// Text content.
    pub content: String,

    /// Whether the document has never been saved.
    pub untitled: bool,
}

impl Document {
    /// Create a saved document.
    pub fn new(
        path: impl Into<PathBuf>,
        language_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            language_id: language_id.into(),
            content: content.into(),
            untitled: false,
        }
    }

    /// Create a document that has never been saved.
    pub fn untitled(language_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: PathBuf::from("Untitled-1"),
            language_id: language_id.into(),
            content: content.into(),
            untitled: true,
        }
    }

    /// Read a document from disk.
    ///
    /// The language is guessed from the file extension, unknown extensions
    /// yield `plaintext`.
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)?;
        let language_id = Language::from_path(&path)
            .map(Language::id)
            .unwrap_or("plaintext");

        Ok(Self::new(path, language_id, content))
    }

    /// Return the language if it is supported.
    pub fn language(&self) -> Option<Language> {
        Language::from_id(&self.language_id)
    }
}

/// A document has been saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveEvent {
    /// The saved document.
    pub document: Document,
}

impl From<Document> for SaveEvent {
    fn from(document: Document) -> Self {
        Self { document }
    }
}

#[cfg(test)]
mod tests {
    use super::Language;

    #[test]
    fn from_id() {
        const CASES: [(&str, Option<Language>); 6] = [
            ("javascript", Some(Language::JavaScript)),
            ("css", Some(Language::Css)),
            ("json", Some(Language::Json)),
            ("JavaScript", None),
            ("typescript", None),
            ("", None),
        ];

        for (input, expected) in CASES {
            let result = Language::from_id(input);
            assert_eq!(
                result, expected,
                "\nLanguage::from_id({input:?}) expected {expected:?} but received {result:?}"
            );
        }
    }

    #[test]
    fn from_path() {
        const CASES: [(&str, Option<Language>); 7] = [
            ("app.js", Some(Language::JavaScript)),
            ("lib/index.mjs", Some(Language::JavaScript)),
            ("lib/index.cjs", Some(Language::JavaScript)),
            ("style.min.css", Some(Language::Css)),
            ("package.json", Some(Language::Json)),
            ("README.md", None),
            ("Makefile", None),
        ];

        for (input, expected) in CASES {
            let result = Language::from_path(input);
            assert_eq!(
                result, expected,
                "\nLanguage::from_path({input:?}) expected {expected:?} but received {result:?}"
            );
        }
    }
}
