//! Facilities provided by the editor.

use std::path::Path;

use crate::{config::EffectiveConfig, document::Document};

/// Check the existence of files.
pub trait FilesystemProbe: Send + Sync {
    /// Return `true` if `path` exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Probe the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl FilesystemProbe for LocalFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Selected text in the active editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Language identifier of the document holding the selection.
    pub language_id: String,

    /// Selected text.
    pub text: String,
}

/// Minify documents.
///
/// Failures are handled by the implementation, callers never look at them.
pub trait MinificationPipeline: Send + Sync {
    /// Minify a document and write the result at its output path.
    fn minify(&self, document: &Document, config: &EffectiveConfig);

    /// Minify selected text, returning the replacement text.
    fn minify_selection(&self, selection: &Selection, config: &EffectiveConfig) -> Option<String>;
}

/// The clickable minify button.
pub trait StatusAffordance: Send + Sync {
    /// Show the button.
    fn show(&self);

    /// Hide the button.
    fn hide(&self);
}

/// Present messages to the user.
pub trait Notifier: Send + Sync {
    /// Show an informational message.
    fn info(&self, message: &str);

    /// Show an error message.
    fn error(&self, message: &str);
}

/// The editor state queried while handling events.
///
/// Events themselves are delivered to [`crate::Extension::handle`].
pub trait EditorEventSource: Send + Sync {
    /// Return the document of the active editor.
    fn active_document(&self) -> Option<Document>;

    /// Return the selection of the active editor.
    fn active_selection(&self) -> Option<Selection> {
        None
    }

    /// Replace the selection of the active editor.
    fn replace_selection(&self, _text: &str) {}
}
