//! Wire editor events to the decision logic.

use std::sync::Arc;

use thiserror::Error;

use crate::{
    config::{ConfigStore, EffectiveConfig},
    detect::{Heuristic, MinifiedDetector},
    document::{Document, Language, SaveEvent},
    host::{EditorEventSource, FilesystemProbe, MinificationPipeline, Notifier, StatusAffordance},
    settings::SettingsProvider,
    trigger::{Decision, Scheduler, TriggerPolicy},
    visibility::{self, StatusButton, Visibility},
};

/// Message shown after the configuration has been reloaded.
pub const RELOADED_MESSAGE: &str = "Minify configuration reloaded.";

/// An action could not run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// There is no active document.
    #[error("No document open.")]
    NoDocument,
    /// There is no active editor.
    #[error("No editor open.")]
    NoEditor,
    /// The active document has never been saved.
    #[error("File must be saved before it can be minified.")]
    Untitled,
    /// The selection is in a document that cannot be minified.
    #[error("Language {0:?} is not supported.")]
    UnsupportedLanguage(String),
    /// The minifier failed on the selection.
    #[error("Selection could not be minified.")]
    Selection,
}

/// Events sent by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// A document has been saved.
    Save(Document),
    /// A document has been opened.
    Open(Document),
    /// Another editor became active.
    ActiveEditorChange,
    /// Settings of the given namespace have changed.
    ConfigChange(String),
}

/// Collaborators required by an [`Extension`].
pub struct Host<S, A, N, E> {
    /// Source of raw settings.
    pub settings: S,
    /// File system probe.
    pub probe: Arc<dyn FilesystemProbe>,
    /// Minification pipeline.
    pub pipeline: Arc<dyn MinificationPipeline>,
    /// Scheduler of delayed minifications.
    pub scheduler: Arc<dyn Scheduler>,
    /// Minify button.
    pub affordance: A,
    /// User messages.
    pub notifier: N,
    /// Editor state.
    pub editor: E,
}

/// The running add-on.
pub struct Extension {
    config: ConfigStore,
    trigger: TriggerPolicy,
    button: StatusButton,
    pipeline: Arc<dyn MinificationPipeline>,
    notifier: Box<dyn Notifier>,
    editor: Box<dyn EditorEventSource>,
    detector: Option<Box<dyn MinifiedDetector + Send + Sync>>,
}

impl Extension {
    /// Load the configuration and set the initial button state.
    pub fn activate<S, A, N, E>(host: Host<S, A, N, E>, namespace: impl Into<String>) -> Self
    where
        S: SettingsProvider + 'static,
        A: StatusAffordance + 'static,
        N: Notifier + 'static,
        E: EditorEventSource + 'static,
    {
        let config = ConfigStore::new(host.settings, namespace);
        let trigger = TriggerPolicy::new(host.probe, Arc::clone(&host.pipeline), host.scheduler);
        let mut button = StatusButton::new(host.affordance);

        button.apply(Visibility::initial(&config.current()));

        tracing::debug!("Activated with {:?}", config.current());

        Self {
            config,
            trigger,
            button,
            pipeline: host.pipeline,
            notifier: Box::new(host.notifier),
            editor: Box::new(host.editor),
            detector: None,
        }
    }

    /// Replace the default minified document detector.
    pub fn with_detector(self, detector: impl MinifiedDetector + Send + Sync + 'static) -> Self {
        Self {
            detector: Some(Box::new(detector)),
            ..self
        }
    }

    /// Return the current configuration.
    pub fn config(&self) -> Arc<EffectiveConfig> {
        self.config.current()
    }

    /// Return the current visibility of the minify button.
    pub fn visibility(&self) -> Visibility {
        self.button.state()
    }

    /// Handle an editor event.
    ///
    /// Return the decision taken for [`EditorEvent::Save`].
    pub fn handle(&mut self, event: EditorEvent) -> Option<Decision> {
        match event {
            EditorEvent::Save(document) => {
                let decision = self
                    .trigger
                    .on_save(SaveEvent::from(document), self.config.current());
                return Some(decision);
            },
            EditorEvent::Open(_) | EditorEvent::ActiveEditorChange => self.refresh_visibility(),
            EditorEvent::ConfigChange(namespace) => {
                if self.affects_configuration(&namespace) {
                    self.reload_config();
                }
            },
        }

        None
    }

    /// Reload the configuration and update the button.
    pub fn reload_config(&mut self) -> Arc<EffectiveConfig> {
        let reloaded = self.config.load(true);

        self.refresh_visibility();

        if reloaded.notify {
            self.notifier.info(RELOADED_MESSAGE);
        }

        reloaded.config
    }

    /// Minify the active document, whatever `minifyOnSave` says.
    pub fn minify_document(&self) -> Result<(), ActionError> {
        self.run_action(|| {
            let document = self.editor.active_document().ok_or(ActionError::NoDocument)?;

            if document.untitled {
                return Err(ActionError::Untitled);
            }

            self.pipeline.minify(&document, &self.config.current());

            Ok(())
        })
    }

    /// Minify the selected text of the active editor.
    pub fn minify_selection(&self) -> Result<(), ActionError> {
        self.run_action(|| {
            let selection = self.editor.active_selection().ok_or(ActionError::NoEditor)?;

            if Language::from_id(&selection.language_id).is_none() {
                return Err(ActionError::UnsupportedLanguage(selection.language_id));
            }

            let text = self
                .pipeline
                .minify_selection(&selection, &self.config.current())
                .ok_or(ActionError::Selection)?;

            self.editor.replace_selection(&text);

            Ok(())
        })
    }

    /// Serialize the current configuration as pretty JSON.
    pub fn export_config(&self) -> serde_json::Result<String> {
        use serde::Serialize;

        let config = self.config.current();
        let mut output = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut output, formatter);

        config.serialize(&mut serializer)?;

        // The JSON serializer only writes UTF-8
        Ok(String::from_utf8_lossy(&output).into_owned())
    }

    /// Report action failures to the user.
    fn run_action(&self, action: impl FnOnce() -> Result<(), ActionError>) -> Result<(), ActionError> {
        action().inspect_err(|error| self.notifier.error(&error.to_string()))
    }

    fn affects_configuration(&self, namespace: &str) -> bool {
        let own = self.config.namespace();

        namespace == own
            || namespace
                .strip_prefix(own)
                .is_some_and(|rest| rest.starts_with('.'))
    }

    fn refresh_visibility(&mut self) {
        let config = self.config.current();
        let active = self.editor.active_document();

        let heuristic = Heuristic::new(&config.output);
        let detector: &dyn MinifiedDetector = match &self.detector {
            Some(detector) => &**detector,
            None => &heuristic,
        };

        let visibility = visibility::decide(&config, active.as_ref(), detector);

        self.button.apply(visibility);
    }
}
