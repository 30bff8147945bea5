//! Command line utilities.
//!
//! The command line stands in for the editor: files given on the command line
//! or changed on disk play the role of open and saved documents.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::{bail, Context, Result};
pub use clap::Parser;
use clap::{Args, Subcommand};
use tokio::runtime::Handle;

use crate::{
    config::{EffectiveConfig, NAMESPACE},
    detect::Heuristic,
    document::{Document, Language},
    extension::{EditorEvent, Extension, Host},
    host::{EditorEventSource, LocalFilesystem, Notifier, StatusAffordance},
    minify::FileMinifier,
    settings::FileSettings,
    trigger::TokioScheduler,
};

/// Command line usage description.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Subcommand.
    #[command(subcommand)]
    pub command: Command,

    /// Command line options.
    #[command(flatten)]
    pub opts: Opts,
}

/// List of commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Minify files
    Minify {
        /// Files to minify
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Minify files when they change
    Watch {
        /// Directories to watch
        #[arg(default_value = ".")]
        dirs: Vec<PathBuf>,
    },

    /// Tell whether the minify button is shown for a file
    Status {
        /// File to look at
        file: PathBuf,
    },

    /// Print the effective configuration
    ExportConfig,
}

/// Command line options.
#[derive(Debug, Args, Clone)]
pub struct Opts {
    /// Settings file [default: "minify.json", "minify.toml" or "minify.yaml"]
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Settings namespace
    #[arg(long, global = true, default_value = NAMESPACE)]
    pub namespace: String,
}

/// Run a command.
pub fn run(cli: Cli) -> Result<()> {
    let Cli { command, opts } = cli;

    let settings = settings(&opts)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("starting the runtime")?;

    runtime.block_on(async move {
        let editor = ActiveEditor::default();
        let mut extension = Extension::activate(
            Host {
                settings: settings.clone(),
                probe: Arc::new(LocalFilesystem),
                pipeline: Arc::new(FileMinifier::new(Arc::new(LogNotifier))),
                scheduler: Arc::new(TokioScheduler::new(Handle::current())),
                affordance: LogButton,
                notifier: LogNotifier,
                editor: editor.clone(),
            },
            opts.namespace.clone(),
        );

        match command {
            Command::Minify { files } => minify(&extension, &editor, files),
            Command::Watch { dirs } => {
                watch(&mut extension, &editor, &settings, &opts.namespace, dirs).await
            },
            Command::Status { file } => status(&mut extension, &editor, file),
            Command::ExportConfig => {
                println!("{}", extension.export_config()?);
                Ok(())
            },
        }
    })
}

/// Run the `minify` command.
fn minify(extension: &Extension, editor: &ActiveEditor, files: Vec<PathBuf>) -> Result<()> {
    for file in files {
        let document = Document::open(&file).with_context(|| format!("reading {file:?}"))?;

        editor.set(Some(document));

        extension.minify_document()?;
    }

    Ok(())
}

/// Run the `status` command.
fn status(extension: &mut Extension, editor: &ActiveEditor, file: PathBuf) -> Result<()> {
    let document = Document::open(&file).with_context(|| format!("reading {file:?}"))?;

    editor.set(Some(document.clone()));
    extension.handle(EditorEvent::Open(document));

    let state = if extension.visibility().is_shown() {
        "shown"
    } else {
        "hidden"
    };

    println!("{state}");

    Ok(())
}

/// Run the `watch` command.
///
/// Changed files are handled as saved documents, except minified outputs.
/// A change of the settings file reloads the configuration.
async fn watch(
    extension: &mut Extension,
    editor: &ActiveEditor,
    settings: &FileSettings,
    namespace: &str,
    dirs: Vec<PathBuf>,
) -> Result<()> {
    let mut watch_paths = dirs
        .iter()
        .map(|dir| dir.canonicalize().with_context(|| format!("watching {dir:?}")))
        .collect::<Result<Vec<_>>>()?;

    let settings_path = settings.path().canonicalize().ok();

    if let Some(path) = settings_path.as_ref() {
        if !watch_paths.iter().any(|dir| path.starts_with(dir)) {
            watch_paths.push(path.clone());
        }
    }

    crate::watch(watch_paths, |paths| {
        for path in paths {
            let config = extension.config();

            match route(&path, settings_path.as_deref(), &config) {
                Route::Reload => {
                    tracing::info!("Reloading configuration...");
                    extension.handle(EditorEvent::ConfigChange(namespace.to_owned()));
                },
                Route::Save => {
                    let document = match Document::open(&path) {
                        Ok(document) => document,
                        Err(error) => {
                            tracing::warn!("Cannot read {path:?}: {error}");
                            continue;
                        },
                    };

                    editor.set(Some(document.clone()));
                    extension.handle(EditorEvent::ActiveEditorChange);
                    extension.handle(EditorEvent::Save(document));
                },
                Route::Skip => {},
            }
        }

        Ok(true)
    })
    .await?;

    Ok(())
}

/// What the `watch` command does with a changed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    /// Reload the configuration.
    Reload,
    /// Handle the file as a saved document.
    Save,
    /// Ignore the file.
    Skip,
}

/// Route a changed file.
///
/// Minified outputs are skipped, so that writing them does not trigger
/// another minification.
fn route(path: &Path, settings_path: Option<&Path>, config: &EffectiveConfig) -> Route {
    if settings_path == Some(path) {
        return Route::Reload;
    }

    if Language::from_path(path).is_none() || Heuristic::new(&config.output).has_marker(path) {
        return Route::Skip;
    }

    Route::Save
}

/// Select the settings file.
///
/// An explicit settings file must exist and be valid. Without one, a settings
/// file is looked up in the current directory.
fn settings(opts: &Opts) -> Result<FileSettings> {
    let Some(path) = opts.settings.as_deref() else {
        return Ok(FileSettings::discover(".")
            .unwrap_or_else(|| FileSettings::new(Path::new(FileSettings::FILE_NAMES[0]))));
    };

    if !path.is_file() {
        bail!("settings file {path:?} not found");
    }

    let settings = FileSettings::new(path);

    settings
        .read_tree()
        .with_context(|| format!("loading settings from {path:?}"))?;

    tracing::info!("Using settings from {path:?}");

    Ok(settings)
}

/// The document given on the command line.
#[derive(Debug, Clone, Default)]
struct ActiveEditor(Arc<Mutex<Option<Document>>>);

impl ActiveEditor {
    fn set(&self, document: Option<Document>) {
        *self.0.lock().unwrap_or_else(|error| error.into_inner()) = document;
    }
}

impl EditorEventSource for ActiveEditor {
    fn active_document(&self) -> Option<Document> {
        self.0
            .lock()
            .unwrap_or_else(|error| error.into_inner())
            .clone()
    }
}

/// Log notifications.
struct LogNotifier;

impl Notifier for LogNotifier {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }
}

/// Log button changes.
struct LogButton;

impl StatusAffordance for LogButton {
    fn show(&self) {
        tracing::debug!("Minify button shown");
    }

    fn hide(&self) {
        tracing::debug!("Minify button hidden");
    }
}
