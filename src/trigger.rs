//! Decide whether a saved document is minified, and when.
//!
//! Each save is evaluated on its own:
//!
//! 1. unsupported languages are skipped;
//! 2. nothing happens if `minifyOnSave` is `never`;
//! 3. with `exists`, the output file must already exist;
//! 4. otherwise the document is minified, after `onSaveDelay` if it is set.
//!
//! Delayed minifications are never merged nor cancelled: two saves in a row
//! give two minifications.

use std::{sync::Arc, time::Duration};

use tokio::runtime::Handle;

use crate::{
    config::{EffectiveConfig, MinifyOnSave},
    document::SaveEvent,
    host::{FilesystemProbe, MinificationPipeline},
    output_path::resolve_output_path,
};

/// Why a save does not lead to minification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    /// The document language is not supported.
    UnsupportedLanguage,
    /// Minification on save is disabled.
    Disabled,
    /// The output file does not exist yet.
    OutputMissing,
}

/// Outcome of a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Do not minify.
    Suppressed(Suppression),
    /// Minify after a delay.
    Scheduled(Duration),
    /// Minify now.
    Firing,
}

/// Decide what to do with a saved document.
pub fn decide(event: &SaveEvent, config: &EffectiveConfig, probe: &dyn FilesystemProbe) -> Decision {
    if event.document.language().is_none() {
        return Decision::Suppressed(Suppression::UnsupportedLanguage);
    }

    match config.minify_on_save {
        MinifyOnSave::Never => return Decision::Suppressed(Suppression::Disabled),
        MinifyOnSave::Exists => {
            let output_path = resolve_output_path(&event.document.path, &config.output);
            if !probe.exists(&output_path) {
                return Decision::Suppressed(Suppression::OutputMissing);
            }
        },
        MinifyOnSave::Always => {},
    }

    match config.save_delay() {
        Some(delay) => Decision::Scheduled(delay),
        None => Decision::Firing,
    }
}

/// A task run once by a [`Scheduler`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Run tasks later.
pub trait Scheduler: Send + Sync {
    /// Run `task` once, `delay` after now.
    fn schedule(&self, delay: Duration, task: Task);
}

/// Schedule tasks on a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    /// Create a scheduler spawning on the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        // The delay starts now, not when the runtime first polls the task.
        let deadline = tokio::time::Instant::now() + delay;

        self.handle.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            task();
        });
    }
}

/// Apply save decisions.
pub struct TriggerPolicy {
    probe: Arc<dyn FilesystemProbe>,
    pipeline: Arc<dyn MinificationPipeline>,
    scheduler: Arc<dyn Scheduler>,
}

impl TriggerPolicy {
    /// Create a trigger policy.
    pub fn new(
        probe: Arc<dyn FilesystemProbe>,
        pipeline: Arc<dyn MinificationPipeline>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            probe,
            pipeline,
            scheduler,
        }
    }

    /// Handle a save, minifying now or later according to `config`.
    ///
    /// A delayed minification uses `config` even if the configuration is
    /// reloaded in the meantime.
    pub fn on_save(&self, event: SaveEvent, config: Arc<EffectiveConfig>) -> Decision {
        let decision = decide(&event, &config, self.probe.as_ref());

        match decision {
            Decision::Suppressed(reason) => {
                tracing::debug!("Not minifying {:?}: {:?}", event.document.path, reason);
            },
            Decision::Scheduled(delay) => {
                tracing::debug!("Minifying {:?} in {:?}", event.document.path, delay);
                let pipeline = Arc::clone(&self.pipeline);
                self.scheduler.schedule(
                    delay,
                    Box::new(move || pipeline.minify(&event.document, &config)),
                );
            },
            Decision::Firing => {
                self.pipeline.minify(&event.document, &config);
            },
        }

        decision
    }
}
