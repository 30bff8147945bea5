//! Watch for file changes.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use notify_debouncer_full::{
    new_debouncer,
    notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher},
    DebounceEventResult, Debouncer, FileIdMap,
};
use thiserror::Error;

/// Time during which file events are grouped together.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// List of watcher errors.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Boxed error.
    #[error(transparent)]
    Boxed(#[from] Box<dyn std::error::Error + Send + Sync>),
    /// Notify error.
    #[error(transparent)]
    Notify(#[from] notify_debouncer_full::notify::Error),
}

/// Watch for file changes.
///
/// Call `callback` with the paths of files created or modified under `paths`.
/// Watching stops when the callback returns `false`.
pub async fn watch<I, P, F>(paths: I, mut callback: F) -> Result<(), WatchError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
    F: FnMut(Vec<PathBuf>) -> Result<bool, WatchError>,
{
    let (sender, mut receiver) = tokio::sync::mpsc::unbounded_channel();

    let event_handler = move |result: DebounceEventResult| {
        if let Err(error) = sender.send(result) {
            tracing::error!("{:?}", error);
        }
    };

    let mut debouncer = new_debouncer(DEBOUNCE, None, event_handler)?;

    for path in paths {
        add_watch_path(&mut debouncer, path)?;
    }

    let mut last_callback_time = Instant::now();

    while let Some(result) = receiver.recv().await {
        match result {
            Ok(events) => {
                let paths: BTreeSet<PathBuf> = events
                    .iter()
                    .filter(|event| event.time > last_callback_time)
                    .filter(|event| matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)))
                    .flat_map(|event| event.paths.iter().cloned())
                    .filter(|path| path.is_file())
                    .collect();

                if paths.is_empty() {
                    continue;
                }

                tracing::debug!("Files changed: {paths:?}");

                last_callback_time = Instant::now();

                if !(callback)(paths.into_iter().collect())? {
                    break;
                }
            },
            Err(errors) => tracing::error!("{errors:?}"),
        }
    }

    Ok(())
}

fn add_watch_path(
    debouncer: &mut Debouncer<RecommendedWatcher, FileIdMap>,
    path: impl AsRef<Path>,
) -> Result<(), WatchError> {
    let path = path.as_ref();

    debouncer.watcher().watch(path, RecursiveMode::Recursive)?;

    debouncer.cache().add_root(path, RecursiveMode::Recursive);

    tracing::info!("Watching {:?}", path);

    Ok(())
}
