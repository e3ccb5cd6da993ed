use crate::error::AppError;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;

const DEBOUNCE: Duration = Duration::from_millis(300);

/// Signals when anything under the public directory changes, so the
/// manifest can be rebuilt wholesale.
pub struct FolderWatcher {
    state: Mutex<Option<RecommendedWatcher>>,
}

impl Default for FolderWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FolderWatcher {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    /// Watch `path` recursively. Bursts of events collapse into one signal.
    /// Watching a new path drops the previous watch and closes its channel.
    pub fn watch_folder(&self, path: &Path) -> Result<mpsc::UnboundedReceiver<()>, AppError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        // Drop old watcher (stops old watch)
        *state = None;

        let (raw_tx, mut raw_rx) = mpsc::unbounded_channel::<()>();
        let (tx, rx) = mpsc::unbounded_channel::<()>();

        tokio::spawn(async move {
            loop {
                if raw_rx.recv().await.is_none() {
                    // Channel closed, watcher was dropped
                    break;
                }
                tokio::time::sleep(DEBOUNCE).await;
                while raw_rx.try_recv().is_ok() {}
                if tx.send(()).is_err() {
                    break;
                }
            }
        });

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) => {
                    if matches!(
                        event.kind,
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                    ) {
                        let _ = raw_tx.send(());
                    }
                }
                Err(e) => tracing::warn!("Watch error: {}", e),
            }
        })?;

        watcher.watch(path, RecursiveMode::Recursive)?;
        tracing::info!("Watching {} for changes", path.display());

        *state = Some(watcher);
        Ok(rx)
    }

    pub fn stop(&self) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
