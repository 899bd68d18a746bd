//! Change-trigger plumbing: a filesystem watcher over the profile
//! directory feeding a channel that a single ingestion worker drains.
//!
//! Funneling every change through one consumer serializes ingestion cycles
//! by construction, and draining the queue before each cycle collapses a
//! burst of writes into one pass over the newest file state.

use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::TrackerError;
use crate::locate::is_state_file;

/// Events the watcher forwards to the ingestion worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// An account-state file was created or modified.
    StateChanged(PathBuf),
    /// The underlying watcher reported a failure; the worker decides
    /// whether to keep going.
    Error(String),
}

/// Watches a profile directory for account-state changes.
pub struct DirectoryWatcher {
    rx: mpsc::UnboundedReceiver<WatchEvent>,
    // Dropping the watcher stops the event stream, so it rides along.
    _watcher: Option<RecommendedWatcher>,
}

impl DirectoryWatcher {
    pub fn new(dir: &Path) -> Result<Self, TrackerError> {
        let (event_tx, rx) = mpsc::unbounded_channel();

        let mut watcher =
            notify::recommended_watcher(move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                        return;
                    }
                    for path in event.paths {
                        if is_state_file(&path) {
                            let _ = event_tx.send(WatchEvent::StateChanged(path));
                        }
                    }
                }
                Err(e) => {
                    let _ = event_tx.send(WatchEvent::Error(e.to_string()));
                }
            })
            .map_err(|e| TrackerError::Watch {
                reason: e.to_string(),
            })?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|e| TrackerError::Watch {
                reason: e.to_string(),
            })?;

        tracing::info!(dir = %dir.display(), "watching profile directory");
        Ok(Self {
            rx,
            _watcher: Some(watcher),
        })
    }

    /// Next change event, or `None` once the watcher is gone.
    pub async fn next_event(&mut self) -> Option<WatchEvent> {
        self.rx.recv().await
    }

    /// Drop everything already queued so the coming ingestion runs against
    /// the newest file state. Returns how many events were superseded.
    pub fn drain_pending(&mut self) -> usize {
        let mut drained = 0;
        while self.rx.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }

    #[cfg(test)]
    fn from_channel(rx: mpsc::UnboundedReceiver<WatchEvent>) -> Self {
        Self { rx, _watcher: None }
    }
}
