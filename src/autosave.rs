//! Debounced persistence of committed snapshots.
//!
//! The [`Autosaver`] watches the editor's snapshot channel. Each commit
//! (re)starts a quiet-period timer; when the timer runs out, the latest
//! snapshot is written once, on the blocking pool. Commits keep flowing while
//! a write is in flight. A failed write is reported through [`SaveStatus`]
//! and retried on the next change; the in-memory document is never touched.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::db::ProjectStore;
use crate::models::Project;

pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum SaveStatus {
    Idle,
    /// Changes are waiting for the quiet period to end.
    Pending,
    Saving,
    Saved,
    Failed(String),
}

/// A [`SaveStatus`] for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReport {
    pub project_id: String,
    pub status: SaveStatus,
}

pub struct Autosaver {
    status: watch::Receiver<SaveReport>,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl Autosaver {
    /// Start saving snapshots published on `snapshots` into `store`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        store: Arc<dyn ProjectStore>,
        snapshots: watch::Receiver<Arc<Project>>,
        quiet: Duration,
    ) -> Self {
        let project_id = snapshots.borrow().id.clone();
        let (status_tx, status) = watch::channel(SaveReport {
            project_id,
            status: SaveStatus::Idle,
        });
        let (stop, stop_rx) = oneshot::channel();

        let task = tokio::spawn(run(store, snapshots, quiet, status_tx, stop_rx));
        Self {
            status,
            stop: Some(stop),
            task,
        }
    }

    pub fn status(&self) -> SaveReport {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveReport> {
        self.status.clone()
    }

    /// Cancel any pending save and end the saver.
    ///
    /// A write already handed to the blocking pool still runs to completion;
    /// its result is simply not reported.
    pub async fn stop(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Err(e) = (&mut self.task).await {
            tracing::warn!("Autosaver task ended abnormally: {}", e);
        }
    }
}

enum Wake {
    Changed,
    Closed,
    Stopped,
}

async fn next_change(snapshots: &mut watch::Receiver<Arc<Project>>, stop: &mut oneshot::Receiver<()>) -> Wake {
    tokio::select! {
        _ = stop => Wake::Stopped,
        changed = snapshots.changed() => match changed {
            Ok(()) => Wake::Changed,
            Err(_) => Wake::Closed,
        },
    }
}

async fn run(
    store: Arc<dyn ProjectStore>,
    mut snapshots: watch::Receiver<Arc<Project>>,
    quiet: Duration,
    status: watch::Sender<SaveReport>,
    mut stop: oneshot::Receiver<()>,
) {
    let report = |project_id: &str, state: SaveStatus| {
        status.send_replace(SaveReport {
            project_id: project_id.to_string(),
            status: state,
        });
    };

    loop {
        match next_change(&mut snapshots, &mut stop).await {
            Wake::Changed => {}
            Wake::Closed | Wake::Stopped => break,
        }
        report(&snapshots.borrow().id, SaveStatus::Pending);

        // Restart the quiet period on every further change.
        let mut closed = false;
        loop {
            tokio::select! {
                _ = &mut stop => {
                    tracing::debug!("Autosaver stopped with a save pending");
                    return;
                }
                _ = tokio::time::sleep(quiet) => break,
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        closed = true;
                        break;
                    }
                }
            }
        }

        let project = snapshots.borrow_and_update().clone();
        report(&project.id, SaveStatus::Saving);

        let write = {
            let store = Arc::clone(&store);
            let project = Arc::clone(&project);
            tokio::task::spawn_blocking(move || store.save(&project))
        };
        let result = tokio::select! {
            _ = &mut stop => {
                tracing::debug!("Autosaver stopped during a write to project {}", project.id);
                return;
            }
            result = write => result,
        };

        if !closed && snapshots.borrow().id != project.id {
            tracing::debug!("Dropping save result for project {}, no longer open", project.id);
            continue;
        }

        match result {
            Ok(Ok(())) => {
                tracing::info!("Saved project {}", project.id);
                report(&project.id, SaveStatus::Saved);
            }
            Ok(Err(e)) => {
                tracing::error!("Failed to save project {}: {:#}", project.id, e);
                report(&project.id, SaveStatus::Failed(e.to_string()));
            }
            Err(e) => {
                tracing::error!("Save task for project {} panicked: {}", project.id, e);
                report(&project.id, SaveStatus::Failed(e.to_string()));
            }
        }

        if closed {
            break;
        }
    }
}
