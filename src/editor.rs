//! One editing session over one project.
//!
//! [`Editor`] ties the history to the selection: after every transition that
//! changes the present project (commit, undo, redo, reset) the selection is
//! re-resolved and the new snapshot is published on a `watch` channel. The
//! autosaver, or any other observer, subscribes to that channel; the editor
//! itself never performs I/O.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use crate::history::{History, HistoryStatus, DEFAULT_HISTORY_LIMIT};
use crate::models::{ItemRef, Project};
use crate::selection::{SelectedItem, SelectionTracker};

/// An editor shared between the HTTP API, the MCP server and chat turns.
///
/// The lock is only ever held for synchronous work, never across an await.
pub type SharedEditor = Arc<Mutex<Editor>>;

pub fn lock(editor: &SharedEditor) -> MutexGuard<'_, Editor> {
    editor.lock().expect("editor lock poisoned")
}

pub struct Editor {
    history: History,
    selection: SelectionTracker,
    snapshots: watch::Sender<Arc<Project>>,
}

impl Editor {
    pub fn new(project: Project) -> Self {
        Self::with_history_limit(project, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_history_limit(project: Project, limit: usize) -> Self {
        let history = History::with_limit(project, limit);
        let (snapshots, _) = watch::channel(history.snapshot());
        Self {
            history,
            selection: SelectionTracker::new(),
            snapshots,
        }
    }

    pub fn into_shared(self) -> SharedEditor {
        Arc::new(Mutex::new(self))
    }

    pub fn project(&self) -> &Project {
        self.history.present()
    }

    pub fn snapshot(&self) -> Arc<Project> {
        self.history.snapshot()
    }

    /// Receive every committed snapshot from now on.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Project>> {
        self.snapshots.subscribe()
    }

    /// Apply a document mutation. Returns `false` if it changed nothing.
    pub fn commit(&mut self, label: &str, update: impl FnOnce(&Project) -> Project) -> bool {
        if !self.history.commit(update) {
            tracing::debug!("Commit '{}' changed nothing", label);
            return false;
        }
        tracing::debug!("Committed '{}'", label);
        self.after_transition();
        true
    }

    pub fn undo(&mut self) -> bool {
        if !self.history.undo() {
            return false;
        }
        tracing::debug!("Undo");
        self.after_transition();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.redo() {
            return false;
        }
        tracing::debug!("Redo");
        self.after_transition();
        true
    }

    /// Switch to a different project, discarding history and selection.
    pub fn replace_project(&mut self, project: Project) {
        self.history.reset(project);
        self.selection.clear();
        self.snapshots.send_replace(self.history.snapshot());
    }

    pub fn history_status(&self) -> HistoryStatus {
        self.history.status()
    }

    pub fn selection(&self) -> Option<&SelectedItem> {
        self.selection.current()
    }

    pub fn select(&mut self, item: &ItemRef) -> bool {
        self.selection.select(self.history.present(), item)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    fn after_transition(&mut self) {
        self.selection.reconcile(self.history.present());
        self.snapshots.send_replace(self.history.snapshot());
    }
}
