//! Bounded, linear undo/redo over whole-project snapshots.
//!
//! Three buffers: `past` (oldest first), `present`, and `future` (next redo
//! first). Committing a change pushes the old present onto `past`, trimming
//! the oldest entry once the limit is exceeded, and clears `future`: a new
//! edit after an undo discards the redo branch.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::Project;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<Arc<Project>>,
    present: Arc<Project>,
    future: VecDeque<Arc<Project>>,
    limit: usize,
}

/// Counts exposed to callers that render undo/redo affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStatus {
    pub can_undo: bool,
    pub can_redo: bool,
    pub past: usize,
    pub future: usize,
}

impl History {
    pub fn new(project: Project) -> Self {
        Self::with_limit(project, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(project: Project, limit: usize) -> Self {
        Self {
            past: VecDeque::new(),
            present: Arc::new(project),
            future: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn present(&self) -> &Project {
        &self.present
    }

    /// Shared handle to the present snapshot.
    pub fn snapshot(&self) -> Arc<Project> {
        Arc::clone(&self.present)
    }

    /// Apply `update` to the present project.
    ///
    /// Returns `false` and leaves every buffer untouched when the result equals
    /// the present, so no-op mutations never create undo entries.
    pub fn commit(&mut self, update: impl FnOnce(&Project) -> Project) -> bool {
        let next = update(&self.present);
        if next == *self.present {
            return false;
        }

        let previous = std::mem::replace(&mut self.present, Arc::new(next));
        self.past.push_back(previous);
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
        self.future.clear();
        true
    }

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, previous);
        self.future.push_front(current);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let current = std::mem::replace(&mut self.present, next);
        self.past.push_back(current);
        while self.past.len() > self.limit {
            self.past.pop_front();
        }
        true
    }

    /// Start over from `project`, dropping both stacks.
    pub fn reset(&mut self, project: Project) {
        self.past.clear();
        self.future.clear();
        self.present = Arc::new(project);
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            past: self.past.len(),
            future: self.future.len(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OutlineNode;

    fn project() -> Project {
        Project::new("Draft", "Fantasy", "")
    }

    fn retitle(title: &str) -> impl FnOnce(&Project) -> Project + '_ {
        move |p| Project {
            title: title.to_string(),
            ..p.clone()
        }
    }

    #[test]
    fn test_commit_then_undo_then_redo() {
        let mut history = History::new(project());
        let before = history.present().clone();

        assert!(history.commit(|p| p.add_section(None, OutlineNode::new("Ch.1", ""))));
        let after = history.present().clone();

        assert!(history.undo());
        assert_eq!(*history.present(), before);
        assert!(history.redo());
        assert_eq!(*history.present(), after);
    }

    #[test]
    fn test_no_op_commit_leaves_history_untouched() {
        let mut history = History::new(project());
        assert!(!history.commit(|p| p.delete_section("missing")));
        assert!(!history.can_undo());
    }

    #[test]
    fn test_new_commit_clears_future() {
        let mut history = History::new(project());
        history.commit(retitle("One"));
        history.commit(retitle("Two"));
        history.undo();
        history.undo();
        assert_eq!(history.status().future, 2);

        history.commit(retitle("Three"));
        assert!(!history.can_redo());
        assert!(!history.redo());
        assert_eq!(history.present().title, "Three");
    }

    #[test]
    fn test_undo_and_redo_on_empty_stacks_are_no_ops() {
        let mut history = History::new(project());
        assert!(!history.undo());
        assert!(!history.redo());
        assert_eq!(history.present().title, "Draft");
    }

    #[test]
    fn test_past_is_capped_at_limit() {
        let mut history = History::new(project());
        for i in 0..=DEFAULT_HISTORY_LIMIT {
            assert!(history.commit(retitle(&format!("Rev {}", i))));
        }
        assert_eq!(history.status().past, DEFAULT_HISTORY_LIMIT);

        let undone = (0..=DEFAULT_HISTORY_LIMIT).filter(|_| history.undo()).count();
        assert_eq!(undone, DEFAULT_HISTORY_LIMIT);
        assert!(!history.undo());
        // The original "Draft" snapshot was dropped; the oldest survivor is Rev 0.
        assert_eq!(history.present().title, "Rev 0");
    }

    #[test]
    fn test_reset_drops_both_stacks() {
        let mut history = History::with_limit(project(), 5);
        history.commit(retitle("One"));
        history.commit(retitle("Two"));
        history.undo();
        history.reset(Project::new("Other", "", ""));
        assert_eq!(history.status(), HistoryStatus { can_undo: false, can_redo: false, past: 0, future: 0 });
    }
}
