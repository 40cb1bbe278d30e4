//! Tracks which item is open in the editor across document changes.
//!
//! The tracker stores a resolved copy of the item, but only ever trusts its
//! kind and id: after every change of the present project the copy is thrown
//! away and looked up again, so a stale title or body is never shown. If the
//! lookup fails (deleted, or undone out of existence) the selection clears.

use serde::{Deserialize, Serialize};

use crate::models::*;

/// A resolved selection: the current value of the open item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "item", rename_all = "snake_case")]
pub enum SelectedItem {
    Section(OutlineNode),
    Character(Character),
    Note(Note),
    TaskList(TaskList),
}

impl SelectedItem {
    /// Look up `item` in `project`.
    pub fn resolve(project: &Project, item: &ItemRef) -> Option<Self> {
        match item.kind {
            ItemKind::Section => project.find_section(&item.id).cloned().map(Self::Section),
            ItemKind::Character => project.find_character(&item.id).cloned().map(Self::Character),
            ItemKind::Note => project.find_note(&item.id).cloned().map(Self::Note),
            ItemKind::TaskList => project.find_task_list(&item.id).cloned().map(Self::TaskList),
        }
    }

    pub fn item_ref(&self) -> ItemRef {
        match self {
            Self::Section(node) => ItemRef::new(ItemKind::Section, &node.id),
            Self::Character(character) => ItemRef::new(ItemKind::Character, &character.id),
            Self::Note(note) => ItemRef::new(ItemKind::Note, &note.id),
            Self::TaskList(list) => ItemRef::new(ItemKind::TaskList, &list.id),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Section(node) => &node.title,
            Self::Character(character) => &character.name,
            Self::Note(note) => &note.title,
            Self::TaskList(list) => &list.title,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    current: Option<SelectedItem>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&SelectedItem> {
        self.current.as_ref()
    }

    /// Open `item`. Returns `false`, and clears the selection, if the item
    /// does not exist in `project`.
    pub fn select(&mut self, project: &Project, item: &ItemRef) -> bool {
        self.current = SelectedItem::resolve(project, item);
        self.current.is_some()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Re-resolve the selection against a new present project.
    pub fn reconcile(&mut self, project: &Project) {
        let Some(item) = self.current.as_ref().map(SelectedItem::item_ref) else {
            return;
        };
        self.current = SelectedItem::resolve(project, &item);
        if self.current.is_none() {
            tracing::debug!("Selected {} {} no longer exists", item.kind.as_str(), item.id);
        }
    }
}
