//! Document-level mutations.
//!
//! Every operation here has the shape `&Project -> Project`: it borrows the
//! current document and returns the next one, which is what
//! [`crate::history::History::commit`] expects. Outline operations delegate to
//! [`crate::outline`]; characters, notes and task lists are flat collections.
//! Unknown ids are no-ops, exactly as in the tree mutator.

mod characters;
mod notes;
mod task_lists;

pub use characters::remap_character_fields;

use crate::models::*;
use crate::outline;

impl Project {
    fn with_outline(&self, outline: Vec<OutlineNode>) -> Project {
        Project {
            outline,
            ..self.clone()
        }
    }

    pub fn find_section(&self, id: &str) -> Option<&OutlineNode> {
        outline::find(&self.outline, id)
    }

    /// Add a section under `parent_id`, or at the top level when `None`.
    pub fn add_section(&self, parent_id: Option<&str>, node: OutlineNode) -> Project {
        match parent_id {
            Some(parent_id) => self.with_outline(outline::insert_child(&self.outline, parent_id, node)),
            None => self.with_outline(outline::insert_root(&self.outline, node)),
        }
    }

    pub fn update_section(&self, id: &str, update: &OutlineUpdate) -> Project {
        self.with_outline(outline::set_fields(&self.outline, id, update))
    }

    pub fn delete_section(&self, id: &str) -> Project {
        self.with_outline(outline::remove(&self.outline, id))
    }

    pub fn move_section(&self, id: &str, target: &MoveTarget) -> Project {
        self.with_outline(outline::move_node(&self.outline, id, target))
    }

    pub fn toggle_section_export(&self, id: &str) -> Project {
        self.with_outline(outline::toggle_flag(&self.outline, id))
    }

    pub fn toggle_section_character(&self, section_id: &str, character_id: &str) -> Project {
        self.with_outline(outline::toggle_character(&self.outline, section_id, character_id))
    }

    pub fn update_details(&self, input: &UpdateProjectInput) -> Project {
        let mut next = self.clone();
        if let Some(title) = &input.title {
            next.title = title.clone();
        }
        if let Some(genre) = &input.genre {
            next.genre = genre.clone();
        }
        if let Some(description) = &input.description {
            next.description = description.clone();
        }
        next
    }
}
