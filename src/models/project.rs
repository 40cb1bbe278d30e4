use serde::{Deserialize, Serialize};

use super::{Character, Note, OutlineNode, TaskList};

/// A writing project: the unit of persistence, of undo/redo and of AI context.
///
/// A project exclusively owns everything reachable from it. Mutations never
/// edit a project in place; they produce a new value (see [`crate::document`]),
/// which is what lets [`crate::history::History`] keep whole-document snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub outline: Vec<OutlineNode>,
    #[serde(default)]
    pub characters: Vec<Character>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub task_lists: Vec<TaskList>,
}

impl Project {
    pub fn new(title: impl Into<String>, genre: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            genre: genre.into(),
            description: description.into(),
            ..Default::default()
        }
    }
}

/// Partial update for the project's own details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectInput {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub description: Option<String>,
}

/// Listing entry for stored projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub title: String,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
