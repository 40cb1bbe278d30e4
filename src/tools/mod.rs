//! The fixed registry of document tools an agent may call.
//!
//! Each tool name maps to one handler. A handler validates its arguments,
//! checks that the ids it addresses exist, commits exactly one mutation
//! through the [`Editor`], and reports a [`ToolOutcome`]. Failures of any kind
//! (unknown tool, malformed arguments, missing target, rejected move) become
//! `ToolOutcome { success: false, .. }`; nothing here panics or propagates an
//! error to the caller, so one bad call never aborts a batch.

mod handlers;
mod types;

pub use types::*;

use std::str::FromStr;

use schemars::{schema_for, JsonSchema};
use serde_json::Value;
use thiserror::Error;

use crate::editor::Editor;

/// Tool names, exactly as the agent must spell them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    AddOutlineSection,
    UpdateOutlineSection,
    DeleteOutlineSection,
    MoveOutlineSection,
    ToggleSectionExport,
    ToggleCharacterAssociation,
    AddCharacter,
    UpdateCharacter,
    DeleteCharacter,
    AddNote,
    UpdateNote,
    DeleteNote,
    AddTaskList,
    AddTask,
    ToggleTask,
}

impl ToolName {
    pub const ALL: [ToolName; 15] = [
        Self::AddOutlineSection,
        Self::UpdateOutlineSection,
        Self::DeleteOutlineSection,
        Self::MoveOutlineSection,
        Self::ToggleSectionExport,
        Self::ToggleCharacterAssociation,
        Self::AddCharacter,
        Self::UpdateCharacter,
        Self::DeleteCharacter,
        Self::AddNote,
        Self::UpdateNote,
        Self::DeleteNote,
        Self::AddTaskList,
        Self::AddTask,
        Self::ToggleTask,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddOutlineSection => "addOutlineSection",
            Self::UpdateOutlineSection => "updateOutlineSection",
            Self::DeleteOutlineSection => "deleteOutlineSection",
            Self::MoveOutlineSection => "moveOutlineSection",
            Self::ToggleSectionExport => "toggleSectionExport",
            Self::ToggleCharacterAssociation => "toggleCharacterAssociation",
            Self::AddCharacter => "addCharacter",
            Self::UpdateCharacter => "updateCharacter",
            Self::DeleteCharacter => "deleteCharacter",
            Self::AddNote => "addNote",
            Self::UpdateNote => "updateNote",
            Self::DeleteNote => "deleteNote",
            Self::AddTaskList => "addTaskList",
            Self::AddTask => "addTask",
            Self::ToggleTask => "toggleTask",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::AddOutlineSection => "Add a section to the outline. Give parentId to nest it under an existing section; omit it for a top-level section. Returns the new section's id.",
            Self::UpdateOutlineSection => "Change the title and/or body text of an outline section. Fields you omit are left unchanged.",
            Self::DeleteOutlineSection => "Delete an outline section and all of its subsections.",
            Self::MoveOutlineSection => "Move a section (with its subsections). Use targetParentId to make it the last child of another section, or targetSiblingId with position 'before'/'after' to place it next to a sibling. With neither, the section becomes top-level. A section cannot be moved into its own subtree.",
            Self::ToggleSectionExport => "Include or exclude a section (and its subsections) from manuscript exports.",
            Self::ToggleCharacterAssociation => "Link a character to a section, or unlink it if already linked.",
            Self::AddCharacter => "Add a character to the roster with a name, description and any profile fields (role, appearance, personality, motivation, backstory, goals, fears, strengths, weaknesses, relationships, arc, voice). Returns the new character's id.",
            Self::UpdateCharacter => "Update fields of a character. Pass fields directly (e.g. \"motivation\": \"...\") or as a 'field'/'value' pair. Unrecognised field names are ignored.",
            Self::DeleteCharacter => "Delete a character and unlink it from every section.",
            Self::AddNote => "Add a free-form note. Returns the new note's id.",
            Self::UpdateNote => "Change a note's title and/or content.",
            Self::DeleteNote => "Delete a note.",
            Self::AddTaskList => "Create a task list, optionally with initial tasks. Returns the new list's id.",
            Self::AddTask => "Append a task to a task list.",
            Self::ToggleTask => "Mark a task as done, or as not done if it already is.",
        }
    }

    fn parameters(&self) -> Value {
        match self {
            Self::AddOutlineSection => schema_value::<AddOutlineSectionRequest>(),
            Self::UpdateOutlineSection => schema_value::<UpdateOutlineSectionRequest>(),
            Self::DeleteOutlineSection => schema_value::<DeleteOutlineSectionRequest>(),
            Self::MoveOutlineSection => schema_value::<MoveOutlineSectionRequest>(),
            Self::ToggleSectionExport => schema_value::<ToggleSectionExportRequest>(),
            Self::ToggleCharacterAssociation => schema_value::<ToggleCharacterAssociationRequest>(),
            Self::AddCharacter => schema_value::<AddCharacterRequest>(),
            Self::UpdateCharacter => schema_value::<UpdateCharacterRequest>(),
            Self::DeleteCharacter => schema_value::<DeleteCharacterRequest>(),
            Self::AddNote => schema_value::<AddNoteRequest>(),
            Self::UpdateNote => schema_value::<UpdateNoteRequest>(),
            Self::DeleteNote => schema_value::<DeleteNoteRequest>(),
            Self::AddTaskList => schema_value::<AddTaskListRequest>(),
            Self::AddTask => schema_value::<AddTaskRequest>(),
            Self::ToggleTask => schema_value::<ToggleTaskRequest>(),
        }
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| ToolError::UnknownTool(s.to_string()))
    }
}

fn schema_value<T: JsonSchema>() -> Value {
    serde_json::to_value(schema_for!(T)).unwrap_or(Value::Null)
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Rejected: {0}")]
    Rejected(String),
}

impl ToolError {
    pub(crate) fn not_found(kind: &'static str, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Every tool, with its description and argument schema.
pub fn definitions() -> Vec<ToolDefinition> {
    ToolName::ALL
        .iter()
        .map(|tool| ToolDefinition {
            name: tool.as_str().to_string(),
            description: tool.description().to_string(),
            parameters: tool.parameters(),
        })
        .collect()
}

/// Run the named tool against the editor's project.
pub fn execute(editor: &mut Editor, name: &str, arguments: &Value) -> ToolOutcome {
    tracing::info!("Executing tool {} with args: {}", name, arguments);

    let result = name
        .parse::<ToolName>()
        .and_then(|tool| handlers::run(editor, tool, arguments));

    match result {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::warn!("Tool {} failed: {}", name, e);
            ToolOutcome::failure(e.to_string())
        }
    }
}

/// Like [`execute`], for arguments still encoded as a JSON string.
///
/// An empty string is treated as `{}`.
pub fn execute_json(editor: &mut Editor, name: &str, arguments_json: &str) -> ToolOutcome {
    let trimmed = arguments_json.trim();
    if trimmed.is_empty() {
        return execute(editor, name, &Value::Object(Default::default()));
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(arguments) => execute(editor, name, &arguments),
        Err(e) => {
            tracing::warn!("Tool {} sent unparsable arguments: {}", name, e);
            ToolOutcome::failure(format!("Invalid arguments: {}", e))
        }
    }
}
