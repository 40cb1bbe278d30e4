//! Argument types for the document tools.
//!
//! Field names are the wire contract the agent is told about (camelCase).
//! Each type derives `JsonSchema`, which is what the agent sees as the tool's
//! parameter schema.

use rmcp::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================
// Outline
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddOutlineSectionRequest {
    #[schemars(description = "Id of the section to nest under. Omit to add a top-level section")]
    #[serde(default)]
    pub parent_id: Option<String>,
    #[schemars(description = "Section title, e.g. 'Chapter 3: The Crossing'")]
    pub title: String,
    #[schemars(description = "Section body text (summary, beats, or prose)")]
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutlineSectionRequest {
    #[schemars(description = "Id of the section to update")]
    pub section_id: String,
    #[schemars(description = "Replacement title")]
    #[serde(default)]
    pub new_title: Option<String>,
    #[schemars(description = "Replacement body text")]
    #[serde(default)]
    pub new_content: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutlineSectionRequest {
    #[schemars(description = "Id of the section to delete, together with all of its subsections")]
    pub section_id: String,
}

/// Side of the sibling a moved section lands on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SiblingPosition {
    Before,
    #[default]
    After,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MoveOutlineSectionRequest {
    #[schemars(description = "Id of the section to move (its subsections move with it)")]
    pub section_id: String,
    #[schemars(description = "Make the section the last child of this section")]
    #[serde(default)]
    pub target_parent_id: Option<String>,
    #[schemars(description = "Place the section next to this sibling. Takes precedence over targetParentId")]
    #[serde(default)]
    pub target_sibling_id: Option<String>,
    #[schemars(description = "'before' or 'after' the sibling. Defaults to 'after'")]
    #[serde(default)]
    pub position: Option<SiblingPosition>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSectionExportRequest {
    #[schemars(description = "Id of the section to include in or exclude from exports")]
    pub section_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleCharacterAssociationRequest {
    #[schemars(description = "Id of the section")]
    pub section_id: String,
    #[schemars(description = "Id of the character to link to, or unlink from, the section")]
    pub character_id: String,
}

// ============================================================
// Characters
// ============================================================

/// Optional narrative-profile fields shared by character tools.
///
/// This is the advertised shape. Handlers read the values through the
/// character field remapping, so numbers and lists are accepted as well.
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProfileArgs {
    #[schemars(description = "Narrative role, e.g. protagonist, mentor, antagonist")]
    pub role: Option<String>,
    pub age: Option<String>,
    #[schemars(description = "Physical appearance")]
    pub appearance: Option<String>,
    pub personality: Option<String>,
    #[schemars(description = "What drives the character")]
    pub motivation: Option<String>,
    #[schemars(description = "History before the story begins")]
    pub backstory: Option<String>,
    pub goals: Option<String>,
    pub fears: Option<String>,
    pub strengths: Option<String>,
    pub weaknesses: Option<String>,
    #[schemars(description = "Ties to other characters")]
    pub relationships: Option<String>,
    #[schemars(description = "How the character changes over the story")]
    pub arc: Option<String>,
    #[schemars(description = "Speech patterns and dialogue style")]
    pub voice: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCharacterRequest {
    #[schemars(description = "Character name")]
    pub name: String,
    #[schemars(description = "Short description of who the character is")]
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub profile: CharacterProfileArgs,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCharacterRequest {
    #[schemars(description = "Id of the character to update")]
    pub character_id: String,
    #[schemars(description = "Name of a single field to change, used together with 'value'")]
    #[serde(default)]
    pub field: Option<String>,
    #[schemars(description = "New text for 'field'")]
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub profile: CharacterProfileArgs,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCharacterRequest {
    #[schemars(description = "Id of the character to delete. Also unlinks it from every section")]
    pub character_id: String,
}

// ============================================================
// Notes and task lists
// ============================================================

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddNoteRequest {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    #[schemars(description = "Id of the note to update")]
    pub note_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteNoteRequest {
    #[schemars(description = "Id of the note to delete")]
    pub note_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddTaskListRequest {
    pub title: String,
    #[schemars(description = "Initial task texts, in order")]
    #[serde(default)]
    pub tasks: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddTaskRequest {
    #[schemars(description = "Id of the task list to append to")]
    pub task_list_id: String,
    pub text: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToggleTaskRequest {
    pub task_list_id: String,
    #[schemars(description = "Id of the task to mark done or not done")]
    pub task_id: String,
}

// ============================================================
// Results
// ============================================================

/// What every tool reports back, success or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutcome {
    pub success: bool,
    pub message: String,
    /// Id of the item the tool created, so follow-up calls can address it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl ToolOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            id: None,
        }
    }

    pub fn created(message: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            id: Some(id.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            id: None,
        }
    }
}

/// A tool as advertised to the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: serde_json::Value,
}
