use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::autosave::SaveReport;
use crate::backup::{self, Backup, ImportMode, ImportSummary};
use crate::editor;
use crate::history::HistoryStatus;
use crate::manuscript::{self, ManuscriptOptions};
use crate::models::*;
use crate::outline;
use crate::selection::SelectedItem;
use crate::tools::{self, ToolDefinition, ToolName, ToolOutcome};

type ApiError = (StatusCode, String);

fn bad_request(e: impl std::fmt::Display) -> ApiError {
    let msg = e.to_string();
    tracing::warn!("Rejected request: {}", msg);
    (StatusCode::BAD_REQUEST, msg)
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Project
// ============================================================

pub async fn get_project(State(state): State<AppState>) -> Json<Project> {
    Json(editor::lock(&state.editor).project().clone())
}

pub async fn update_project(
    State(state): State<AppState>,
    Json(input): Json<UpdateProjectInput>,
) -> Json<Project> {
    let mut editor = editor::lock(&state.editor);
    editor.commit("update project details", |p| p.update_details(&input));
    Json(editor.project().clone())
}

#[derive(Debug, Default, Deserialize)]
pub struct TreeQuery {
    #[serde(default)]
    pub ids: bool,
}

pub async fn get_tree(State(state): State<AppState>, Query(query): Query<TreeQuery>) -> impl IntoResponse {
    let tree = outline::render_tree(&editor::lock(&state.editor).project().outline, query.ids);
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], tree)
}

#[derive(Debug, Default, Deserialize)]
pub struct ManuscriptQuery {
    pub characters: Option<bool>,
    pub notes: Option<bool>,
}

pub async fn get_manuscript(
    State(state): State<AppState>,
    Query(query): Query<ManuscriptQuery>,
) -> impl IntoResponse {
    let defaults = ManuscriptOptions::default();
    let options = ManuscriptOptions {
        include_characters: query.characters.unwrap_or(defaults.include_characters),
        include_notes: query.notes.unwrap_or(defaults.include_notes),
    };
    let text = manuscript::render_with(&editor::lock(&state.editor).snapshot(), options);
    ([(header::CONTENT_TYPE, "text/markdown; charset=utf-8")], text)
}

pub async fn export_project(State(state): State<AppState>) -> Json<Backup> {
    Json(backup::export(editor::lock(&state.editor).project()))
}

#[derive(Debug, Default, Deserialize)]
pub struct ImportQuery {
    #[serde(default)]
    pub mode: ImportMode,
}

pub async fn import_project(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    body: String,
) -> Result<Json<ImportSummary>, ApiError> {
    let mut editor = editor::lock(&state.editor);
    backup::import_into(&mut editor, &body, query.mode)
        .map(Json)
        .map_err(bad_request)
}

pub async fn get_save_status(State(state): State<AppState>) -> Json<Option<SaveReport>> {
    Json(state.save_status.as_ref().map(|status| status.borrow().clone()))
}

// ============================================================
// Tools
// ============================================================

pub async fn list_tools() -> Json<Vec<ToolDefinition>> {
    Json(tools::definitions())
}

pub async fn run_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: String,
) -> Result<Json<ToolOutcome>, ApiError> {
    if name.parse::<ToolName>().is_err() {
        return Err((StatusCode::NOT_FOUND, format!("Unknown tool: {}", name)));
    }
    let mut editor = editor::lock(&state.editor);
    Ok(Json(tools::execute_json(&mut editor, &name, &body)))
}

// ============================================================
// History
// ============================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryChange {
    pub changed: bool,
    pub history: HistoryStatus,
}

pub async fn get_history(State(state): State<AppState>) -> Json<HistoryStatus> {
    Json(editor::lock(&state.editor).history_status())
}

pub async fn undo(State(state): State<AppState>) -> Json<HistoryChange> {
    let mut editor = editor::lock(&state.editor);
    let changed = editor.undo();
    Json(HistoryChange {
        changed,
        history: editor.history_status(),
    })
}

pub async fn redo(State(state): State<AppState>) -> Json<HistoryChange> {
    let mut editor = editor::lock(&state.editor);
    let changed = editor.redo();
    Json(HistoryChange {
        changed,
        history: editor.history_status(),
    })
}

// ============================================================
// Selection
// ============================================================

pub async fn get_selection(State(state): State<AppState>) -> Json<Option<SelectedItem>> {
    Json(editor::lock(&state.editor).selection().cloned())
}

pub async fn select(
    State(state): State<AppState>,
    Json(item): Json<ItemRef>,
) -> Result<Json<SelectedItem>, ApiError> {
    let mut editor = editor::lock(&state.editor);
    if !editor.select(&item) {
        return Err((
            StatusCode::NOT_FOUND,
            format!("No {} with id {}", item.kind.as_str(), item.id),
        ));
    }
    editor
        .selection()
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Selection not found".to_string()))
}

pub async fn clear_selection(State(state): State<AppState>) -> StatusCode {
    editor::lock(&state.editor).clear_selection();
    StatusCode::NO_CONTENT
}
