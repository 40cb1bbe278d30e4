//! Whole-project backup and restore.
//!
//! A backup is the complete project wrapped in a small envelope. Import
//! accepts either the envelope or a bare project document, checks that every
//! entry carries an id and a title (or a name, for characters), and then
//! either replaces the open document or merges the new entries into it. Both
//! modes go through the editor's history, so an import can be undone.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::editor::Editor;
use crate::models::*;
use crate::outline;

pub const BACKUP_FORMAT: &str = "plotline-backup";
pub const BACKUP_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub format: String,
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub project: Project,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Backup is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported backup format: {0}")]
    UnsupportedFormat(String),

    #[error("Unsupported backup version {0}")]
    UnsupportedVersion(u32),

    #[error("Invalid backup at {path}: {reason}")]
    Invalid { path: String, reason: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    #[default]
    Replace,
    Merge,
}

impl FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replace" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            other => Err(format!("Unknown import mode: {}", other)),
        }
    }
}

/// Counts of what an import brought in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub sections: usize,
    pub characters: usize,
    pub notes: usize,
    pub task_lists: usize,
    /// Entries left out of a merge because their id was already taken.
    pub skipped: usize,
}

pub fn export(project: &Project) -> Backup {
    Backup {
        format: BACKUP_FORMAT.to_string(),
        version: BACKUP_VERSION,
        exported_at: Utc::now(),
        project: project.clone(),
    }
}

pub fn export_json(project: &Project) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&export(project))
}

/// Parse and validate a backup or bare project document.
pub fn parse(text: &str) -> Result<Project, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    let document = match value {
        Value::Object(mut envelope) if envelope.contains_key("project") => {
            check_envelope(&envelope)?;
            envelope.remove("project").unwrap_or_default()
        }
        other => other,
    };

    validate(&document)?;
    Ok(serde_json::from_value(document)?)
}

fn check_envelope(envelope: &Map<String, Value>) -> Result<(), ImportError> {
    if let Some(format) = envelope.get("format").and_then(Value::as_str) {
        if format != BACKUP_FORMAT {
            return Err(ImportError::UnsupportedFormat(format.to_string()));
        }
    }
    if let Some(version) = envelope.get("version").and_then(Value::as_u64) {
        if version > u64::from(BACKUP_VERSION) {
            return Err(ImportError::UnsupportedVersion(version.try_into().unwrap_or(u32::MAX)));
        }
    }
    Ok(())
}

/// Every entry needs an id and a title (or name); section ids must be unique.
fn validate(document: &Value) -> Result<(), ImportError> {
    let project = document.as_object().ok_or_else(|| invalid("project", "expected an object"))?;
    require_string(project, "id", "project")?;

    let mut seen = HashSet::new();
    for (i, node) in entries(project, "outline")?.iter().enumerate() {
        validate_section(node, &format!("outline[{}]", i), &mut seen)?;
    }
    for (collection, label) in [("characters", "name"), ("notes", "title"), ("taskLists", "title")] {
        for (i, entry) in entries(project, collection)?.iter().enumerate() {
            let path = format!("{}[{}]", collection, i);
            let entry = entry.as_object().ok_or_else(|| invalid(&path, "expected an object"))?;
            require_string(entry, "id", &path)?;
            require_string(entry, label, &path)?;
        }
    }
    Ok(())
}

fn validate_section(node: &Value, path: &str, seen: &mut HashSet<String>) -> Result<(), ImportError> {
    let node = node.as_object().ok_or_else(|| invalid(path, "expected an object"))?;
    let id = require_string(node, "id", path)?;
    require_string(node, "title", path)?;
    if !seen.insert(id.to_string()) {
        return Err(invalid(path, &format!("duplicate section id '{}'", id)));
    }
    for (i, child) in entries(node, "children")?.iter().enumerate() {
        validate_section(child, &format!("{}.children[{}]", path, i), seen)?;
    }
    Ok(())
}

fn entries<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a [Value], ImportError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(invalid(key, "expected an array")),
    }
}

fn require_string<'a>(object: &'a Map<String, Value>, key: &str, path: &str) -> Result<&'a str, ImportError> {
    match object.get(key).and_then(Value::as_str) {
        Some(value) if !(key == "id" && value.trim().is_empty()) => Ok(value),
        _ => Err(invalid(path, &format!("missing {}", key))),
    }
}

fn invalid(path: &str, reason: &str) -> ImportError {
    tracing::warn!("Rejected backup: {} at {}", reason, path);
    ImportError::Invalid {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

/// Append the entries of `incoming` whose ids `current` does not use.
///
/// An outline root is skipped whole if any id in its subtree is taken.
pub fn merge(current: &Project, incoming: Project) -> (Project, ImportSummary) {
    let mut next = current.clone();
    let mut summary = ImportSummary::default();

    let mut section_ids: HashSet<String> = outline::ids(&current.outline).into_iter().collect();
    for root in incoming.outline {
        let subtree = outline::ids(std::slice::from_ref(&root));
        if subtree.iter().any(|id| section_ids.contains(id)) {
            summary.skipped += 1;
            continue;
        }
        summary.sections += subtree.len();
        section_ids.extend(subtree);
        next.outline.push(root);
    }

    summary.characters = append_new(&mut next.characters, incoming.characters, |c| &c.id, &mut summary.skipped);
    summary.notes = append_new(&mut next.notes, incoming.notes, |n| &n.id, &mut summary.skipped);
    summary.task_lists = append_new(&mut next.task_lists, incoming.task_lists, |l| &l.id, &mut summary.skipped);

    (next, summary)
}

fn append_new<T>(target: &mut Vec<T>, incoming: Vec<T>, id: impl Fn(&T) -> &String, skipped: &mut usize) -> usize {
    let mut taken: HashSet<String> = target.iter().map(|item| id(item).clone()).collect();
    let mut added = 0;
    for item in incoming {
        if taken.insert(id(&item).clone()) {
            target.push(item);
            added += 1;
        } else {
            *skipped += 1;
        }
    }
    added
}

fn summarize(project: &Project) -> ImportSummary {
    ImportSummary {
        sections: outline::count(&project.outline),
        characters: project.characters.len(),
        notes: project.notes.len(),
        task_lists: project.task_lists.len(),
        skipped: 0,
    }
}

/// Import `text` into the open project as one undoable change.
///
/// Replacing keeps the open project's id, so the restored document is saved
/// in place.
pub fn import_into(editor: &mut Editor, text: &str, mode: ImportMode) -> Result<ImportSummary, ImportError> {
    let incoming = parse(text)?;

    let summary = match mode {
        ImportMode::Replace => {
            let summary = summarize(&incoming);
            editor.commit("import (replace)", |current| Project {
                id: current.id.clone(),
                ..incoming
            });
            summary
        }
        ImportMode::Merge => {
            let (next, summary) = merge(editor.project(), incoming);
            editor.commit("import (merge)", |_| next);
            summary
        }
    };

    tracing::info!(
        "Imported {} section(s), {} character(s), {} note(s), {} task list(s) ({} skipped)",
        summary.sections,
        summary.characters,
        summary.notes,
        summary.task_lists,
        summary.skipped
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Project {
        let mut project = Project::new("Saltmarsh", "Mystery", "A drowned village");
        project.outline.push(
            OutlineNode::with_id("act1", "Act I", "")
                .with_children(vec![OutlineNode::with_id("ch1", "Chapter 1", "Fog")]),
        );
        project.characters.push(Character {
            id: "ada".to_string(),
            ..Character::new("Ada", "Detective")
        });
        project.notes.push(Note {
            id: "n1".to_string(),
            ..Note::new("Tides", "")
        });
        project
    }

    #[test]
    fn export_then_parse_is_lossless() {
        let project = sample();
        let json = export_json(&project).unwrap();
        assert_eq!(parse(&json).unwrap(), project);
    }

    #[test]
    fn bare_project_documents_are_accepted() {
        let project = sample();
        let json = serde_json::to_string(&project).unwrap();
        assert_eq!(parse(&json).unwrap(), project);
    }

    #[test]
    fn entries_without_ids_are_rejected() {
        let json = r#"{"id": "p1", "title": "X", "outline": [{"title": "No id"}]}"#;
        assert!(matches!(parse(json), Err(ImportError::Invalid { ref path, .. }) if path == "outline[0]"));
    }

    #[test]
    fn nameless_characters_are_rejected() {
        let json = r#"{"id": "p1", "characters": [{"id": "c1", "description": "?"}]}"#;
        assert!(matches!(parse(json), Err(ImportError::Invalid { .. })));
    }

    #[test]
    fn nested_duplicate_section_ids_are_rejected() {
        let json = r#"{"id": "p1", "outline": [
            {"id": "a", "title": "A", "children": [{"id": "a", "title": "Again"}]}
        ]}"#;
        assert!(matches!(parse(json), Err(ImportError::Invalid { .. })));
    }

    #[test]
    fn foreign_formats_are_rejected() {
        let json = r#"{"format": "something-else", "project": {"id": "p1"}}"#;
        assert!(matches!(parse(json), Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn newer_versions_are_rejected() {
        let json = r#"{"format": "plotline-backup", "version": 9, "project": {"id": "p1"}}"#;
        assert!(matches!(parse(json), Err(ImportError::UnsupportedVersion(9))));
    }

    #[test]
    fn merge_skips_taken_ids() {
        let current = sample();
        let mut incoming = sample();
        incoming.outline.push(OutlineNode::with_id("act2", "Act II", ""));
        incoming.characters.push(Character {
            id: "bo".to_string(),
            ..Character::new("Bo", "")
        });

        let (merged, summary) = merge(&current, incoming);

        assert_eq!(merged.outline.len(), 2);
        assert_eq!(merged.characters.len(), 2);
        assert_eq!(merged.notes.len(), 1);
        assert_eq!(summary.sections, 1);
        assert_eq!(summary.characters, 1);
        assert_eq!(summary.skipped, 3);
    }

    #[test]
    fn merge_skips_roots_whose_subtree_collides() {
        let current = sample();
        let mut incoming = Project::new("Other", "", "");
        incoming.outline.push(
            OutlineNode::with_id("fresh", "Fresh", "")
                .with_children(vec![OutlineNode::with_id("ch1", "Clash", "")]),
        );

        let (merged, summary) = merge(&current, incoming);

        assert_eq!(merged.outline, current.outline);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn replace_import_is_undoable_and_keeps_the_project_id() {
        let mut editor = Editor::new(Project::new("Open", "", ""));
        let open_id = editor.project().id.clone();
        let json = export_json(&sample()).unwrap();

        let summary = import_into(&mut editor, &json, ImportMode::Replace).unwrap();

        assert_eq!(summary.sections, 2);
        assert_eq!(editor.project().id, open_id);
        assert_eq!(editor.project().title, "Saltmarsh");
        assert!(editor.undo());
        assert_eq!(editor.project().title, "Open");
    }

    #[test]
    fn import_modes_parse() {
        assert_eq!("merge".parse::<ImportMode>(), Ok(ImportMode::Merge));
        assert_eq!("replace".parse::<ImportMode>(), Ok(ImportMode::Replace));
        assert!("append".parse::<ImportMode>().is_err());
    }
}
