use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::types::*;
use super::{ToolError, ToolName};
use crate::document::remap_character_fields;
use crate::editor::Editor;
use crate::models::*;
use crate::outline;

pub(super) fn run(editor: &mut Editor, tool: ToolName, args: &Value) -> Result<ToolOutcome, ToolError> {
    match tool {
        ToolName::AddOutlineSection => add_outline_section(editor, parse(args)?),
        ToolName::UpdateOutlineSection => update_outline_section(editor, parse(args)?),
        ToolName::DeleteOutlineSection => delete_outline_section(editor, parse(args)?),
        ToolName::MoveOutlineSection => move_outline_section(editor, parse(args)?),
        ToolName::ToggleSectionExport => toggle_section_export(editor, parse(args)?),
        ToolName::ToggleCharacterAssociation => toggle_character_association(editor, parse(args)?),
        ToolName::AddCharacter => add_character(editor, parse(args)?, object(args)?),
        ToolName::UpdateCharacter => update_character(editor, parse(args)?, object(args)?),
        ToolName::DeleteCharacter => delete_character(editor, parse(args)?),
        ToolName::AddNote => add_note(editor, parse(args)?),
        ToolName::UpdateNote => update_note(editor, parse(args)?),
        ToolName::DeleteNote => delete_note(editor, parse(args)?),
        ToolName::AddTaskList => add_task_list(editor, parse(args)?),
        ToolName::AddTask => add_task(editor, parse(args)?),
        ToolName::ToggleTask => toggle_task(editor, parse(args)?),
    }
}

/// Character calls only type the name or id. Profile values go through
/// [`remap_character_fields`], which also takes numbers and lists.
#[derive(Debug, Deserialize)]
struct NewCharacter {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CharacterTarget {
    character_id: String,
}

fn parse<T: DeserializeOwned>(args: &Value) -> Result<T, ToolError> {
    serde_json::from_value(args.clone()).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

fn object(args: &Value) -> Result<&Map<String, Value>, ToolError> {
    args.as_object()
        .ok_or_else(|| ToolError::InvalidArguments("expected a JSON object".to_string()))
}

/// Agents sometimes send `""` where they mean "absent".
fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ToolError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ToolError::InvalidArguments(format!("{} must not be empty", field)));
    }
    Ok(trimmed)
}

fn section_title(editor: &Editor, id: &str) -> Result<String, ToolError> {
    editor
        .project()
        .find_section(id)
        .map(|node| node.title.clone())
        .ok_or_else(|| ToolError::not_found("Section", id))
}

fn character_name(editor: &Editor, id: &str) -> Result<String, ToolError> {
    editor
        .project()
        .find_character(id)
        .map(|c| c.name.clone())
        .ok_or_else(|| ToolError::not_found("Character", id))
}

// ============================================================
// Outline
// ============================================================

fn add_outline_section(editor: &mut Editor, req: AddOutlineSectionRequest) -> Result<ToolOutcome, ToolError> {
    let title = required("title", &req.title)?.to_string();
    let parent_id = present(req.parent_id);
    let parent_title = match &parent_id {
        Some(parent_id) => Some(section_title(editor, parent_id)?),
        None => None,
    };

    let node = OutlineNode::new(title.clone(), req.content.unwrap_or_default());
    let id = node.id.clone();
    editor.commit(ToolName::AddOutlineSection.as_str(), |p| {
        p.add_section(parent_id.as_deref(), node)
    });

    let message = match parent_title {
        Some(parent) => format!("Added section '{}' under '{}'", title, parent),
        None => format!("Added top-level section '{}'", title),
    };
    Ok(ToolOutcome::created(message, id))
}

fn update_outline_section(editor: &mut Editor, req: UpdateOutlineSectionRequest) -> Result<ToolOutcome, ToolError> {
    let title = section_title(editor, &req.section_id)?;
    let update = OutlineUpdate {
        title: present(req.new_title),
        content: req.new_content,
        ..Default::default()
    };
    if update.is_empty() {
        return Err(ToolError::InvalidArguments(
            "provide newTitle and/or newContent".to_string(),
        ));
    }

    let changed = editor.commit(ToolName::UpdateOutlineSection.as_str(), |p| {
        p.update_section(&req.section_id, &update)
    });
    Ok(ToolOutcome::success(if changed {
        format!("Updated section '{}'", title)
    } else {
        format!("Section '{}' already had that title and content", title)
    }))
}

fn delete_outline_section(editor: &mut Editor, req: DeleteOutlineSectionRequest) -> Result<ToolOutcome, ToolError> {
    let (title, descendants) = editor
        .project()
        .find_section(&req.section_id)
        .map(|node| (node.title.clone(), outline::count(&node.children)))
        .ok_or_else(|| ToolError::not_found("Section", &req.section_id))?;

    editor.commit(ToolName::DeleteOutlineSection.as_str(), |p| {
        p.delete_section(&req.section_id)
    });

    Ok(ToolOutcome::success(match descendants {
        0 => format!("Deleted section '{}'", title),
        n => format!("Deleted section '{}' and {} subsection(s)", title, n),
    }))
}

fn move_outline_section(editor: &mut Editor, req: MoveOutlineSectionRequest) -> Result<ToolOutcome, ToolError> {
    let target = match (present(req.target_sibling_id), present(req.target_parent_id)) {
        (Some(sibling), _) => match req.position.unwrap_or_default() {
            SiblingPosition::Before => MoveTarget::Before(sibling),
            SiblingPosition::After => MoveTarget::After(sibling),
        },
        (None, Some(parent)) => MoveTarget::Parent(parent),
        (None, None) => MoveTarget::Root,
    };

    let project = editor.project();
    let section = project
        .find_section(&req.section_id)
        .ok_or_else(|| ToolError::not_found("Section", &req.section_id))?;
    let title = section.title.clone();

    if let Some(anchor) = target.anchor() {
        if outline::is_within(section, anchor) {
            tracing::warn!("Rejected move of section {} relative to {}", req.section_id, anchor);
            return Err(ToolError::Rejected(format!(
                "cannot move section '{}' into its own subtree",
                title
            )));
        }
        if project.find_section(anchor).is_none() {
            return Err(ToolError::not_found("Section", anchor));
        }
    }

    let changed = editor.commit(ToolName::MoveOutlineSection.as_str(), |p| {
        p.move_section(&req.section_id, &target)
    });
    Ok(ToolOutcome::success(if changed {
        format!("Moved section '{}'", title)
    } else {
        format!("Section '{}' is already in that position", title)
    }))
}

fn toggle_section_export(editor: &mut Editor, req: ToggleSectionExportRequest) -> Result<ToolOutcome, ToolError> {
    let title = section_title(editor, &req.section_id)?;
    editor.commit(ToolName::ToggleSectionExport.as_str(), |p| {
        p.toggle_section_export(&req.section_id)
    });

    let included = editor
        .project()
        .find_section(&req.section_id)
        .is_some_and(OutlineNode::is_included);
    Ok(ToolOutcome::success(format!(
        "Section '{}' is now {} exports",
        title,
        if included { "included in" } else { "excluded from" }
    )))
}

fn toggle_character_association(
    editor: &mut Editor,
    req: ToggleCharacterAssociationRequest,
) -> Result<ToolOutcome, ToolError> {
    let title = section_title(editor, &req.section_id)?;
    let name = character_name(editor, &req.character_id)?;

    editor.commit(ToolName::ToggleCharacterAssociation.as_str(), |p| {
        p.toggle_section_character(&req.section_id, &req.character_id)
    });

    let linked = editor
        .project()
        .find_section(&req.section_id)
        .is_some_and(|node| node.has_character(&req.character_id));
    Ok(ToolOutcome::success(if linked {
        format!("Linked '{}' to section '{}'", name, title)
    } else {
        format!("Unlinked '{}' from section '{}'", name, title)
    }))
}

// ============================================================
// Characters
// ============================================================

fn add_character(
    editor: &mut Editor,
    req: NewCharacter,
    args: &Map<String, Value>,
) -> Result<ToolOutcome, ToolError> {
    let name = required("name", &req.name)?.to_string();

    let mut character = Character::new(name.clone(), "");
    remap_character_fields(args).apply(&mut character);
    character.name = name.clone();
    let id = character.id.clone();

    editor.commit(ToolName::AddCharacter.as_str(), |p| p.add_character(character));
    Ok(ToolOutcome::created(format!("Added character '{}'", name), id))
}

fn update_character(
    editor: &mut Editor,
    req: CharacterTarget,
    args: &Map<String, Value>,
) -> Result<ToolOutcome, ToolError> {
    let name = character_name(editor, &req.character_id)?;
    let update = remap_character_fields(args);
    if update.is_empty() {
        return Err(ToolError::InvalidArguments(
            "no recognised character fields to update".to_string(),
        ));
    }

    let fields: Vec<&str> = update.fields.keys().map(CharacterField::key).collect();
    let changed = editor.commit(ToolName::UpdateCharacter.as_str(), |p| {
        p.update_character(&req.character_id, &update)
    });

    Ok(ToolOutcome::success(if changed {
        format!("Updated character '{}' ({})", name, fields.join(", "))
    } else {
        format!("Character '{}' already had those values", name)
    }))
}

fn delete_character(editor: &mut Editor, req: DeleteCharacterRequest) -> Result<ToolOutcome, ToolError> {
    let name = character_name(editor, &req.character_id)?;
    let links = count_links(&editor.project().outline, &req.character_id);

    editor.commit(ToolName::DeleteCharacter.as_str(), |p| {
        p.delete_character(&req.character_id)
    });

    Ok(ToolOutcome::success(match links {
        0 => format!("Deleted character '{}'", name),
        n => format!("Deleted character '{}' and unlinked it from {} section(s)", name, n),
    }))
}

fn count_links(forest: &[OutlineNode], character_id: &str) -> usize {
    forest
        .iter()
        .map(|node| usize::from(node.has_character(character_id)) + count_links(&node.children, character_id))
        .sum()
}

// ============================================================
// Notes and task lists
// ============================================================

fn add_note(editor: &mut Editor, req: AddNoteRequest) -> Result<ToolOutcome, ToolError> {
    let title = required("title", &req.title)?.to_string();
    let note = Note::new(title.clone(), req.content.unwrap_or_default());
    let id = note.id.clone();

    editor.commit(ToolName::AddNote.as_str(), |p| p.add_note(note));
    Ok(ToolOutcome::created(format!("Added note '{}'", title), id))
}

fn update_note(editor: &mut Editor, req: UpdateNoteRequest) -> Result<ToolOutcome, ToolError> {
    let title = editor
        .project()
        .find_note(&req.note_id)
        .map(|n| n.title.clone())
        .ok_or_else(|| ToolError::not_found("Note", &req.note_id))?;
    let input = UpdateNoteInput {
        title: present(req.title),
        content: req.content,
    };
    if input.title.is_none() && input.content.is_none() {
        return Err(ToolError::InvalidArguments("provide title and/or content".to_string()));
    }

    editor.commit(ToolName::UpdateNote.as_str(), |p| p.update_note(&req.note_id, &input));
    Ok(ToolOutcome::success(format!("Updated note '{}'", title)))
}

fn delete_note(editor: &mut Editor, req: DeleteNoteRequest) -> Result<ToolOutcome, ToolError> {
    let title = editor
        .project()
        .find_note(&req.note_id)
        .map(|n| n.title.clone())
        .ok_or_else(|| ToolError::not_found("Note", &req.note_id))?;

    editor.commit(ToolName::DeleteNote.as_str(), |p| p.delete_note(&req.note_id));
    Ok(ToolOutcome::success(format!("Deleted note '{}'", title)))
}

fn add_task_list(editor: &mut Editor, req: AddTaskListRequest) -> Result<ToolOutcome, ToolError> {
    let title = required("title", &req.title)?.to_string();
    let mut list = TaskList::new(title.clone());
    list.tasks = req
        .tasks
        .iter()
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .map(Task::new)
        .collect();
    let id = list.id.clone();
    let count = list.tasks.len();

    editor.commit(ToolName::AddTaskList.as_str(), |p| p.add_task_list(list));
    Ok(ToolOutcome::created(
        format!("Added task list '{}' with {} task(s)", title, count),
        id,
    ))
}

fn add_task(editor: &mut Editor, req: AddTaskRequest) -> Result<ToolOutcome, ToolError> {
    let text = required("text", &req.text)?.to_string();
    let list_title = editor
        .project()
        .find_task_list(&req.task_list_id)
        .map(|l| l.title.clone())
        .ok_or_else(|| ToolError::not_found("Task list", &req.task_list_id))?;

    let task = Task::new(text.clone());
    let id = task.id.clone();
    editor.commit(ToolName::AddTask.as_str(), |p| p.add_task(&req.task_list_id, task));
    Ok(ToolOutcome::created(
        format!("Added task '{}' to '{}'", text, list_title),
        id,
    ))
}

fn toggle_task(editor: &mut Editor, req: ToggleTaskRequest) -> Result<ToolOutcome, ToolError> {
    let list = editor
        .project()
        .find_task_list(&req.task_list_id)
        .ok_or_else(|| ToolError::not_found("Task list", &req.task_list_id))?;
    let text = list
        .tasks
        .iter()
        .find(|t| t.id == req.task_id)
        .map(|t| t.text.clone())
        .ok_or_else(|| ToolError::not_found("Task", &req.task_id))?;

    editor.commit(ToolName::ToggleTask.as_str(), |p| {
        p.toggle_task(&req.task_list_id, &req.task_id)
    });

    let done = editor
        .project()
        .find_task_list(&req.task_list_id)
        .and_then(|l| l.tasks.iter().find(|t| t.id == req.task_id))
        .is_some_and(|t| t.completed);
    Ok(ToolOutcome::success(format!(
        "Marked '{}' as {}",
        text,
        if done { "done" } else { "not done" }
    )))
}
