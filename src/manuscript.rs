//! Markdown compilation of a project.
//!
//! Sections become headings by depth. A section excluded from export drops
//! its whole subtree. Character sheets list each non-empty field the
//! character's export map does not switch off.

use std::fmt::Write;

use crate::models::*;

#[derive(Debug, Clone, Copy)]
pub struct ManuscriptOptions {
    pub include_characters: bool,
    pub include_notes: bool,
}

impl Default for ManuscriptOptions {
    fn default() -> Self {
        Self {
            include_characters: true,
            include_notes: false,
        }
    }
}

pub fn render(project: &Project) -> String {
    render_with(project, ManuscriptOptions::default())
}

pub fn render_with(project: &Project, options: ManuscriptOptions) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", project.title);
    if !project.genre.is_empty() {
        let _ = writeln!(out, "\n_{}_", project.genre);
    }
    if !project.description.is_empty() {
        let _ = writeln!(out, "\n{}", project.description);
    }

    for node in &project.outline {
        write_section(&mut out, node, 2);
    }

    let characters: Vec<&Character> = project.characters.iter().filter(|c| has_exported_fields(c)).collect();
    if options.include_characters && !characters.is_empty() {
        let _ = writeln!(out, "\n## Characters");
        for character in characters {
            write_character(&mut out, character);
        }
    }

    if options.include_notes && !project.notes.is_empty() {
        let _ = writeln!(out, "\n## Notes");
        for note in &project.notes {
            let _ = writeln!(out, "\n### {}", note.title);
            if !note.content.trim().is_empty() {
                let _ = writeln!(out, "\n{}", note.content.trim());
            }
        }
    }

    out
}

fn write_section(out: &mut String, node: &OutlineNode, depth: usize) {
    if !node.is_included() {
        return;
    }
    let _ = writeln!(out, "\n{} {}", "#".repeat(depth.min(6)), node.title);
    if !node.content.trim().is_empty() {
        let _ = writeln!(out, "\n{}", node.content.trim());
    }
    for child in &node.children {
        write_section(out, child, depth + 1);
    }
}

fn exported_fields<'a>(character: &'a Character) -> impl Iterator<Item = (CharacterField, &'a str)> + 'a {
    CharacterField::ALL
        .into_iter()
        .filter(|field| character.exports(field.key()))
        .filter_map(|field| {
            character
                .field(field)
                .filter(|value| !value.trim().is_empty())
                .map(|value| (field, value))
        })
}

fn has_exported_fields(character: &Character) -> bool {
    exported_fields(character).next().is_some()
}

fn write_character(out: &mut String, character: &Character) {
    let heading = if character.exports(CharacterField::Name.key()) && !character.name.is_empty() {
        character.name.as_str()
    } else {
        "Unnamed character"
    };
    let _ = writeln!(out, "\n### {}\n", heading);

    for (field, value) in exported_fields(character) {
        match field {
            CharacterField::Name => {}
            CharacterField::Description => {
                let _ = writeln!(out, "{}\n", value.trim());
            }
            _ => {
                let _ = writeln!(out, "- **{}:** {}", field.label(), value.trim());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        let mut project = Project::new("Saltmarsh", "Mystery", "");
        let mut cut = OutlineNode::with_id("cut", "Deleted Scene", "Never mind");
        cut.include_in_export = Some(false);
        project.outline.push(
            OutlineNode::with_id("act1", "Act I", "").with_children(vec![
                OutlineNode::with_id("ch1", "Chapter 1", "Fog rolls in."),
                cut.with_children(vec![OutlineNode::with_id("inner", "Inner", "Hidden too")]),
            ]),
        );
        project
    }

    #[test]
    fn headings_follow_depth() {
        let text = render(&project());
        assert!(text.starts_with("# Saltmarsh\n"));
        assert!(text.contains("\n## Act I\n"));
        assert!(text.contains("\n### Chapter 1\n\nFog rolls in.\n"));
    }

    #[test]
    fn excluded_sections_drop_their_subtree() {
        let text = render(&project());
        assert!(!text.contains("Deleted Scene"));
        assert!(!text.contains("Inner"));
    }

    #[test]
    fn character_fields_respect_the_export_map() {
        let mut project = project();
        let mut ada = Character::new("Ada", "A detective");
        ada.motivation = Some("Find her brother".to_string());
        ada.backstory = Some("Secret".to_string());
        ada.export_fields = Some([("backstory".to_string(), false)].into_iter().collect());
        project.characters.push(ada);

        let text = render(&project);

        assert!(text.contains("\n## Characters\n"));
        assert!(text.contains("\n### Ada\n"));
        assert!(text.contains("- **Motivation:** Find her brother"));
        assert!(!text.contains("Secret"));
    }

    #[test]
    fn notes_are_opt_in() {
        let mut project = project();
        project.notes.push(Note::new("Tides", "High at dawn"));

        assert!(!render(&project).contains("Tides"));
        let text = render_with(
            &project,
            ManuscriptOptions {
                include_notes: true,
                ..Default::default()
            },
        );
        assert!(text.contains("\n## Notes\n\n### Tides\n\nHigh at dawn\n"));
    }
}
