//! What the assistant is told about the open project on every round-trip.

use serde::Serialize;

use crate::models::*;
use crate::outline;
use crate::selection::SelectedItem;

pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a writing partner helping an author plan a novel. You can read the \
project context below and change the project only through the tools you are \
given. Refer to sections, characters, notes and task lists by the ids shown \
in the context. When you add something, use the id returned by the tool for \
any follow-up call. Keep replies short and concrete, and tell the author what \
you changed.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContext<'a> {
    pub title: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    pub genre: &'a str,
    #[serde(skip_serializing_if = "is_blank")]
    pub description: &'a str,
    pub outline: Vec<SectionSummary<'a>>,
    /// The outline as an indented tree, ids in brackets.
    pub outline_tree: String,
    pub characters: Vec<CharacterSummary<'a>>,
    pub notes: Vec<NoteSummary<'a>>,
    pub task_lists: Vec<TaskListSummary<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<&'a SelectedItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionSummary<'a> {
    pub id: &'a str,
    pub title: &'a str,
    #[serde(skip_serializing_if = "is_true")]
    pub included: bool,
    #[serde(skip_serializing_if = "no_links")]
    pub character_ids: &'a [String],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SectionSummary<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSummary<'a> {
    pub id: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'a str>,
    #[serde(skip_serializing_if = "is_blank")]
    pub description: &'a str,
}

#[derive(Debug, Serialize)]
pub struct NoteSummary<'a> {
    pub id: &'a str,
    pub title: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListSummary<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub tasks: &'a [Task],
}

fn is_true(value: &bool) -> bool {
    *value
}

fn is_blank(value: &&str) -> bool {
    value.is_empty()
}

fn no_links(ids: &&[String]) -> bool {
    ids.is_empty()
}

impl<'a> ProjectContext<'a> {
    pub fn build(project: &'a Project, selected: Option<&'a SelectedItem>) -> Self {
        Self {
            title: &project.title,
            genre: &project.genre,
            description: &project.description,
            outline: project.outline.iter().map(SectionSummary::from).collect(),
            outline_tree: outline::render_tree(&project.outline, true),
            characters: project
                .characters
                .iter()
                .map(|c| CharacterSummary {
                    id: &c.id,
                    name: &c.name,
                    role: c.role.as_deref(),
                    description: &c.description,
                })
                .collect(),
            notes: project
                .notes
                .iter()
                .map(|n| NoteSummary {
                    id: &n.id,
                    title: &n.title,
                })
                .collect(),
            task_lists: project
                .task_lists
                .iter()
                .map(|l| TaskListSummary {
                    id: &l.id,
                    title: &l.title,
                    tasks: &l.tasks,
                })
                .collect(),
            selected,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl<'a> From<&'a OutlineNode> for SectionSummary<'a> {
    fn from(node: &'a OutlineNode) -> Self {
        Self {
            id: &node.id,
            title: &node.title,
            included: node.is_included(),
            character_ids: node.character_ids.as_deref().unwrap_or_default(),
            children: node.children.iter().map(SectionSummary::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn context_carries_ids_and_flags() {
        let mut project = Project::new("Saltmarsh", "Mystery", "");
        let mut chapter = OutlineNode::with_id("ch1", "Chapter 1", "");
        chapter.include_in_export = Some(false);
        chapter.character_ids = Some(vec!["c1".to_string()]);
        project.outline.push(chapter);
        project.characters.push(Character {
            id: "c1".to_string(),
            ..Character::new("Ada", "A detective")
        });

        let json: Value = serde_json::from_str(&ProjectContext::build(&project, None).to_json()).unwrap();

        assert_eq!(json["title"], "Saltmarsh");
        assert_eq!(json["outline"][0]["id"], "ch1");
        assert_eq!(json["outline"][0]["included"], false);
        assert_eq!(json["outline"][0]["characterIds"][0], "c1");
        assert_eq!(json["characters"][0]["name"], "Ada");
        assert!(json["outlineTree"].as_str().unwrap().contains("[ch1]"));
        assert!(json.get("selected").is_none());
        assert!(json.get("description").is_none());
    }

    #[test]
    fn included_sections_omit_the_flag() {
        let mut project = Project::new("Saltmarsh", "", "");
        project.outline.push(OutlineNode::with_id("ch1", "Chapter 1", ""));

        let json: Value = serde_json::from_str(&ProjectContext::build(&project, None).to_json()).unwrap();

        assert!(json["outline"][0].get("included").is_none());
        assert!(json["outline"][0].get("children").is_none());
    }
}
