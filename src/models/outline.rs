use serde::{Deserialize, Serialize};

/// A section of the manuscript outline.
///
/// Sections form a forest: every node exclusively owns its `children`, and
/// cross-references to characters are kept as plain ids so a deleted character
/// never leaves a dangling pointer, only a stale id that the document model
/// strips on delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineNode {
    /// Opaque identifier, unique across the whole forest.
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub children: Vec<OutlineNode>,
    /// Ids of characters appearing in this section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_ids: Option<Vec<String>>,
    /// Storage key or embedded payload for the section's illustration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub illustration: Option<String>,
    /// Whether the section is compiled into exports. `None` means included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_in_export: Option<bool>,
}

impl OutlineNode {
    /// Create a leaf section with a fresh id.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), title, content)
    }

    pub fn with_id(id: impl Into<String>, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content: content.into(),
            children: Vec::new(),
            character_ids: None,
            illustration: None,
            include_in_export: None,
        }
    }

    pub fn with_children(mut self, children: Vec<OutlineNode>) -> Self {
        self.children = children;
        self
    }

    pub fn is_included(&self) -> bool {
        self.include_in_export.unwrap_or(true)
    }

    pub fn has_character(&self, character_id: &str) -> bool {
        self.character_ids
            .as_ref()
            .is_some_and(|ids| ids.iter().any(|id| id == character_id))
    }
}

/// Partial update for a section. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub illustration: Option<String>,
    pub include_in_export: Option<bool>,
}

impl OutlineUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.illustration.is_none()
            && self.include_in_export.is_none()
    }
}

/// Where a moved section should land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MoveTarget {
    /// Promote to the end of the top level.
    Root,
    /// Become the last child of the given section.
    Parent(String),
    /// Sit immediately before the given sibling.
    Before(String),
    /// Sit immediately after the given sibling.
    After(String),
}

impl MoveTarget {
    /// The section id the target is anchored on, if any.
    pub fn anchor(&self) -> Option<&str> {
        match self {
            Self::Root => None,
            Self::Parent(id) | Self::Before(id) | Self::After(id) => Some(id),
        }
    }
}
