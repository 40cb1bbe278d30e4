use serde::{Deserialize, Serialize};

/// The kinds of item that can be open in the main editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Section,
    Character,
    Note,
    TaskList,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Section => "section",
            Self::Character => "character",
            Self::Note => "note",
            Self::TaskList => "task_list",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "section" => Some(Self::Section),
            "character" => Some(Self::Character),
            "note" => Some(Self::Note),
            "task_list" => Some(Self::TaskList),
            _ => None,
        }
    }
}

/// A view reference (kind + id) to an item in the current project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    pub kind: ItemKind,
    pub id: String,
}

impl ItemRef {
    pub fn new(kind: ItemKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }
}
