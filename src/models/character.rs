use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A member of the character roster.
///
/// Besides `name` and `description`, a character carries a fixed set of
/// narrative-profile fields, each independently optional. Which of them make
/// it into an export is controlled per field by `export_fields`, keyed by
/// [`CharacterField::key`]; a missing key means the field is included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backstory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fears: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strengths: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weaknesses: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub illustration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_fields: Option<BTreeMap<String, bool>>,
}

/// Every editable text field on a [`Character`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterField {
    Name,
    Description,
    Role,
    Age,
    Appearance,
    Personality,
    Motivation,
    Backstory,
    Goals,
    Fears,
    Strengths,
    Weaknesses,
    Relationships,
    Arc,
    Voice,
}

impl CharacterField {
    pub const ALL: [CharacterField; 15] = [
        Self::Name,
        Self::Description,
        Self::Role,
        Self::Age,
        Self::Appearance,
        Self::Personality,
        Self::Motivation,
        Self::Backstory,
        Self::Goals,
        Self::Fears,
        Self::Strengths,
        Self::Weaknesses,
        Self::Relationships,
        Self::Arc,
        Self::Voice,
    ];

    /// The narrative-profile fields, in display order.
    pub const PROFILE: [CharacterField; 13] = [
        Self::Role,
        Self::Age,
        Self::Appearance,
        Self::Personality,
        Self::Motivation,
        Self::Backstory,
        Self::Goals,
        Self::Fears,
        Self::Strengths,
        Self::Weaknesses,
        Self::Relationships,
        Self::Arc,
        Self::Voice,
    ];

    /// Canonical key, used in JSON and in the export-inclusion map.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Role => "role",
            Self::Age => "age",
            Self::Appearance => "appearance",
            Self::Personality => "personality",
            Self::Motivation => "motivation",
            Self::Backstory => "backstory",
            Self::Goals => "goals",
            Self::Fears => "fears",
            Self::Strengths => "strengths",
            Self::Weaknesses => "weaknesses",
            Self::Relationships => "relationships",
            Self::Arc => "arc",
            Self::Voice => "voice",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Description => "Description",
            Self::Role => "Role",
            Self::Age => "Age",
            Self::Appearance => "Appearance",
            Self::Personality => "Personality",
            Self::Motivation => "Motivation",
            Self::Backstory => "Backstory",
            Self::Goals => "Goals",
            Self::Fears => "Fears",
            Self::Strengths => "Strengths",
            Self::Weaknesses => "Weaknesses",
            Self::Relationships => "Relationships",
            Self::Arc => "Character Arc",
            Self::Voice => "Voice",
        }
    }

    /// Resolve a field name as an AI agent might phrase it.
    ///
    /// Matching ignores case, `_`, `-` and spaces, so `backStory`,
    /// `back_story` and `Back Story` all land on [`CharacterField::Backstory`].
    pub fn from_alias(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        let field = match normalized.as_str() {
            "name" | "fullname" | "charactername" => Self::Name,
            "description" | "summary" | "bio" | "overview" => Self::Description,
            "role" | "storyrole" | "archetype" => Self::Role,
            "age" => Self::Age,
            "appearance" | "looks" | "physicaldescription" | "physicalappearance" => {
                Self::Appearance
            }
            "personality" | "traits" | "personalitytraits" | "temperament" => Self::Personality,
            "motivation" | "motivations" | "drive" => Self::Motivation,
            "backstory" | "background" | "history" => Self::Backstory,
            "goals" | "goal" | "objectives" => Self::Goals,
            "fears" | "fear" => Self::Fears,
            "strengths" | "strength" => Self::Strengths,
            "weaknesses" | "weakness" | "flaws" | "flaw" => Self::Weaknesses,
            "relationships" | "relationship" | "connections" => Self::Relationships,
            "arc" | "characterarc" | "development" => Self::Arc,
            "voice" | "speech" | "dialoguestyle" | "speechpattern" => Self::Voice,
            _ => return None,
        };
        Some(field)
    }
}

impl Character {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            role: None,
            age: None,
            appearance: None,
            personality: None,
            motivation: None,
            backstory: None,
            goals: None,
            fears: None,
            strengths: None,
            weaknesses: None,
            relationships: None,
            arc: None,
            voice: None,
            illustration: None,
            export_fields: None,
        }
    }

    pub fn field(&self, field: CharacterField) -> Option<&str> {
        let value = match field {
            CharacterField::Name => return Some(&self.name),
            CharacterField::Description => return Some(&self.description),
            CharacterField::Role => &self.role,
            CharacterField::Age => &self.age,
            CharacterField::Appearance => &self.appearance,
            CharacterField::Personality => &self.personality,
            CharacterField::Motivation => &self.motivation,
            CharacterField::Backstory => &self.backstory,
            CharacterField::Goals => &self.goals,
            CharacterField::Fears => &self.fears,
            CharacterField::Strengths => &self.strengths,
            CharacterField::Weaknesses => &self.weaknesses,
            CharacterField::Relationships => &self.relationships,
            CharacterField::Arc => &self.arc,
            CharacterField::Voice => &self.voice,
        };
        value.as_deref()
    }

    pub fn set_field(&mut self, field: CharacterField, value: String) {
        let slot = match field {
            CharacterField::Name => {
                self.name = value;
                return;
            }
            CharacterField::Description => {
                self.description = value;
                return;
            }
            CharacterField::Role => &mut self.role,
            CharacterField::Age => &mut self.age,
            CharacterField::Appearance => &mut self.appearance,
            CharacterField::Personality => &mut self.personality,
            CharacterField::Motivation => &mut self.motivation,
            CharacterField::Backstory => &mut self.backstory,
            CharacterField::Goals => &mut self.goals,
            CharacterField::Fears => &mut self.fears,
            CharacterField::Strengths => &mut self.strengths,
            CharacterField::Weaknesses => &mut self.weaknesses,
            CharacterField::Relationships => &mut self.relationships,
            CharacterField::Arc => &mut self.arc,
            CharacterField::Voice => &mut self.voice,
        };
        *slot = Some(value);
    }

    /// Whether `section` (a field key or `"illustration"`) is exported.
    pub fn exports(&self, section: &str) -> bool {
        self.export_fields
            .as_ref()
            .and_then(|map| map.get(section).copied())
            .unwrap_or(true)
    }
}

/// Partial update for a character, keyed by canonical field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterUpdate {
    pub fields: BTreeMap<CharacterField, String>,
    pub illustration: Option<String>,
}

impl CharacterUpdate {
    pub fn set(mut self, field: CharacterField, value: impl Into<String>) -> Self {
        self.fields.insert(field, value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.illustration.is_none()
    }

    pub fn apply(&self, character: &mut Character) {
        for (field, value) in &self.fields {
            character.set_field(*field, value.clone());
        }
        if let Some(illustration) = &self.illustration {
            character.illustration = Some(illustration.clone());
        }
    }
}
