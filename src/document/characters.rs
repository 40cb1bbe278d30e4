use serde_json::{Map, Value};

use crate::models::*;
use crate::outline;

/// Argument keys that address the call rather than a field.
const CONTROL_KEYS: &[&str] = &["characterId", "character_id", "id", "field", "value"];

impl Project {
    pub fn find_character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    pub fn add_character(&self, character: Character) -> Project {
        let mut next = self.clone();
        next.characters.push(character);
        next
    }

    pub fn update_character(&self, id: &str, update: &CharacterUpdate) -> Project {
        let mut next = self.clone();
        if let Some(character) = next.characters.iter_mut().find(|c| c.id == id) {
            update.apply(character);
        }
        next
    }

    /// Remove the character and strip its id from every section, tree-wide.
    pub fn delete_character(&self, id: &str) -> Project {
        if self.find_character(id).is_none() {
            return self.clone();
        }
        Project {
            characters: self.characters.iter().filter(|c| c.id != id).cloned().collect(),
            outline: outline::strip_character(&self.outline, id),
            ..self.clone()
        }
    }

    /// Flip whether one section of a character sheet is exported.
    pub fn toggle_character_export(&self, id: &str, section: &str) -> Project {
        let mut next = self.clone();
        if let Some(character) = next.characters.iter_mut().find(|c| c.id == id) {
            let included = character.exports(section);
            character
                .export_fields
                .get_or_insert_with(Default::default)
                .insert(section.to_string(), !included);
        }
        next
    }
}

/// Translate loosely-shaped AI arguments into a [`CharacterUpdate`].
///
/// Two shapes are accepted and may be mixed:
/// - a generic `{"field": "<name>", "value": "<text>"}` pair;
/// - direct keys, e.g. `{"motivation": "..."}` or `{"background": "..."}`.
///
/// Field names go through [`CharacterField::from_alias`]. Names that do not
/// resolve are skipped with a warning rather than failing the whole update.
pub fn remap_character_fields(args: &Map<String, Value>) -> CharacterUpdate {
    let mut update = CharacterUpdate::default();

    if let (Some(field), Some(value)) = (
        args.get("field").and_then(Value::as_str),
        args.get("value").and_then(value_as_text),
    ) {
        match CharacterField::from_alias(field) {
            Some(field) => update = update.set(field, value),
            None => tracing::warn!("Ignoring unknown character field '{}'", field),
        }
    }

    for (key, value) in args {
        if CONTROL_KEYS.contains(&key.as_str()) {
            continue;
        }
        let Some(text) = value_as_text(value) else {
            continue;
        };
        if matches!(key.as_str(), "illustration" | "image" | "imageUrl") {
            update.illustration = Some(text);
            continue;
        }
        match CharacterField::from_alias(key) {
            Some(field) => update = update.set(field, text),
            None => tracing::warn!("Ignoring unknown character field '{}'", key),
        }
    }

    update
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(value_as_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}
