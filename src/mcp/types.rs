//! Request types for the MCP-only tools, and the argument wrapper used for
//! the shared document tools.

use std::borrow::Cow;
use std::marker::PhantomData;

use rmcp::schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Tool arguments kept as raw JSON, advertised with the schema of `T`.
///
/// Document tools validate their own arguments; keeping the raw object lets
/// character tools see field names outside the schema (aliases like
/// `background`) exactly as they do over HTTP or chat.
pub struct ToolArgs<T> {
    pub value: Value,
    _schema: PhantomData<fn() -> T>,
}

impl<T> ToolArgs<T> {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            _schema: PhantomData,
        }
    }
}

impl<'de, T> Deserialize<'de> for ToolArgs<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::new)
    }
}

impl<T: JsonSchema> JsonSchema for ToolArgs<T> {
    fn inline_schema() -> bool {
        T::inline_schema()
    }

    fn schema_name() -> Cow<'static, str> {
        T::schema_name()
    }

    fn schema_id() -> Cow<'static, str> {
        T::schema_id()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        T::json_schema(generator)
    }
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetOutlineRequest {
    #[schemars(description = "Append each section's id in brackets. Defaults to true")]
    #[serde(default)]
    pub with_ids: Option<bool>,
}

/// Result of an undo or redo.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub changed: bool,
    pub can_undo: bool,
    pub can_redo: bool,
}
