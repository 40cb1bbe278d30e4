use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::message::{ChatMessage, ToolCall};
use crate::models::Project;
use crate::selection::SelectedItem;
use crate::tools::ToolDefinition;

/// Everything the backend is given for one round-trip.
pub struct ConverseRequest<'a> {
    pub system_prompt: &'a str,
    /// The conversation so far, oldest first. Error messages are left out.
    pub messages: &'a [ChatMessage],
    pub project: Arc<Project>,
    pub selected: Option<SelectedItem>,
    /// Compact JSON rendering of `project` and `selected` for the prompt.
    pub context: String,
    pub tools: &'a [ToolDefinition],
}

/// A backend reply. Either part may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiResponse {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,
}

impl AiResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            text: None,
            tool_calls,
        }
    }
}

/// The model provider behind a chat session.
///
/// Implementations own the transport. Any error aborts the current turn.
pub trait AiBackend: Send + Sync {
    fn converse(
        &self,
        request: ConverseRequest<'_>,
    ) -> impl Future<Output = anyhow::Result<AiResponse>> + Send;
}
