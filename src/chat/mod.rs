//! The tool dispatch loop behind the assistant panel.
//!
//! A turn runs at most two backend round-trips. The first reply either
//! answers directly or requests tool calls; requested calls are executed in
//! order, each committed through the editor on its own, and their outcomes are
//! sent back for one final reply. Tool calls in that final reply are not
//! executed.
//!
//! A [`ChatSession`] is the whole conversational state: start a new one to
//! start over.

mod backend;
mod context;
mod message;

pub use backend::{AiBackend, AiResponse, ConverseRequest};
pub use context::{ProjectContext, DEFAULT_SYSTEM_PROMPT};
pub use message::{ChatMessage, Role, ToolCall};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::editor::{self, SharedEditor};
use crate::tools::{self, ToolDefinition, ToolOutcome};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("A message is already being answered")]
    Busy,

    #[error("Message is empty")]
    EmptyMessage,

    #[error("Assistant unavailable: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub call_id: String,
    pub name: String,
    pub outcome: ToolOutcome,
}

/// What one turn produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutcome {
    pub reply: Option<String>,
    pub tool_results: Vec<ToolCallResult>,
}

pub struct ChatSession {
    id: String,
    started_at: DateTime<Utc>,
    system_prompt: String,
    tools: Vec<ToolDefinition>,
    log: Mutex<Vec<ChatMessage>>,
    busy: AtomicBool,
}

/// Holds the session's busy flag for the length of a turn.
struct TurnGuard<'a>(&'a AtomicBool);

impl<'a> TurnGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

impl ChatSession {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            system_prompt: system_prompt.into(),
            tools: tools::definitions(),
            log: Mutex::new(Vec::new()),
            busy: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.log().clone()
    }

    /// Whether a turn is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run one user turn against `editor`.
    ///
    /// Fails with [`ChatError::Busy`] if another turn on this session has not
    /// finished. A backend failure ends the turn with an error message in the
    /// log; tool calls already executed stay committed.
    pub async fn send_message<B: AiBackend>(
        &self,
        editor: &SharedEditor,
        backend: &B,
        text: &str,
    ) -> Result<TurnOutcome, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        let _turn = TurnGuard::acquire(&self.busy).ok_or(ChatError::Busy)?;

        tracing::info!("Chat session {}: user turn", self.id);
        self.push(ChatMessage::user(text));

        let first = self.converse(editor, backend).await?;
        if first.tool_calls.is_empty() {
            if first.text.is_some() {
                self.push(ChatMessage::assistant(first.text.clone(), Vec::new()));
            }
            return Ok(TurnOutcome {
                reply: first.text,
                tool_results: Vec::new(),
            });
        }

        let calls = first.tool_calls.clone();
        self.push(ChatMessage::assistant(first.text, first.tool_calls));

        let mut tool_results = Vec::with_capacity(calls.len());
        for call in calls {
            let outcome = tools::execute_json(&mut editor::lock(editor), &call.name, &call.arguments_json);
            self.push(ChatMessage::tool_result(&call.id, &outcome));
            tool_results.push(ToolCallResult {
                call_id: call.id,
                name: call.name,
                outcome,
            });
        }

        let second = self.converse(editor, backend).await?;
        if !second.tool_calls.is_empty() {
            tracing::debug!(
                "Ignoring {} tool call(s) in the follow-up reply",
                second.tool_calls.len()
            );
        }
        if second.text.is_some() {
            self.push(ChatMessage::assistant(second.text.clone(), Vec::new()));
        }

        Ok(TurnOutcome {
            reply: second.text,
            tool_results,
        })
    }

    async fn converse<B: AiBackend>(&self, editor: &SharedEditor, backend: &B) -> Result<AiResponse, ChatError> {
        let (project, selected) = {
            let editor = editor::lock(editor);
            (editor.snapshot(), editor.selection().cloned())
        };
        let context = ProjectContext::build(&project, selected.as_ref()).to_json();
        let transcript: Vec<ChatMessage> = self
            .log()
            .iter()
            .filter(|m| m.role != Role::Error)
            .cloned()
            .collect();

        let request = ConverseRequest {
            system_prompt: &self.system_prompt,
            messages: &transcript,
            project,
            selected,
            context,
            tools: &self.tools,
        };

        backend.converse(request).await.map_err(|e| {
            tracing::error!("Chat session {}: backend failed: {:#}", self.id, e);
            self.push(ChatMessage::error(format!("The assistant could not be reached: {}", e)));
            ChatError::Backend(e.to_string())
        })
    }

    fn log(&self) -> std::sync::MutexGuard<'_, Vec<ChatMessage>> {
        self.log.lock().expect("chat log lock poisoned")
    }

    fn push(&self, message: ChatMessage) {
        self.log().push(message);
    }
}
