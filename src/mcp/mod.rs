//! MCP server exposing the document tools to an external agent.
//!
//! Every document tool delegates to [`crate::tools::execute`], so an agent
//! connected over MCP edits the project exactly like the in-app assistant:
//! one undoable commit per call, `{success, message}` back.

mod types;

pub use types::*;

use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde_json::Value;

use crate::editor::{self, SharedEditor};
use crate::outline;
use crate::tools::{self, *};

#[derive(Clone)]
pub struct McpServer {
    editor: SharedEditor,
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    pub fn new(editor: SharedEditor) -> Self {
        Self {
            editor,
            tool_router: Self::tool_router(),
        }
    }

    /// Run a document tool and wrap its outcome for MCP.
    pub fn call_document_tool(&self, tool: ToolName, arguments: &Value) -> Result<CallToolResult, McpError> {
        let outcome = tools::execute(&mut editor::lock(&self.editor), tool.as_str(), arguments);
        let json = serde_json::to_string(&outcome).map_err(|e| McpError::internal_error(e.to_string(), None))?;

        Ok(if outcome.success {
            CallToolResult::success(vec![Content::text(json)])
        } else {
            CallToolResult::error(vec![Content::text(json)])
        })
    }

    pub fn outline_text(&self, with_ids: bool) -> String {
        let editor = editor::lock(&self.editor);
        let outline = &editor.project().outline;
        if outline.is_empty() {
            "(empty outline)".to_string()
        } else {
            outline::render_tree(outline, with_ids)
        }
    }

    fn history_result(&self, changed: bool) -> Result<CallToolResult, McpError> {
        let status = editor::lock(&self.editor).history_status();
        let response = HistoryResponse {
            changed,
            can_undo: status.can_undo,
            can_redo: status.can_redo,
        };
        let json = serde_json::to_string(&response).map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_router]
impl McpServer {
    // ============================================================
    // Outline
    // ============================================================

    #[tool(
        name = "addOutlineSection",
        description = "Add a section to the outline. Give parentId to nest it under an existing section; omit it for a top-level section. Returns the new section's id."
    )]
    async fn add_outline_section(
        &self,
        params: Parameters<ToolArgs<AddOutlineSectionRequest>>,
    ) -> Result<CallToolResult, McpError> {
        self.call_document_tool(ToolName::AddOutlineSection, &params.0.value)
    }

    #[tool(
        name = "updateOutlineSection",
        description = "Change the title and/or body text of an outline section. Fields you omit are left unchanged."
    )]
    async fn update_outline_section(
        &self,
        params: Parameters<ToolArgs<UpdateOutlineSectionRequest>>,
    ) -> Result<CallToolResult, McpError> {
        self.call_document_tool(ToolName::UpdateOutlineSection, &params.0.value)
    }

    #[tool(
        name = "deleteOutlineSection",
        description = "Delete an outline section and all of its subsections."
    )]
    async fn delete_outline_section(
        &self,
        params: Parameters<ToolArgs<DeleteOutlineSectionRequest>>,
    ) -> Result<CallToolResult, McpError> {
        self.call_document_tool(ToolName::DeleteOutlineSection, &params.0.value)
    }

    #[tool(
        name = "moveOutlineSection",
        description = "Move a section (with its subsections). Use targetParentId to make it the last child of another section, or targetSiblingId with position 'before'/'after' to place it next to a sibling. With neither, the section becomes top-level. A section cannot be moved into its own subtree."
    )]
    async fn move_outline_section(
        &self,
        params: Parameters<ToolArgs<MoveOutlineSectionRequest>>,
    ) -> Result<CallToolResult, McpError> {
        self.call_document_tool(ToolName::MoveOutlineSection, &params.0.value)
    }

    #[tool(
        name = "toggleSectionExport",
        description = "Include or exclude a section (and its subsections) from manuscript exports."
    )]
    async fn toggle_section_export(
        &self,
        params: Parameters<ToolArgs<ToggleSectionExportRequest>>,
    ) -> Result<CallToolResult, McpError> {
        self.call_document_tool(ToolName::ToggleSectionExport, &params.0.value)
    }

    #[tool(
        name = "toggleCharacterAssociation",
        description = "Link a character to a section, or unlink it if already linked."
    )]
    async fn toggle_character_association(
        &self,
        params: Parameters<ToolArgs<ToggleCharacterAssociationRequest>>,
    ) -> Result<CallToolResult, McpError> {
        self.call_document_tool(ToolName::ToggleCharacterAssociation, &params.0.value)
    }

    #[tool(
        name = "getOutline",
        description = "Show the outline as an indented tree. Included sections are marked ●, excluded ones ○."
    )]
    async fn get_outline(
        &self,
        params: Parameters<GetOutlineRequest>,
    ) -> Result<CallToolResult, McpError> {
        let text = self.outline_text(params.0.with_ids.unwrap_or(true));
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    // ============================================================
    // Characters
    // ============================================================

    #[tool(
        name = "addCharacter",
        description = "Add a character to the roster with a name, description and any profile fields (role, appearance, personality, motivation, backstory, goals, fears, strengths, weaknesses, relationships, arc, voice). Returns the new character's id."
    )]
    async fn add_character(
        &self,
        params: Parameters<ToolArgs<AddCharacterRequest>>,
    ) -> Result<CallToolResult, McpError> {
        self.call_document_tool(ToolName::AddCharacter, &params.0.value)
    }

    #[tool(
        name = "updateCharacter",
        description = "Update fields of a character. Pass fields directly (e.g. \"motivation\": \"...\") or as a 'field'/'value' pair. Unrecognised field names are ignored."
    )]
    async fn update_character(
        &self,
        params: Parameters<ToolArgs<UpdateCharacterRequest>>,
    ) -> Result<CallToolResult, McpError> {
        self.call_document_tool(ToolName::UpdateCharacter, &params.0.value)
    }

    #[tool(
        name = "deleteCharacter",
        description = "Delete a character and unlink it from every section."
    )]
    async fn delete_character(
        &self,
        params: Parameters<ToolArgs<DeleteCharacterRequest>>,
    ) -> Result<CallToolResult, McpError> {
        self.call_document_tool(ToolName::DeleteCharacter, &params.0.value)
    }

    // ============================================================
    // Notes and task lists
    // ============================================================

    #[tool(name = "addNote", description = "Add a free-form note. Returns the new note's id.")]
    async fn add_note(&self, params: Parameters<ToolArgs<AddNoteRequest>>) -> Result<CallToolResult, McpError> {
        self.call_document_tool(ToolName::AddNote, &params.0.value)
    }

    #[tool(name = "updateNote", description = "Change a note's title and/or content.")]
    async fn update_note(
        &self,
        params: Parameters<ToolArgs<UpdateNoteRequest>>,
    ) -> Result<CallToolResult, McpError> {
        self.call_document_tool(ToolName::UpdateNote, &params.0.value)
    }

    #[tool(name = "deleteNote", description = "Delete a note.")]
    async fn delete_note(
        &self,
        params: Parameters<ToolArgs<DeleteNoteRequest>>,
    ) -> Result<CallToolResult, McpError> {
        self.call_document_tool(ToolName::DeleteNote, &params.0.value)
    }

    #[tool(
        name = "addTaskList",
        description = "Create a task list, optionally with initial tasks. Returns the new list's id."
    )]
    async fn add_task_list(
        &self,
        params: Parameters<ToolArgs<AddTaskListRequest>>,
    ) -> Result<CallToolResult, McpError> {
        self.call_document_tool(ToolName::AddTaskList, &params.0.value)
    }

    #[tool(name = "addTask", description = "Append a task to a task list.")]
    async fn add_task(&self, params: Parameters<ToolArgs<AddTaskRequest>>) -> Result<CallToolResult, McpError> {
        self.call_document_tool(ToolName::AddTask, &params.0.value)
    }

    #[tool(name = "toggleTask", description = "Mark a task as done, or as not done if it already is.")]
    async fn toggle_task(
        &self,
        params: Parameters<ToolArgs<ToggleTaskRequest>>,
    ) -> Result<CallToolResult, McpError> {
        self.call_document_tool(ToolName::ToggleTask, &params.0.value)
    }

    // ============================================================
    // History
    // ============================================================

    #[tool(name = "undo", description = "Undo the most recent change to the project.")]
    async fn undo(&self) -> Result<CallToolResult, McpError> {
        let changed = editor::lock(&self.editor).undo();
        self.history_result(changed)
    }

    #[tool(name = "redo", description = "Redo the most recently undone change.")]
    async fn redo(&self) -> Result<CallToolResult, McpError> {
        let changed = editor::lock(&self.editor).redo();
        self.history_result(changed)
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation {
                name: "plotline".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                title: None,
                icons: None,
                website_url: None,
            },
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            instructions: Some(
                r#"Plotline holds one novel project: an outline of nested sections, a character roster, notes and task lists.

WORKFLOW:
1. Call getOutline to see the sections and their ids
2. Edit with the document tools; each call is one undoable change
3. Use the id a tool returns when you need to refer to what it created

RULES:
- Sections are addressed by id, never by title
- A section cannot be moved into its own subtree
- Deleting a character also unlinks it from every section
- Every tool answers {success, message}; on failure nothing changed"#
                    .into(),
            ),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(editor: SharedEditor) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(editor);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}

/// The MCP server as a streamable-HTTP service, for mounting next to the API.
///
/// Every MCP session gets its own [`McpServer`], all editing the same project.
pub fn http_service(
    editor: SharedEditor,
) -> rmcp::transport::streamable_http_server::StreamableHttpService<
    McpServer,
    rmcp::transport::streamable_http_server::session::local::LocalSessionManager,
> {
    use rmcp::transport::streamable_http_server::{
        session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
    };

    StreamableHttpService::new(
        move || Ok(McpServer::new(editor.clone())),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    )
}
