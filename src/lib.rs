//! Plotline: the document engine of a long-form writing tool.
//!
//! A project (outline, characters, notes, task lists) is edited through an
//! [`editor::Editor`], which records every change in a bounded undo history
//! and keeps the open item in sync. The same edits are available to an AI
//! agent as named tools, over the in-app chat loop, HTTP or MCP.

pub mod api;
pub mod autosave;
pub mod backup;
pub mod chat;
pub mod config;
pub mod db;
pub mod document;
pub mod editor;
pub mod history;
pub mod manuscript;
pub mod mcp;
pub mod models;
pub mod outline;
pub mod selection;
pub mod tools;
