//! Project persistence.
//!
//! Projects are stored whole: one row per project holding its JSON document.
//! The editor never calls into this module; the autosaver and the CLI do.

mod memory;
mod schema;

pub use memory::MemoryStore;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};

use crate::models::*;

/// Where projects live between sessions.
pub trait ProjectStore: Send + Sync {
    fn load(&self, id: &str) -> Result<Option<Project>>;

    /// Insert or overwrite the stored copy of `project`.
    fn save(&self, project: &Project) -> Result<()>;

    /// Stored projects, most recently saved first.
    fn list(&self) -> Result<Vec<ProjectSummary>>;

    fn delete(&self, id: &str) -> Result<bool>;
}

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }
}

/// `<data dir>/plotline/plotline.db`
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "plotline")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("plotline.db"))
}

impl ProjectStore for Database {
    fn load(&self, id: &str) -> Result<Option<Project>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let document: Option<String> = conn
            .query_row("SELECT document FROM projects WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;

        document
            .map(|json| serde_json::from_str(&json).with_context(|| format!("Corrupt document for project {}", id)))
            .transpose()
    }

    fn save(&self, project: &Project) -> Result<()> {
        let document = serde_json::to_string(project)?;
        let now = Utc::now().to_rfc3339();

        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "INSERT INTO projects (id, title, document, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                document = excluded.document,
                updated_at = excluded.updated_at",
            (&project.id, &project.title, &document, &now),
        )?;

        tracing::debug!("Stored project {} ({} bytes)", project.id, document.len());
        Ok(())
    }

    fn list(&self) -> Result<Vec<ProjectSummary>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, title, updated_at FROM projects ORDER BY updated_at DESC, title",
        )?;

        let projects = stmt
            .query_map([], |row| {
                Ok(ProjectSummary {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    updated_at: parse_datetime(row.get::<_, String>(2)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM projects WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
