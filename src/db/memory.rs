use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use chrono::{DateTime, Utc};

use super::ProjectStore;
use crate::models::*;

/// A [`ProjectStore`] that forgets everything on drop.
#[derive(Default)]
pub struct MemoryStore {
    projects: Mutex<HashMap<String, (Project, DateTime<Utc>)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectStore for MemoryStore {
    fn load(&self, id: &str) -> Result<Option<Project>> {
        let projects = self.projects.lock().expect("store lock poisoned");
        Ok(projects.get(id).map(|(project, _)| project.clone()))
    }

    fn save(&self, project: &Project) -> Result<()> {
        let mut projects = self.projects.lock().expect("store lock poisoned");
        projects.insert(project.id.clone(), (project.clone(), Utc::now()));
        Ok(())
    }

    fn list(&self) -> Result<Vec<ProjectSummary>> {
        let projects = self.projects.lock().expect("store lock poisoned");
        let mut summaries: Vec<ProjectSummary> = projects
            .values()
            .map(|(project, updated_at)| ProjectSummary {
                id: project.id.clone(),
                title: project.title.clone(),
                updated_at: *updated_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.title.cmp(&b.title)));
        Ok(summaries)
    }

    fn delete(&self, id: &str) -> Result<bool> {
        let mut projects = self.projects.lock().expect("store lock poisoned");
        Ok(projects.remove(id).is_some())
    }
}
