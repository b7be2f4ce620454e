//! Persisted map of downloaded projects, keyed by remote id.

use log::debug;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::projects_model::ProjectFile;
use crate::errors::Result;
use crate::store::DurableStore;

pub const PROJECT_FILES_KEY: &str = "project_files_metadata";

pub struct ProjectCatalog {
    store: Arc<dyn DurableStore>,
    key: String,
    lock: Mutex<()>,
}

impl ProjectCatalog {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self {
            store,
            key: PROJECT_FILES_KEY.to_string(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<BTreeMap<String, ProjectFile>> {
        match self.store.get(&self.key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Inserts or replaces the entry for `project.id`.
    pub async fn save_project(&self, project: ProjectFile) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut projects = self.load().await?;
        debug!(
            "[Projects] Registering {} -> {}",
            project.id, project.local_path
        );
        projects.insert(project.id.clone(), project);
        let raw = serde_json::to_string(&projects)?;
        self.store.set(&self.key, &raw).await
    }

    /// Registered projects whose local file still exists.
    pub async fn list_projects(&self) -> Result<Vec<ProjectFile>> {
        let projects = self.load().await?;
        let mut present = Vec::with_capacity(projects.len());
        for project in projects.into_values() {
            if tokio::fs::try_exists(Path::new(&project.local_path))
                .await
                .unwrap_or(false)
            {
                present.push(project);
            } else {
                debug!("[Projects] Skipping {}, local file is gone", project.id);
            }
        }
        Ok(present)
    }

    /// Remote id of the project stored at `local_path`, if any.
    pub async fn resolve_remote_id(&self, local_path: &str) -> Result<Option<String>> {
        Ok(self
            .load()
            .await?
            .into_values()
            .find(|project| project.local_path == local_path)
            .map(|project| project.id))
    }
}
