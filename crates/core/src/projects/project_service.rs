//! Downloads remote project files for offline use.

use log::info;
use std::path::PathBuf;
use std::sync::Arc;

use super::project_catalog::ProjectCatalog;
use super::projects_model::{local_file_name, ProjectFile};
use crate::clock::Clock;
use crate::errors::{Error, Result};
use crate::records::RecordStoreTrait;
use crate::transport::RemoteTransport;

pub struct ProjectService {
    catalog: Arc<ProjectCatalog>,
    records: Arc<dyn RecordStoreTrait>,
    transport: Arc<dyn RemoteTransport>,
    clock: Arc<dyn Clock>,
    projects_dir: PathBuf,
}

impl ProjectService {
    pub fn new(
        catalog: Arc<ProjectCatalog>,
        records: Arc<dyn RecordStoreTrait>,
        transport: Arc<dyn RemoteTransport>,
        clock: Arc<dyn Clock>,
        projects_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog,
            records,
            transport,
            clock,
            projects_dir: projects_dir.into(),
        }
    }

    pub async fn list_projects(&self) -> Result<Vec<ProjectFile>> {
        self.catalog.list_projects().await
    }

    /// Fetches `remote_id`, stores it under the projects directory and registers it.
    pub async fn download_project(&self, remote_id: &str, name: &str) -> Result<ProjectFile> {
        if remote_id.trim().is_empty() {
            return Err(Error::validation("Remote file id is required"));
        }
        let now = self.clock.now();
        let file_name = local_file_name(name, now.date_naive())?;
        let contents = self.transport.download(remote_id).await?;

        tokio::fs::create_dir_all(&self.projects_dir)
            .await
            .map_err(|err| {
                Error::file_unavailable(self.projects_dir.to_string_lossy(), err.to_string())
            })?;
        let local_path = self
            .projects_dir
            .join(file_name)
            .to_string_lossy()
            .to_string();
        self.records.write_contents(&local_path, &contents).await?;

        let project = ProjectFile {
            id: remote_id.to_string(),
            name: name.to_string(),
            local_path,
            downloaded_at: now,
        };
        self.catalog.save_project(project.clone()).await?;
        info!(
            "[Projects] Downloaded {} to {}",
            project.id, project.local_path
        );
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::records::CsvRecordStore;
    use crate::store::MemoryStore;
    use crate::test_support::{ts, ScriptedTransport, PROJECT_CSV};

    #[tokio::test]
    async fn download_writes_file_and_registers_it() {
        let dir = tempfile::tempdir().expect("tempdir");
        let projects_dir = dir.path().join("projects");
        let catalog = Arc::new(ProjectCatalog::new(Arc::new(MemoryStore::new())));
        let records = Arc::new(CsvRecordStore::new());
        let transport = Arc::new(ScriptedTransport::new().with_download("drive-1", PROJECT_CSV));
        let clock = Arc::new(ManualClock::new(ts("2026-02-10T09:30:00Z")));
        let service = ProjectService::new(
            catalog.clone(),
            records.clone(),
            transport,
            clock,
            &projects_dir,
        );

        let project = service
            .download_project("drive-1", "Route 12 North")
            .await
            .expect("download");

        assert!(project.local_path.ends_with("Route_12_North_2026-02-10.csv"));
        let record = records
            .read_record(&project.local_path, "TP-7")
            .await
            .expect("read");
        assert_eq!(record.get("LINE ITEM"), Some("LI-02"));
        assert_eq!(
            catalog
                .resolve_remote_id(&project.local_path)
                .await
                .expect("resolve")
                .as_deref(),
            Some("drive-1")
        );
        assert_eq!(service.list_projects().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn download_name_cannot_leave_the_projects_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let projects_dir = dir.path().join("data").join("projects");
        let catalog = Arc::new(ProjectCatalog::new(Arc::new(MemoryStore::new())));
        let service = ProjectService::new(
            catalog.clone(),
            Arc::new(CsvRecordStore::new()),
            Arc::new(ScriptedTransport::new().with_download("drive-1", PROJECT_CSV)),
            Arc::new(ManualClock::new(ts("2026-02-10T09:30:00Z"))),
            &projects_dir,
        );

        let project = service
            .download_project("drive-1", "../../escaped")
            .await
            .expect("download");

        let expected = projects_dir.join("escaped_2026-02-10.csv");
        assert_eq!(project.local_path, expected.to_string_lossy());
        assert!(expected.exists());
        assert!(!dir.path().join("escaped_2026-02-10.csv").exists());

        let err = service.download_project("drive-1", "..").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(catalog.list_projects().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn failed_download_registers_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = Arc::new(ProjectCatalog::new(Arc::new(MemoryStore::new())));
        let service = ProjectService::new(
            catalog.clone(),
            Arc::new(CsvRecordStore::new()),
            Arc::new(ScriptedTransport::new()),
            Arc::new(ManualClock::new(ts("2026-02-10T09:30:00Z"))),
            dir.path(),
        );

        let err = service.download_project("missing", "Route").await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert!(catalog.list_projects().await.expect("list").is_empty());
    }
}
