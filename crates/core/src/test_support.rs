//! Fakes shared by the unit tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::clock::{Clock, ManualClock};
use crate::errors::{Error, Result};
use crate::projects::{ProjectCatalog, ProjectFile};
use crate::records::CsvRecordStore;
use crate::store::{DurableStore, MemoryStore};
use crate::sync::{ConnectivityMonitor, SyncOrchestrator};
use crate::transport::{RemoteTransport, UploadReceipt};

pub(crate) const PROJECT_CSV: &str = "\
TEST POINT,LINE ITEM,TREATMENT TYPE,Chainage,Latitude,Longitude,Pavement Thickness (mm),Comments
1,LI-01,Overlay,0+100,-33.86,151.20,150,
2,LI-01,Overlay,0+200,-33.87,151.21,,
TP-7,LI-02,Reseal,0+700,-33.88,151.22,,
";

pub(crate) fn ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .expect("timestamp")
        .with_timezone(&Utc)
}

pub(crate) fn write_csv(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write csv");
    path.to_string_lossy().to_string()
}

/// Transport whose behaviour is configured per test.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    signed_out: AtomicBool,
    panic_on_upload: AtomicBool,
    failing: Mutex<HashSet<String>>,
    uploads: Mutex<Vec<(String, String)>>,
    downloads: Mutex<HashMap<String, String>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_authenticated(&self, authenticated: bool) {
        self.signed_out.store(!authenticated, Ordering::SeqCst);
    }

    pub(crate) fn fail_uploads_to(&self, remote_id: &str) {
        self.failing
            .lock()
            .expect("lock")
            .insert(remote_id.to_string());
    }

    pub(crate) fn heal(&self) {
        self.failing.lock().expect("lock").clear();
    }

    pub(crate) fn panic_on_upload(&self) {
        self.panic_on_upload.store(true, Ordering::SeqCst);
    }

    pub(crate) fn with_download(self, remote_id: &str, contents: &str) -> Self {
        self.downloads
            .lock()
            .expect("lock")
            .insert(remote_id.to_string(), contents.to_string());
        self
    }

    pub(crate) fn uploads(&self) -> Vec<(String, String)> {
        self.uploads.lock().expect("lock").clone()
    }
}

#[async_trait]
impl RemoteTransport for ScriptedTransport {
    async fn is_authenticated(&self) -> bool {
        !self.signed_out.load(Ordering::SeqCst)
    }

    async fn upload(&self, remote_id: &str, content: &str) -> Result<UploadReceipt> {
        if self.panic_on_upload.load(Ordering::SeqCst) {
            panic!("transport blew up");
        }
        if self.failing.lock().expect("lock").contains(remote_id) {
            return Err(Error::network("HTTP 503"));
        }
        self.uploads
            .lock()
            .expect("lock")
            .push((remote_id.to_string(), content.to_string()));
        Ok(UploadReceipt {
            remote_id: remote_id.to_string(),
            status: "200".to_string(),
        })
    }

    async fn download(&self, remote_id: &str) -> Result<String> {
        self.downloads
            .lock()
            .expect("lock")
            .get(remote_id)
            .cloned()
            .ok_or_else(|| Error::network(format!("HTTP 404 for {}", remote_id)))
    }
}

/// Memory store whose writes can be made to fail per key, or per key and value.
#[derive(Default)]
pub(crate) struct FlakyStore {
    inner: MemoryStore,
    failing_writes: Mutex<HashSet<(String, Option<String>)>>,
}

impl FlakyStore {
    pub(crate) fn fail_writes_to(&self, key: &str) {
        self.failing_writes
            .lock()
            .expect("lock")
            .insert((key.to_string(), None));
    }

    pub(crate) fn fail_writes_of(&self, key: &str, value: &str) {
        self.failing_writes
            .lock()
            .expect("lock")
            .insert((key.to_string(), Some(value.to_string())));
    }

    pub(crate) fn heal(&self) {
        self.failing_writes.lock().expect("lock").clear();
    }

    fn check(&self, key: &str, value: Option<&str>) -> Result<()> {
        let failing = self.failing_writes.lock().expect("lock");
        let blocked = failing.iter().any(|(failing_key, failing_value)| {
            failing_key == key
                && (failing_value.is_none() || failing_value.as_deref() == value)
        });
        if blocked {
            return Err(Error::storage(format!("write to {} failed", key)));
        }
        Ok(())
    }
}

#[async_trait]
impl DurableStore for FlakyStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.check(key, Some(value))?;
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.check(key, None)?;
        self.inner.remove(key).await
    }
}

/// Orchestrator wired to in-memory fakes and a temp project directory.
///
/// Starts online, authenticated, with the clock at 2026-02-10T09:00:00Z.
pub(crate) struct Harness {
    pub dir: TempDir,
    pub store: Arc<FlakyStore>,
    pub records: Arc<CsvRecordStore>,
    pub catalog: Arc<ProjectCatalog>,
    pub transport: Arc<ScriptedTransport>,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub clock: Arc<ManualClock>,
    pub orchestrator: Arc<SyncOrchestrator>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(FlakyStore::default());
        let records = Arc::new(CsvRecordStore::new());
        let catalog = Arc::new(ProjectCatalog::new(store.clone()));
        let transport = Arc::new(ScriptedTransport::new());
        let connectivity = Arc::new(ConnectivityMonitor::new(true));
        let clock = Arc::new(ManualClock::new(ts("2026-02-10T09:00:00Z")));
        let orchestrator = Arc::new(
            SyncOrchestrator::new(
                store.clone(),
                records.clone(),
                catalog.clone(),
                transport.clone(),
                connectivity.clone(),
            )
            .with_clock(clock.clone()),
        );
        Self {
            dir,
            store,
            records,
            catalog,
            transport,
            connectivity,
            clock,
            orchestrator,
        }
    }

    /// Writes a project file and registers it against `remote_id`. Returns its file id.
    pub(crate) async fn project(&self, name: &str, remote_id: &str) -> String {
        let file_id = write_csv(self.dir.path(), name, PROJECT_CSV);
        self.catalog
            .save_project(ProjectFile {
                id: remote_id.to_string(),
                name: name.to_string(),
                local_path: file_id.clone(),
                downloaded_at: self.clock.now(),
            })
            .await
            .expect("register project");
        file_id
    }
}
