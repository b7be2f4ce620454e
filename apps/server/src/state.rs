//! Service wiring shared by every request handler.

use std::sync::Arc;

use fieldsync_core::clock::SystemClock;
use fieldsync_core::projects::{ProjectCatalog, ProjectService};
use fieldsync_core::records::CsvRecordStore;
use fieldsync_core::store::DurableStore;
use fieldsync_core::submission::SubmissionService;
use fieldsync_core::sync::{ConnectivityMonitor, ConnectivityWatcher, SyncConfig, SyncOrchestrator};
use fieldsync_drive::{DriveClient, DriveTransport};
use fieldsync_storage_sqlite::SqliteKvStore;

use crate::config::ServerConfig;

pub struct AppState {
    pub records: Arc<CsvRecordStore>,
    pub orchestrator: Arc<SyncOrchestrator>,
    pub submissions: SubmissionService,
    pub projects: ProjectService,
    pub connectivity: Arc<ConnectivityMonitor>,
    pub watcher: ConnectivityWatcher,
    pub drive: Arc<DriveTransport>,
}

pub fn build_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let (pool, writer) = fieldsync_storage_sqlite::init(&config.data_dir)?;
    let store: Arc<dyn DurableStore> = Arc::new(SqliteKvStore::new(pool, writer));

    let client = DriveClient::with_urls(&config.drive_api_url, &config.drive_upload_url)?;
    let drive = Arc::new(DriveTransport::new(client, store.clone()));
    let records = Arc::new(CsvRecordStore::new());
    let catalog = Arc::new(ProjectCatalog::new(store.clone()));
    let clock = Arc::new(SystemClock);
    // Optimistic until the probe or the host says otherwise.
    let connectivity = Arc::new(ConnectivityMonitor::new(true));

    let mut sync_config = SyncConfig::default();
    if let Some(cooldown) = config.sync_cooldown {
        sync_config = sync_config.with_cooldown(cooldown);
    }
    let orchestrator = Arc::new(
        SyncOrchestrator::new(
            store,
            records.clone(),
            catalog.clone(),
            drive.clone(),
            connectivity.clone(),
        )
        .with_config(sync_config)
        .with_clock(clock.clone()),
    );

    Ok(Arc::new(AppState {
        submissions: SubmissionService::new(records.clone(), orchestrator.clone()),
        projects: ProjectService::new(
            catalog,
            records.clone(),
            drive.clone(),
            clock,
            config.projects_dir(),
        ),
        watcher: ConnectivityWatcher::new(connectivity.clone(), orchestrator.clone()),
        records,
        orchestrator,
        connectivity,
        drive,
    }))
}
