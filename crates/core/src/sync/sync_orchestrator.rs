//! Flush orchestration: decides when to drain the mutation queue and records outcomes.

use futures::FutureExt;
use log::{debug, error, info, warn};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::connectivity::Connectivity;
use super::mutation_queue::MutationQueue;
use super::sync_model::{
    ItemResult, PendingMutation, SyncOutcome, SyncPhase, SyncStatus, SyncTrigger,
};
use super::sync_scheduler::SyncConfig;
use super::sync_state::SyncStateStore;
use crate::clock::{Clock, SystemClock};
use crate::errors::{Error, Result};
use crate::projects::ProjectCatalog;
use crate::records::RecordStoreTrait;
use crate::store::DurableStore;
use crate::transport::{RemoteTransport, UploadReceipt};

pub const NOT_AUTHENTICATED_MESSAGE: &str = "Not authenticated with Google Drive";

/// Owns the mutation queue and the persisted sync state.
///
/// The persisted flushing flag is the mutual exclusion for a flush. It is
/// claimed under `claim_lock` and cleared on every exit path of an attempt.
/// A persisted flag found while `flushing` is false belongs to a run that
/// died mid-flush and is cleared.
pub struct SyncOrchestrator {
    store: Arc<dyn DurableStore>,
    records: Arc<dyn RecordStoreTrait>,
    catalog: Arc<ProjectCatalog>,
    transport: Arc<dyn RemoteTransport>,
    connectivity: Arc<dyn Connectivity>,
    clock: Arc<dyn Clock>,
    config: SyncConfig,
    queue: MutationQueue,
    state: SyncStateStore,
    claim_lock: Mutex<()>,
    flushing: AtomicBool,
}

impl SyncOrchestrator {
    pub fn new(
        store: Arc<dyn DurableStore>,
        records: Arc<dyn RecordStoreTrait>,
        catalog: Arc<ProjectCatalog>,
        transport: Arc<dyn RemoteTransport>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        let config = SyncConfig::default();
        Self {
            queue: MutationQueue::new(store.clone(), config.queue_key.clone()),
            state: SyncStateStore::new(store.clone(), config.clone()),
            store,
            records,
            catalog,
            transport,
            connectivity,
            clock: Arc::new(SystemClock),
            config,
            claim_lock: Mutex::new(()),
            flushing: AtomicBool::new(false),
        }
    }

    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.queue = MutationQueue::new(self.store.clone(), config.queue_key.clone());
        self.state = SyncStateStore::new(self.store.clone(), config.clone());
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock.now()
    }

    /// Startup reconciliation: clears a flushing flag left behind by a killed process.
    ///
    /// Returns whether a stale flag was found.
    pub async fn init(&self) -> Result<bool> {
        if self.flushing.load(Ordering::SeqCst) || !self.state.is_flushing().await? {
            return Ok(false);
        }
        warn!("[SyncOrchestrator] Clearing stale flushing flag left by a previous run");
        self.state.set_flushing(false).await?;
        Ok(true)
    }

    pub fn phase(&self) -> SyncPhase {
        if self.flushing.load(Ordering::SeqCst) {
            SyncPhase::Flushing
        } else {
            SyncPhase::Idle
        }
    }

    /// Queues an edit for the next flush, replacing any entry for the same record.
    pub async fn enqueue(&self, mutation: PendingMutation) -> Result<()> {
        self.queue.enqueue(mutation).await
    }

    pub async fn pending_mutations(&self) -> Result<Vec<PendingMutation>> {
        self.queue.dequeue_all().await
    }

    /// Uploads the current local copy of `file_id` to its registered remote file.
    pub async fn upload_file(&self, file_id: &str) -> Result<UploadReceipt> {
        let remote_id = self
            .catalog
            .resolve_remote_id(file_id)
            .await?
            .ok_or_else(|| Error::file_unavailable(file_id, "No remote file registered"))?;
        let content = self.records.read_contents(file_id).await?;
        self.transport.upload(&remote_id, &content).await
    }

    pub async fn force_sync(&self) -> Result<Option<SyncOutcome>> {
        self.attempt_sync_with_trigger(true, SyncTrigger::Manual).await
    }

    pub async fn attempt_sync(&self, force: bool) -> Result<Option<SyncOutcome>> {
        let trigger = if force {
            SyncTrigger::Manual
        } else {
            SyncTrigger::Periodic
        };
        self.attempt_sync_with_trigger(force, trigger).await
    }

    /// Runs one flush attempt if nothing prevents it.
    ///
    /// Returns `Ok(None)` when the attempt is skipped (already flushing, no
    /// network, cooldown, empty queue). Store errors while deciding are
    /// returned before anything is claimed; once claimed, every failure ends
    /// as an outcome in history and the flag is released.
    pub async fn attempt_sync_with_trigger(
        &self,
        force: bool,
        trigger: SyncTrigger,
    ) -> Result<Option<SyncOutcome>> {
        let queued = {
            let _claim = self.claim_lock.lock().await;

            if self.flushing.load(Ordering::SeqCst) {
                debug!("[SyncOrchestrator] Sync already in progress, skipping");
                return Ok(None);
            }
            if self.state.is_flushing().await? {
                // No flush runs in this process, so the persisted flag is a leftover.
                warn!("[SyncOrchestrator] Clearing stale flushing flag");
                self.state.set_flushing(false).await?;
            }

            if !self.connectivity.is_reachable() {
                debug!("[SyncOrchestrator] No connectivity, skipping sync");
                return Ok(None);
            }

            if !force {
                if let Some(last_attempt) = self.state.last_attempt().await? {
                    let elapsed = self.clock.now() - last_attempt;
                    if !self.config.cooldown_elapsed(elapsed) {
                        debug!(
                            "[SyncOrchestrator] Sync attempted {}s ago, skipping",
                            elapsed.num_seconds()
                        );
                        return Ok(None);
                    }
                }
            }

            let queued = self.queue.size().await?;
            if queued == 0 {
                debug!("[SyncOrchestrator] No items to sync");
                return Ok(None);
            }

            self.flushing.store(true, Ordering::SeqCst);
            queued
        };

        let body = AssertUnwindSafe(self.flush(trigger, queued))
            .catch_unwind()
            .await;
        let outcome = match body {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => {
                error!("[SyncOrchestrator] Sync attempt failed: {}", err);
                SyncOutcome::hard_failure(self.clock.now(), trigger, err.to_string())
            }
            Err(_) => {
                error!("[SyncOrchestrator] Sync attempt panicked");
                SyncOutcome::hard_failure(
                    self.clock.now(),
                    trigger,
                    "Sync attempt aborted unexpectedly",
                )
            }
        };

        if let Err(err) = self.state.push_outcome(&outcome).await {
            warn!("[SyncOrchestrator] Failed to record sync outcome: {}", err);
        }
        self.release().await;
        Ok(Some(outcome))
    }

    async fn flush(&self, trigger: SyncTrigger, queued: usize) -> Result<SyncOutcome> {
        self.state.set_flushing(true).await?;
        self.state.set_last_attempt(self.clock.now()).await?;
        info!("[SyncOrchestrator] Starting sync for {} items", queued);

        if !self.transport.is_authenticated().await {
            warn!("[SyncOrchestrator] Not authenticated, leaving {} items queued", queued);
            return Ok(SyncOutcome::unauthenticated(
                self.clock.now(),
                trigger,
                queued,
                NOT_AUTHENTICATED_MESSAGE,
            ));
        }

        let entries = self.queue.dequeue_all().await?;
        let mut results = Vec::with_capacity(entries.len());
        for entry in &entries {
            let error = match self.upload_file(&entry.file_id).await {
                Ok(receipt) => {
                    debug!(
                        "[SyncOrchestrator] Uploaded {}#{} -> {} ({})",
                        entry.file_id, entry.record_key, receipt.remote_id, receipt.status
                    );
                    None
                }
                Err(err) => {
                    warn!(
                        "[SyncOrchestrator] Upload failed for {}#{}: {}",
                        entry.file_id, entry.record_key, err
                    );
                    Some(format!("{}#{}: {}", entry.file_id, entry.record_key, err))
                }
            };
            results.push(ItemResult {
                mutation_id: entry.mutation_id.clone(),
                error,
            });
        }

        let remaining = self.queue.settle(&results).await?;
        let outcome = SyncOutcome::from_items(self.clock.now(), trigger, &results);
        info!(
            "[SyncOrchestrator] Sync completed: {}/{} items succeeded, {} still queued",
            outcome.items_succeeded, outcome.items_processed, remaining
        );
        Ok(outcome)
    }

    /// Clears the flushing flag. A failed clear is retried once and otherwise
    /// left for the next attempt to reclaim.
    async fn release(&self) {
        let mut cleared = self.state.set_flushing(false).await;
        if cleared.is_err() {
            cleared = self.state.set_flushing(false).await;
        }
        if let Err(err) = cleared {
            error!(
                "[SyncOrchestrator] Failed to clear flushing flag, next attempt will reclaim it: {}",
                err
            );
        }
        self.flushing.store(false, Ordering::SeqCst);
    }

    pub async fn get_sync_status(&self) -> Result<SyncStatus> {
        let pending_count = self.queue.size().await?;
        let is_processing =
            self.flushing.load(Ordering::SeqCst) || self.state.is_flushing().await?;
        let last_attempt_at = self.state.last_attempt().await?;
        Ok(SyncStatus {
            pending_count,
            is_processing,
            last_attempt_at,
        })
    }

    /// Outcomes of recent attempts, newest first.
    pub async fn get_sync_history(&self) -> Result<Vec<SyncOutcome>> {
        self.state.history().await
    }
}
