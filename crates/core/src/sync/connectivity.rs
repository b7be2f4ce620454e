//! Network reachability and the watcher that turns reconnects into flushes.

use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

use super::sync_model::SyncTrigger;
use super::sync_orchestrator::SyncOrchestrator;

/// Source of reachability state and change notifications.
pub trait Connectivity: Send + Sync {
    fn is_reachable(&self) -> bool;

    /// Receiver observing every reachability change from now on.
    fn subscribe(&self) -> watch::Receiver<bool>;
}

/// In-process reachability state fed by the host (platform callbacks, probes).
pub struct ConnectivityMonitor {
    tx: watch::Sender<bool>,
}

impl ConnectivityMonitor {
    pub fn new(reachable: bool) -> Self {
        let (tx, _) = watch::channel(reachable);
        Self { tx }
    }

    /// Records the latest reachability. Returns true when the value changed.
    pub fn set_reachable(&self, reachable: bool) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == reachable {
                return false;
            }
            *current = reachable;
            true
        });
        if changed {
            info!(
                "[Connectivity] Network is now {}",
                if reachable { "reachable" } else { "unreachable" }
            );
        }
        changed
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Connectivity for ConnectivityMonitor {
    fn is_reachable(&self) -> bool {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

struct WatcherTasks {
    watch: JoinHandle<()>,
    consumer: JoinHandle<()>,
}

impl WatcherTasks {
    fn is_running(&self) -> bool {
        !self.watch.is_finished() && !self.consumer.is_finished()
    }

    fn abort(self) {
        self.watch.abort();
        self.consumer.abort();
    }
}

/// Triggers a non-forced flush whenever the network comes back.
///
/// Reachability edges are forwarded as messages to a single consumer task,
/// so flush attempts never run inside the notification path.
pub struct ConnectivityWatcher {
    connectivity: Arc<dyn Connectivity>,
    orchestrator: Arc<SyncOrchestrator>,
    tasks: Mutex<Option<WatcherTasks>>,
}

impl ConnectivityWatcher {
    pub fn new(connectivity: Arc<dyn Connectivity>, orchestrator: Arc<SyncOrchestrator>) -> Self {
        Self {
            connectivity,
            orchestrator,
            tasks: Mutex::new(None),
        }
    }

    /// Installs the subscription. Calling it again while running is a no-op.
    ///
    /// Returns whether a new subscription was installed.
    pub async fn initialize(&self) -> bool {
        let mut guard = self.tasks.lock().await;
        if let Some(tasks) = guard.take() {
            if tasks.is_running() {
                *guard = Some(tasks);
                return false;
            }
            tasks.abort();
        }

        let (trigger_tx, mut trigger_rx) = mpsc::channel::<SyncTrigger>(8);
        let mut reachability = self.connectivity.subscribe();
        // Baseline is taken here so an edge before the task first runs is still seen.
        let mut was_reachable = *reachability.borrow_and_update();

        let watch = tokio::spawn(async move {
            while reachability.changed().await.is_ok() {
                let reachable = *reachability.borrow_and_update();
                if reachable && !was_reachable {
                    debug!("[Connectivity] Network restored, requesting sync");
                    if trigger_tx.send(SyncTrigger::ConnectivityRestored).await.is_err() {
                        break;
                    }
                }
                was_reachable = reachable;
            }
            debug!("[Connectivity] Reachability source closed");
        });

        let orchestrator = Arc::clone(&self.orchestrator);
        let consumer = tokio::spawn(async move {
            while let Some(trigger) = trigger_rx.recv().await {
                match orchestrator.attempt_sync_with_trigger(false, trigger).await {
                    Ok(Some(outcome)) => debug!(
                        "[Connectivity] Reconnect sync finished: {} of {} succeeded",
                        outcome.items_succeeded, outcome.items_processed
                    ),
                    Ok(None) => debug!("[Connectivity] Reconnect sync skipped"),
                    Err(err) => warn!("[Connectivity] Reconnect sync failed: {}", err),
                }
            }
        });

        *guard = Some(WatcherTasks { watch, consumer });
        info!("[Connectivity] Watching network reachability");
        true
    }

    /// Removes the subscription. `initialize()` may be called again afterwards.
    pub async fn teardown(&self) {
        if let Some(tasks) = self.tasks.lock().await.take() {
            tasks.abort();
            info!("[Connectivity] Stopped watching network reachability");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.tasks
            .lock()
            .await
            .as_ref()
            .is_some_and(WatcherTasks::is_running)
    }
}
