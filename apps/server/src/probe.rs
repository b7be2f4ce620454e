//! Background reachability probe and periodic flush retry.

use std::sync::Arc;
use std::time::Duration;

use fieldsync_core::sync::SyncTrigger;
use tokio::task::JoinHandle;

use crate::state::AppState;

/// Pings the Drive API every `interval`, feeding the connectivity monitor.
///
/// While reachable, each tick also offers the orchestrator a non-forced
/// flush so failed items are retried once the cooldown has passed.
pub fn spawn_probe(state: Arc<AppState>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let reachable = state.drive.client().ping().await;
            state.connectivity.set_reachable(reachable);
            if !reachable {
                continue;
            }
            match state
                .orchestrator
                .attempt_sync_with_trigger(false, SyncTrigger::Periodic)
                .await
            {
                Ok(Some(outcome)) => tracing::info!(
                    "Periodic sync: {} of {} items succeeded",
                    outcome.items_succeeded,
                    outcome.items_processed
                ),
                Ok(None) => {}
                Err(err) => tracing::warn!("Periodic sync failed: {}", err),
            }
        }
    })
}
