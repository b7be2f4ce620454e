//! Persisted orchestrator state: flushing flag, last attempt, outcome history.

use chrono::{DateTime, Utc};
use log::warn;
use std::sync::Arc;

use super::sync_model::SyncOutcome;
use super::sync_scheduler::SyncConfig;
use crate::errors::Result;
use crate::store::DurableStore;

pub struct SyncStateStore {
    store: Arc<dyn DurableStore>,
    config: SyncConfig,
}

impl SyncStateStore {
    pub fn new(store: Arc<dyn DurableStore>, config: SyncConfig) -> Self {
        Self { store, config }
    }

    pub async fn is_flushing(&self) -> Result<bool> {
        Ok(self
            .store
            .get(&self.config.processing_key)
            .await?
            .map(|value| value == "true")
            .unwrap_or(false))
    }

    pub async fn set_flushing(&self, flushing: bool) -> Result<()> {
        let value = if flushing { "true" } else { "false" };
        self.store.set(&self.config.processing_key, value).await
    }

    /// Last attempt timestamp. An unparseable value is treated as absent.
    pub async fn last_attempt(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.store.get(&self.config.last_attempt_key).await? else {
            return Ok(None);
        };
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(value) => Ok(Some(value.with_timezone(&Utc))),
            Err(err) => {
                warn!(
                    "[SyncOrchestrator] Ignoring unparseable last attempt '{}': {}",
                    raw, err
                );
                Ok(None)
            }
        }
    }

    pub async fn set_last_attempt(&self, at: DateTime<Utc>) -> Result<()> {
        self.store
            .set(&self.config.last_attempt_key, &at.to_rfc3339())
            .await
    }

    /// Outcomes, newest first.
    pub async fn history(&self) -> Result<Vec<SyncOutcome>> {
        match self.store.get(&self.config.history_key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Prepends `outcome`, evicting the oldest beyond the history limit.
    pub async fn push_outcome(&self, outcome: &SyncOutcome) -> Result<()> {
        let mut history = match self.history().await {
            Ok(history) => history,
            Err(err) => {
                warn!(
                    "[SyncOrchestrator] Resetting unreadable sync history: {}",
                    err
                );
                Vec::new()
            }
        };
        history.insert(0, outcome.clone());
        history.truncate(self.config.history_limit);
        let raw = serde_json::to_string(&history)?;
        self.store.set(&self.config.history_key, &raw).await
    }
}
