//! Durable queue of edits awaiting upload.
//!
//! The whole queue lives under a single store key as a JSON array and is
//! always read-modified-written as a unit under an in-process lock.

use log::debug;
use serde::de::IgnoredAny;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::sync_model::{ItemResult, PendingMutation};
use crate::errors::Result;
use crate::store::DurableStore;

pub struct MutationQueue {
    store: Arc<dyn DurableStore>,
    key: String,
    lock: Mutex<()>,
}

impl MutationQueue {
    pub fn new(store: Arc<dyn DurableStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<PendingMutation>> {
        match self.store.get(&self.key).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn persist(&self, entries: &[PendingMutation]) -> Result<()> {
        if entries.is_empty() {
            return self.store.remove(&self.key).await;
        }
        let raw = serde_json::to_string(entries)?;
        self.store.set(&self.key, &raw).await
    }

    /// Appends `mutation`, or replaces the entry already targeting the same record.
    pub async fn enqueue(&self, mutation: PendingMutation) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        match entries
            .iter_mut()
            .find(|entry| entry.targets(&mutation.file_id, &mutation.record_key))
        {
            Some(existing) => {
                debug!(
                    "[SyncQueue] Replacing queued edit for {}#{}",
                    mutation.file_id, mutation.record_key
                );
                *existing = mutation;
            }
            None => {
                debug!(
                    "[SyncQueue] Queued edit for {}#{}",
                    mutation.file_id, mutation.record_key
                );
                entries.push(mutation);
            }
        }
        self.persist(&entries).await
    }

    /// Snapshot of every queued entry in stored order. Nothing is removed.
    pub async fn dequeue_all(&self) -> Result<Vec<PendingMutation>> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    /// Overwrites the queue; an empty list deletes the key.
    pub async fn replace_with(&self, remaining: Vec<PendingMutation>) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.persist(&remaining).await
    }

    /// Number of queued entries, without decoding their payloads.
    pub async fn size(&self) -> Result<usize> {
        match self.store.get(&self.key).await? {
            Some(raw) => Ok(serde_json::from_str::<Vec<IgnoredAny>>(&raw)?.len()),
            None => Ok(0),
        }
    }

    /// Applies flush results against the current queue contents.
    ///
    /// Succeeded entries are dropped and failed ones get their retry
    /// bookkeeping bumped. Entries are matched by `mutation_id`, so an edit
    /// that replaced a flushed entry mid-flush stays queued untouched.
    /// Returns the number of entries left.
    pub async fn settle(&self, results: &[ItemResult]) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let by_id = results
            .iter()
            .map(|result| (result.mutation_id.as_str(), result.error.as_deref()))
            .collect::<HashMap<_, _>>();

        let remaining = self
            .load()
            .await?
            .into_iter()
            .filter_map(|mut entry| match by_id.get(entry.mutation_id.as_str()) {
                Some(None) => None,
                Some(Some(error)) => {
                    entry.retry_count = entry.retry_count.saturating_add(1);
                    entry.last_error = Some((*error).to_string());
                    Some(entry)
                }
                None => Some(entry),
            })
            .collect::<Vec<_>>();

        self.persist(&remaining).await?;
        Ok(remaining.len())
    }
}
