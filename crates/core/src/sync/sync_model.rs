//! Queue and sync outcome domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::records::RecordUpdate;

/// An edit waiting to be pushed to the remote copy of its file.
///
/// At most one entry per `(file_id, record_key)` is retained in the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingMutation {
    pub mutation_id: String,
    pub file_id: String,
    pub record_key: String,
    pub payload: RecordUpdate,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub retry_count: u32,
    #[serde(default)]
    pub last_error: Option<String>,
}

impl PendingMutation {
    pub fn new(
        file_id: impl Into<String>,
        record_key: impl Into<String>,
        payload: RecordUpdate,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            mutation_id: Uuid::now_v7().to_string(),
            file_id: file_id.into(),
            record_key: record_key.into(),
            payload,
            created_at,
            retry_count: 0,
            last_error: None,
        }
    }

    /// Records an upload failure that happened before the entry was queued.
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.last_error = Some(message.into());
        self
    }

    /// Dedup identity within the queue.
    pub fn targets(&self, file_id: &str, record_key: &str) -> bool {
        self.file_id == file_id && self.record_key == record_key
    }
}

/// What started a flush attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncTrigger {
    Startup,
    ConnectivityRestored,
    Periodic,
    Manual,
    Submission,
}

/// Terminal state of one flush attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcomeState {
    Success,
    PartialFailure,
    HardFailure,
}

/// Immutable summary of one completed flush attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub timestamp: DateTime<Utc>,
    pub success: bool,
    pub items_processed: usize,
    pub items_succeeded: usize,
    pub items_failed: usize,
    pub errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<SyncTrigger>,
}

impl SyncOutcome {
    /// Outcome built from per-item upload results.
    pub fn from_items(
        timestamp: DateTime<Utc>,
        trigger: SyncTrigger,
        items: &[ItemResult],
    ) -> Self {
        let succeeded = items.iter().filter(|item| item.error.is_none()).count();
        let errors = items
            .iter()
            .filter_map(|item| item.error.clone())
            .collect::<Vec<_>>();
        Self {
            timestamp,
            success: errors.is_empty(),
            items_processed: items.len(),
            items_succeeded: succeeded,
            items_failed: items.len() - succeeded,
            errors,
            trigger: Some(trigger),
        }
    }

    /// Credentials were missing: nothing was attempted, every queued item counts as failed.
    pub fn unauthenticated(
        timestamp: DateTime<Utc>,
        trigger: SyncTrigger,
        queued: usize,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            success: false,
            items_processed: 0,
            items_succeeded: 0,
            items_failed: queued,
            errors: vec![message.into()],
            trigger: Some(trigger),
        }
    }

    /// The attempt broke down before per-item results could be aggregated.
    pub fn hard_failure(
        timestamp: DateTime<Utc>,
        trigger: SyncTrigger,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            success: false,
            items_processed: 0,
            items_succeeded: 0,
            items_failed: 0,
            errors: vec![message.into()],
            trigger: Some(trigger),
        }
    }

    pub fn state(&self) -> SyncOutcomeState {
        if self.success {
            SyncOutcomeState::Success
        } else if self.items_processed > 0 {
            SyncOutcomeState::PartialFailure
        } else {
            SyncOutcomeState::HardFailure
        }
    }
}

/// Result of pushing one queued entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemResult {
    pub mutation_id: String,
    pub error: Option<String>,
}

/// In-process orchestrator phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Idle,
    Flushing,
}

/// Snapshot for UI badges and polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub pending_count: usize,
    pub is_processing: bool,
    pub last_attempt_at: Option<DateTime<Utc>>,
}
