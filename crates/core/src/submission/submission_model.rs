use serde::{Deserialize, Serialize};

use crate::records::RecordUpdate;

pub const MESSAGE_SYNCED: &str = "Saved and synced";
pub const MESSAGE_QUEUED: &str = "Saved locally, will sync when online";
pub const MESSAGE_SYNC_FAILED_PREFIX: &str = "Saved locally, cloud sync failed, will retry";

/// An edit submitted from the field form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitEditRequest {
    pub file_id: String,
    pub record_key: String,
    pub payload: RecordUpdate,
    pub online: bool,
}

/// Where a submitted edit ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionDisposition {
    /// Written locally and uploaded immediately.
    Synced,
    /// Written locally and queued without trying the network.
    Queued,
    /// Written locally, the immediate upload failed, queued for retry.
    QueuedAfterFailure,
    /// Written locally but could not be queued.
    LocalOnly,
    /// Nothing was written.
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub success: bool,
    pub message: String,
    pub disposition: SubmissionDisposition,
}

impl SubmissionResult {
    pub fn synced() -> Self {
        Self {
            success: true,
            message: MESSAGE_SYNCED.to_string(),
            disposition: SubmissionDisposition::Synced,
        }
    }

    pub fn queued() -> Self {
        Self {
            success: true,
            message: MESSAGE_QUEUED.to_string(),
            disposition: SubmissionDisposition::Queued,
        }
    }

    pub fn queued_after_failure(error: &str) -> Self {
        Self {
            success: true,
            message: format!("{}: {}", MESSAGE_SYNC_FAILED_PREFIX, error),
            disposition: SubmissionDisposition::QueuedAfterFailure,
        }
    }

    pub fn local_only(error: &str) -> Self {
        Self {
            success: false,
            message: format!(
                "Saved locally, but the edit could not be queued for sync: {}",
                error
            ),
            disposition: SubmissionDisposition::LocalOnly,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            disposition: SubmissionDisposition::Rejected,
        }
    }
}
