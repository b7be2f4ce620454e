//! Saves an edit locally, then uploads it now or leaves it for the next flush.

use log::{info, warn};
use std::sync::Arc;

use super::submission_model::{SubmissionResult, SubmitEditRequest};
use super::validation::validate_submission;
use crate::records::{RecordStoreTrait, RecordUpdate};
use crate::sync::{PendingMutation, SyncOrchestrator};

pub struct SubmissionService {
    records: Arc<dyn RecordStoreTrait>,
    orchestrator: Arc<SyncOrchestrator>,
}

impl SubmissionService {
    pub fn new(records: Arc<dyn RecordStoreTrait>, orchestrator: Arc<SyncOrchestrator>) -> Self {
        Self {
            records,
            orchestrator,
        }
    }

    pub async fn submit(&self, request: SubmitEditRequest) -> SubmissionResult {
        self.submit_edit(
            &request.file_id,
            &request.record_key,
            &request.payload,
            request.online,
        )
        .await
    }

    /// Applies `update` to the local file first. The result reports success
    /// as soon as the local write and any required enqueue succeeded.
    pub async fn submit_edit(
        &self,
        file_id: &str,
        record_key: &str,
        update: &RecordUpdate,
        online: bool,
    ) -> SubmissionResult {
        if let Err(err) = validate_submission(file_id, record_key, update) {
            return SubmissionResult::rejected(err.to_string());
        }

        if let Err(err) = self.records.update_record(file_id, record_key, update).await {
            warn!(
                "[Submission] Local save failed for {}#{}: {}",
                file_id, record_key, err
            );
            return SubmissionResult::rejected(format!("Failed to save: {}", err));
        }

        let mutation = PendingMutation::new(
            file_id,
            record_key,
            update.clone(),
            self.orchestrator.now(),
        );

        if !online {
            return match self.orchestrator.enqueue(mutation).await {
                Ok(()) => {
                    info!(
                        "[Submission] Queued {}#{} for later sync",
                        file_id, record_key
                    );
                    SubmissionResult::queued()
                }
                Err(err) => self.not_queued(file_id, record_key, &err.to_string()),
            };
        }

        match self.orchestrator.upload_file(file_id).await {
            Ok(_) => {
                info!("[Submission] Synced {}#{}", file_id, record_key);
                SubmissionResult::synced()
            }
            Err(upload_err) => {
                let upload_err = upload_err.to_string();
                warn!(
                    "[Submission] Upload failed for {}#{}, queueing: {}",
                    file_id, record_key, upload_err
                );
                match self
                    .orchestrator
                    .enqueue(mutation.with_error(upload_err.clone()))
                    .await
                {
                    Ok(()) => SubmissionResult::queued_after_failure(&upload_err),
                    Err(err) => self.not_queued(file_id, record_key, &err.to_string()),
                }
            }
        }
    }

    fn not_queued(&self, file_id: &str, record_key: &str, error: &str) -> SubmissionResult {
        warn!(
            "[Submission] Saved {}#{} locally but could not queue it: {}",
            file_id, record_key, error
        );
        SubmissionResult::local_only(error)
    }
}
