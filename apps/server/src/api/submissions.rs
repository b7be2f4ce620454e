use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use fieldsync_core::submission::{SubmissionResult, SubmitEditRequest};

use crate::state::AppState;

async fn submit_edit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitEditRequest>,
) -> Json<SubmissionResult> {
    Json(state.submissions.submit(request).await)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/submissions", post(submit_edit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_state::{offline_state, write_project};
    use fieldsync_core::records::{MutableField, RecordUpdate};
    use fieldsync_core::submission::SubmissionDisposition;

    #[tokio::test]
    async fn offline_edit_is_saved_and_queued() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = offline_state(dir.path());
        let file_id = write_project(dir.path());

        let Json(result) = submit_edit(
            State(state.clone()),
            Json(SubmitEditRequest {
                file_id,
                record_key: "TP-7".to_string(),
                payload: RecordUpdate::new().with(MutableField::RoadWidthTotal, "6.2"),
                online: false,
            }),
        )
        .await;

        assert!(result.success);
        assert_eq!(result.disposition, SubmissionDisposition::Queued);
        let status = state.orchestrator.get_sync_status().await.expect("status");
        assert_eq!(status.pending_count, 1);
    }
}
