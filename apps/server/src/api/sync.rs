use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use fieldsync_core::sync::{SyncOutcome, SyncStatus};

use crate::error::ApiResult;
use crate::state::AppState;

async fn get_sync_status(State(state): State<Arc<AppState>>) -> ApiResult<Json<SyncStatus>> {
    Ok(Json(state.orchestrator.get_sync_status().await?))
}

async fn get_sync_history(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<SyncOutcome>>> {
    Ok(Json(state.orchestrator.get_sync_history().await?))
}

/// `null` when there was nothing to flush or a flush is already running.
async fn force_sync(State(state): State<Arc<AppState>>) -> ApiResult<Json<Option<SyncOutcome>>> {
    Ok(Json(state.orchestrator.force_sync().await?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sync/status", get(get_sync_status))
        .route("/sync/history", get(get_sync_history))
        .route("/sync/force", post(force_sync))
}
