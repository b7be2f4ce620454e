use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use fieldsync_core::sync::Connectivity;
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectivityUpdate {
    reachable: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConnectivityState {
    reachable: bool,
    changed: bool,
}

/// Host-side network notifications (e.g. the OS reporting a reconnect).
async fn report_connectivity(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ConnectivityUpdate>,
) -> Json<ConnectivityState> {
    let changed = state.connectivity.set_reachable(update.reachable);
    Json(ConnectivityState {
        reachable: state.connectivity.is_reachable(),
        changed,
    })
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/connectivity", post(report_connectivity))
}
