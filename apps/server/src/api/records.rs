use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use fieldsync_core::records::{Record, RecordStoreTrait};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordQuery {
    file_id: String,
    key: String,
}

async fn read_record(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecordQuery>,
) -> ApiResult<Json<Record>> {
    Ok(Json(state.records.read_record(&query.file_id, &query.key).await?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/records", get(read_record))
}
