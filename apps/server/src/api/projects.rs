use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use fieldsync_core::projects::ProjectFile;
use fieldsync_drive::DriveFile;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DownloadRequest {
    remote_id: String,
    name: String,
}

async fn list_projects(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<ProjectFile>>> {
    Ok(Json(state.projects.list_projects().await?))
}

async fn list_remote_files(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<DriveFile>>> {
    Ok(Json(state.drive.list_csv_files().await?))
}

async fn download_project(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DownloadRequest>,
) -> ApiResult<Json<ProjectFile>> {
    let project = state
        .projects
        .download_project(&request.remote_id, &request.name)
        .await?;
    Ok(Json(project))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/projects", get(list_projects))
        .route("/projects/remote", get(list_remote_files))
        .route("/projects/download", post(download_project))
}
