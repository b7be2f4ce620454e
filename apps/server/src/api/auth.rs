use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::put;
use axum::{Json, Router};
use fieldsync_core::transport::RemoteTransport;
use serde::Deserialize;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest {
    access_token: String,
}

async fn set_token(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TokenRequest>,
) -> ApiResult<StatusCode> {
    state.drive.set_access_token(&request.access_token).await?;
    tracing::info!("Drive access token updated");
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_token(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    state.drive.clear_access_token().await?;
    tracing::info!("Drive access token cleared");
    Ok(StatusCode::NO_CONTENT)
}

async fn token_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "authenticated": state.drive.is_authenticated().await }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(
        "/auth/token",
        put(set_token).delete(clear_token).get(token_status),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_state::offline_state;

    #[tokio::test]
    async fn token_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = offline_state(dir.path());

        let status = set_token(
            State(state.clone()),
            Json(TokenRequest {
                access_token: "ya29.token".to_string(),
            }),
        )
        .await
        .expect("set");
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.drive.is_authenticated().await);

        let err = set_token(
            State(state.clone()),
            Json(TokenRequest {
                access_token: " ".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        clear_token(State(state.clone())).await.expect("clear");
        let Json(body) = token_status(State(state)).await;
        assert_eq!(body["authenticated"], false);
    }
}
