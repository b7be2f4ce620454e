//! HTTP routes for the field app.

mod auth;
mod connectivity;
mod projects;
mod records;
mod submissions;
mod sync;

use std::sync::Arc;

use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(submissions::router())
        .merge(records::router())
        .merge(sync::router())
        .merge(connectivity::router())
        .merge(auth::router())
        .merge(projects::router())
        .with_state(state)
}
