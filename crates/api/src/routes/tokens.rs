//! Route definitions for the `/tokens` resource.

use axum::routing::{patch, post};
use axum::Router;

use crate::handlers::tokens;
use crate::state::AppState;

/// Routes mounted at `/tokens`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/walkin", post(tokens::register_walk_in))
        .route("/offline", post(tokens::issue_offline))
        .route("/{id}/status", patch(tokens::update_status))
}
