//! Route definitions for the `/admin` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`. All require the `admin` role (enforced by
/// the handlers).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reconciliation", get(admin::list_reconciliation))
        .route(
            "/reconciliation/{id}/resolve",
            post(admin::resolve_reconciliation),
        )
}
