//! Route definitions for the `/providers` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{availability, tokens};
use crate::state::AppState;

/// Routes mounted at `/providers`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/availability", get(availability::list_availability))
        .route(
            "/{id}/availability/{date}",
            get(availability::get_availability).put(availability::set_capacity),
        )
        .route("/{id}/tokens/{date}", get(tokens::list_for_date))
}
