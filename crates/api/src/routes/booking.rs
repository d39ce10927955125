//! Route definitions for the `/bookings` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::booking;
use crate::state::AppState;

/// Routes mounted at `/bookings`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/intents", post(booking::create_intent))
        .route("/intents/{merchant_ref}", get(booking::get_intent))
        .route("/gateway/webhook", post(booking::gateway_webhook))
}
