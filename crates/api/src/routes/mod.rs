pub mod admin;
pub mod booking;
pub mod health;
pub mod providers;
pub mod tokens;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /providers/{id}/availability            list upcoming days
/// /providers/{id}/availability/{date}     set capacity (PUT), display read (GET)
/// /providers/{id}/tokens/{date}           day's token list in queue order
///
/// /bookings/intents                       create payment intent (POST)
/// /bookings/intents/{merchant_ref}        intent status (GET)
/// /bookings/gateway/webhook               signed gateway callback (POST)
///
/// /tokens/walkin                          walk-in intake (POST)
/// /tokens/offline                         admin offline issuance (POST)
/// /tokens/{id}/status                     lifecycle transition (PATCH)
///
/// /admin/reconciliation                   unresolved captured payments
/// /admin/reconciliation/{id}/resolve      mark handled (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/providers", providers::router())
        .nest("/bookings", booking::router())
        .nest("/tokens", tokens::router())
        .nest("/admin", admin::router())
}
