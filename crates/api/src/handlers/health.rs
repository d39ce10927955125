//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /health
///
/// Returns 200 when the process is up and the database answers a ping.
pub async fn health(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    medq_db::health_check(&state.pool).await?;
    Ok(Json(json!({ "status": "ok" })))
}
