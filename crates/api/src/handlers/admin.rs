//! Admin handlers for the payment reconciliation queue.

use axum::extract::{Path, State};
use axum::Json;
use medq_core::error::CoreError;
use medq_core::types::DbId;
use medq_db::models::reconciliation::ReconciliationItem;
use medq_db::repositories::ReconciliationRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::actor::ActorClaim;
use crate::response::DataResponse;
use crate::state::AppState;

fn require_admin(actor: &ActorClaim) -> AppResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::Forbidden(
            "reconciliation is admin-only".into(),
        )))
    }
}

/// GET /api/v1/admin/reconciliation
///
/// Unresolved captured-but-unfulfilled payments, oldest first.
pub async fn list_reconciliation(
    actor: ActorClaim,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ReconciliationItem>>>> {
    require_admin(&actor)?;
    let items = ReconciliationRepo::list_open(&state.pool).await?;
    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/admin/reconciliation/{id}/resolve
pub async fn resolve_reconciliation(
    actor: ActorClaim,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ReconciliationItem>>> {
    require_admin(&actor)?;
    let item = ReconciliationRepo::resolve(&state.pool, id).await?;

    tracing::info!(
        actor_id = actor.actor_id,
        reconciliation_id = item.id,
        merchant_ref = %item.merchant_ref,
        "Reconciliation item resolved"
    );

    Ok(Json(DataResponse { data: item }))
}
