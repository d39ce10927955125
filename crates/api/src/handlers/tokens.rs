//! Handlers for token issuance (walk-in, admin offline) and the status
//! lifecycle.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use medq_core::error::CoreError;
use medq_core::roles::ROLE_FRONTDESK;
use medq_core::source::SOURCE_OFFLINE;
use medq_core::types::{Day, DbId};
use medq_db::models::patient::WalkInRequest;
use medq_db::models::token::{IssueToken, OfflineIssueRequest, Token, UpdateStatusRequest};
use medq_db::repositories::{AvailabilityRepo, TokenRepo};
use medq_events::QueueEvent;
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::authorize_provider_actor;
use crate::middleware::actor::ActorClaim;
use crate::response::DataResponse;
use crate::services::intake::LocalIntakeService;
use crate::state::AppState;

/// A day's token list plus the derived "now serving" position.
#[derive(Debug, Serialize)]
pub struct DayTokens {
    pub tokens: Vec<Token>,
    pub in_progress_position: Option<i32>,
}

/// GET /api/v1/providers/{id}/tokens/{date}
///
/// Tokens in queue order. Read-only, lock-free.
pub async fn list_for_date(
    State(state): State<AppState>,
    Path((provider_id, for_date)): Path<(DbId, Day)>,
) -> AppResult<Json<DataResponse<DayTokens>>> {
    let tokens = TokenRepo::list_for_date(&state.pool, provider_id, for_date).await?;

    let in_progress_position = AvailabilityRepo::find(&state.pool, provider_id, for_date)
        .await?
        .and_then(|record| record.in_progress_position());

    Ok(Json(DataResponse {
        data: DayTokens {
            tokens,
            in_progress_position,
        },
    }))
}

/// POST /api/v1/tokens/walkin
///
/// Front-desk walk-in intake: resolve/create the patient, then issue.
pub async fn register_walk_in(
    actor: ActorClaim,
    State(state): State<AppState>,
    Json(input): Json<WalkInRequest>,
) -> AppResult<impl IntoResponse> {
    if !(actor.is_admin() || actor.has_role(ROLE_FRONTDESK)) {
        // Providers may also register walk-ins for their own queue.
        authorize_provider_actor(&state, &actor, input.provider_id).await?;
    }

    let (patient, token) = LocalIntakeService::register_walk_in(&state, &input).await?;

    tracing::info!(
        actor_id = actor.actor_id,
        patient_id = patient.id,
        token_id = token.id,
        queue_position = token.queue_position,
        "Walk-in registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: serde_json::json!({ "patient": patient, "token": token }),
        }),
    ))
}

/// POST /api/v1/tokens/offline
///
/// Admin-created offline booking for an existing patient. No payment.
pub async fn issue_offline(
    actor: ActorClaim,
    State(state): State<AppState>,
    Json(input): Json<OfflineIssueRequest>,
) -> AppResult<impl IntoResponse> {
    if !actor.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "offline issuance is admin-only".into(),
        )));
    }
    input.validate()?;

    let token = TokenRepo::issue(
        &state.pool,
        &IssueToken {
            provider_id: input.provider_id,
            patient_id: input.patient_id,
            for_date: input.for_date,
            source: SOURCE_OFFLINE,
            note: input.note.clone(),
            payment_ref: None,
        },
    )
    .await?;

    state.event_bus.publish(
        QueueEvent::new("token.issued")
            .with_provider(token.provider_id)
            .with_patient(token.patient_id)
            .with_payload(serde_json::json!({
                "token_id": token.id,
                "queue_position": token.queue_position,
                "for_date": token.for_date,
                "source": token.source,
            })),
    );

    tracing::info!(
        actor_id = actor.actor_id,
        token_id = token.id,
        queue_position = token.queue_position,
        "Offline token issued"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: token })))
}

/// PATCH /api/v1/tokens/{id}/status
///
/// Apply a lifecycle transition. Permitted for the token's own provider,
/// an authorized manager of that provider, or an admin. Repeating the
/// current terminal status is a no-op.
pub async fn update_status(
    actor: ActorClaim,
    State(state): State<AppState>,
    Path(token_id): Path<DbId>,
    Json(input): Json<UpdateStatusRequest>,
) -> AppResult<Json<DataResponse<Token>>> {
    let token = TokenRepo::find_by_id(&state.pool, token_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Token", token_id))?;

    authorize_provider_actor(&state, &actor, token.provider_id).await?;

    let update = TokenRepo::update_status(&state.pool, token_id, &input).await?;

    if update.changed {
        state.event_bus.publish(
            QueueEvent::new("token.status_changed")
                .with_provider(update.token.provider_id)
                .with_patient(update.token.patient_id)
                .with_payload(serde_json::json!({
                    "token_id": update.token.id,
                    "status": input.status,
                    "queue_position": update.token.queue_position,
                })),
        );
    }

    Ok(Json(DataResponse { data: update.token }))
}
