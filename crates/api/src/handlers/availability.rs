//! Handlers for per-provider daily capacity.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use medq_core::error::CoreError;
use medq_core::types::{Day, DbId};
use medq_db::models::availability::{AvailabilityRecord, SetCapacityRequest};
use medq_db::repositories::AvailabilityRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::handlers::authorize_provider_actor;
use crate::middleware::actor::ActorClaim;
use crate::response::DataResponse;
use crate::state::AppState;

/// Availability record plus the derived "now serving" position.
#[derive(Debug, Serialize)]
pub struct AvailabilityView {
    #[serde(flatten)]
    pub record: AvailabilityRecord,
    /// `completed_count + 1` while the day has unserved tokens. Derived,
    /// never persisted.
    pub in_progress_position: Option<i32>,
}

impl From<AvailabilityRecord> for AvailabilityView {
    fn from(record: AvailabilityRecord) -> Self {
        let in_progress_position = record.in_progress_position();
        Self {
            record,
            in_progress_position,
        }
    }
}

/// PUT /api/v1/providers/{id}/availability/{date}
///
/// Create or update the capacity record. Capacity may never shrink below
/// the slots already issued.
pub async fn set_capacity(
    actor: ActorClaim,
    State(state): State<AppState>,
    Path((provider_id, for_date)): Path<(DbId, Day)>,
    Json(input): Json<SetCapacityRequest>,
) -> AppResult<Json<DataResponse<AvailabilityView>>> {
    authorize_provider_actor(&state, &actor, provider_id).await?;
    input.validate()?;

    let record = AvailabilityRepo::set_capacity(&state.pool, provider_id, for_date, &input).await?;

    tracing::info!(
        actor_id = actor.actor_id,
        provider_id,
        for_date = %for_date,
        total_capacity = record.total_capacity,
        accepting = record.accepting,
        on_leave = record.on_leave,
        "Capacity set"
    );

    Ok(Json(DataResponse {
        data: record.into(),
    }))
}

/// GET /api/v1/providers/{id}/availability/{date}
///
/// Lock-free display read; may be stale relative to in-flight issuances.
pub async fn get_availability(
    State(state): State<AppState>,
    Path((provider_id, for_date)): Path<(DbId, Day)>,
) -> AppResult<Json<DataResponse<AvailabilityView>>> {
    let record = AvailabilityRepo::find(&state.pool, provider_id, for_date)
        .await?
        .ok_or_else(|| {
            CoreError::not_found("Availability", format!("{provider_id}/{for_date}"))
        })?;

    Ok(Json(DataResponse {
        data: record.into(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// First date to include; defaults to today (UTC).
    pub from: Option<Day>,
}

/// GET /api/v1/providers/{id}/availability
pub async fn list_availability(
    State(state): State<AppState>,
    Path(provider_id): Path<DbId>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<DataResponse<Vec<AvailabilityView>>>> {
    let from = query.from.unwrap_or_else(|| Utc::now().date_naive());
    let records = AvailabilityRepo::list_for_provider(&state.pool, provider_id, from).await?;

    Ok(Json(DataResponse {
        data: records.into_iter().map(Into::into).collect(),
    }))
}
