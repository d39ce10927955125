//! Availability (per-provider, per-date capacity) models.

use medq_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `availability` table.
///
/// Reads of this struct outside a transaction are display-only and may be
/// stale; booking paths re-validate under the row lock.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AvailabilityRecord {
    pub id: DbId,
    pub provider_id: DbId,
    pub for_date: Day,
    pub total_capacity: i32,
    pub filled_count: i32,
    pub completed_count: i32,
    pub accepting: bool,
    pub paused: bool,
    pub pause_reason: Option<String>,
    pub on_leave: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AvailabilityRecord {
    /// Queue position currently being served, derived from the completed
    /// count. Never persisted.
    pub fn in_progress_position(&self) -> Option<i32> {
        let next = self.completed_count + 1;
        (next <= self.filled_count).then_some(next)
    }
}

/// Request body for the capacity upsert endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetCapacityRequest {
    #[validate(range(min = 0, max = 500))]
    pub total_capacity: i32,
    pub accepting: Option<bool>,
    pub paused: Option<bool>,
    pub pause_reason: Option<String>,
    pub on_leave: Option<bool>,
}
