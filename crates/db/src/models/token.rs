//! Queue token models.

use medq_core::status::TokenStatus;
use medq_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `tokens` table.
///
/// `queue_position` is immutable once assigned; only `status_id`, `note`
/// and `updated_at` change after insertion.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Token {
    pub id: DbId,
    pub provider_id: DbId,
    pub patient_id: DbId,
    pub for_date: Day,
    pub queue_position: i32,
    pub status_id: i16,
    pub source: String,
    pub note: Option<String>,
    pub payment_ref: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Token {
    /// Decode the stored status ID.
    pub fn status(&self) -> Option<TokenStatus> {
        TokenStatus::from_id(self.status_id)
    }
}

/// DTO for atomic token issuance.
#[derive(Debug, Clone)]
pub struct IssueToken {
    pub provider_id: DbId,
    pub patient_id: DbId,
    pub for_date: Day,
    /// One of the `medq_core::source` constants.
    pub source: &'static str,
    pub note: Option<String>,
    pub payment_ref: Option<String>,
}

/// Request body for admin offline issuance.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OfflineIssueRequest {
    pub provider_id: DbId,
    pub patient_id: DbId,
    pub for_date: Day,
    #[validate(length(max = 1000))]
    pub note: Option<String>,
}

/// Request body for the status update endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: TokenStatus,
    pub note: Option<String>,
    /// Required to move a token between two different terminal states.
    #[serde(default)]
    pub correction: bool,
}

/// Outcome of a status update, including whether anything changed.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub token: Token,
    /// False when the request repeated the current terminal state.
    pub changed: bool,
}
