//! Provider and manager-assignment models.

use medq_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `providers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Provider {
    pub id: DbId,
    pub name: String,
    pub specialty: Option<String>,
    pub consultation_fee_cents: i64,
    pub is_billable: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a provider.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProvider {
    pub name: String,
    pub specialty: Option<String>,
    pub consultation_fee_cents: i64,
    pub is_billable: Option<bool>,
}
