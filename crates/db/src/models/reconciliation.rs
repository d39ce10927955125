//! Reconciliation queue models (payment captured, slot unavailable).

use medq_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `reconciliation_queue` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReconciliationItem {
    pub id: DbId,
    pub merchant_ref: String,
    pub reason: String,
    pub resolved: bool,
    pub created_at: Timestamp,
}
