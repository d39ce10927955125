//! Repository for the manual-ops reconciliation queue.

use medq_core::error::CoreError;
use medq_core::types::DbId;
use sqlx::PgPool;

use crate::error::LedgerResult;
use crate::models::reconciliation::ReconciliationItem;

/// Column list for reconciliation queries.
const COLUMNS: &str = "id, merchant_ref, reason, resolved, created_at";

pub struct ReconciliationRepo;

impl ReconciliationRepo {
    /// List unresolved items, oldest first.
    pub async fn list_open(pool: &PgPool) -> Result<Vec<ReconciliationItem>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reconciliation_queue
             WHERE NOT resolved
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, ReconciliationItem>(&query)
            .fetch_all(pool)
            .await
    }

    /// Mark an item handled by ops.
    pub async fn resolve(pool: &PgPool, id: DbId) -> LedgerResult<ReconciliationItem> {
        let query = format!(
            "UPDATE reconciliation_queue SET resolved = TRUE
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ReconciliationItem>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(|| CoreError::not_found("ReconciliationItem", id).into())
    }
}
