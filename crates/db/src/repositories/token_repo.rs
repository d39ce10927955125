//! Repository for the `tokens` table: the append-only token ledger.
//!
//! Issuance is one transaction spanning the slot reservation and the row
//! insert; on any failure inside the unit nothing persists, neither the
//! counter increment nor the token.

use futures::stream::BoxStream;
use medq_core::error::CoreError;
use medq_core::status::TokenStatus;
use medq_core::types::{Day, DbId};
use sqlx::{PgConnection, PgPool};

use crate::error::LedgerResult;
use crate::models::token::{IssueToken, StatusUpdate, Token, UpdateStatusRequest};
use crate::repositories::AvailabilityRepo;

/// Column list for token queries.
const COLUMNS: &str = "id, provider_id, patient_id, for_date, queue_position, \
    status_id, source, note, payment_ref, created_at, updated_at";

/// Full list query as a single literal so it can back a borrowed stream.
const LIST_QUERY: &str = "SELECT id, provider_id, patient_id, for_date, queue_position, \
    status_id, source, note, payment_ref, created_at, updated_at \
    FROM tokens WHERE provider_id = $1 AND for_date = $2 \
    ORDER BY queue_position ASC";

pub struct TokenRepo;

impl TokenRepo {
    /// Issue a token: reserve the next slot and insert the row atomically.
    pub async fn issue(pool: &PgPool, input: &IssueToken) -> LedgerResult<Token> {
        let mut tx = pool.begin().await?;
        let token = Self::issue_in_tx(&mut *tx, input).await?;
        tx.commit().await?;

        tracing::info!(
            provider_id = token.provider_id,
            for_date = %token.for_date,
            queue_position = token.queue_position,
            source = %token.source,
            "Token issued"
        );
        Ok(token)
    }

    /// Issuance body, exposed so the payment fulfillment path can run it
    /// inside the same transaction as the intent flip.
    pub async fn issue_in_tx(conn: &mut PgConnection, input: &IssueToken) -> LedgerResult<Token> {
        if !medq_core::source::is_valid_source(input.source) {
            return Err(CoreError::Validation(format!(
                "unknown booking source '{}'",
                input.source
            ))
            .into());
        }
        ensure_exists(conn, "providers", "Provider", input.provider_id).await?;
        ensure_exists(conn, "patients", "Patient", input.patient_id).await?;

        let position =
            AvailabilityRepo::reserve_slot(conn, input.provider_id, input.for_date).await?;

        let query = format!(
            "INSERT INTO tokens
                (provider_id, patient_id, for_date, queue_position, status_id,
                 source, note, payment_ref)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        let token = sqlx::query_as::<_, Token>(&query)
            .bind(input.provider_id)
            .bind(input.patient_id)
            .bind(input.for_date)
            .bind(position)
            .bind(TokenStatus::Upcoming.id())
            .bind(input.source)
            .bind(&input.note)
            .bind(&input.payment_ref)
            .fetch_one(conn)
            .await?;

        Ok(token)
    }

    /// Apply a status transition and its completed-count effect atomically.
    ///
    /// Re-invoking with the token's current terminal status is a no-op and
    /// never re-increments the completed count. Moving between two
    /// different terminal states requires the explicit correction flag and
    /// adjusts the count symmetrically.
    pub async fn update_status(
        pool: &PgPool,
        token_id: DbId,
        input: &UpdateStatusRequest,
    ) -> LedgerResult<StatusUpdate> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM tokens WHERE id = $1 FOR UPDATE");
        let token = sqlx::query_as::<_, Token>(&query)
            .bind(token_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| CoreError::not_found("Token", token_id))?;

        let from = token.status().ok_or_else(|| {
            CoreError::Internal(format!("token {token_id} has unknown status {}", token.status_id))
        })?;

        let transition =
            medq_core::status::validate_transition(from, input.status, input.correction)?;

        if transition.noop {
            return Ok(StatusUpdate {
                token,
                changed: false,
            });
        }

        if transition.completed_delta != 0 {
            AvailabilityRepo::adjust_completed(
                &mut *tx,
                token.provider_id,
                token.for_date,
                transition.completed_delta,
            )
            .await?;
        }

        let query = format!(
            "UPDATE tokens
             SET status_id = $2, note = COALESCE($3, note), updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Token>(&query)
            .bind(token_id)
            .bind(input.status.id())
            .bind(&input.note)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            token_id,
            provider_id = updated.provider_id,
            for_date = %updated.for_date,
            from = ?transition.from,
            to = ?transition.to,
            completed_delta = transition.completed_delta,
            "Token status changed"
        );

        Ok(StatusUpdate {
            token: updated,
            changed: true,
        })
    }

    /// Lazy, restartable stream of a day's tokens in queue order.
    ///
    /// Lock-free; call again to restart from the beginning.
    pub fn stream_for_date(
        pool: &PgPool,
        provider_id: DbId,
        for_date: Day,
    ) -> BoxStream<'_, Result<Token, sqlx::Error>> {
        sqlx::query_as::<_, Token>(LIST_QUERY)
            .bind(provider_id)
            .bind(for_date)
            .fetch(pool)
    }

    /// Collect a day's tokens in queue order.
    pub async fn list_for_date(
        pool: &PgPool,
        provider_id: DbId,
        for_date: Day,
    ) -> Result<Vec<Token>, sqlx::Error> {
        sqlx::query_as::<_, Token>(LIST_QUERY)
            .bind(provider_id)
            .bind(for_date)
            .fetch_all(pool)
            .await
    }

    /// Find a token by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Token>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tokens WHERE id = $1");
        sqlx::query_as::<_, Token>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the token issued for a payment reference, if any.
    pub async fn find_by_payment_ref(
        conn: &mut PgConnection,
        payment_ref: &str,
    ) -> Result<Option<Token>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tokens WHERE payment_ref = $1");
        sqlx::query_as::<_, Token>(&query)
            .bind(payment_ref)
            .fetch_optional(conn)
            .await
    }
}

/// Cheap existence probe used to surface specific not-found errors before
/// the slot reservation runs.
async fn ensure_exists(
    conn: &mut PgConnection,
    table: &'static str,
    entity: &'static str,
    id: DbId,
) -> LedgerResult<()> {
    let query = format!("SELECT 1 FROM {table} WHERE id = $1");
    let found: Option<(i32,)> = sqlx::query_as(&query).bind(id).fetch_optional(conn).await?;
    if found.is_none() {
        return Err(CoreError::not_found(entity, id).into());
    }
    Ok(())
}
