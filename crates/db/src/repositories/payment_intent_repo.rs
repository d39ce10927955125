//! Repository for the `payment_intents` table and the gateway-callback
//! fulfillment transaction.
//!
//! Callbacks may arrive zero, one or many times and may race each other;
//! every mutation here locks the intent row first, so duplicates serialize
//! and observe the terminal state the first delivery wrote.

use medq_core::error::CoreError;
use medq_core::source::SOURCE_ONLINE;
use medq_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::error::{LedgerError, LedgerResult};
use crate::models::payment_intent::{CreateIntent, FulfillOutcome, PaymentIntent};
use crate::models::status::IntentStatus;
use crate::models::token::IssueToken;
use crate::repositories::TokenRepo;

/// Column list for payment intent queries.
const COLUMNS: &str = "id, merchant_ref, provider_id, patient_id, for_date, \
    amount_cents, status_id, gateway_order_ref, fulfilled, created_at, updated_at";

pub struct PaymentIntentRepo;

impl PaymentIntentRepo {
    /// Persist a freshly created intent in the INITIATED state.
    ///
    /// Called only after the gateway accepted the order; a gateway failure
    /// leaves no intent behind.
    pub async fn create(pool: &PgPool, input: &CreateIntent) -> Result<PaymentIntent, sqlx::Error> {
        let query = format!(
            "INSERT INTO payment_intents
                (merchant_ref, provider_id, patient_id, for_date, amount_cents,
                 status_id, gateway_order_ref)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PaymentIntent>(&query)
            .bind(&input.merchant_ref)
            .bind(input.provider_id)
            .bind(input.patient_id)
            .bind(input.for_date)
            .bind(input.amount_cents)
            .bind(IntentStatus::Initiated.id())
            .bind(&input.gateway_order_ref)
            .fetch_one(pool)
            .await
    }

    /// Find an intent by its merchant reference.
    pub async fn find_by_merchant_ref(
        pool: &PgPool,
        merchant_ref: &str,
    ) -> Result<Option<PaymentIntent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payment_intents WHERE merchant_ref = $1");
        sqlx::query_as::<_, PaymentIntent>(&query)
            .bind(merchant_ref)
            .fetch_optional(pool)
            .await
    }

    /// Process a gateway success callback for `merchant_ref`.
    ///
    /// One transaction: lock the intent row, then
    /// - already SUCCESS and fulfilled: return the existing token (no-op);
    /// - already SUCCESS but unfulfilled: no-op, still unfulfilled;
    /// - FAILURE: terminal states are final, the late success is rejected;
    /// - INITIATED: issue the token in this same transaction and flip the
    ///   intent to SUCCESS. If issuance hits exhausted capacity the intent
    ///   still flips to SUCCESS (the money moved) but stays unfulfilled,
    ///   and a reconciliation row is written in the same commit.
    pub async fn fulfill_success(
        pool: &PgPool,
        merchant_ref: &str,
    ) -> LedgerResult<FulfillOutcome> {
        let mut tx = pool.begin().await?;

        let intent = Self::lock(&mut *tx, merchant_ref).await?;

        match intent.status() {
            Some(IntentStatus::Success) => {
                if !intent.fulfilled {
                    return Ok(FulfillOutcome::Unfulfilled);
                }
                let token = TokenRepo::find_by_payment_ref(&mut *tx, merchant_ref)
                    .await?
                    .ok_or_else(|| {
                        CoreError::Internal(format!(
                            "intent {merchant_ref} is fulfilled but has no token"
                        ))
                    })?;
                Ok(FulfillOutcome::AlreadyIssued(token))
            }

            Some(IntentStatus::Failure) => Err(CoreError::Conflict(format!(
                "intent {merchant_ref} already failed; success callback rejected"
            ))
            .into()),

            Some(IntentStatus::Initiated) => {
                let issue = IssueToken {
                    provider_id: intent.provider_id,
                    patient_id: intent.patient_id,
                    for_date: intent.for_date,
                    source: SOURCE_ONLINE,
                    note: None,
                    payment_ref: Some(merchant_ref.to_string()),
                };

                match TokenRepo::issue_in_tx(&mut *tx, &issue).await {
                    Ok(token) => {
                        Self::mark_success(&mut *tx, intent.id, true).await?;
                        tx.commit().await?;
                        tracing::info!(
                            merchant_ref,
                            token_id = token.id,
                            queue_position = token.queue_position,
                            "Payment intent fulfilled"
                        );
                        Ok(FulfillOutcome::Issued(token))
                    }
                    Err(LedgerError::Core(CoreError::CapacityExhausted)) => {
                        Self::mark_success(&mut *tx, intent.id, false).await?;
                        sqlx::query(
                            "INSERT INTO reconciliation_queue (merchant_ref, reason)
                             VALUES ($1, $2)",
                        )
                        .bind(merchant_ref)
                        .bind("payment captured but capacity exhausted")
                        .execute(&mut *tx)
                        .await?;
                        tx.commit().await?;
                        tracing::warn!(
                            merchant_ref,
                            provider_id = intent.provider_id,
                            for_date = %intent.for_date,
                            "Payment captured but no slot available; queued for reconciliation"
                        );
                        Ok(FulfillOutcome::Unfulfilled)
                    }
                    Err(other) => Err(other),
                }
            }

            None => Err(CoreError::Internal(format!(
                "intent {merchant_ref} has unknown status {}",
                intent.status_id
            ))
            .into()),
        }
    }

    /// Process a gateway failure callback. Idempotent: INITIATED flips to
    /// FAILURE; terminal intents are left alone. Returns whether anything
    /// changed. No token is created or removed.
    pub async fn mark_failure(pool: &PgPool, merchant_ref: &str) -> LedgerResult<bool> {
        let mut tx = pool.begin().await?;

        let intent = Self::lock(&mut *tx, merchant_ref).await?;

        if intent.status() != Some(IntentStatus::Initiated) {
            return Ok(false);
        }

        sqlx::query(
            "UPDATE payment_intents SET status_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(intent.id)
        .bind(IntentStatus::Failure.id())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(merchant_ref, "Payment intent marked failed");
        Ok(true)
    }

    async fn mark_success(
        conn: &mut PgConnection,
        intent_id: DbId,
        fulfilled: bool,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE payment_intents
             SET status_id = $2, fulfilled = $3, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(intent_id)
        .bind(IntentStatus::Success.id())
        .bind(fulfilled)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Lock the intent row for the rest of the transaction.
    async fn lock(conn: &mut PgConnection, merchant_ref: &str) -> LedgerResult<PaymentIntent> {
        let query =
            format!("SELECT {COLUMNS} FROM payment_intents WHERE merchant_ref = $1 FOR UPDATE");
        let intent = sqlx::query_as::<_, PaymentIntent>(&query)
            .bind(merchant_ref)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| CoreError::not_found("PaymentIntent", merchant_ref))?;
        Ok(intent)
    }
}
