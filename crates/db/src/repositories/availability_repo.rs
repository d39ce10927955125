//! Repository for the `availability` table.
//!
//! This is the home of the correctness-critical slot primitive:
//! [`AvailabilityRepo::reserve_slot`] hands out dense 1-based queue
//! positions under a `FOR UPDATE` row lock, so concurrent issuers for the
//! same (provider, date) serialize on the availability row and exactly
//! `min(callers, remaining)` succeed.

use medq_core::error::CoreError;
use medq_core::types::{Day, DbId};
use sqlx::{PgConnection, PgPool};

use crate::error::{LedgerError, LedgerResult};
use crate::models::availability::{AvailabilityRecord, SetCapacityRequest};

/// Column list for availability queries.
const COLUMNS: &str = "id, provider_id, for_date, total_capacity, filled_count, \
    completed_count, accepting, paused, pause_reason, on_leave, created_at, updated_at";

pub struct AvailabilityRepo;

impl AvailabilityRepo {
    /// Create or update the capacity record for (provider, date).
    ///
    /// Capacity may never shrink below the slots already issued; that
    /// request fails with a conflict and leaves the row untouched. Flags
    /// are written atomically with the capacity.
    pub async fn set_capacity(
        pool: &PgPool,
        provider_id: DbId,
        for_date: Day,
        input: &SetCapacityRequest,
    ) -> LedgerResult<AvailabilityRecord> {
        let mut tx = pool.begin().await?;

        let provider_exists: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM providers WHERE id = $1")
                .bind(provider_id)
                .fetch_optional(&mut *tx)
                .await?;
        if provider_exists.is_none() {
            return Err(CoreError::not_found("Provider", provider_id).into());
        }

        let current = Self::lock(&mut *tx, provider_id, for_date).await?;

        let record = match current {
            Some(existing) => {
                if input.total_capacity < existing.filled_count {
                    return Err(CoreError::Conflict(format!(
                        "capacity {} is below the {} slots already issued",
                        input.total_capacity, existing.filled_count
                    ))
                    .into());
                }
                let query = format!(
                    "UPDATE availability SET
                        total_capacity = $3,
                        accepting = COALESCE($4, accepting),
                        paused = COALESCE($5, paused),
                        pause_reason = COALESCE($6, pause_reason),
                        on_leave = COALESCE($7, on_leave),
                        updated_at = NOW()
                     WHERE provider_id = $1 AND for_date = $2
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, AvailabilityRecord>(&query)
                    .bind(provider_id)
                    .bind(for_date)
                    .bind(input.total_capacity)
                    .bind(input.accepting)
                    .bind(input.paused)
                    .bind(&input.pause_reason)
                    .bind(input.on_leave)
                    .fetch_one(&mut *tx)
                    .await?
            }
            None => {
                let query = format!(
                    "INSERT INTO availability
                        (provider_id, for_date, total_capacity, accepting, paused,
                         pause_reason, on_leave)
                     VALUES ($1, $2, $3, COALESCE($4, TRUE), COALESCE($5, FALSE),
                             $6, COALESCE($7, FALSE))
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, AvailabilityRecord>(&query)
                    .bind(provider_id)
                    .bind(for_date)
                    .bind(input.total_capacity)
                    .bind(input.accepting)
                    .bind(input.paused)
                    .bind(&input.pause_reason)
                    .bind(input.on_leave)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        tx.commit().await?;
        Ok(record)
    }

    /// Atomically claim the next queue position for (provider, date).
    ///
    /// Must run inside the caller's transaction; the `FOR UPDATE` lock and
    /// the in-lock re-validation are what make issuance race-free. A prior
    /// display read is never trusted.
    pub async fn reserve_slot(
        conn: &mut PgConnection,
        provider_id: DbId,
        for_date: Day,
    ) -> LedgerResult<i32> {
        let record = Self::lock(conn, provider_id, for_date)
            .await?
            .ok_or_else(|| availability_not_found(provider_id, for_date))?;

        if record.on_leave {
            return Err(CoreError::OnLeave.into());
        }
        if !record.accepting || record.paused {
            return Err(CoreError::NotAccepting {
                reason: record.pause_reason,
            }
            .into());
        }
        if record.filled_count >= record.total_capacity {
            return Err(CoreError::CapacityExhausted.into());
        }

        let (position,): (i32,) = sqlx::query_as(
            "UPDATE availability
             SET filled_count = filled_count + 1, updated_at = NOW()
             WHERE id = $1
             RETURNING filled_count",
        )
        .bind(record.id)
        .fetch_one(conn)
        .await?;

        Ok(position)
    }

    /// Adjust the completed count by `delta` (±1) under the row lock.
    ///
    /// Fails with a conflict if the result would leave the count outside
    /// `[0, filled_count]`. Runs inside the caller's transaction alongside
    /// the status write it accounts for.
    pub async fn adjust_completed(
        conn: &mut PgConnection,
        provider_id: DbId,
        for_date: Day,
        delta: i32,
    ) -> LedgerResult<()> {
        let record = Self::lock(conn, provider_id, for_date)
            .await?
            .ok_or_else(|| availability_not_found(provider_id, for_date))?;

        let next = record.completed_count + delta;
        if next < 0 || next > record.filled_count {
            return Err(CoreError::Conflict(format!(
                "completed count {next} out of range 0..={}",
                record.filled_count
            ))
            .into());
        }

        sqlx::query(
            "UPDATE availability
             SET completed_count = completed_count + $2, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(record.id)
        .bind(delta)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Lock-free display read. May be stale; never used to gate issuance.
    pub async fn find(
        pool: &PgPool,
        provider_id: DbId,
        for_date: Day,
    ) -> Result<Option<AvailabilityRecord>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM availability WHERE provider_id = $1 AND for_date = $2");
        sqlx::query_as::<_, AvailabilityRecord>(&query)
            .bind(provider_id)
            .bind(for_date)
            .fetch_optional(pool)
            .await
    }

    /// List a provider's availability from the given date onward.
    pub async fn list_for_provider(
        pool: &PgPool,
        provider_id: DbId,
        from_date: Day,
    ) -> Result<Vec<AvailabilityRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM availability
             WHERE provider_id = $1 AND for_date >= $2
             ORDER BY for_date ASC"
        );
        sqlx::query_as::<_, AvailabilityRecord>(&query)
            .bind(provider_id)
            .bind(from_date)
            .fetch_all(pool)
            .await
    }

    /// Lock the (provider, date) row for the rest of the transaction.
    async fn lock(
        conn: &mut PgConnection,
        provider_id: DbId,
        for_date: Day,
    ) -> Result<Option<AvailabilityRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM availability
             WHERE provider_id = $1 AND for_date = $2
             FOR UPDATE"
        );
        sqlx::query_as::<_, AvailabilityRecord>(&query)
            .bind(provider_id)
            .bind(for_date)
            .fetch_optional(conn)
            .await
    }
}

fn availability_not_found(provider_id: DbId, for_date: Day) -> LedgerError {
    CoreError::not_found("Availability", format!("{provider_id}/{for_date}")).into()
}
