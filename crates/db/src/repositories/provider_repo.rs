//! Repository for the `providers` and `provider_managers` tables.

use medq_core::types::DbId;
use sqlx::PgPool;

use crate::models::provider::{CreateProvider, Provider};

/// Column list for provider queries.
const COLUMNS: &str =
    "id, name, specialty, consultation_fee_cents, is_billable, created_at, updated_at";

pub struct ProviderRepo;

impl ProviderRepo {
    /// Insert a new provider, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateProvider) -> Result<Provider, sqlx::Error> {
        let query = format!(
            "INSERT INTO providers (name, specialty, consultation_fee_cents, is_billable)
             VALUES ($1, $2, $3, COALESCE($4, TRUE))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Provider>(&query)
            .bind(&input.name)
            .bind(&input.specialty)
            .bind(input.consultation_fee_cents)
            .bind(input.is_billable)
            .fetch_one(pool)
            .await
    }

    /// Find a provider by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Provider>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM providers WHERE id = $1");
        sqlx::query_as::<_, Provider>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Grant a user manager rights over a provider. Idempotent.
    pub async fn add_manager(
        pool: &PgPool,
        provider_id: DbId,
        user_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO provider_managers (provider_id, user_id)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_provider_managers_provider_user DO NOTHING",
        )
        .bind(provider_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Provider IDs the given user manages. Backs the role cache.
    pub async fn managed_provider_ids(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let rows: Vec<(DbId,)> =
            sqlx::query_as("SELECT provider_id FROM provider_managers WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
