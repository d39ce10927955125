//! Repository for the `patients` table.

use medq_core::types::DbId;
use sqlx::PgPool;

use crate::models::patient::{Patient, UpsertPatient};

/// Column list for patient queries.
const COLUMNS: &str = "id, full_name, contact_number, age, gender, created_at, updated_at";

pub struct PatientRepo;

impl PatientRepo {
    /// Resolve or create a patient identity, keyed by (contact, name).
    ///
    /// Idempotent: repeating the same walk-in registration returns the same
    /// row, filling in age/gender if they were previously unknown.
    pub async fn upsert(pool: &PgPool, input: &UpsertPatient) -> Result<Patient, sqlx::Error> {
        let query = format!(
            "INSERT INTO patients (full_name, contact_number, age, gender)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_patients_contact_name DO UPDATE SET
                age = COALESCE(patients.age, EXCLUDED.age),
                gender = COALESCE(patients.gender, EXCLUDED.gender),
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Patient>(&query)
            .bind(&input.full_name)
            .bind(&input.contact_number)
            .bind(input.age)
            .bind(&input.gender)
            .fetch_one(pool)
            .await
    }

    /// Find a patient by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Patient>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM patients WHERE id = $1");
        sqlx::query_as::<_, Patient>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
