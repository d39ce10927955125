//! Patient identity models.

use medq_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `patients` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Patient {
    pub id: DbId,
    pub full_name: String,
    pub contact_number: String,
    pub age: Option<i16>,
    pub gender: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for the idempotent walk-in identity upsert, keyed by
/// (contact_number, full_name).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpsertPatient {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(length(min = 5, max = 20))]
    pub contact_number: String,
    #[validate(range(min = 0, max = 130))]
    pub age: Option<i16>,
    pub gender: Option<String>,
}

/// Request body for walk-in registration: identity fields plus the target
/// provider and date.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WalkInRequest {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(length(min = 5, max = 20))]
    pub contact_number: String,
    #[validate(range(min = 0, max = 130))]
    pub age: Option<i16>,
    pub gender: Option<String>,
    pub provider_id: DbId,
    pub for_date: Day,
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

impl WalkInRequest {
    /// The identity portion of the request.
    pub fn patient(&self) -> UpsertPatient {
        UpsertPatient {
            full_name: self.full_name.clone(),
            contact_number: self.contact_number.clone(),
            age: self.age,
            gender: self.gender.clone(),
        }
    }
}
