//! Payment intent models for the online booking path.

use medq_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::status::IntentStatus;
use crate::models::token::Token;

/// A row from the `payment_intents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentIntent {
    pub id: DbId,
    pub merchant_ref: String,
    pub provider_id: DbId,
    pub patient_id: DbId,
    pub for_date: Day,
    pub amount_cents: i64,
    pub status_id: i16,
    pub gateway_order_ref: Option<String>,
    pub fulfilled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PaymentIntent {
    /// Decode the stored status ID.
    pub fn status(&self) -> Option<IntentStatus> {
        IntentStatus::from_id(self.status_id)
    }
}

/// DTO for persisting a freshly created intent.
#[derive(Debug, Clone)]
pub struct CreateIntent {
    pub merchant_ref: String,
    pub provider_id: DbId,
    pub patient_id: DbId,
    pub for_date: Day,
    pub amount_cents: i64,
    pub gateway_order_ref: String,
}

/// Request body for intent creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateIntentRequest {
    pub provider_id: DbId,
    pub patient_id: DbId,
    pub for_date: Day,
}

/// Result of processing a gateway success callback.
///
/// Every variant is safe to return for duplicate deliveries of the same
/// callback.
#[derive(Debug)]
pub enum FulfillOutcome {
    /// The intent moved to success and a token was issued.
    Issued(Token),
    /// Duplicate delivery: the intent had already succeeded and issued.
    AlreadyIssued(Token),
    /// Payment captured but capacity was exhausted; the intent is success
    /// but unfulfilled and a reconciliation row exists.
    Unfulfilled,
}
