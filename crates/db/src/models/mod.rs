pub mod availability;
pub mod patient;
pub mod payment_intent;
pub mod provider;
pub mod reconciliation;
pub mod status;
pub mod token;
