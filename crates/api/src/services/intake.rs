//! Walk-in intake: resolve the patient identity, then issue a token with
//! no payment step.
//!
//! The identity upsert and the issuance are deliberately separate units:
//! the upsert is idempotent and may legitimately have happened on an
//! earlier visit, while issuance stays atomic with the slot reservation.

use medq_core::source::SOURCE_WALKIN;
use medq_db::models::patient::{Patient, WalkInRequest};
use medq_db::models::token::{IssueToken, Token};
use medq_db::repositories::{PatientRepo, TokenRepo};
use medq_events::QueueEvent;
use validator::Validate;

use crate::error::AppResult;
use crate::state::AppState;

pub struct LocalIntakeService;

impl LocalIntakeService {
    /// Register a walk-in: upsert the patient, then issue a walk-in token.
    ///
    /// Capacity errors are the same as any other issuance path; a repeat
    /// registration reuses the existing patient row but still consumes a
    /// new slot.
    pub async fn register_walk_in(
        state: &AppState,
        input: &WalkInRequest,
    ) -> AppResult<(Patient, Token)> {
        input.validate()?;

        let patient = PatientRepo::upsert(&state.pool, &input.patient()).await?;

        let token = TokenRepo::issue(
            &state.pool,
            &IssueToken {
                provider_id: input.provider_id,
                patient_id: patient.id,
                for_date: input.for_date,
                source: SOURCE_WALKIN,
                note: input.reason.clone(),
                payment_ref: None,
            },
        )
        .await?;

        state.event_bus.publish(
            QueueEvent::new("token.issued")
                .with_provider(token.provider_id)
                .with_patient(patient.id)
                .with_payload(serde_json::json!({
                    "token_id": token.id,
                    "queue_position": token.queue_position,
                    "for_date": token.for_date,
                    "source": token.source,
                })),
        );

        Ok((patient, token))
    }
}
