//! Payment-gated booking orchestration.
//!
//! Per-attempt lifecycle: INITIATED → TOKEN_ISSUED on the gateway success
//! callback, or INITIATED → FAILED on the failure callback. Both terminal
//! outcomes are idempotent under duplicate and out-of-order delivery; the
//! one unresolved race — payment captured after capacity ran out — lands
//! in the reconciliation queue, never in a corrupted ledger.

use medq_core::error::CoreError;
use medq_core::fees::booking_amount_cents;
use medq_db::models::payment_intent::{CreateIntent, CreateIntentRequest, FulfillOutcome};
use medq_db::repositories::{AvailabilityRepo, PatientRepo, PaymentIntentRepo, ProviderRepo};
use medq_events::QueueEvent;
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// What the booking client needs to open the gateway's payment UI.
#[derive(Debug, Serialize)]
pub struct IntentHandle {
    pub merchant_ref: String,
    pub gateway_order_ref: String,
    pub client_token: String,
    pub amount_cents: i64,
}

pub struct ReservationCoordinator;

impl ReservationCoordinator {
    /// Create a payment intent and a payable gateway order.
    ///
    /// No token exists after this step. The availability checks here are
    /// display-level fail-fasts; the authoritative capacity check happens
    /// under the row lock when the success callback issues the token. The
    /// gateway is called before anything is persisted, so a gateway
    /// failure leaves no partial state.
    pub async fn create_intent(
        state: &AppState,
        input: &CreateIntentRequest,
    ) -> AppResult<IntentHandle> {
        let provider = ProviderRepo::find_by_id(&state.pool, input.provider_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Provider", input.provider_id))?;

        if !provider.is_billable {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "provider {} does not take online payment",
                provider.id
            ))));
        }

        PatientRepo::find_by_id(&state.pool, input.patient_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Patient", input.patient_id))?;

        let availability = AvailabilityRepo::find(&state.pool, input.provider_id, input.for_date)
            .await?
            .ok_or_else(|| {
                CoreError::not_found(
                    "Availability",
                    format!("{}/{}", input.provider_id, input.for_date),
                )
            })?;

        if availability.on_leave {
            return Err(AppError::Core(CoreError::OnLeave));
        }
        if !availability.accepting || availability.paused {
            return Err(AppError::Core(CoreError::NotAccepting {
                reason: availability.pause_reason,
            }));
        }
        if availability.filled_count >= availability.total_capacity {
            return Err(AppError::Core(CoreError::CapacityExhausted));
        }

        let amount_cents = booking_amount_cents(provider.consultation_fee_cents);
        let merchant_ref = format!("MQ-{}", Uuid::new_v4().simple());

        let order = state
            .gateway
            .create_order(amount_cents, &merchant_ref)
            .await?;

        let intent = PaymentIntentRepo::create(
            &state.pool,
            &CreateIntent {
                merchant_ref: merchant_ref.clone(),
                provider_id: input.provider_id,
                patient_id: input.patient_id,
                for_date: input.for_date,
                amount_cents,
                gateway_order_ref: order.gateway_order_ref.clone(),
            },
        )
        .await?;

        tracing::info!(
            merchant_ref = %intent.merchant_ref,
            provider_id = intent.provider_id,
            for_date = %intent.for_date,
            amount_cents,
            "Payment intent created"
        );

        Ok(IntentHandle {
            merchant_ref: intent.merchant_ref,
            gateway_order_ref: order.gateway_order_ref,
            client_token: order.client_token,
            amount_cents,
        })
    }

    /// Handle a gateway success callback. Safe under duplicate delivery.
    pub async fn on_gateway_success(
        state: &AppState,
        merchant_ref: &str,
    ) -> AppResult<FulfillOutcome> {
        let outcome = PaymentIntentRepo::fulfill_success(&state.pool, merchant_ref).await?;

        match &outcome {
            FulfillOutcome::Issued(token) => {
                state.event_bus.publish(
                    QueueEvent::new("token.issued")
                        .with_provider(token.provider_id)
                        .with_patient(token.patient_id)
                        .with_payload(serde_json::json!({
                            "token_id": token.id,
                            "queue_position": token.queue_position,
                            "for_date": token.for_date,
                            "source": token.source,
                        })),
                );
            }
            FulfillOutcome::Unfulfilled => {
                state.event_bus.publish(
                    QueueEvent::new("payment.unfulfilled")
                        .with_payload(serde_json::json!({ "merchant_ref": merchant_ref })),
                );
            }
            FulfillOutcome::AlreadyIssued(_) => {
                tracing::debug!(merchant_ref, "Duplicate success callback ignored");
            }
        }

        Ok(outcome)
    }

    /// Handle a gateway failure callback. Safe under duplicate delivery;
    /// never touches tokens (none exist for a failed intent).
    pub async fn on_gateway_failure(state: &AppState, merchant_ref: &str) -> AppResult<bool> {
        let changed = PaymentIntentRepo::mark_failure(&state.pool, merchant_ref).await?;
        if !changed {
            tracing::debug!(merchant_ref, "Failure callback for terminal intent ignored");
        }
        Ok(changed)
    }
}
