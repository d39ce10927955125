//! Handlers for the payment-gated booking path.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use medq_core::error::CoreError;
use medq_db::models::payment_intent::{CreateIntentRequest, FulfillOutcome, PaymentIntent};
use medq_db::models::status::IntentStatus;
use medq_db::repositories::PaymentIntentRepo;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::gateway::{signature, GatewayOrderStatus};
use crate::middleware::actor::ActorClaim;
use crate::response::DataResponse;
use crate::services::reservation::ReservationCoordinator;
use crate::state::AppState;

/// POST /api/v1/bookings/intents
///
/// Create a payment intent and a payable gateway order. No token exists
/// until the gateway confirms payment.
pub async fn create_intent(
    actor: ActorClaim,
    State(state): State<AppState>,
    Json(input): Json<CreateIntentRequest>,
) -> AppResult<impl IntoResponse> {
    let handle = ReservationCoordinator::create_intent(&state, &input).await?;

    tracing::info!(
        actor_id = actor.actor_id,
        merchant_ref = %handle.merchant_ref,
        "Booking intent created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: handle })))
}

/// Callback body posted by the gateway, signed over the raw bytes.
#[derive(Debug, Deserialize)]
struct WebhookPayload {
    merchant_ref: String,
    event: String,
}

/// POST /api/v1/bookings/gateway/webhook
///
/// Asynchronous payment outcome delivery. May arrive zero, one or many
/// times per intent, in any order; processing is idempotent. Always
/// answers 200 for a processed callback so the gateway does not retry —
/// including the captured-but-unfulfilled case, which is surfaced with its
/// own outcome code and queued for reconciliation, never retried against
/// capacity.
pub async fn gateway_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let sig = headers
        .get("x-gateway-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Missing x-gateway-signature header".into(),
            ))
        })?;

    if !signature::verify(&state.config.gateway.webhook_secret, &body, sig) {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid gateway signature".into(),
        )));
    }

    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("malformed webhook body: {e}")))?;

    let response = match payload.event.as_str() {
        "payment.success" => {
            match ReservationCoordinator::on_gateway_success(&state, &payload.merchant_ref).await? {
                FulfillOutcome::Issued(token) => json!({
                    "outcome": "issued",
                    "token": token,
                }),
                FulfillOutcome::AlreadyIssued(token) => json!({
                    "outcome": "already_issued",
                    "token": token,
                }),
                FulfillOutcome::Unfulfilled => json!({
                    "outcome": "unfulfilled",
                    "code": "PAYMENT_UNFULFILLED",
                    "merchant_ref": payload.merchant_ref,
                }),
            }
        }
        "payment.failure" => {
            let changed =
                ReservationCoordinator::on_gateway_failure(&state, &payload.merchant_ref).await?;
            json!({
                "outcome": "failed",
                "changed": changed,
            })
        }
        other => {
            return Err(AppError::BadRequest(format!(
                "unknown webhook event '{other}'"
            )));
        }
    };

    Ok(Json(DataResponse { data: response }))
}

/// Stored intent plus, while still pending, the gateway's live view.
#[derive(Debug, Serialize)]
pub struct IntentView {
    #[serde(flatten)]
    pub intent: PaymentIntent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_status: Option<GatewayOrderStatus>,
}

/// GET /api/v1/bookings/intents/{merchant_ref}
pub async fn get_intent(
    _actor: ActorClaim,
    State(state): State<AppState>,
    Path(merchant_ref): Path<String>,
) -> AppResult<Json<DataResponse<IntentView>>> {
    let intent = PaymentIntentRepo::find_by_merchant_ref(&state.pool, &merchant_ref)
        .await?
        .ok_or_else(|| CoreError::not_found("PaymentIntent", &merchant_ref))?;

    // Pass the gateway's live status through while we have no terminal
    // callback yet; stored state stays authoritative.
    let gateway_status = match (intent.status(), &intent.gateway_order_ref) {
        (Some(IntentStatus::Initiated), Some(order_ref)) => {
            match state.gateway.check_status(order_ref).await {
                Ok(status) => Some(status),
                Err(e) => {
                    tracing::warn!(merchant_ref = %intent.merchant_ref, error = %e,
                        "Gateway status probe failed");
                    None
                }
            }
        }
        _ => None,
    };

    Ok(Json(DataResponse {
        data: IntentView {
            intent,
            gateway_status,
        },
    }))
}
