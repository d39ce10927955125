//! External payment gateway collaborator.
//!
//! The engine never trusts the gateway to be timely or exactly-once: order
//! creation is synchronous and fails fast, while payment outcomes arrive as
//! signed asynchronous callbacks handled idempotently in the booking
//! handlers.

pub mod http;
pub mod signature;

use async_trait::async_trait;
use medq_core::error::CoreError;
use serde::{Deserialize, Serialize};

pub use http::HttpGateway;

/// A payable order created at the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    /// The gateway's own order reference.
    pub gateway_order_ref: String,
    /// Opaque token the client uses to open the payment UI.
    pub client_token: String,
}

/// Order status as reported by the gateway's query API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayOrderStatus {
    Pending,
    Paid,
    Failed,
}

/// Client for the external payment gateway.
///
/// Implemented over HTTP in production ([`HttpGateway`]) and by an
/// in-memory mock in integration tests.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a payable order for `amount_cents`, keyed by our
    /// `merchant_ref`. Failures map to [`CoreError::Gateway`] and must
    /// leave no state behind on our side.
    async fn create_order(
        &self,
        amount_cents: i64,
        merchant_ref: &str,
    ) -> Result<GatewayOrder, CoreError>;

    /// Query the current status of a previously created order.
    async fn check_status(&self, gateway_order_ref: &str)
        -> Result<GatewayOrderStatus, CoreError>;
}
