//! HTTP implementation of the payment gateway client.

use std::time::Duration;

use async_trait::async_trait;
use medq_core::error::CoreError;
use serde::Deserialize;
use serde_json::json;

use crate::config::GatewayConfig;
use crate::gateway::{GatewayOrder, GatewayOrderStatus, PaymentGateway};

/// HTTP request timeout for gateway calls. Kept short: order creation sits
/// on the interactive booking path and must fail fast.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Production gateway client speaking the gateway's JSON order API.
pub struct HttpGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    order_ref: String,
    client_token: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: GatewayOrderStatus,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { client, config }
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn create_order(
        &self,
        amount_cents: i64,
        merchant_ref: &str,
    ) -> Result<GatewayOrder, CoreError> {
        let url = format!("{}/orders", self.config.base_url);
        let body = json!({
            "key_id": self.config.key_id,
            "amount": amount_cents,
            "currency": "INR",
            "merchant_ref": merchant_ref,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoreError::Gateway(format!("order creation request failed: {e}")))?
            .error_for_status()
            .map_err(|e| CoreError::Gateway(format!("order creation rejected: {e}")))?;

        let order: OrderResponse = response
            .json()
            .await
            .map_err(|e| CoreError::Gateway(format!("malformed order response: {e}")))?;

        Ok(GatewayOrder {
            gateway_order_ref: order.order_ref,
            client_token: order.client_token,
        })
    }

    async fn check_status(
        &self,
        gateway_order_ref: &str,
    ) -> Result<GatewayOrderStatus, CoreError> {
        let url = format!("{}/orders/{gateway_order_ref}", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CoreError::Gateway(format!("status request failed: {e}")))?
            .error_for_status()
            .map_err(|e| CoreError::Gateway(format!("status request rejected: {e}")))?;

        let status: StatusResponse = response
            .json()
            .await
            .map_err(|e| CoreError::Gateway(format!("malformed status response: {e}")))?;

        Ok(status.status)
    }
}
