//! Shared test harness: in-memory gateway mock, app construction and
//! request helpers.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use tower::ServiceExt;

use medq_api::config::{GatewayConfig, ServerConfig};
use medq_api::gateway::{GatewayOrder, GatewayOrderStatus, PaymentGateway};
use medq_api::router::build_app_router;
use medq_api::services::role_cache::RoleCache;
use medq_api::state::AppState;
use medq_core::error::CoreError;
use medq_db::models::availability::SetCapacityRequest;
use medq_db::models::patient::UpsertPatient;
use medq_db::models::provider::CreateProvider;
use medq_db::repositories::{AvailabilityRepo, PatientRepo, ProviderRepo};
use medq_events::EventBus;
use sqlx::PgPool;

/// Webhook secret the test app is configured with.
pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

/// In-memory gateway double. Orders always succeed unless `failing()` is
/// used; status probes report pending.
pub struct MockGateway {
    fail_orders: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            fail_orders: AtomicBool::new(false),
        }
    }

    /// A gateway whose order creation always errors.
    pub fn failing() -> Self {
        Self {
            fail_orders: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(
        &self,
        _amount_cents: i64,
        merchant_ref: &str,
    ) -> Result<GatewayOrder, CoreError> {
        if self.fail_orders.load(Ordering::Relaxed) {
            return Err(CoreError::Gateway("order creation refused".into()));
        }
        Ok(GatewayOrder {
            gateway_order_ref: format!("gw-{merchant_ref}"),
            client_token: "tok_test".into(),
        })
    }

    async fn check_status(
        &self,
        _gateway_order_ref: &str,
    ) -> Result<GatewayOrderStatus, CoreError> {
        Ok(GatewayOrderStatus::Pending)
    }
}

fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".into()],
        request_timeout_secs: 5,
        notification_endpoint: None,
        gateway: GatewayConfig {
            base_url: "http://gateway.test".into(),
            key_id: "test-key".into(),
            webhook_secret: WEBHOOK_SECRET.into(),
        },
    }
}

/// Build the full app router over the test pool and the given gateway.
pub fn build_test_app_with_gateway(pool: PgPool, gateway: Arc<dyn PaymentGateway>) -> Router {
    let config = test_config();
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        gateway,
        event_bus: Arc::new(EventBus::default()),
        role_cache: Arc::new(RoleCache::with_ttl(pool, std::time::Duration::ZERO)),
    };
    build_app_router(state, &config)
}

/// Build the full app router with the default (always-succeeding) mock.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_gateway(pool, Arc::new(MockGateway::new()))
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Actor headers forwarded by the auth front-end.
#[derive(Clone, Copy)]
pub struct Actor {
    pub id: i64,
    pub roles: &'static str,
    pub provider_id: Option<i64>,
}

pub const ADMIN: Actor = Actor {
    id: 1,
    roles: "admin",
    provider_id: None,
};

pub const FRONTDESK: Actor = Actor {
    id: 2,
    roles: "frontdesk",
    provider_id: None,
};

impl Actor {
    pub fn provider(provider_id: i64) -> Self {
        Actor {
            id: 100 + provider_id,
            roles: "provider",
            provider_id: Some(provider_id),
        }
    }

    pub fn plain(id: i64) -> Self {
        Actor {
            id,
            roles: "",
            provider_id: None,
        }
    }

    fn apply(self, builder: axum::http::request::Builder) -> axum::http::request::Builder {
        let builder = builder
            .header("x-actor-id", self.id.to_string())
            .header("x-actor-roles", self.roles);
        match self.provider_id {
            Some(pid) => builder.header("x-actor-provider", pid.to_string()),
            None => builder,
        }
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_as(app: &Router, actor: Actor, uri: &str) -> Response<Body> {
    let request = actor
        .apply(Request::builder().uri(uri))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn json_as(
    app: &Router,
    actor: Actor,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = actor
        .apply(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json"),
        )
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| panic!("non-JSON body: {e}"))
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 9, 14).unwrap()
}

pub async fn seed_provider(pool: &PgPool) -> i64 {
    ProviderRepo::create(
        pool,
        &CreateProvider {
            name: "Dr. Rao".to_string(),
            specialty: Some("General Medicine".to_string()),
            consultation_fee_cents: 50_000,
            is_billable: Some(true),
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn seed_patient(pool: &PgPool) -> i64 {
    PatientRepo::upsert(
        pool,
        &UpsertPatient {
            full_name: "Asha Verma".to_string(),
            contact_number: "9900112233".to_string(),
            age: Some(34),
            gender: None,
        },
    )
    .await
    .unwrap()
    .id
}

pub async fn seed_capacity(pool: &PgPool, provider_id: i64, capacity: i32) {
    AvailabilityRepo::set_capacity(
        pool,
        provider_id,
        day(),
        &SetCapacityRequest {
            total_capacity: capacity,
            accepting: None,
            paused: None,
            pause_reason: None,
            on_leave: None,
        },
    )
    .await
    .unwrap();
}
