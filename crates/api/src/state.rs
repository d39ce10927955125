use std::sync::Arc;

use crate::config::ServerConfig;
use crate::gateway::PaymentGateway;
use crate::services::role_cache::RoleCache;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc`). The gateway is a trait
/// object so integration tests substitute a mock without touching shared
/// process state; the role cache is likewise injected, not a global.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: medq_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// External payment gateway client.
    pub gateway: Arc<dyn PaymentGateway>,
    /// Centralized event bus for fire-and-forget notifications.
    pub event_bus: Arc<medq_events::EventBus>,
    /// Read-through cache of provider-manager assignments.
    pub role_cache: Arc<RoleCache>,
}
