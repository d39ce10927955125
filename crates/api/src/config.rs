//! Server and gateway configuration loaded from environment variables.

/// Server configuration.
///
/// All fields have defaults suitable for local development. In production,
/// override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Optional notification service endpoint; when unset, events are not
    /// relayed externally.
    pub notification_endpoint: Option<String>,
    /// Payment gateway settings.
    pub gateway: GatewayConfig,
}

/// External payment gateway settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway's order API.
    pub base_url: String,
    /// Merchant key id sent with order creation.
    pub key_id: String,
    /// Shared secret used to verify callback signatures (HMAC-SHA256).
    pub webhook_secret: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                  | Default                    |
    /// |--------------------------|----------------------------|
    /// | `HOST`                   | `0.0.0.0`                  |
    /// | `PORT`                   | `3000`                     |
    /// | `CORS_ORIGINS`           | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`   | `30`                       |
    /// | `NOTIFY_ENDPOINT`        | unset                      |
    /// | `GATEWAY_BASE_URL`       | `http://localhost:9090`    |
    /// | `GATEWAY_KEY_ID`         | `dev-key`                  |
    /// | `GATEWAY_WEBHOOK_SECRET` | `dev-secret`               |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let notification_endpoint = std::env::var("NOTIFY_ENDPOINT").ok();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            notification_endpoint,
            gateway: GatewayConfig::from_env(),
        }
    }
}

impl GatewayConfig {
    /// Load gateway settings from environment variables with dev defaults.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("GATEWAY_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:9090".into()),
            key_id: std::env::var("GATEWAY_KEY_ID").unwrap_or_else(|_| "dev-key".into()),
            webhook_secret: std::env::var("GATEWAY_WEBHOOK_SECRET")
                .unwrap_or_else(|_| "dev-secret".into()),
        }
    }
}
