use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use medq_api::config::ServerConfig;
use medq_api::gateway::HttpGateway;
use medq_api::router::build_app_router;
use medq_api::services::role_cache::RoleCache;
use medq_api::state::AppState;
use medq_events::{EventBus, NotificationRelay};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "medq_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = medq_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    medq_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    medq_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Payment gateway client ---
    let gateway = Arc::new(HttpGateway::new(config.gateway.clone()));

    // --- Event bus + notification relay ---
    let event_bus = Arc::new(EventBus::default());
    if let Some(endpoint) = &config.notification_endpoint {
        let relay = NotificationRelay::new(endpoint.clone());
        tokio::spawn(relay.run(event_bus.subscribe()));
        tracing::info!(endpoint, "Notification relay started");
    } else {
        tracing::info!("No NOTIFY_ENDPOINT configured; notifications stay in-process");
    }

    // --- Role cache ---
    let role_cache = Arc::new(RoleCache::new(pool.clone()));

    // --- App state & router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        gateway,
        event_bus,
        role_cache,
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Server stopped");
}

/// Resolve on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
