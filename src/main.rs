use std::net::SocketAddr;
use std::sync::Arc;

use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rust_acord_api::config::Config;
use rust_acord_api::dispatcher::Dispatcher;
use rust_acord_api::handlers::AppState;
use rust_acord_api::routes::create_router;
use rust_acord_api::store::MemoryQuoteStore;
use rust_acord_api::turborater::MockTurboRater;

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, wires the in-memory quote store
/// and the mocked TurboRater client into the dispatcher, then serves the
/// router until Ctrl+C.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_acord_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let store = Arc::new(MemoryQuoteStore::new());
    tracing::info!("In-memory quote store initialized");

    let forwarder = Arc::new(MockTurboRater::from_config(&config));

    let dispatcher = Arc::new(Dispatcher::new(store, forwarder));
    let app_state = Arc::new(AppState::new(config.clone(), dispatcher));

    // Per-IP rate limiting
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(config.rate_limit_per_second)
            .burst_size(config.rate_limit_burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?,
    );

    // Body size limit is set in create_router
    let app = create_router(app_state)
        .layer(ServiceBuilder::new().layer(GovernorLayer {
            config: governor_conf,
        }))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        "Server started on {} at {} (route mode: {})",
        addr,
        chrono::Utc::now(),
        config.route_mode
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

/// Resolves on Ctrl+C. Never resolves if the signal handler cannot be installed.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down server at {}", chrono::Utc::now());
}
