use anyhow::Context;
use domain_enrichment_api::chat_transport::HttpChatTransport;
use domain_enrichment_api::config::Config;
use domain_enrichment_api::enrichment::Enricher;
use domain_enrichment_api::handlers::{self, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - The chat transport and the enrichment orchestrator.
/// - HTTP routes and middleware (CORS, Rate Limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "domain_enrichment_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let status = config.provider_status();
    tracing::info!(
        "Available providers: {:?}",
        status
            .available_providers
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
    );

    let transport = HttpChatTransport::new(&config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize chat transport: {}", e))?;
    let addr = format!("{}:{}", config.host, config.port);

    let app_state = Arc::new(AppState {
        enricher: Enricher::new(config, Arc::new(transport)),
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .context("invalid rate limiter configuration")?,
    );

    // Health checks bypass rate limiting
    let api = handlers::api_routes().layer(GovernorLayer {
        config: governor_conf,
    });
    let app = handlers::router(app_state, api);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
