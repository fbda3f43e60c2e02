use crate::enrichment::Enricher;
use crate::errors::AppError;
use crate::models::*;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Request bodies above this size are rejected.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Orchestrator holding the immutable configuration and provider adapters.
    pub enricher: Enricher,
}

/// Builds the API routes.
///
/// `/api` routes are returned separately so the server can put rate limiting
/// in front of them while health checks bypass it.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/config", get(get_config))
        .route("/api/enrich", post(enrich_domain))
        .route("/api/enrich/batch", post(enrich_batch))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

/// Full application router.
///
/// `api` is normally [`api_routes`], optionally wrapped in a rate limiter;
/// `/` and `/health` are always mounted outside it.
pub fn router(state: Arc<AppState>, api: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// GET /
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Domain Enrichment API",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Health check endpoint.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "domain-enrichment-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /api/config
///
/// Reports which credentials are configured and which providers are usable.
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ProviderStatus> {
    Json(state.enricher.config().provider_status())
}

/// POST /api/enrich
///
/// Enriches one domain with the requested provider.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `payload` - Domain, provider, fields and optional credential/endpoint.
///
/// # Returns
///
/// * `Result<Json<EnrichmentResult>, AppError>` - The enrichment result or an error.
pub async fn enrich_domain(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EnrichmentRequest>,
) -> Result<Json<EnrichmentResult>, AppError> {
    tracing::info!(
        "POST /api/enrich - domain: {}, provider: {}, fields: {:?}, custom key: {}",
        payload.domain,
        payload.provider,
        payload.fields,
        payload.custom_api_key.is_some()
    );

    let result = state.enricher.resolve(&payload).await?;
    Ok(Json(result))
}

/// POST /api/enrich/batch
///
/// Enriches a list of raw values (domains, URLs or e-mail addresses).
pub async fn enrich_batch(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BatchEnrichmentRequest>,
) -> Result<Json<BatchEnrichmentResponse>, AppError> {
    tracing::info!(
        "POST /api/enrich/batch - {} values, provider: {}",
        payload.values.len(),
        payload.provider
    );

    let response = state.enricher.enrich_batch(&payload).await?;
    Ok(Json(response))
}
