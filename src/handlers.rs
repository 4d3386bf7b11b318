use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::errors::AppError;
use crate::models::StoredQuote;
use crate::transport::{QuoteEndpoint, TransportAdapter, TransportRequest, TransportResponse};
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Quote pipeline; also owns the quote store.
    pub dispatcher: Arc<Dispatcher>,
    /// Adapter that decides which requests are quote submissions.
    pub endpoint: Arc<dyn TransportAdapter>,
}

impl AppState {
    /// Wires the quote endpoint for the configured route mode.
    pub fn new(config: Config, dispatcher: Arc<Dispatcher>) -> Self {
        let endpoint = Arc::new(QuoteEndpoint::new(dispatcher.clone(), config.route_mode));
        Self {
            config,
            dispatcher,
            endpoint,
        }
    }
}

/// Health check endpoint.
///
/// Returns the service status, version, and number of quotes held in memory.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "rust-acord-api",
            "version": env!("CARGO_PKG_VERSION"),
            "route_mode": state.config.route_mode.to_string(),
            "stored_quotes": state.dispatcher.store().len()
        })),
    )
}

/// GET /quotes/:id
///
/// Returns a previously accepted quote with its ACORD XML and raw input.
pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StoredQuote>, AppError> {
    tracing::info!("GET /quotes/{}", id);

    state
        .dispatcher
        .store()
        .get(&id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Quote {} not found", id)))
}

/// Quote submission entry for the standalone listener.
///
/// Mounted as the router fallback: the transport adapter decides whether the
/// method/path is a submission and answers 404 otherwise. Bodies over the
/// router's limit are answered with a JSON 413.
pub async fn submit_quote(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(
                "Rejected {} {} body: {}",
                method,
                uri.path(),
                rejection.body_text()
            );
            let err = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::PayloadTooLarge(rejection.body_text())
            } else {
                AppError::InvalidPayload(rejection.body_text())
            };
            return TransportResponse::from_error(&err).into_response();
        }
    };

    tracing::info!("{} {} - {} byte body", method, uri.path(), body.len());

    let request = TransportRequest {
        method,
        path: uri.path().to_string(),
        headers,
        body,
    };

    state.endpoint.serve(request).into_response()
}
