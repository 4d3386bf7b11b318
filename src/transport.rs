//! Transport adapters: the seam between hosting shapes and the dispatcher.
//!
//! Both the axum listener and the gateway-invoked entry point translate their
//! wire request into a [`TransportRequest`] and hand it to a
//! [`TransportAdapter`]; neither knows about quotes.

use axum::{
    body::Bytes,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::fmt;
use std::io::Read;
use std::str::FromStr;
use std::sync::Arc;

use crate::config::DEFAULT_MAX_BODY_BYTES;
use crate::dispatcher::Dispatcher;
use crate::errors::AppError;

/// Path served by the quote endpoint in [`RouteMode::QuoteOnly`].
pub const QUOTE_PATH: &str = "/quote";

/// Which requests the quote endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMode {
    /// Only `POST /quote`; everything else is 404.
    QuoteOnly,
    /// `POST` on any path.
    AnyPath,
}

impl FromStr for RouteMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quote" => Ok(RouteMode::QuoteOnly),
            "any" => Ok(RouteMode::AnyPath),
            other => anyhow::bail!("ROUTE_MODE must be 'quote' or 'any', got '{}'", other),
        }
    }
}

impl fmt::Display for RouteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteMode::QuoteOnly => write!(f, "quote"),
            RouteMode::AnyPath => write!(f, "any"),
        }
    }
}

/// Hosting-neutral request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Hosting-neutral response. The body is always JSON.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn json(status: StatusCode, body: &Value) -> Self {
        let body = Bytes::from(body.to_string());
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn from_error(err: &AppError) -> Self {
        let (status, body) = err.status_and_body();
        Self::json(status, &body)
    }

    /// Status line in gateway form, e.g. `200 OK`.
    pub fn status_line(&self) -> String {
        format!(
            "{} {}",
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("")
        )
        .trim_end()
        .to_string()
    }
}

impl IntoResponse for TransportResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

/// Translates one generic request into one generic response.
pub trait TransportAdapter: Send + Sync {
    fn serve(&self, request: TransportRequest) -> TransportResponse;
}

/// The quote submission endpoint.
#[derive(Clone)]
pub struct QuoteEndpoint {
    dispatcher: Arc<Dispatcher>,
    mode: RouteMode,
}

impl QuoteEndpoint {
    pub fn new(dispatcher: Arc<Dispatcher>, mode: RouteMode) -> Self {
        Self { dispatcher, mode }
    }

    pub fn accepts(&self, method: &Method, path: &str) -> bool {
        *method == Method::POST
            && match self.mode {
                RouteMode::AnyPath => true,
                RouteMode::QuoteOnly => path == QUOTE_PATH,
            }
    }
}

impl TransportAdapter for QuoteEndpoint {
    fn serve(&self, request: TransportRequest) -> TransportResponse {
        if !self.accepts(&request.method, &request.path) {
            tracing::debug!("No quote route for {} {}", request.method, request.path);
            return TransportResponse::from_error(&AppError::RouteNotFound(format!(
                "{} {}",
                request.method, request.path
            )));
        }

        let content_type = request
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok());

        let (status, body) = self
            .dispatcher
            .handle(&request.body, content_type)
            .into_reply();
        TransportResponse::json(status, &body)
    }
}

/// Reply handed back to a gateway host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayReply {
    pub status_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl From<TransportResponse> for GatewayReply {
    fn from(response: TransportResponse) -> Self {
        let headers = response
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Self {
            status_line: response.status_line(),
            headers,
            body: response.body.to_vec(),
        }
    }
}

/// Entry point for hosts that call the service as a function per request.
pub struct GatewayHost<A> {
    adapter: A,
    max_body_bytes: usize,
}

impl<A: TransportAdapter> GatewayHost<A> {
    pub fn new(adapter: A) -> Self {
        Self {
            adapter,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Largest `Content-Length` the host will read; bigger requests get 413.
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Handles one gateway invocation.
    ///
    /// Reads exactly `Content-Length` bytes from `body`; the stream is not
    /// expected to end after the payload.
    pub fn invoke<R: Read>(
        &self,
        method: &str,
        path: &str,
        headers: &HeaderMap,
        body: &mut R,
    ) -> GatewayReply {
        let Ok(method) = Method::from_bytes(method.as_bytes()) else {
            return TransportResponse::from_error(&AppError::RouteNotFound(format!(
                "{} {}",
                method, path
            )))
            .into();
        };

        let body = match read_body(headers, body, self.max_body_bytes) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Rejected {} {} body: {}", method, path, e);
                return TransportResponse::from_error(&e).into();
            }
        };

        self.adapter
            .serve(TransportRequest {
                method,
                path: path.to_string(),
                headers: headers.clone(),
                body,
            })
            .into()
    }
}

/// Declared `Content-Length`, or zero when absent or unparsable.
pub fn content_length(headers: &HeaderMap) -> usize {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

/// Reads up to `Content-Length` bytes. A shorter stream yields what was sent,
/// which then fails JSON decoding rather than blocking.
///
/// A declared length above `limit` is refused before anything is read or
/// allocated.
pub fn read_body<R: Read>(
    headers: &HeaderMap,
    reader: &mut R,
    limit: usize,
) -> Result<Bytes, AppError> {
    let length = content_length(headers);
    if length > limit {
        return Err(AppError::PayloadTooLarge(format!(
            "declared {} bytes, limit is {}",
            length, limit
        )));
    }

    let mut buf = Vec::with_capacity(length);
    reader
        .take(length as u64)
        .read_to_end(&mut buf)
        .map_err(|e| AppError::InternalError(format!("Failed to read request body: {}", e)))?;
    Ok(Bytes::from(buf))
}
