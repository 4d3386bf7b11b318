use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Body could not be decoded into a quote (malformed JSON, missing `jsonobj`).
    InvalidPayload(String),
    /// Body larger than the configured limit.
    PayloadTooLarge(String),
    /// Method/path combination not served by the quote endpoint.
    RouteNotFound(String),
    /// Stored quote lookup miss.
    NotFound(String),
    /// The TurboRater forwarder refused the quote.
    UpstreamFailed(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidPayload(msg) => write!(f, "Invalid payload: {}", msg),
            AppError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            AppError::RouteNotFound(msg) => write!(f, "Route not found: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::UpstreamFailed(msg) => write!(f, "TurboRater error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Returns the innermost error, skipping any context wrappers.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    /// Maps the error to the HTTP status and JSON body sent to the caller.
    ///
    /// Server-side failures are logged here; the public body never carries the
    /// internal detail message.
    pub fn status_and_body(&self) -> (StatusCode, Value) {
        let (status, error_message) = match self {
            AppError::InvalidPayload(_) => (StatusCode::BAD_REQUEST, "Invalid JSON"),
            AppError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "Payload too large"),
            AppError::RouteNotFound(_) => (StatusCode::NOT_FOUND, "Endpoint not found"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Quote not found"),
            AppError::UpstreamFailed(msg) => {
                tracing::error!("TurboRater error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send to TurboRater",
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            AppError::WithContext { source, context } => {
                // Log full context chain for debugging
                tracing::error!("Error with context: {} -> {}", context, source);
                return source.status_and_body();
            }
        };

        (status, json!({ "error": error_message }))
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<serde_json::Error> for AppError {
    /// Decoding failures surface as invalid payloads.
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidPayload(err.to_string())
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Arguments
    ///
    /// * `context` - The context message to add.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    ///
    /// # Arguments
    ///
    /// * `f` - A closure that produces the context message.
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_payload_maps_to_400() {
        let (status, body) = AppError::InvalidPayload("eof".to_string()).status_and_body();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Invalid JSON"}));
    }

    #[test]
    fn test_payload_too_large_maps_to_413() {
        let (status, body) =
            AppError::PayloadTooLarge("3145728 bytes".to_string()).status_and_body();
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body, json!({"error": "Payload too large"}));
    }

    #[test]
    fn test_route_not_found_maps_to_404() {
        let (status, body) = AppError::RouteNotFound("GET /".to_string()).status_and_body();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Endpoint not found"}));
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let (status, body) =
            AppError::InternalError("lock poisoned".to_string()).status_and_body();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Internal server error"}));
    }

    #[test]
    fn test_context_delegates_to_source() {
        let err: Result<(), AppError> = Err(AppError::UpstreamFailed("timeout".to_string()));
        let err = err.context("forwarding quote").unwrap_err();

        assert!(matches!(err.root(), AppError::UpstreamFailed(_)));
        assert_eq!(err.to_string(), "forwarding quote: TurboRater error: timeout");

        let (status, body) = err.status_and_body();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to send to TurboRater"}));
    }

    #[test]
    fn test_with_context_is_lazy_on_success() {
        let ok: Result<u8, AppError> = Ok(7);
        let value = ok
            .with_context(|| panic!("context must not be built on success"))
            .unwrap();
        assert_eq!(value, 7);
    }
}
