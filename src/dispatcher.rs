//! Quote submission pipeline: decode → online gate → ACORD transform → forward → store.

use axum::http::StatusCode;
use serde_json::{json, Value};
use std::borrow::Cow;
use std::sync::Arc;

use crate::acord::AcordTransformer;
use crate::errors::{AppError, ResultExt};
use crate::models::{AcceptedQuote, IgnoredResponse, QuoteInput, QuoteResponse};
use crate::store::QuoteStore;
use crate::turborater::QuoteForwarder;

/// Channel value that triggers transformation and storage.
pub const ONLINE_CHANNEL: &str = "online";

pub const IGNORED_REASON: &str = "Not an online quote";

/// Form field carrying the JSON document in form-encoded submissions.
pub const FORM_JSON_FIELD: &str = "jsonobj";

/// Outcome of one submission.
#[derive(Debug, Clone)]
pub enum DispatchResult {
    Accepted {
        quote_id: String,
        xml: String,
        message: String,
    },
    Ignored {
        reason: String,
    },
    Rejected(AppError),
}

impl DispatchResult {
    /// HTTP status and JSON body for this outcome.
    pub fn into_reply(self) -> (StatusCode, Value) {
        match self {
            DispatchResult::Accepted {
                quote_id,
                xml,
                message,
            } => (
                StatusCode::OK,
                json!(QuoteResponse {
                    status: "success".to_string(),
                    data: AcceptedQuote {
                        quote_id,
                        xml,
                        message,
                    },
                }),
            ),
            DispatchResult::Ignored { reason } => (
                StatusCode::OK,
                json!(IgnoredResponse {
                    status: "ignored".to_string(),
                    reason,
                }),
            ),
            DispatchResult::Rejected(err) => err.status_and_body(),
        }
    }
}

/// How a request body encodes the quote document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadEncoding {
    Json,
    Form,
}

impl PayloadEncoding {
    /// Picks the encoding from the content type, sniffing the body when the
    /// content type is missing or unrecognized.
    pub fn detect(body: &[u8], content_type: Option<&str>) -> Self {
        let essence = content_type
            .and_then(|ct| ct.split(';').next())
            .map(|ct| ct.trim().to_ascii_lowercase());

        match essence.as_deref() {
            Some("application/json") => PayloadEncoding::Json,
            Some(ct) if ct.ends_with("+json") => PayloadEncoding::Json,
            Some("application/x-www-form-urlencoded") => PayloadEncoding::Form,
            _ => match body.iter().find(|b| !b.is_ascii_whitespace()) {
                None | Some(b'{') | Some(b'[') => PayloadEncoding::Json,
                Some(_) => PayloadEncoding::Form,
            },
        }
    }
}

/// Decodes a raw body into a quote.
///
/// Fails with [`AppError::InvalidPayload`] on malformed JSON, a form body
/// without `jsonobj`, or a JSON value that is not an object.
pub fn decode_payload(body: &[u8], content_type: Option<&str>) -> Result<QuoteInput, AppError> {
    let document: Cow<'_, [u8]> = match PayloadEncoding::detect(body, content_type) {
        PayloadEncoding::Json => Cow::Borrowed(body),
        PayloadEncoding::Form => url::form_urlencoded::parse(body)
            .find(|(key, _)| key == FORM_JSON_FIELD)
            .map(|(_, value)| Cow::Owned(value.into_owned().into_bytes()))
            .ok_or_else(|| {
                AppError::InvalidPayload(format!("missing '{}' form field", FORM_JSON_FIELD))
            })?,
    };

    Ok(serde_json::from_slice(&document)?)
}

/// Hosting-agnostic request handler shared by every transport.
pub struct Dispatcher {
    transformer: AcordTransformer,
    store: Arc<dyn QuoteStore>,
    forwarder: Arc<dyn QuoteForwarder>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn QuoteStore>, forwarder: Arc<dyn QuoteForwarder>) -> Self {
        Self {
            transformer: AcordTransformer::default(),
            store,
            forwarder,
        }
    }

    pub fn with_transformer(mut self, transformer: AcordTransformer) -> Self {
        self.transformer = transformer;
        self
    }

    pub fn store(&self) -> &Arc<dyn QuoteStore> {
        &self.store
    }

    /// Handles one submission end to end. Never panics on bad input and never
    /// leaves a partial record behind.
    pub fn handle(&self, body: &[u8], content_type: Option<&str>) -> DispatchResult {
        let input = match decode_payload(body, content_type) {
            Ok(input) => input,
            Err(e) => {
                tracing::warn!("Rejected quote payload ({} bytes): {}", body.len(), e);
                return DispatchResult::Rejected(e);
            }
        };

        tracing::debug!(
            "Decoded quote payload: {}",
            serde_json::to_string(&input).unwrap_or_default()
        );

        match self.process(input) {
            Ok(result) => result,
            Err(e) => DispatchResult::Rejected(e),
        }
    }

    fn process(&self, input: QuoteInput) -> Result<DispatchResult, AppError> {
        let field_map = self.transformer.field_map(input.layout());
        let channel = field_map.channel(&input);

        if channel.as_deref() != Some(ONLINE_CHANNEL) {
            tracing::info!(
                "Ignoring quote from channel {:?} ({})",
                channel,
                input.summary()
            );
            return Ok(DispatchResult::Ignored {
                reason: IGNORED_REASON.to_string(),
            });
        }

        let xml = self.transformer.transform(&input);
        tracing::debug!("Generated ACORD XML: {}", xml);

        let receipt = self
            .forwarder
            .forward(&xml)
            .context("forwarding quote to TurboRater")?;

        // The upstream already holds the quote; keep its reference if storing fails
        let summary = input.summary();
        let stored = self.store.put(xml, input).with_context(|| {
            format!(
                "storing quote already forwarded to TurboRater as {}",
                receipt.quote_id
            )
        })?;

        tracing::info!(
            "Accepted online quote {} (upstream ref {}, {})",
            stored.id,
            receipt.quote_id,
            summary
        );

        Ok(DispatchResult::Accepted {
            quote_id: stored.id,
            xml: stored.xml,
            message: receipt.message,
        })
    }
}
