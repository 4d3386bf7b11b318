use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::errors::AppError;

/// Upstream reference returned by the mocked TurboRater endpoint.
pub const MOCK_TURBORATER_QUOTE_ID: &str = "TR123456789";

/// Acknowledgement from the rating system for one forwarded quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardReceipt {
    pub status: String,
    pub quote_id: String,
    pub message: String,
}

/// Sends ACORD documents to the rating system.
pub trait QuoteForwarder: Send + Sync {
    fn forward(&self, xml: &str) -> Result<ForwardReceipt, AppError>;
}

/// Stand-in for the TurboRater quote API. Issues no network request.
///
/// Holds the endpoint and credentials a real client would use so deployments
/// configure it the same way.
#[derive(Clone)]
pub struct MockTurboRater {
    api_url: String,
    username: String,
    password: String,
}

impl MockTurboRater {
    pub fn new(api_url: String, username: String, password: String) -> Self {
        tracing::info!(
            "TurboRater client initialized (mocked): {} user={} password_set={}",
            api_url,
            username,
            !password.is_empty()
        );
        Self {
            api_url,
            username,
            password,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.turborater_api_url.clone(),
            config.turborater_username.clone(),
            config.turborater_password.clone(),
        )
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

impl std::fmt::Debug for MockTurboRater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTurboRater")
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field("password_set", &!self.password.is_empty())
            .finish()
    }
}

impl QuoteForwarder for MockTurboRater {
    fn forward(&self, xml: &str) -> Result<ForwardReceipt, AppError> {
        tracing::info!("Generated ACORD XML for {}: {}", self.api_url, xml);

        let receipt = ForwardReceipt {
            status: "success".to_string(),
            quote_id: MOCK_TURBORATER_QUOTE_ID.to_string(),
            message: "Quote stored successfully".to_string(),
        };

        tracing::info!(
            "Mock TurboRater response: status={} quote_id={} message={}",
            receipt.status,
            receipt.quote_id,
            receipt.message
        );
        Ok(receipt)
    }
}
