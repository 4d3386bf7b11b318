use crate::transport::RouteMode;

/// Request body limit used when `MAX_BODY_BYTES` is unset.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub route_mode: RouteMode,
    pub turborater_api_url: String,
    pub turborater_username: String,
    pub turborater_password: String,
    pub max_body_bytes: usize,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let config = Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            route_mode: var("ROUTE_MODE")
                .unwrap_or_else(|| "quote".to_string())
                .parse()?,
            turborater_api_url: {
                let url = var("TURBORATER_API_URL")
                    .unwrap_or_else(|| "https://api.turborater.com/quote".to_string());
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    anyhow::bail!("TURBORATER_API_URL must start with http:// or https://");
                }
                url
            },
            turborater_username: var("TURBORATER_USERNAME").unwrap_or_default(),
            turborater_password: var("TURBORATER_PASSWORD").unwrap_or_default(),
            max_body_bytes: var("MAX_BODY_BYTES")
                .unwrap_or_else(|| DEFAULT_MAX_BODY_BYTES.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_BODY_BYTES must be a positive number"))
                .and_then(|bytes: usize| {
                    if bytes == 0 {
                        anyhow::bail!("MAX_BODY_BYTES cannot be zero");
                    }
                    Ok(bytes)
                })?,
            rate_limit_per_second: var("RATE_LIMIT_PER_SECOND")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("RATE_LIMIT_PER_SECOND must be a number"))?,
            rate_limit_burst: var("RATE_LIMIT_BURST")
                .unwrap_or_else(|| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("RATE_LIMIT_BURST must be a number"))?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::debug!("Server address: {}", config.bind_address());
        tracing::debug!("Route mode: {}", config.route_mode);
        tracing::debug!("TurboRater API URL: {}", config.turborater_api_url);
        if config.turborater_username.is_empty() {
            tracing::warn!("TURBORATER_USERNAME not set; mocked client runs without credentials");
        }

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:8000");
        assert_eq!(config.route_mode, RouteMode::QuoteOnly);
        assert_eq!(config.turborater_api_url, "https://api.turborater.com/quote");
        assert_eq!(config.max_body_bytes, 1024 * 1024);
        assert_eq!(config.rate_limit_per_second, 10);
        assert_eq!(config.rate_limit_burst, 20);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "9090"),
            ("ROUTE_MODE", "any"),
            ("TURBORATER_USERNAME", "agent"),
        ])
        .unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:9090");
        assert_eq!(config.route_mode, RouteMode::AnyPath);
        assert_eq!(config.turborater_username, "agent");
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("PORT", "  ")]).unwrap();
        assert_eq!(config.port, 8000);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config_from(&[("PORT", "not-a-port")]).is_err());
        assert!(config_from(&[("PORT", "70000")]).is_err());
        assert!(config_from(&[("ROUTE_MODE", "sideways")]).is_err());
        assert!(config_from(&[("TURBORATER_API_URL", "ftp://rating")]).is_err());
        assert!(config_from(&[("MAX_BODY_BYTES", "0")]).is_err());
    }
}
