//! HTTP client configuration and building logic
//!
//! This module handles the configuration and construction of the HTTP client
//! used to talk to TheMealDB.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{api, http, limits};
use crate::errors::{ApiError, ApiResult};

/// Configuration for the recipe API client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API base URL without the key segment
    pub base_url: String,
    /// API key inserted as the first path segment
    pub api_key: String,
    /// TCP nodelay (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
    /// Connection pool idle timeout
    pub pool_idle_timeout: Option<Duration>,
    /// Maximum number of idle connections per host
    pub pool_max_per_host: usize,
    /// Request timeout
    pub request_timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Rate limit (requests per second)
    pub rate_limit_rps: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: api::BASE_URL.to_string(),
            api_key: api::DEFAULT_API_KEY.to_string(),
            tcp_nodelay: true,
            pool_idle_timeout: Some(http::POOL_IDLE_TIMEOUT),
            pool_max_per_host: http::POOL_MAX_PER_HOST,
            request_timeout: http::DEFAULT_TIMEOUT,
            connect_timeout: http::CONNECT_TIMEOUT,
            rate_limit_rps: limits::DEFAULT_RATE_LIMIT_RPS,
        }
    }
}

impl ClientConfig {
    /// Point the client at a different server, e.g. a local mock
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a different API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Root URL every endpoint is joined onto: `<base_url>/<api_key>/`
    pub fn api_root(&self) -> ApiResult<Url> {
        let raw = format!(
            "{}/{}/",
            self.base_url.trim_end_matches('/'),
            self.api_key.trim_matches('/')
        );
        Url::parse(&raw).map_err(|e| ApiError::InvalidUrl {
            url: raw.clone(),
            error: e.to_string(),
        })
    }

    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> ApiResult<Client> {
        let mut client_builder = Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(http::USER_AGENT)
            .tcp_nodelay(self.tcp_nodelay)
            .pool_max_idle_per_host(self.pool_max_per_host);

        if let Some(idle_timeout) = self.pool_idle_timeout {
            client_builder = client_builder.pool_idle_timeout(idle_timeout);
        }

        client_builder.build().map_err(ApiError::Http)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert!(config.tcp_nodelay);
        assert_eq!(config.rate_limit_rps, limits::DEFAULT_RATE_LIMIT_RPS);
        assert_eq!(config.api_key, api::DEFAULT_API_KEY);
    }

    #[test]
    fn test_api_root_joins_key() {
        let config = ClientConfig::default();
        let root = config.api_root().unwrap();
        assert_eq!(root.as_str(), "https://www.themealdb.com/api/json/v1/1/");
        assert_eq!(
            root.join(api::SEARCH).unwrap().as_str(),
            "https://www.themealdb.com/api/json/v1/1/search.php"
        );
    }

    #[test]
    fn test_api_root_tolerates_trailing_slash() {
        let config = ClientConfig::default()
            .with_base_url("http://127.0.0.1:8080/")
            .with_api_key("9973533");
        assert_eq!(
            config.api_root().unwrap().as_str(),
            "http://127.0.0.1:8080/9973533/"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ClientConfig::default().with_base_url("not a url");
        assert!(matches!(
            config.api_root(),
            Err(ApiError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_http_client_with_custom_config() {
        let config = ClientConfig {
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            ..Default::default()
        };

        assert!(config.build_http_client().is_ok());
    }
}
