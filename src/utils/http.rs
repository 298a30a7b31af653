//! HTTP client utilities.

use reqwest::{Client, RequestBuilder};
use std::sync::Arc;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::sources::FeedError;

/// Shared HTTP client with the feed's user agent and timeouts
///
/// arXiv asks API clients to identify themselves, so every request made
/// through this client carries a descriptive `User-Agent`. A timeout of 0
/// seconds in [`HttpConfig`] means no timeout.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, FeedError> {
        Self::from_config(&HttpConfig::default())
    }

    /// Create a new HTTP client from configuration
    pub fn from_config(config: &HttpConfig) -> Result<Self, FeedError> {
        let timeout = non_zero_secs(config.timeout_secs);
        let connect_timeout = non_zero_secs(config.connect_timeout_secs);

        let mut builder = Client::builder()
            .user_agent(config.user_agent.as_str())
            .pool_idle_timeout(Duration::from_secs(90));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FeedError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            timeout,
            connect_timeout,
        })
    }

    /// Create a new HTTP client with a custom user agent
    pub fn with_user_agent(user_agent: &str) -> Result<Self, FeedError> {
        Self::from_config(&HttpConfig {
            user_agent: user_agent.to_string(),
            ..HttpConfig::default()
        })
    }

    /// Create from an existing reqwest Client
    ///
    /// The client's own timeouts are opaque, so [`timeout`](Self::timeout)
    /// and [`connect_timeout`](Self::connect_timeout) report `None`.
    pub fn from_client(client: Arc<Client>) -> Self {
        Self {
            client,
            timeout: None,
            connect_timeout: None,
        }
    }

    /// Start a GET request
    pub fn get(&self, url: impl reqwest::IntoUrl) -> RequestBuilder {
        self.client.get(url)
    }

    /// Get the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Whole-request timeout, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Connect timeout, `None` when disabled
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_client_builds() {
        assert!(HttpClient::new().is_ok());
    }

    #[test]
    fn test_custom_user_agent_builds() {
        assert!(HttpClient::with_user_agent("paper-feed-tests/0.0").is_ok());
    }

    #[test]
    fn test_configured_timeouts() {
        let client = HttpClient::new().unwrap();
        assert_eq!(client.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(client.connect_timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let client = HttpClient::from_config(&HttpConfig {
            timeout_secs: 0,
            connect_timeout_secs: 0,
            ..HttpConfig::default()
        })
        .unwrap();

        assert_eq!(client.timeout(), None);
        assert_eq!(client.connect_timeout(), None);
    }

    #[tokio::test]
    async fn test_zero_timeout_requests_complete() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let client = HttpClient::from_config(&HttpConfig {
            timeout_secs: 0,
            ..HttpConfig::default()
        })
        .unwrap();
        let response = client.get(server.url()).send().await.unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), "ok");
        mock.assert_async().await;
    }
}
