//! Main FlowdeckClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use reqwest::Method;
use reqwest::Response;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ApiError;

use super::retry::RetryConfig;

/// Client for the flows HTTP API.
///
/// This client is cheap to clone (uses `Arc` internally) and can be shared
/// across threads safely.
///
/// # Example
///
/// ```ignore
/// use flowdeck_lib::api::FlowdeckClient;
///
/// let client = FlowdeckClient::builder()
///     .url("https://cloud.example.com/api")
///     .token("my-token")
///     .build()?;
/// ```
#[derive(Clone)]
pub struct FlowdeckClient {
    inner: Arc<FlowdeckClientInner>,
}

struct FlowdeckClientInner {
    base_url: Url,
    token: Option<String>,
    http_client: Client,
    timeout: Option<Duration>,
    retry: RetryConfig,
}

impl FlowdeckClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> FlowdeckClientBuilder<Missing> {
        FlowdeckClientBuilder::new()
    }

    /// Returns the base URL of the API. Always ends with `/`.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.inner.retry
    }

    /// Resolves `path` against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", path, e)))
    }

    /// Sends a request, retrying transient failures per the retry config.
    pub(crate) async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, ApiError> {
        let retry = &self.inner.retry;
        let mut attempt = 0;

        loop {
            match self.send_once(method.clone(), url.clone(), body).await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < retry.max_retries && retry.should_retry(&err) => {
                    let delay = retry.delay_for(attempt);
                    log::warn!(
                        "{} {} failed ({}), retry {}/{} in {:?}",
                        method,
                        url,
                        err,
                        attempt + 1,
                        retry.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Sends a request and parses the JSON response body.
    pub(crate) async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<T, ApiError> {
        let response = self.request(method, url, body).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| ApiError::parse_with_body(e.to_string(), text))
    }

    async fn send_once(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, ApiError> {
        log::debug!("{} {}", method, url);

        let mut request = self
            .inner
            .http_client
            .request(method, url)
            .header(ACCEPT, "application/json");

        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token);
        }
        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| match self.inner.timeout {
            Some(timeout) if e.is_timeout() => ApiError::Timeout(timeout),
            _ => ApiError::Network(e),
        })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    log::warn!("Failed to read body of HTTP {} response: {}", status, e);
                    String::new()
                }
            };
            Err(ApiError::from_body(status, &body))
        }
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`FlowdeckClient`].
///
/// Uses the typestate pattern to ensure the URL is set at compile time.
///
/// # Example
///
/// ```ignore
/// let client = FlowdeckClient::builder()
///     .url("https://cloud.example.com/api")
///     .token(token)
///     .timeout(Duration::from_secs(30))
///     .retry(RetryConfig::default().max_retries(5))
///     .build()?;
/// ```
pub struct FlowdeckClientBuilder<U> {
    url: U,
    token: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry: RetryConfig,
    http_client: Option<Client>,
}

impl FlowdeckClientBuilder<Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            token: None,
            timeout: None,
            connect_timeout: None,
            retry: RetryConfig::default(),
            http_client: None,
        }
    }

    /// Sets the API base URL.
    pub fn url(self, url: impl Into<String>) -> FlowdeckClientBuilder<Set<String>> {
        FlowdeckClientBuilder {
            url: Set(url.into()),
            token: self.token,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            retry: self.retry,
            http_client: self.http_client,
        }
    }
}

impl Default for FlowdeckClientBuilder<Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U> FlowdeckClientBuilder<U> {
    /// Sets the bearer token sent with every request.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the retry behavior for transient failures.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl FlowdeckClientBuilder<Set<String>> {
    /// Builds the [`FlowdeckClient`].
    pub fn build(self) -> Result<FlowdeckClient, ApiError> {
        let mut base_url =
            Url::parse(&self.url.0).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.url.0, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(self.url.0));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(FlowdeckClient {
            inner: Arc::new(FlowdeckClientInner {
                base_url,
                token: self.token,
                http_client,
                timeout: self.timeout,
                retry: self.retry,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = FlowdeckClient::builder()
            .url("https://cloud.example.com/api")
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "https://cloud.example.com/api/");
        assert_eq!(
            client.endpoint("/v1/flows").unwrap().as_str(),
            "https://cloud.example.com/api/v1/flows"
        );
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let err = FlowdeckClient::builder().url("not a url").build().err().unwrap();
        assert!(matches!(err, ApiError::InvalidUrl(_)));

        let err = FlowdeckClient::builder().url("mailto:ops@example.com").build().err().unwrap();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }
}
