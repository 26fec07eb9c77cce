//! Shared REST transport used by the wallet and service clients.
//!
//! [`ApiTransport`] owns the `reqwest` client, default headers, credentials
//! and retry configuration. Each response body is read exactly once and
//! handed to [`classify_response`].

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::error::{classify_response, ApiError, ApiResult, RequestMeta, REQUEST_ID_HEADER};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Header used for impersonation-style scoped requests on behalf of a child user.
pub const CHILD_USER_HEADER: &str = "X-Child-User";

/// Retry configuration for idempotent requests.
///
/// POST requests are never retried: they create loans, vault plans and
/// withdrawals, and replaying them is not safe.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = disabled)
    pub max_retries: u32,
    /// Base delay before first retry (ms)
    pub base_delay_ms: u64,
    /// Maximum delay between retries (ms)
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_delay_ms: 100,
            max_delay_ms: 10_000,
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with the given max retries.
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Set the base delay in milliseconds.
    pub fn with_base_delay_ms(mut self, ms: u64) -> Self {
        self.base_delay_ms = ms;
        self
    }

    /// Set the maximum delay in milliseconds.
    pub fn with_max_delay_ms(mut self, ms: u64) -> Self {
        self.max_delay_ms = ms;
        self
    }

    /// Calculate delay for a given attempt with exponential backoff and jitter.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp_delay = self.base_delay_ms.saturating_mul(1 << attempt.min(10));
        let capped_delay = exp_delay.min(self.max_delay_ms);
        // Add jitter: 75-100% of calculated delay
        let jitter_range = capped_delay / 4;
        let jitter = rand::random::<u64>() % (jitter_range + 1);
        Duration::from_millis(capped_delay - jitter_range + jitter)
    }
}

/// Builder for configuring [`ApiTransport`].
#[derive(Debug, Clone)]
pub struct ApiTransportBuilder {
    base_url: String,
    timeout: Duration,
    default_headers: Vec<(String, String)>,
    retry_config: RetryConfig,
    auth_token: Option<String>,
    child_user: Option<String>,
}

impl ApiTransportBuilder {
    /// Create a new builder with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_headers: Vec::new(),
            retry_config: RetryConfig::default(),
            auth_token: None,
            child_user: None,
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Add a default header to all requests.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Enable retries with exponential backoff for GET requests.
    pub fn with_retry(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Send `Authorization: Bearer <token>` on every request.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Send `X-Child-User: <username>` on every request.
    pub fn child_user(mut self, username: impl Into<String>) -> Self {
        self.child_user = Some(username.into());
        self
    }

    /// Build the transport.
    pub fn build(self) -> ApiResult<ApiTransport> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        for (name, value) in self.default_headers {
            let header_name = reqwest::header::HeaderName::try_from(name.as_str()).map_err(|e| {
                ApiError::InvalidParameter(format!("Invalid header name '{}': {}", name, e))
            })?;
            let header_value = reqwest::header::HeaderValue::from_str(&value).map_err(|e| {
                ApiError::InvalidParameter(format!("Invalid header value for '{}': {}", name, e))
            })?;
            headers.insert(header_name, header_value);
        }

        let http_client = Client::builder()
            .timeout(self.timeout)
            .pool_max_idle_per_host(10)
            .default_headers(headers)
            .build()?;

        Ok(ApiTransport {
            http_client,
            base_url: self.base_url,
            retry_config: self.retry_config,
            auth_token: self.auth_token,
            child_user: self.child_user,
        })
    }
}

/// Low-level HTTP transport shared by [`WalletClient`](crate::wallet::WalletClient)
/// and [`ServiceClient`](crate::service::ServiceClient).
#[derive(Debug, Clone)]
pub struct ApiTransport {
    http_client: Client,
    base_url: String,
    retry_config: RetryConfig,
    auth_token: Option<String>,
    child_user: Option<String>,
}

impl ApiTransport {
    /// Create a transport with default settings (30s timeout, no retries).
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        ApiTransportBuilder::new(base_url).build()
    }

    pub fn builder(base_url: impl Into<String>) -> ApiTransportBuilder {
        ApiTransportBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    pub fn set_auth_token(&mut self, token: impl Into<String>) {
        self.auth_token = Some(token.into());
    }

    pub fn clear_auth_token(&mut self) {
        self.auth_token = None;
    }

    pub fn has_auth_token(&self) -> bool {
        self.auth_token.is_some()
    }

    pub fn set_child_user(&mut self, username: impl Into<String>) {
        self.child_user = Some(username.into());
    }

    pub fn clear_child_user(&mut self) {
        self.child_user = None;
    }

    pub fn child_user(&self) -> Option<&str> {
        self.child_user.as_deref()
    }

    /// Join a path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    // =========================================================================
    // Request helpers
    // =========================================================================

    /// GET with retries per [`RetryConfig`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.execute(Method::GET, path, None::<&()>, true).await
    }

    /// POST a JSON body. Never retried.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        self.execute(Method::POST, path, Some(body), false).await
    }

    fn request<B: Serialize>(
        &self,
        method: &Method,
        url: &str,
        body: Option<&B>,
    ) -> reqwest::RequestBuilder {
        let mut req = self.http_client.request(method.clone(), url);

        if let Some(token) = &self.auth_token {
            req = req.header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(child) = &self.child_user {
            req = req.header(CHILD_USER_HEADER, child);
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        req
    }

    async fn execute<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        retry: bool,
    ) -> ApiResult<T> {
        let url = self.url(path);
        let max_retries = if retry { self.retry_config.max_retries } else { 0 };
        let mut attempt = 0;

        loop {
            match self.request(&method, &url, body).send().await {
                Ok(response) => {
                    let status = response.status();

                    if attempt < max_retries && Self::is_retryable_status(status) {
                        let delay = self.retry_config.delay_for_attempt(attempt);
                        tracing::debug!(
                            attempt = attempt + 1,
                            max_retries,
                            delay_ms = delay.as_millis() as u64,
                            status = %status,
                            "Retrying request after error"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    return Self::read_response(&method, response).await;
                }
                Err(e) => {
                    let is_retryable = e.is_connect() || e.is_timeout() || e.is_request();

                    if attempt < max_retries && is_retryable {
                        let delay = self.retry_config.delay_for_attempt(attempt);
                        tracing::debug!(
                            attempt = attempt + 1,
                            max_retries,
                            delay_ms = delay.as_millis() as u64,
                            error = %e,
                            "Retrying request after network error"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        continue;
                    }

                    return Err(ApiError::Http(e));
                }
            }
        }
    }

    /// Consume the body once and classify it.
    async fn read_response<T: DeserializeOwned>(
        method: &Method,
        response: reqwest::Response,
    ) -> ApiResult<T> {
        let status = response.status().as_u16();
        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let meta = RequestMeta::new(method.as_str(), response.url().path())
            .with_request_id(request_id);

        let body = response.bytes().await?;
        let result = classify_response(status, meta, &body);

        if let Err(e) = &result {
            tracing::debug!(status, error = %e, "API request failed");
        }

        result
    }

    /// Check if a status code is retryable.
    fn is_retryable_status(status: StatusCode) -> bool {
        status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        let transport = ApiTransport::new("https://testapi.zarban.io").unwrap();
        assert_eq!(transport.base_url(), "https://testapi.zarban.io");
        assert!(!transport.has_auth_token());
        assert!(transport.child_user().is_none());
    }

    #[test]
    fn test_builder_trims_trailing_slash() {
        let transport = ApiTransport::builder("https://testwapi.zarban.io/")
            .timeout_secs(60)
            .header("X-Custom", "test")
            .auth_token("jwt")
            .child_user("child_user_test")
            .build()
            .unwrap();

        assert_eq!(transport.base_url(), "https://testwapi.zarban.io");
        assert!(transport.has_auth_token());
        assert_eq!(transport.child_user(), Some("child_user_test"));
    }

    #[test]
    fn test_builder_rejects_invalid_header() {
        let result = ApiTransport::builder("https://testapi.zarban.io")
            .header("bad header", "value")
            .build();
        assert!(matches!(result, Err(ApiError::InvalidParameter(_))));
    }

    #[test]
    fn test_url_join() {
        let transport = ApiTransport::new("https://testapi.zarban.io/").unwrap();
        assert_eq!(
            transport.url("/v2/stablecoin-system/ilks"),
            "https://testapi.zarban.io/v2/stablecoin-system/ilks"
        );
        assert_eq!(transport.url("v2/x"), "https://testapi.zarban.io/v2/x");
    }

    #[test]
    fn test_credentials_toggle() {
        let mut transport = ApiTransport::new("https://testwapi.zarban.io").unwrap();
        transport.set_auth_token("t");
        transport.set_child_user("c");
        assert!(transport.has_auth_token());
        transport.clear_auth_token();
        transport.clear_child_user();
        assert!(!transport.has_auth_token());
        assert!(transport.child_user().is_none());
    }

    #[test]
    fn test_retry_config() {
        let config = RetryConfig::new(3)
            .with_base_delay_ms(200)
            .with_max_delay_ms(5000);

        assert_eq!(config.max_retries, 3);
        assert_eq!(config.base_delay_ms, 200);
        assert_eq!(config.max_delay_ms, 5000);
    }

    #[test]
    fn test_retry_delay_calculation() {
        let config = RetryConfig {
            max_retries: 5,
            base_delay_ms: 100,
            max_delay_ms: 1000,
        };

        // First attempt: ~100ms (75-100ms with jitter)
        let delay0 = config.delay_for_attempt(0);
        assert!(delay0.as_millis() >= 75 && delay0.as_millis() <= 100);

        let delay1 = config.delay_for_attempt(1);
        assert!(delay1.as_millis() >= 150 && delay1.as_millis() <= 200);

        // Large attempt: capped at max_delay
        let delay10 = config.delay_for_attempt(10);
        assert!(delay10.as_millis() >= 750 && delay10.as_millis() <= 1000);
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(ApiTransport::is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(ApiTransport::is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(!ApiTransport::is_retryable_status(StatusCode::BAD_REQUEST));
        assert!(!ApiTransport::is_retryable_status(StatusCode::NOT_FOUND));
    }
}
