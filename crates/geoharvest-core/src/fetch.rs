//! Resilient HTTP fetch: per-attempt timeout, bounded retries, linear backoff.

use crate::config::{HarvestConfig, KeyValue};
use crate::error::{HarvestError, Result};
use crate::ports::{HttpResponse, Transport, TransportError};
use async_trait::async_trait;
use reqwest::Url;
use std::time::Duration;

/// Default backoff unit; attempt `n` waits `n + 1` units before the next try
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(1000);

/// A fully built GET request
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub url: Url,
    pub headers: Vec<KeyValue>,
}

impl FetchRequest {
    pub fn new(url: Url) -> Self {
        Self { url, headers: Vec::new() }
    }

    /// Build the request for a run: query params appended to the URL, headers in list order
    pub fn from_config(config: &HarvestConfig) -> Self {
        Self { url: config.request_url(), headers: config.headers.clone() }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(KeyValue::new(key, value));
        self
    }
}

/// Retry and timeout policy applied by [`Fetcher`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure
    pub retries: u32,
    /// Deadline for each individual attempt
    pub timeout: Duration,
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: crate::config::DEFAULT_RETRIES,
            timeout: Duration::from_millis(crate::config::DEFAULT_TIMEOUT_MS),
            backoff_base: DEFAULT_BACKOFF_BASE,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &HarvestConfig) -> Self {
        Self { retries: config.retries, timeout: config.timeout, ..Default::default() }
    }

    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    /// Total number of attempts, including the first
    pub fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Wait after the 0-based `attempt` failed
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(attempt.saturating_add(1))
    }
}

/// Fetches a body through a [`Transport`], retrying failed attempts sequentially
pub struct Fetcher<T: Transport> {
    transport: T,
    policy: RetryPolicy,
}

impl Fetcher<ReqwestTransport> {
    /// Fetcher backed by a fresh reqwest client
    pub fn with_reqwest(policy: RetryPolicy) -> Result<Self> {
        Ok(Self::new(ReqwestTransport::new()?, policy))
    }
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch the response body, returning the last error once every attempt has failed
    pub async fn fetch(&self, request: &FetchRequest) -> Result<String> {
        let mut attempt = 0;

        loop {
            match self.attempt(request, attempt).await {
                Ok(body) => {
                    tracing::debug!(attempt, bytes = body.len(), url = %request.url, "Fetch succeeded");
                    return Ok(body);
                }
                Err(err) if attempt < self.policy.retries => {
                    let delay = self.policy.delay_for(attempt);
                    tracing::warn!(
                        attempt,
                        error = %err,
                        retry_in_ms = delay.as_millis() as u64,
                        "Fetch attempt failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!(
                        attempts = self.policy.attempts(),
                        error = %err,
                        "Fetch failed, no retries left"
                    );
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(&self, request: &FetchRequest, attempt: u32) -> Result<String> {
        // Dropping the transport future on expiry cancels the in-flight request.
        let response = tokio::time::timeout(self.policy.timeout, self.transport.get(request))
            .await
            .map_err(|_| HarvestError::Timeout {
                attempt,
                timeout_ms: self.policy.timeout.as_millis() as u64,
            })?
            .map_err(|e| HarvestError::Network { attempt, reason: e.reason })?;

        if !response.is_success() {
            return Err(HarvestError::Http {
                attempt,
                status: response.status,
                reason: response.reason,
            });
        }

        Ok(response.body)
    }
}

/// [`Transport`] implementation over a shared `reqwest::Client`
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("geoharvest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HarvestError::Client { reason: e.to_string() })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, request: &FetchRequest) -> std::result::Result<HttpResponse, TransportError> {
        let mut builder = self.client.get(request.url.clone());
        for header in &request.headers {
            builder = builder.header(header.key.as_str(), header.value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::new(format!("Request to {} failed: {}", request.url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(format!("Failed to read response body: {}", e)))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    enum Step {
        Respond(u16, &'static str),
        Fail(&'static str),
        Hang,
    }

    struct ScriptedTransport {
        steps: Mutex<VecDeque<Step>>,
        calls: Mutex<Vec<Instant>>,
    }

    impl ScriptedTransport {
        fn new(steps: Vec<Step>) -> Self {
            Self { steps: Mutex::new(steps.into()), calls: Mutex::new(Vec::new()) }
        }

        fn call_times(&self) -> Vec<Instant> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(&self, _request: &FetchRequest) -> std::result::Result<HttpResponse, TransportError> {
            self.calls.lock().unwrap().push(Instant::now());
            let step = self.steps.lock().unwrap().pop_front().unwrap_or(Step::Fail("script exhausted"));
            match step {
                Step::Respond(status, body) => Ok(HttpResponse {
                    status,
                    reason: "Scripted".to_string(),
                    body: body.to_string(),
                }),
                Step::Fail(reason) => Err(TransportError::new(reason)),
                Step::Hang => std::future::pending().await,
            }
        }
    }

    fn assert_close(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(10),
            "expected ~{:?}, got {:?}",
            expected,
            actual
        );
    }

    fn request() -> FetchRequest {
        FetchRequest::new(Url::parse("https://example.com/features").unwrap())
    }

    fn policy(retries: u32) -> RetryPolicy {
        RetryPolicy { retries, timeout: Duration::from_secs(5), backoff_base: DEFAULT_BACKOFF_BASE }
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts(), 3);
        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(4), Duration::from_millis(5000));
    }

    #[test]
    fn test_request_from_config() {
        let mut config = HarvestConfig::for_url("https://example.com/api").unwrap();
        config.query_params = vec![KeyValue::new("limit", "5")];
        config.headers = vec![KeyValue::new("X-Api-Key", "abc")];

        let request = FetchRequest::from_config(&config);
        assert_eq!(request.url.as_str(), "https://example.com/api?limit=5");
        assert_eq!(request.headers, vec![KeyValue::new("X-Api-Key", "abc")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success() {
        let fetcher = Fetcher::new(ScriptedTransport::new(vec![Step::Respond(200, "{}")]), policy(2));
        let body = fetcher.fetch(&request()).await.unwrap();
        assert_eq!(body, "{}");
        assert_eq!(fetcher.transport().call_times().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_exhausted_with_increasing_delays() {
        let transport = ScriptedTransport::new(vec![
            Step::Fail("connection refused"),
            Step::Fail("connection refused"),
            Step::Fail("connection refused"),
            Step::Fail("connection refused"),
        ]);
        let fetcher = Fetcher::new(transport, policy(3));

        let err = fetcher.fetch(&request()).await.unwrap_err();
        assert!(matches!(err, HarvestError::Network { attempt: 3, .. }));

        let calls = fetcher.transport().call_times();
        assert_eq!(calls.len(), 4);

        let gaps: Vec<Duration> = calls.windows(2).map(|w| w[1] - w[0]).collect();
        assert_close(gaps[0], Duration::from_secs(1));
        assert_close(gaps[1], Duration::from_secs(2));
        assert_close(gaps[2], Duration::from_secs(3));
        assert!(gaps.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_means_single_attempt() {
        let fetcher = Fetcher::new(ScriptedTransport::new(vec![Step::Fail("boom")]), policy(0));
        assert!(fetcher.fetch(&request()).await.is_err());
        assert_eq!(fetcher.transport().call_times().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_http_error_is_retried_then_succeeds() {
        let transport = ScriptedTransport::new(vec![
            Step::Respond(503, ""),
            Step::Respond(200, r#"{"type":"FeatureCollection","features":[]}"#),
        ]);
        let fetcher = Fetcher::new(transport, policy(2));

        let body = fetcher.fetch(&request()).await.unwrap();
        assert!(body.contains("FeatureCollection"));
        assert_eq!(fetcher.transport().call_times().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_http_error_is_propagated() {
        let transport = ScriptedTransport::new(vec![Step::Respond(500, ""), Step::Respond(404, "")]);
        let fetcher = Fetcher::new(transport, policy(1));

        let err = fetcher.fetch(&request()).await.unwrap_err();
        assert!(matches!(err, HarvestError::Http { attempt: 1, status: 404, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_attempt_times_out_and_retries() {
        let transport = ScriptedTransport::new(vec![Step::Hang, Step::Respond(200, "ok")]);
        let fetcher = Fetcher::new(transport, policy(1));

        let started = Instant::now();
        let body = fetcher.fetch(&request()).await.unwrap();
        assert_eq!(body, "ok");

        let calls = fetcher.transport().call_times();
        assert_eq!(calls.len(), 2);
        // 5s attempt deadline plus 1s backoff
        assert_close(calls[1] - started, Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_attempt_timing_out() {
        let fetcher = Fetcher::new(ScriptedTransport::new(vec![Step::Hang, Step::Hang]), policy(1));

        let err = fetcher.fetch(&request()).await.unwrap_err();
        assert!(matches!(err, HarvestError::Timeout { attempt: 1, timeout_ms: 5000 }));
    }
}
