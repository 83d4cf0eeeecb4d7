pub mod quran;

use reqwest::Url;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("request cancelled")]
    Cancelled,
    #[error("HTTP {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

/// Shared flag flipped once to abandon an in-flight request.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), ApiError> {
        if self.is_cancelled() {
            Err(ApiError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// One in-flight request per family: beginning a new one cancels the previous.
#[derive(Debug, Default)]
pub struct RequestSlot {
    token: CancelToken,
    generation: u64,
}

impl RequestSlot {
    pub fn begin(&mut self) -> (CancelToken, u64) {
        self.token.cancel();
        self.token = CancelToken::new();
        self.generation += 1;
        (self.token.clone(), self.generation)
    }

    pub fn cancel(&mut self) {
        self.token.cancel();
        self.generation += 1;
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation && !self.token.is_cancelled()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            retryable_statuses: vec![409, 429, 500],
        }
    }
}

impl RetryPolicy {
    pub fn is_retryable(&self, err: &ApiError) -> bool {
        match err {
            ApiError::Status(status) => self.retryable_statuses.contains(status),
            ApiError::Transport(_) => true,
            _ => false,
        }
    }

    /// Delay before the attempt following `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Runs `op` until it succeeds, fails with a non-retryable error, or attempts run out.
    pub fn run<T>(
        &self,
        cancel: &CancelToken,
        mut op: impl FnMut(u32) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut last_err = ApiError::Transport("no attempts made".to_string());
        for attempt in 1..=self.max_attempts {
            cancel.check()?;
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(ApiError::Cancelled) => return Err(ApiError::Cancelled),
                Err(err) => {
                    if !self.is_retryable(&err) || attempt == self.max_attempts {
                        return Err(err);
                    }
                    let delay = self.delay_for(attempt);
                    tracing::debug!(attempt, ?delay, error = %err, "retrying request");
                    sleep_unless_cancelled(delay, cancel)?;
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }
}

fn sleep_unless_cancelled(delay: Duration, cancel: &CancelToken) -> Result<(), ApiError> {
    let deadline = Instant::now() + delay;
    let slice = Duration::from_millis(20);
    loop {
        cancel.check()?;
        let now = Instant::now();
        if now >= deadline {
            return Ok(());
        }
        thread::sleep(slice.min(deadline - now));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Single blocking GET; the seam tests substitute.
pub trait Transport: Send + Sync {
    fn get(&self, url: &Url) -> Result<HttpResponse, ApiError>;
}

pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(base: &str, timeout: Duration) -> eyre::Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tilawa/", env!("CARGO_PKG_VERSION")));
        if base.starts_with("http://127.0.0.1") || base.starts_with("http://localhost") {
            builder = builder.no_proxy();
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &Url) -> Result<HttpResponse, ApiError> {
        let response = self
            .client
            .get(url.clone())
            .header("Accept", "application/json")
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

#[derive(Clone)]
pub struct ApiClient {
    base: String,
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl ApiClient {
    pub fn new(base: &str, transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            transport,
            policy,
        }
    }

    pub fn with_reqwest(base: &str, timeout: Duration) -> eyre::Result<Self> {
        let transport = ReqwestTransport::new(base, timeout)?;
        Ok(Self::new(base, Arc::new(transport), RetryPolicy::default()))
    }

    pub fn build_url(&self, path: &str, params: &[(&str, String)]) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.base, path);
        let mut url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    pub fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        cancel: &CancelToken,
    ) -> Result<T, ApiError> {
        let url = self.build_url(path, params)?;
        let body = self.policy.run(cancel, |attempt| {
            tracing::debug!(%url, attempt, "GET");
            let response = self.transport.get(&url)?;
            cancel.check()?;
            if !(200..300).contains(&response.status) {
                tracing::warn!(%url, status = response.status, attempt, "request failed");
                return Err(ApiError::Status(response.status));
            }
            Ok(response.body)
        })?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
