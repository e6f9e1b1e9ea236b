use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

/// Per-request socket timeout applied by [`ReqwestTransport`].
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Response captured by a [`Transport`], detached from the HTTP client.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are lower-cased.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub fn text_preview(&self, max: usize) -> String {
        String::from_utf8_lossy(&self.body[..self.body.len().min(max)]).into_owned()
    }
}

/// Failure below the HTTP layer (DNS, connect, timeout, body read).
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Issues a single GET. Implemented by reqwest in production and by fakes in tests.
pub trait Transport: Send + Sync {
    fn get(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// Waits between attempts.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, delay: Duration) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent("newspulse-bot/0.1")
            .build()
            .map_err(|e| TransportError(format!("failed to build client: {e}")))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        params: &[(String, String)],
    ) -> Result<HttpResponse, TransportError> {
        let resp = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = resp
            .bytes()
            .await
            .map_err(|e| TransportError(format!("body read failed: {e}")))?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// `base_delay * 2^attempt`, capped at `max_delay`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Delay after a 429: the numeric `Retry-After` if given, else backoff.
    pub fn rate_limit_delay(&self, retry_after: Option<&str>, attempt: u32) -> Duration {
        match retry_after.map(str::trim).and_then(parse_retry_after) {
            Some(secs) => Duration::from_secs(secs).min(self.max_delay),
            None => self.backoff(attempt),
        }
    }
}

/// Only all-digit values count; HTTP-date forms fall back to backoff.
fn parse_retry_after(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u64>().ok()
}

#[derive(Debug, Clone, Error)]
pub enum RetryError {
    #[error("rate limited (HTTP 429) after {attempts} attempts")]
    RateLimited { attempts: u32 },
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("network error: {0}")]
    Transport(#[from] TransportError),
    #[error("no attempts were made")]
    NoAttempts,
}

impl RetryError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RetryError::RateLimited { .. } => Some(429),
            RetryError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            RetryError::RateLimited { .. } | RetryError::Transport(_) => true,
            RetryError::Status { status, .. } => *status >= 500,
            RetryError::NoAttempts => false,
        }
    }
}

/// GET `url` with bounded retries.
///
/// 429 honours `Retry-After`; 5xx and transport failures back off
/// exponentially; any other non-success status is returned at once. No sleep
/// follows the final attempt.
pub async fn request_with_retry<T, S>(
    transport: &T,
    sleeper: &S,
    url: &str,
    params: &[(String, String)],
    policy: &RetryPolicy,
) -> Result<HttpResponse, RetryError>
where
    T: Transport,
    S: Sleeper,
{
    let mut last: Option<RetryError> = None;

    for attempt in 0..policy.max_attempts {
        let is_last = attempt + 1 == policy.max_attempts;

        let delay = match transport.get(url, params).await {
            Ok(resp) if resp.is_success() => return Ok(resp),
            Ok(resp) if resp.status == 429 => {
                let delay = policy.rate_limit_delay(resp.header("retry-after"), attempt);
                warn!(
                    "{} rate limited (attempt {}/{}), retry in {:?}",
                    url,
                    attempt + 1,
                    policy.max_attempts,
                    delay
                );
                last = Some(RetryError::RateLimited {
                    attempts: attempt + 1,
                });
                delay
            }
            Ok(resp) => {
                let err = RetryError::Status {
                    status: resp.status,
                    body: resp.text_preview(300),
                };
                if !err.is_retryable() {
                    debug!("{} returned {}; not retrying", url, resp.status);
                    return Err(err);
                }
                let delay = policy.backoff(attempt);
                warn!(
                    "{} returned {} (attempt {}/{}), retry in {:?}",
                    url,
                    resp.status,
                    attempt + 1,
                    policy.max_attempts,
                    delay
                );
                last = Some(err);
                delay
            }
            Err(e) => {
                let delay = policy.backoff(attempt);
                warn!(
                    "{} request failed: {} (attempt {}/{}), retry in {:?}",
                    url,
                    e,
                    attempt + 1,
                    policy.max_attempts,
                    delay
                );
                last = Some(RetryError::Transport(e));
                delay
            }
        };

        if !is_last {
            sleeper.sleep(delay).await;
        }
    }

    Err(last.unwrap_or(RetryError::NoAttempts))
}
