//! HTTP client for the record store, with bounded retry and error
//! normalization.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::models::{ActiveCounts, ClientPage, ClientRecord, ListParams};
use crate::store::query::DEFAULT_LIMIT;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure modes of a dashboard fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-success response, carrying the message probed from the body or a
    /// generic status line.
    #[error("{0}")]
    Server(String),
    /// The request itself failed: connect, timeout, body read.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    /// A success response whose body did not decode. Another attempt would
    /// return the same bytes, so this is never retried.
    #[error("could not decode the server response")]
    InvalidData(#[source] serde_json::Error),
    /// A failure with no usable diagnostics, such as a panicked request task.
    #[error("an unknown error occurred while fetching data")]
    Unknown,
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Bounded retry with a doubling backoff and no jitter.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Backoff before retry `attempt` (1-based): 100ms, 200ms, 400ms, ...
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

/// Error payload shapes json-server-style backends produce.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> FetchResult<Self> {
        Self::with_retry(base_url, RetryPolicy::default())
    }

    pub fn with_retry(base_url: impl Into<String>, retry: RetryPolicy) -> FetchResult<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        })
    }

    /// One page of client records. The filtered total comes from the
    /// `x-total-count` header; a missing or mangled header degrades to the
    /// page length.
    pub async fn get_clients(&self, params: &ListParams) -> FetchResult<ClientPage> {
        let url = format!("{}/clients", self.base_url);
        let response = self.get_with_retry(&url, params).await?;

        let total_header = response
            .headers()
            .get("x-total-count")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());

        let bytes = response.bytes().await?;
        let records: Vec<ClientRecord> = decode(&bytes)?;

        Ok(ClientPage {
            total: total_header.unwrap_or(records.len() as u64),
            // the window is echoed from the request, as the server does not
            // report it back
            page: params.page.unwrap_or(1),
            per_page: params.limit.unwrap_or(DEFAULT_LIMIT),
            records,
        })
    }

    /// Active/inactive totals across the whole filtered set.
    pub async fn get_active_counts(&self, params: &ListParams) -> FetchResult<ActiveCounts> {
        let url = format!("{}/clients/active", self.base_url);
        let response = self.get_with_retry(&url, params).await?;
        let bytes = response.bytes().await?;
        decode(&bytes)
    }

    /// Issue a GET, retrying transport errors and non-success statuses
    /// through one funnel until the policy is exhausted.
    async fn get_with_retry(
        &self,
        url: &str,
        params: &ListParams,
    ) -> FetchResult<reqwest::Response> {
        let mut attempt = 0;
        loop {
            let error = match self.http.get(url).query(params).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => FetchError::Server(server_error(response).await),
                Err(err) => FetchError::Transport(err),
            };

            attempt += 1;
            if attempt > self.retry.max_retries {
                return Err(error);
            }
            let delay = self.retry.delay(attempt);
            warn!(
                "GET {url} failed ({error}), retry {attempt}/{} in {delay:?}",
                self.retry.max_retries
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Human-readable reason for a non-success response, preferring whatever
/// message the body carries.
async fn server_error(response: reqwest::Response) -> String {
    let fallback = format!(
        "request failed with status code {}",
        response.status().as_u16()
    );
    match response.bytes().await {
        Ok(bytes) => probe_error_body(&bytes, fallback),
        Err(_) => fallback,
    }
}

fn probe_error_body(bytes: &[u8], fallback: String) -> String {
    match serde_json::from_slice::<ErrorBody>(bytes) {
        Ok(body) => body.error.or(body.message).unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> FetchResult<T> {
    serde_json::from_slice(bytes).map_err(FetchError::InvalidData)
}
