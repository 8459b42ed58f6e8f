//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content
//! - Retry with exponential backoff for transient failures
//! - The fixed politeness delay after every successful fetch
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Longest single backoff interval, however many retries have happened
const MAX_BACKOFF: Duration = Duration::from_secs(120);

/// Result of a fetch operation
///
/// Failures are values: the caller logs them and skips the unit of work.
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: Url,
        /// HTTP status code
        status_code: u16,
        /// Page body content
        body: String,
    },

    /// The server answered with a non-success status
    HttpError {
        /// The last HTTP status code received
        status_code: u16,
        /// Requests made, including retries
        attempts: u32,
    },

    /// No usable response (connection refused, timeout, body read error)
    NetworkError {
        /// Error description
        error: String,
        /// Requests made, including retries
        attempts: u32,
    },
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Short description of a failure for log lines
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::HttpError {
                status_code,
                attempts,
            } => Some(format!("HTTP {} after {} attempt(s)", status_code, attempts)),
            Self::NetworkError { error, attempts } => {
                Some(format!("{} after {} attempt(s)", error, attempts))
            }
        }
    }
}

/// Retry behavior for transient failures
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 429, 500, 502, 503, 504 | Retry with backoff |
/// | Timeout / connection error | Retry with backoff |
/// | Other HTTP status (404, 403, ...) | Immediate failure |
/// | Request could not be built | Immediate failure |
///
/// Backoff before retry `n` (1-based) is `base * 2^(n-1)`, capped at two
/// minutes. Only GET is ever issued, so every retry is idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub max_retries: u32,
    /// Wait before the first retry
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_base: Duration) -> Self {
        Self {
            max_retries,
            backoff_base,
        }
    }

    /// Returns true if a response with this status should be retried
    pub fn is_retryable_status(status: StatusCode) -> bool {
        matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
    }

    /// Returns true if a request error should be retried
    pub fn is_retryable_error(error: &reqwest::Error) -> bool {
        !(error.is_builder() || error.is_redirect() || error.is_status())
    }

    /// Wait before retry number `retry` (1-based)
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.backoff_base
            .checked_mul(1u32 << exponent)
            .map_or(MAX_BACKOFF, |d| d.min(MAX_BACKOFF))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Fetch statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    /// Pages requested (one per `fetch` call)
    pub requests: u64,
    /// Pages fetched successfully
    pub successes: u64,
    /// Pages given up on
    pub failures: u64,
    /// Extra attempts made because of transient failures
    pub retries: u64,
}

/// Sequential page fetcher owning the HTTP session
///
/// One request is in flight at a time; every successful fetch is followed by
/// the configured delay, so total crawl time grows with delay x pages.
pub struct Fetcher {
    client: Client,
    retry: RetryPolicy,
    request_delay: Duration,
    stats: FetchStats,
}

impl Fetcher {
    /// Creates a fetcher from crawler and user agent settings
    pub fn new(crawler: &CrawlerConfig, user_agent: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, crawler.request_timeout())?;

        Ok(Self {
            client,
            retry: RetryPolicy::new(crawler.max_retries, crawler.backoff_base()),
            request_delay: crawler.request_delay(),
            stats: FetchStats::default(),
        })
    }

    pub fn stats(&self) -> FetchStats {
        self.stats
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// Never returns an error: exhausted retries and permanent failures come
    /// back as `HttpError`/`NetworkError` so one bad page cannot abort a crawl.
    pub async fn fetch(&mut self, url: &Url) -> FetchResult {
        self.stats.requests += 1;
        let mut attempts = 0;

        let result = loop {
            attempts += 1;
            tracing::debug!("GET {} (attempt {})", url, attempts);

            let outcome = fetch_once(&self.client, url, attempts).await;
            let retryable = match &outcome {
                Attempt::Done(_) => false,
                Attempt::Retryable(_) => attempts <= self.retry.max_retries,
            };

            if !retryable {
                break outcome.into_result();
            }

            let wait = self.retry.backoff_for(attempts);
            if let Some(reason) = outcome.into_result().failure_reason() {
                tracing::warn!("Transient failure for {} ({}), retrying in {:?}", url, reason, wait);
            }
            self.stats.retries += 1;
            tokio::time::sleep(wait).await;
        };

        if result.is_success() {
            self.stats.successes += 1;
            if !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
        } else {
            self.stats.failures += 1;
        }

        result
    }
}

/// Outcome of a single request attempt
enum Attempt {
    /// Success or a failure that retrying cannot fix
    Done(FetchResult),
    /// A failure worth another attempt, if any remain
    Retryable(FetchResult),
}

impl Attempt {
    fn into_result(self) -> FetchResult {
        match self {
            Self::Done(result) | Self::Retryable(result) => result,
        }
    }
}

async fn fetch_once(client: &Client, url: &Url, attempts: u32) -> Attempt {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            let retryable = RetryPolicy::is_retryable_error(&e);
            let result = FetchResult::NetworkError {
                error: classify_error(&e),
                attempts,
            };
            return if retryable {
                Attempt::Retryable(result)
            } else {
                Attempt::Done(result)
            };
        }
    };

    let status = response.status();
    if !status.is_success() {
        let result = FetchResult::HttpError {
            status_code: status.as_u16(),
            attempts,
        };
        return if RetryPolicy::is_retryable_status(status) {
            Attempt::Retryable(result)
        } else {
            Attempt::Done(result)
        };
    }

    let final_url = response.url().clone();
    match response.text().await {
        Ok(body) => Attempt::Done(FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        }),
        // A body cut off mid-transfer is a connection-level failure
        Err(e) => Attempt::Retryable(FetchResult::NetworkError {
            error: format!("Failed to read body: {}", e),
            attempts,
        }),
    }
}

fn classify_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use shelfscan::config::UserAgentConfig;
/// use shelfscan::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}
