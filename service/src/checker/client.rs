//! Outbound HTTP transport for URL checks.
//!
//! This module provides a trait-based fetcher for the single GET a check
//! performs. The trait abstraction enables:
//!
//! - Easy mocking in unit tests
//! - Live-socket testing against stub servers in integration tests
//! - Swapping implementations (e.g., a HEAD-based prober)
//!
//! # Example
//!
//! ```ignore
//! use apiguardian_api::checker::{HttpUrlFetcher, UrlFetcher};
//!
//! let fetcher = HttpUrlFetcher::new("API-Guardian/1.0")?;
//! let response = fetcher.fetch(&url, Duration::from_secs(10)).await?;
//! println!("{} with {} headers", response.status, response.headers.len());
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

/// Errors from the outbound fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within the allotted time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// DNS, connect, TLS, or protocol failure before a response arrived.
    #[error("request failed: {0}")]
    Transport(String),
}

/// Status line and headers of a completed response.
///
/// The body is never read; a check only inspects the status code and the
/// response headers.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

/// Trait for the single GET a check performs.
///
/// Use [`HttpUrlFetcher`] for real HTTP calls, or `mock::MockUrlFetcher`
/// for testing.
#[async_trait]
pub trait UrlFetcher: Send + Sync {
    /// Issue one GET against `url`, aborting the request once `timeout`
    /// elapses.
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchedResponse, FetchError>;
}

/// reqwest-based implementation of `UrlFetcher`.
///
/// The timeout is applied per request, so a fired deadline tears down the
/// in-flight request rather than leaving it running in the background.
pub struct HttpUrlFetcher {
    client: reqwest::Client,
}

impl HttpUrlFetcher {
    /// Create a fetcher whose requests carry `user_agent`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying TLS backend cannot be initialized.
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    /// Create a fetcher with a custom `reqwest::Client` (for testing with custom config).
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UrlFetcher for HttpUrlFetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchedResponse, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| classify_error(&err, timeout))?;

        Ok(FetchedResponse {
            status: response.status(),
            headers: response.headers().clone(),
        })
    }
}

/// Map a reqwest failure onto the fetch error model.
fn classify_error(err: &reqwest::Error, timeout: Duration) -> FetchError {
    if err.is_timeout() {
        return FetchError::Timeout(timeout);
    }

    // reqwest's Display often stops at "error sending request"; walk the
    // source chain so the result names the actual cause.
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    FetchError::Transport(message)
}

#[cfg(any(test, feature = "test-utils"))]
#[allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::missing_const_for_fn,
    clippy::must_use_candidate
)]
pub mod mock {
    //! Mock implementation for unit testing.

    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use url::Url;

    use super::{FetchError, FetchedResponse, UrlFetcher};

    /// Mock implementation of `UrlFetcher` for unit tests.
    ///
    /// Queue results with `push_response` and verify traffic with
    /// `fetch_count()`, `fetched_urls()`, and `fetch_timeouts()`.
    pub struct MockUrlFetcher {
        responses: Mutex<VecDeque<Result<FetchedResponse, FetchError>>>,
        calls: Mutex<Vec<(String, Duration)>>,
    }

    impl MockUrlFetcher {
        pub fn new() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Queue the result for the next `fetch` call.
        pub fn push_response(&self, result: Result<FetchedResponse, FetchError>) {
            self.responses.lock().unwrap().push_back(result);
        }

        /// URLs passed to `fetch`, in call order.
        pub fn fetched_urls(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(url, _)| url.clone())
                .collect()
        }

        /// Timeouts passed to `fetch`, in call order.
        pub fn fetch_timeouts(&self) -> Vec<Duration> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(_, timeout)| *timeout)
                .collect()
        }

        /// Number of `fetch` calls made.
        pub fn fetch_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl Default for MockUrlFetcher {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl UrlFetcher for MockUrlFetcher {
        async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchedResponse, FetchError> {
            self.calls.lock().unwrap().push((url.to_string(), timeout));

            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(FetchError::Transport(format!(
                        "no stubbed response for {url}"
                    )))
                })
        }
    }
}
