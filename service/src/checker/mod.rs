//! URL checking core.
//!
//! A check is one outbound GET: validate the target, issue the request under
//! a hard timeout, then reduce whatever happened to a [`CheckResult`]. The
//! checker fails closed: malformed input, unreachable hosts, and timeouts
//! all come back as `Error` results rather than `Err`.
//!
//! # Architecture
//!
//! The module uses a trait-based design for testability:
//!
//! - [`Checker`] - Validates targets, dispatches the GET, classifies the outcome
//! - [`UrlFetcher`] - Trait for the single GET a check performs
//! - [`HttpUrlFetcher`] - Real HTTP implementation using reqwest
//! - [`mock::MockUrlFetcher`] - Mock for unit tests (behind `test-utils` feature)
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use apiguardian_api::checker::{Checker, HttpUrlFetcher};
//!
//! let fetcher = Arc::new(HttpUrlFetcher::new("API-Guardian/1.0")?);
//! let checker = Checker::new(fetcher);
//! let result = checker.check("https://example.com").await;
//! println!("{:?} in {:?}ms", result.outcome, result.response_time_ms);
//! ```

mod client;
mod types;

pub use client::{FetchError, FetchedResponse, HttpUrlFetcher, UrlFetcher};
pub use types::{CheckOutcome, CheckResult};

#[cfg(any(test, feature = "test-utils"))]
pub use client::mock;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::HeaderMap;
use thiserror::Error;
use url::Url;

/// Default hard limit on a single check, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default hard limit on a single check.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(DEFAULT_TIMEOUT_MS);

/// Default User-Agent sent with every outbound check.
pub const USER_AGENT: &str = "API-Guardian/1.0";

/// Reasons a target string is rejected before any network traffic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("URL parameter is required")]
    Empty,

    #[error("Invalid URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("Unsupported URL scheme '{0}': only http and https are allowed")]
    UnsupportedScheme(String),
}

/// Parse and validate a check target.
///
/// Leading and trailing whitespace is trimmed before parsing. Only absolute
/// `http` and `https` URLs are accepted; anything a GET could not be issued
/// against is rejected here, before a connection is attempted.
///
/// # Errors
///
/// - [`TargetError::Empty`] if the trimmed input is empty
/// - [`TargetError::Parse`] if the input is not an absolute URL
/// - [`TargetError::UnsupportedScheme`] for schemes other than http/https
pub fn parse_target(raw: &str) -> Result<Url, TargetError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TargetError::Empty);
    }

    let url = Url::parse(trimmed)?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(TargetError::UnsupportedScheme(other.to_string())),
    }
}

/// Collapse response headers into a sorted map keyed by lower-cased name.
///
/// Repeated headers are joined with `", "`. Values that are not valid UTF-8
/// are decoded lossily.
#[must_use]
pub fn normalize_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    map
}

/// Performs single-shot URL checks.
///
/// Construction is cheap and checks keep no state between invocations; one
/// `Checker` is shared across all requests.
pub struct Checker {
    fetcher: Arc<dyn UrlFetcher>,
    timeout: Duration,
}

impl Checker {
    /// Create a checker with the default timeout.
    #[must_use]
    pub fn new(fetcher: Arc<dyn UrlFetcher>) -> Self {
        Self {
            fetcher,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a checker with a custom per-check timeout.
    #[must_use]
    pub fn with_timeout(fetcher: Arc<dyn UrlFetcher>, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    /// Check a single target URL.
    ///
    /// Issues at most one GET. Invalid targets are rejected without any
    /// network traffic; transport failures and timeouts are folded into the
    /// returned result, so this method always produces a `CheckResult`.
    pub async fn check(&self, target: &str) -> CheckResult {
        let url = match parse_target(target) {
            Ok(url) => url,
            Err(err) => {
                tracing::debug!(target, error = %err, "rejected check target");
                return CheckResult::failure(err.to_string());
            }
        };

        let started = Instant::now();
        match self.fetcher.fetch(&url, self.timeout).await {
            Ok(response) => {
                let elapsed_ms = elapsed_millis(started.elapsed());
                let headers = normalize_headers(&response.headers);
                tracing::debug!(
                    %url,
                    status = response.status.as_u16(),
                    elapsed_ms,
                    "check completed"
                );
                if response.status.is_success() {
                    CheckResult::ok(elapsed_ms, headers)
                } else {
                    CheckResult::http_error(elapsed_ms, headers)
                }
            }
            Err(err) => {
                tracing::debug!(%url, error = %err, "check failed");
                CheckResult::failure(err.to_string())
            }
        }
    }
}

fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
