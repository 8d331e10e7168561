//! Result types for URL checks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Outcome of a check, `"OK"` or `"Error"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckOutcome {
    #[serde(rename = "OK")]
    Ok,
    Error,
}

impl CheckOutcome {
    /// Wire form of the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Error => "Error",
        }
    }
}

/// Result of checking a single URL.
///
/// `OK` means the target answered with a 2xx status. Everything else is an
/// error: non-2xx responses keep their captured headers and latency, while
/// failures before a response arrived (bad input, DNS, connect, timeout)
/// carry a message instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    #[serde(rename = "status")]
    pub outcome: CheckOutcome,

    /// Milliseconds from dispatch to response headers. Absent when no
    /// response arrived.
    #[serde(rename = "responseTime", skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,

    /// Response headers keyed by lower-cased name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,

    /// Failure description for checks that never produced a response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CheckResult {
    /// The target answered with a 2xx status.
    #[must_use]
    pub fn ok(response_time_ms: u64, headers: BTreeMap<String, String>) -> Self {
        Self {
            outcome: CheckOutcome::Ok,
            response_time_ms: Some(response_time_ms),
            headers: Some(headers),
            message: None,
        }
    }

    /// A response arrived but its status was outside the 2xx range.
    #[must_use]
    pub fn http_error(response_time_ms: u64, headers: BTreeMap<String, String>) -> Self {
        Self {
            outcome: CheckOutcome::Error,
            response_time_ms: Some(response_time_ms),
            headers: Some(headers),
            message: None,
        }
    }

    /// No response at all: invalid target, transport failure, or timeout.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            outcome: CheckOutcome::Error,
            response_time_ms: None,
            headers: None,
            message: Some(message.into()),
        }
    }
}
