//! Security header report card.
//!
//! Grades a response's headers against a fixed checklist of five
//! security-relevant headers. The same checklist supplies the hardening
//! values this service sets on its own responses, so a running instance
//! passes its own audit.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A header the report card looks for.
pub struct AuditedHeader {
    /// Lower-cased header name.
    pub name: &'static str,

    /// Value this service sends on its own responses. `None` for headers
    /// that must come from the TLS terminator (HSTS).
    pub hardening_value: Option<&'static str>,
}

/// The headers every check reports on, in display order.
pub const AUDITED_HEADERS: &[AuditedHeader] = &[
    AuditedHeader {
        name: "content-security-policy",
        hardening_value: Some("default-src 'self'"),
    },
    AuditedHeader {
        name: "strict-transport-security",
        hardening_value: None,
    },
    AuditedHeader {
        name: "x-content-type-options",
        hardening_value: Some("nosniff"),
    },
    AuditedHeader {
        name: "x-frame-options",
        hardening_value: Some("DENY"),
    },
    AuditedHeader {
        name: "referrer-policy",
        hardening_value: Some("strict-origin-when-cross-origin"),
    },
];

/// One row of the report card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderFinding {
    /// Lower-cased header name.
    pub name: String,

    /// Whether the response carried this header.
    pub present: bool,

    /// The received value, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Presence report over the audited security headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityReport {
    pub findings: Vec<HeaderFinding>,
}

impl SecurityReport {
    /// Number of audited headers the response did not set.
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.findings.iter().filter(|f| !f.present).count()
    }
}

/// Grade a normalized header map against [`AUDITED_HEADERS`].
///
/// Findings come back in checklist order, one per audited header,
/// regardless of what the response carried.
#[must_use]
pub fn evaluate(headers: &BTreeMap<String, String>) -> SecurityReport {
    let findings = AUDITED_HEADERS
        .iter()
        .map(|audited| {
            let value = headers.get(audited.name).cloned();
            HeaderFinding {
                name: audited.name.to_string(),
                present: value.is_some(),
                value,
            }
        })
        .collect();

    SecurityReport { findings }
}
