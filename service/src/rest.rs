//! REST surface for URL checks.
//!
//! One endpoint does the real work: `GET /check?url=...` runs a single
//! reachability check against the target and answers with the outcome plus
//! a security-header report card. Anything wrong with the *target* is an
//! `Error` result inside a 200 response; only a missing `url` parameter is
//! the caller's mistake and maps to 400. The handler therefore has no 500
//! path of its own.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::checker::{CheckResult, Checker};
use crate::history::{NewScan, ScanStore};
use crate::report::{self, SecurityReport};

/// Query parameters for the check endpoint.
#[derive(Debug, Deserialize)]
pub struct CheckParams {
    pub url: Option<String>,
}

/// Response envelope: the check result with the report card attached.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    #[serde(flatten)]
    pub result: CheckResult,

    /// Present whenever response headers were captured.
    #[serde(rename = "securityReport", skip_serializing_if = "Option::is_none")]
    pub security_report: Option<SecurityReport>,
}

/// Create the check router.
pub fn router() -> Router {
    Router::new().route("/check", get(check))
}

/// Handle a check request.
async fn check(
    Extension(checker): Extension<Arc<Checker>>,
    Extension(store): Extension<Arc<dyn ScanStore>>,
    Query(params): Query<CheckParams>,
) -> impl IntoResponse {
    let Some(target) = params
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(CheckResult::failure("URL parameter is required")),
        )
            .into_response();
    };

    let result = checker.check(target).await;
    let security_report = result.headers.as_ref().map(report::evaluate);

    record_scan(store.as_ref(), target, &result).await;

    tracing::info!(
        url = %target,
        status = result.outcome.as_str(),
        response_time_ms = result.response_time_ms,
        missing_headers = security_report.as_ref().map(SecurityReport::missing_count),
        "Check completed"
    );

    Json(CheckResponse {
        result,
        security_report,
    })
    .into_response()
}

/// Persist the scan. Recording is best-effort: a store failure is logged
/// and never alters the response already produced for the caller.
async fn record_scan(store: &dyn ScanStore, url: &str, result: &CheckResult) {
    let scan = NewScan {
        url,
        status: result.outcome.as_str(),
        response_time_ms: result.response_time_ms,
        report: result
            .headers
            .as_ref()
            .and_then(|headers| serde_json::to_value(headers).ok()),
    };

    if let Err(err) = store.record(scan).await {
        tracing::warn!(error = %err, url = %url, "Failed to record scan");
    }
}
