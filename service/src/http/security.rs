//! Security headers middleware for HTTP responses.
//!
//! A header-audit service should pass its own audit, so every response
//! carries the same hardening headers the checker looks for on targets.
//! The header set comes straight from the audit checklist in
//! [`crate::report`]; only HSTS is driven by configuration, since it is
//! meaningless without HTTPS in front of the service.

use std::sync::Arc;

use axum::{
    extract::Request,
    http::{
        header::STRICT_TRANSPORT_SECURITY,
        HeaderMap, HeaderName, HeaderValue,
    },
    middleware::Next,
    response::Response,
    Extension,
};

use crate::config::SecurityHeadersConfig;
use crate::report::AUDITED_HEADERS;

/// Build security headers from the audit checklist and configuration.
///
/// Returns an `Arc`-wrapped `HeaderMap` that can be shared across requests
/// via Axum's `Extension` layer.
#[must_use]
pub fn build_security_headers(config: &SecurityHeadersConfig) -> Arc<HeaderMap> {
    let mut headers = HeaderMap::new();

    // Every audited header with a static hardening value
    for audited in AUDITED_HEADERS {
        if let Some(value) = audited.hardening_value {
            headers.insert(
                HeaderName::from_static(audited.name),
                HeaderValue::from_static(value),
            );
        }
    }

    // HSTS (only if enabled - should only be used with HTTPS)
    if config.hsts_enabled {
        let hsts_value = if config.hsts_include_subdomains {
            format!("max-age={}; includeSubDomains", config.hsts_max_age)
        } else {
            format!("max-age={}", config.hsts_max_age)
        };
        if let Ok(value) = HeaderValue::from_str(&hsts_value) {
            headers.insert(STRICT_TRANSPORT_SECURITY, value);
        }
    }

    Arc::new(headers)
}

/// Middleware to add security headers to all responses.
///
/// This middleware reads the pre-built `HeaderMap` from an `Extension` and
/// extends every response with those headers. It should be added as the
/// outermost layer so headers are applied to all routes.
///
/// # Example
///
/// ```ignore
/// use axum::{middleware, Router, Extension};
/// use apiguardian_api::http::security::{build_security_headers, security_headers_middleware};
/// use apiguardian_api::config::SecurityHeadersConfig;
///
/// let config = SecurityHeadersConfig::default();
/// let headers = build_security_headers(&config);
///
/// let app = Router::new()
///     // ... routes ...
///     .layer(middleware::from_fn(security_headers_middleware))
///     .layer(Extension(headers));
/// ```
pub async fn security_headers_middleware(
    Extension(headers): Extension<Arc<HeaderMap>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let response_headers = response.headers_mut();
    for (k, v) in headers.iter() {
        response_headers.insert(k.clone(), v.clone());
    }
    response
}
