//! Test app builder that mirrors main.rs wiring with injectable deps/mocks.
//!
//! This module provides a [`TestAppBuilder`] that constructs an Axum router matching
//! the production configuration in `main.rs`, but with the ability to inject mocks
//! and test-specific configurations.
//!
//! # Usage
//!
//! ```ignore
//! use crate::common::app_builder::TestAppBuilder;
//!
//! #[tokio::test]
//! async fn test_with_full_app() {
//!     let app = TestAppBuilder::new()
//!         .with_api()
//!         .with_fetcher(fetcher)
//!         .with_cors(&["http://localhost:3000"])
//!         .build();
//!
//!     // Use app.oneshot(...) to send requests
//! }
//! ```
//!
//! # Preset Builders
//!
//! - [`TestAppBuilder::minimal()`] - Health check only
//! - [`TestAppBuilder::with_mocks()`] - Full app with a stub transport and store

use std::sync::Arc;
use std::time::Duration;

use apiguardian_api::{
    checker::{mock::MockUrlFetcher, Checker, UrlFetcher, DEFAULT_TIMEOUT},
    config::SecurityHeadersConfig,
    history::{NoopScanStore, ScanStore},
    http::{build_security_headers, security_headers_middleware},
    rest,
};
use axum::{
    http::{HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
    Extension, Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

/// Health check handler (mirrors main.rs)
async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Builder for test applications that mirrors main.rs wiring.
///
/// Use the builder pattern to construct an Axum router with the exact same
/// layer ordering and configuration as production, while allowing injection
/// of mocks for testing.
pub struct TestAppBuilder {
    /// Whether to include the check API routes
    include_api: bool,
    /// Whether to include health check route
    include_health: bool,
    /// Transport behind the checker (None uses an empty stub)
    fetcher: Option<Arc<dyn UrlFetcher>>,
    /// Scan store (None uses the no-op store)
    store: Option<Arc<dyn ScanStore>>,
    /// Checker timeout handed to the transport
    timeout: Duration,
    /// CORS allowed origins (None means no CORS layer)
    cors_origins: Option<Vec<String>>,
    /// Security headers config (None means disabled)
    security_headers: Option<SecurityHeadersConfig>,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppBuilder {
    /// Create a new empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            include_api: false,
            include_health: false,
            fetcher: None,
            store: None,
            timeout: DEFAULT_TIMEOUT,
            cors_origins: None,
            security_headers: None,
        }
    }

    // =========================================================================
    // Preset Builders
    // =========================================================================

    /// Create a minimal app with only the health check endpoint.
    ///
    /// Use this for simple connectivity tests.
    #[must_use]
    pub fn minimal() -> Self {
        Self::new().with_health()
    }

    /// Create a full app with stub dependencies.
    ///
    /// Mirrors production main.rs wiring but with a stub transport instead
    /// of a real HTTP client and without a database. Includes all routes,
    /// CORS, and security headers.
    #[must_use]
    pub fn with_mocks() -> Self {
        Self::new()
            .with_api()
            .with_health()
            .with_cors(&["http://localhost:3000"])
            .with_security_headers_default()
    }

    // =========================================================================
    // Component Configuration
    // =========================================================================

    /// Include the check API routes (/api/check).
    #[must_use]
    pub fn with_api(mut self) -> Self {
        self.include_api = true;
        self
    }

    /// Include health check route (/health).
    #[must_use]
    pub fn with_health(mut self) -> Self {
        self.include_health = true;
        self
    }

    /// Use a specific transport behind the checker.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn UrlFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Use a specific scan store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ScanStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the checker timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure CORS with specific allowed origins.
    ///
    /// Pass an empty slice to block all cross-origin requests.
    /// Pass `&["*"]` to allow any origin.
    #[must_use]
    pub fn with_cors(mut self, origins: &[&str]) -> Self {
        self.cors_origins = Some(origins.iter().map(|s| (*s).to_string()).collect());
        self
    }

    /// Enable security headers with default configuration.
    #[must_use]
    pub fn with_security_headers_default(mut self) -> Self {
        self.security_headers = Some(SecurityHeadersConfig::default());
        self
    }

    /// Enable security headers with custom configuration.
    #[must_use]
    pub fn with_security_headers(mut self, config: SecurityHeadersConfig) -> Self {
        self.security_headers = Some(config);
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Build the Axum router.
    ///
    /// The layer ordering matches main.rs exactly:
    /// 1. Routes (check API, health)
    /// 2. Extensions (checker, scan store)
    /// 3. CORS layer
    /// 4. Trace layer
    /// 5. Security headers middleware (outermost)
    #[must_use]
    pub fn build(self) -> Router {
        let fetcher = self
            .fetcher
            .unwrap_or_else(|| Arc::new(MockUrlFetcher::new()));
        let checker = Arc::new(Checker::with_timeout(fetcher, self.timeout));
        let store = self.store.unwrap_or_else(|| Arc::new(NoopScanStore));

        // Start building the router
        let mut app = Router::new();

        // Add routes
        if self.include_api {
            app = app.nest("/api", rest::router());
        }

        if self.include_health {
            app = app.route("/health", get(health_check));
        }

        // Add extensions
        app = app.layer(Extension(checker)).layer(Extension(store));

        // Add CORS layer if configured
        if let Some(origins) = self.cors_origins {
            let allow_origin: AllowOrigin = if origins.iter().any(|o| o == "*") {
                AllowOrigin::any()
            } else if origins.is_empty() {
                AllowOrigin::list(Vec::<HeaderValue>::new())
            } else {
                let header_values: Vec<HeaderValue> = origins
                    .iter()
                    .filter_map(|origin| origin.parse().ok())
                    .collect();
                AllowOrigin::list(header_values)
            };

            app = app.layer(
                CorsLayer::new()
                    .allow_methods([Method::GET, Method::OPTIONS])
                    .allow_headers(Any)
                    .allow_origin(allow_origin),
            );
        }

        app = app.layer(TraceLayer::new_for_http());

        // Add security headers middleware if configured
        if let Some(config) = self.security_headers {
            if config.enabled {
                let headers = build_security_headers(&config);
                app = app
                    .layer(middleware::from_fn(security_headers_middleware))
                    .layer(Extension(headers));
            }
        }

        app
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{
            header::{X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS},
            Request,
        },
    };
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_minimal_builder_creates_health_route() {
        let app = TestAppBuilder::minimal().build();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_with_mocks_builder() {
        let app = TestAppBuilder::with_mocks().build();

        // Health check should work
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);

        // Check endpoint should be routed (missing url param is a 400, not a 404)
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/check")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_security_headers_applied() {
        let app = TestAppBuilder::minimal()
            .with_security_headers_default()
            .build();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(X_CONTENT_TYPE_OPTIONS),
            Some(&HeaderValue::from_static("nosniff"))
        );
        assert_eq!(
            response.headers().get(X_FRAME_OPTIONS),
            Some(&HeaderValue::from_static("DENY"))
        );
    }
}
