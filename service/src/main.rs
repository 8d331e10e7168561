#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use apiguardian_api::{
    checker::{Checker, HttpUrlFetcher},
    config::Config,
    db::setup_database,
    history::{NoopScanStore, PgScanStore, ScanStore},
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
use clap::Parser;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Debug, Parser)]
#[command(
    name = "apiguardian-api",
    version,
    about = "URL reachability and security-header audit service"
)]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "config.yaml")]
    config: String,
}

// Health check handler
async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Resolve once Ctrl-C arrives so in-flight checks can finish first.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Failed to listen for shutdown signal");
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();

    // Load and validate configuration first (fail-fast)
    let config = Config::load_from(&args.config).map_err(|e| anyhow::anyhow!("{e}"))?;

    // Set up logging from config
    std::env::set_var("RUST_LOG", &config.logging.level);
    tracing_subscriber::fmt::init();

    // Init banner so container logs clearly show startup
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "apiguardian-api starting up"
    );

    // Outbound checker
    let fetcher = HttpUrlFetcher::new(&config.checker.user_agent)
        .context("Failed to build outbound HTTP client")?;
    let checker = Arc::new(Checker::with_timeout(
        Arc::new(fetcher),
        config.checker.timeout(),
    ));

    // Scan history store
    let store: Arc<dyn ScanStore> = if config.database.enabled {
        tracing::info!("Connecting to database...");
        let pool = setup_database(&config.database).await?;
        Arc::new(PgScanStore::new(pool))
    } else {
        tracing::info!("Scan history disabled - checks will not be persisted");
        Arc::new(NoopScanStore)
    };

    // Build CORS layer from config
    let cors_origins = &config.cors.allowed_origins;
    let allow_origin: AllowOrigin = if cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow any origin - not recommended for production");
        AllowOrigin::any()
    } else if cors_origins.is_empty() {
        tracing::info!(
            "CORS allowed origins not configured - cross-origin requests will be blocked"
        );
        AllowOrigin::list(Vec::<HeaderValue>::new())
    } else {
        let origins: Vec<HeaderValue> = cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        tracing::info!(origins = ?cors_origins, "CORS allowed origins configured");
        AllowOrigin::list(origins)
    };

    // Build the API
    let mut app = Router::new()
        // Check routes
        .nest("/api", rest::router())
        // Health check route
        .route("/health", get(health_check))
        .layer(Extension(checker))
        .layer(Extension(store))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::OPTIONS])
                .allow_headers(Any)
                .allow_origin(allow_origin),
        )
        .layer(TraceLayer::new_for_http());

    // Add security headers middleware if enabled
    if config.security_headers.enabled {
        tracing::info!("Security headers enabled");
        let headers = build_security_headers(&config.security_headers);
        app = app
            .layer(middleware::from_fn(security_headers_middleware))
            .layer(Extension(headers));
    } else {
        tracing::info!("Security headers disabled");
    }

    // Start the server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server.host / server.port combination")?;
    tracing::info!("Starting server at http://{addr}/api/check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
