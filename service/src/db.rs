use std::time::{Duration, Instant};

use sqlx::{migrate::Migrator, postgres::PgPoolOptions, PgPool};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::DatabaseConfig;

/// Connect to the database and run migrations
///
/// # Errors
/// Returns an error if the database stays unreachable past the retry
/// deadline or if migrations fail to apply.
pub async fn setup_database(config: &DatabaseConfig) -> Result<PgPool, anyhow::Error> {
    let database_url = config.connection_url();
    let retry_deadline = Duration::from_secs(60); // overall retry budget
    let max_interval = Duration::from_secs(30); // cap single waits
    let mut delay = Duration::from_millis(500);
    let start = Instant::now();

    let pool = loop {
        info!(host = %config.host, database = %config.name, "Attempting to connect to Postgres...");

        match PgPoolOptions::new()
            .max_connections(config.max_connections)
            // Allow extra time to acquire a connection during startup bursts
            .acquire_timeout(Duration::from_secs(30))
            .connect(&database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(err) => {
                if start.elapsed() >= retry_deadline {
                    warn!(error = %err, "Postgres not ready; retries exhausted");
                    return Err(err.into());
                }

                warn!(error = %err, "Postgres not ready yet; retrying");
                sleep(delay).await;
                delay = (delay.saturating_mul(2)).min(max_interval);
            }
        }
    };

    // Run database migrations from the crate's migrations directory
    let migrations_path = std::path::Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/migrations"));
    let migrator = Migrator::new(migrations_path).await?;
    migrator.run(&pool).await?;
    info!("Migrations applied");
    Ok(pool)
}
