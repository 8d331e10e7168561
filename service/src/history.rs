//! Scan history persistence.
//!
//! Every completed check can be recorded as a row in the `scans` table.
//! Recording is best-effort: callers log store failures and move on, so the
//! check response never depends on whether the row landed.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

/// Errors from scan persistence.
#[derive(Debug, thiserror::Error)]
pub enum ScanStoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A scan row about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScan<'a> {
    /// The target as the caller supplied it.
    pub url: &'a str,

    /// Wire outcome, `"OK"` or `"Error"`.
    pub status: &'a str,

    /// Measured latency, when a response arrived.
    pub response_time_ms: Option<u64>,

    /// Captured headers as a JSON object, when a response arrived.
    pub report: Option<Value>,
}

/// Trait for recording completed checks.
///
/// Use [`PgScanStore`] against postgres, [`NoopScanStore`] when persistence
/// is disabled, or `mock::MockScanStore` in tests.
#[async_trait]
pub trait ScanStore: Send + Sync {
    /// Persist one scan.
    ///
    /// # Errors
    ///
    /// Returns [`ScanStoreError::Database`] on connection or query failure.
    async fn record(&self, scan: NewScan<'_>) -> Result<(), ScanStoreError>;
}

/// sqlx-backed implementation writing to the `scans` table.
pub struct PgScanStore {
    pool: PgPool,
}

impl PgScanStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScanStore for PgScanStore {
    async fn record(&self, scan: NewScan<'_>) -> Result<(), ScanStoreError> {
        let response_time = scan
            .response_time_ms
            .map(|ms| i64::try_from(ms).unwrap_or(i64::MAX));

        sqlx::query(
            "INSERT INTO scans (url, status, response_time, report) VALUES ($1, $2, $3, $4)",
        )
        .bind(scan.url)
        .bind(scan.status)
        .bind(response_time)
        .bind(scan.report)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Store used when persistence is disabled; drops every scan.
pub struct NoopScanStore;

#[async_trait]
impl ScanStore for NoopScanStore {
    async fn record(&self, _scan: NewScan<'_>) -> Result<(), ScanStoreError> {
        Ok(())
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[allow(
    clippy::unwrap_used,
    clippy::missing_panics_doc,
    clippy::missing_const_for_fn,
    clippy::must_use_candidate
)]
pub mod mock {
    //! Recording store for unit tests.

    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::Value;

    use super::{NewScan, ScanStore, ScanStoreError};

    /// Owned copy of a recorded scan.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedScan {
        pub url: String,
        pub status: String,
        pub response_time_ms: Option<u64>,
        pub report: Option<Value>,
    }

    /// Mock implementation of `ScanStore` for unit tests.
    ///
    /// Records every scan passed to `record`; use `set_record_result` to
    /// make the next call fail.
    pub struct MockScanStore {
        record_result: Mutex<Option<Result<(), ScanStoreError>>>,
        records: Mutex<Vec<RecordedScan>>,
    }

    impl MockScanStore {
        pub fn new() -> Self {
            Self {
                record_result: Mutex::new(None),
                records: Mutex::new(Vec::new()),
            }
        }

        /// Set the result for the next `record` call.
        pub fn set_record_result(&self, result: Result<(), ScanStoreError>) {
            *self.record_result.lock().unwrap() = Some(result);
        }

        /// All scans passed to `record`, in call order.
        pub fn records(&self) -> Vec<RecordedScan> {
            self.records.lock().unwrap().clone()
        }
    }

    impl Default for MockScanStore {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ScanStore for MockScanStore {
        async fn record(&self, scan: NewScan<'_>) -> Result<(), ScanStoreError> {
            self.records.lock().unwrap().push(RecordedScan {
                url: scan.url.to_string(),
                status: scan.status.to_string(),
                response_time_ms: scan.response_time_ms,
                report: scan.report,
            });

            self.record_result.lock().unwrap().take().unwrap_or(Ok(()))
        }
    }
}
