//! Shared helpers for integration tests.
//!
//! PostgreSQL-backed suites run against the shared embedded cluster from
//! `pg-embed-setup-unpriv`, one temporary database per test. Setting
//! `USER_API_TEST_DATABASE_URL` points them at an existing database instead.

use std::time::Duration;

use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};

/// Environment variable naming an existing PostgreSQL database to use in
/// place of the embedded cluster.
pub const TEST_DATABASE_ENV: &str = "USER_API_TEST_DATABASE_URL";

const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Returns true when the `SKIP_TEST_CLUSTER` environment variable is set to a
/// truthy value ("1", "true" or "yes", case-insensitive).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Handles cluster setup failures consistently across suites.
///
/// Prints a skip marker and returns `None` when `SKIP_TEST_CLUSTER` is truthy.
/// Otherwise panics so a broken cluster fails the run.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// Database a test runs against. Embedded databases are dropped with it.
pub enum TestDatabase {
    External(String),
    Embedded(TemporaryDatabase),
}

impl TestDatabase {
    pub fn url(&self) -> String {
        match self {
            Self::External(url) => url.clone(),
            Self::Embedded(database) => database.url().to_string(),
        }
    }
}

/// Provision a database for one test.
///
/// Must be called outside a Tokio runtime; the embedded cluster bootstraps
/// synchronously.
pub fn test_database() -> Option<TestDatabase> {
    match std::env::var(TEST_DATABASE_ENV) {
        Ok(url) if !url.trim().is_empty() => return Some(TestDatabase::External(url)),
        _ => {}
    }
    match shared_cluster().and_then(|cluster| {
        cluster
            .create_temporary_database()
            .map_err(|err| format!("create temporary database: {err:?}"))
    }) {
        Ok(database) => Some(TestDatabase::Embedded(database)),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(err) if attempt >= SHARED_CLUSTER_RETRIES => return Err(err.to_string()),
            Err(_) => {
                std::thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}
