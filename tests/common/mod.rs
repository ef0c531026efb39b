//! Common test utilities for integration tests
//!
//! Provides shared fixtures, helpers, and test utilities used across
//! multiple integration test files.

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use order_service::Order;
use tempfile::TempDir;

/// Sample order payload with every sub-document populated.
pub const MODEL_ORDER_JSON: &str = include_str!("../fixtures/model.json");

/// The fixture order, re-keyed under `order_uid`.
pub fn sample_order(order_uid: &str) -> Order {
    let mut order = Order::decode(MODEL_ORDER_JSON.as_bytes()).expect("fixture order decodes");
    order.order_uid = order_uid.to_string();
    order
}

/// JSON payload for `sample_order(order_uid)`.
pub fn sample_payload(order_uid: &str) -> Vec<u8> {
    serde_json::to_vec(&sample_order(order_uid)).expect("order serializes")
}

/// File-backed SQLite URL inside a fresh temporary directory.
///
/// Keep the returned `TempDir` alive for the duration of the test.
pub fn temp_database_url() -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path: PathBuf = dir.path().join("orders.db");
    (dir, format!("sqlite:{}", path.display()))
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Poll `check` every 10ms until it returns true or `timeout` elapses.
pub async fn wait_until<F, Fut>(timeout: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if check().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
