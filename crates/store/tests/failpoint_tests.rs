#![allow(clippy::expect_used, clippy::panic)]
//! Integration tests for fail-point injection.
//!
//! These tests require the `failpoints` feature:
//! ```bash
//! cargo test -p tokencache-store --features failpoints --test failpoint_tests
//! ```

use tokencache_store::{CredentialStore, MemoryStore, StoreError};

#[test]
fn put_failpoint_returns_io_error_and_stores_nothing() {
    let scenario = fail::FailScenario::setup();
    fail::cfg("memory-store-put", "return").expect("failed to configure fail point");

    let store = MemoryStore::new();
    let result = store.put(b"key".to_vec(), b"value".to_vec());

    assert!(matches!(result, Err(StoreError::Io { .. })), "got {result:?}");
    fail::remove("memory-store-put");
    assert_eq!(store.get(b"key").expect("get"), None, "failed put must not leave an entry");

    scenario.teardown();
}

#[test]
fn enumerate_failpoint_returns_error() {
    let scenario = fail::FailScenario::setup();
    fail::cfg("memory-store-enumerate", "return").expect("failed to configure fail point");

    let store = MemoryStore::new();
    assert!(store.enumerate(b"").is_err(), "enumerate should fail when fail point is active");

    scenario.teardown();
}

#[test]
fn operations_without_failpoint_succeed() {
    let scenario = fail::FailScenario::setup();

    let store = MemoryStore::new();
    store.put(b"key".to_vec(), b"value".to_vec()).expect("put");
    assert!(store.get(b"key").expect("get").is_some());

    scenario.teardown();
}
