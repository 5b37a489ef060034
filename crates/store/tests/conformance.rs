//! Conformance suite for the bundled credential stores.
//!
//! Each check runs against a fresh store for fine-grained failure reporting;
//! the `run_all` tests exercise the full suite on one store to prove the
//! checks do not interfere with each other.

#![allow(clippy::expect_used, clippy::panic)]

use tokencache_store::{FileStore, MemoryStore, conformance};

fn file_store() -> (tempfile::TempDir, FileStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = FileStore::open(dir.path()).expect("open file store");
    (dir, store)
}

// ============================================================================
// MemoryStore
// ============================================================================

#[test]
fn memory_get_returns_none_for_missing_key() {
    conformance::crud_get_returns_none_for_missing_key(&MemoryStore::new());
}

#[test]
fn memory_put_then_get_returns_record() {
    conformance::crud_put_then_get_returns_record(&MemoryStore::new());
}

#[test]
fn memory_put_overwrites_existing() {
    conformance::crud_put_overwrites_existing(&MemoryStore::new());
}

#[test]
fn memory_delete_removes_key() {
    conformance::crud_delete_removes_key(&MemoryStore::new());
}

#[test]
fn memory_realistic_key_roundtrip() {
    conformance::crud_realistic_key_roundtrip(&MemoryStore::new());
}

#[test]
fn memory_enumerate_filters_and_orders() {
    conformance::enumerate_filters_and_orders(&MemoryStore::new());
}

#[test]
fn memory_enumerate_returns_snapshot() {
    conformance::enumerate_returns_snapshot(&MemoryStore::new());
}

#[test]
fn memory_concurrent_writers_same_key() {
    conformance::concurrent_writers_same_key(&MemoryStore::new());
}

#[test]
fn memory_run_all() {
    conformance::run_all(&MemoryStore::new());
}

// ============================================================================
// FileStore
// ============================================================================

#[test]
fn file_put_overwrites_existing() {
    let (_dir, store) = file_store();
    conformance::crud_put_overwrites_existing(&store);
}

#[test]
fn file_keys_are_byte_distinct() {
    let (_dir, store) = file_store();
    conformance::crud_keys_are_byte_distinct(&store);
}

#[test]
fn file_realistic_key_roundtrip() {
    let (_dir, store) = file_store();
    conformance::crud_realistic_key_roundtrip(&store);
}

#[test]
fn file_enumerate_filters_and_orders() {
    let (_dir, store) = file_store();
    conformance::enumerate_filters_and_orders(&store);
}

#[test]
fn file_concurrent_writers_same_key() {
    let (_dir, store) = file_store();
    conformance::concurrent_writers_same_key(&store);
}

#[test]
fn file_run_all() {
    let (_dir, store) = file_store();
    conformance::run_all(&store);
}
