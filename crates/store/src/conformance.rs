//! Conformance test suite for [`CredentialStore`] implementations.
//!
//! Every store the token cache runs on (in-memory, directory-backed,
//! platform keychain) must satisfy the same contract. Call each function with
//! a fresh store, or [`run_all`] to exercise the whole suite in sequence.
//!
//! ```no_run
//! use tokencache_store::{MemoryStore, conformance};
//!
//! #[test]
//! fn memory_store_conformance() {
//!     conformance::run_all(&MemoryStore::new());
//! }
//! ```
//!
//! | Category | Contract aspect |
//! |----------|-----------------|
//! | CRUD | get/put/delete semantics, overwrite, idempotent delete, realistic key lengths |
//! | Enumerate | prefix filtering, ordering, snapshot isolation |
//! | Concurrent | per-key atomicity under parallel access |

#![allow(clippy::expect_used, clippy::panic)]

use std::sync::Barrier;

use bytes::Bytes;

use crate::store::CredentialStore;

// ============================================================================
// CRUD
// ============================================================================

/// `get` on a nonexistent key returns `Ok(None)`.
pub fn crud_get_returns_none_for_missing_key<S: CredentialStore>(store: &S) {
    let result = store.get(b"crud:missing");
    assert!(result.is_ok(), "get should not error on missing key: {result:?}");
    assert_eq!(result.expect("checked above"), None, "missing key should return None");
}

/// `put` then `get` round-trips the record.
pub fn crud_put_then_get_returns_record<S: CredentialStore>(store: &S) {
    store.put(b"crud:k1".to_vec(), b"v1".to_vec()).expect("put should succeed");
    let val = store.get(b"crud:k1").expect("get should succeed");
    assert_eq!(val, Some(Bytes::from("v1")));
}

/// `put` on an existing key overwrites it and leaves a single entry.
pub fn crud_put_overwrites_existing<S: CredentialStore>(store: &S) {
    store.put(b"crud:ow".to_vec(), b"original".to_vec()).expect("put");
    store.put(b"crud:ow".to_vec(), b"updated".to_vec()).expect("overwrite");
    assert_eq!(store.get(b"crud:ow").expect("get"), Some(Bytes::from("updated")));

    let entries = store.enumerate(b"crud:ow").expect("enumerate");
    assert_eq!(entries.len(), 1, "overwrite must not duplicate the entry: {entries:?}");
}

/// `delete` on a nonexistent key is a silent no-op.
pub fn crud_delete_nonexistent_is_noop<S: CredentialStore>(store: &S) {
    let result = store.delete(b"crud:ghost");
    assert!(result.is_ok(), "delete of nonexistent key should not error: {result:?}");
}

/// `delete` removes a previously stored key; a second delete is a no-op.
pub fn crud_delete_removes_key<S: CredentialStore>(store: &S) {
    store.put(b"crud:del".to_vec(), b"val".to_vec()).expect("put");
    store.delete(b"crud:del").expect("delete");
    assert_eq!(store.get(b"crud:del").expect("get after delete"), None);
    store.delete(b"crud:del").expect("second delete should be a no-op");
}

/// Keys are byte-level distinct: `"key"` and `"key\x00"` are different.
pub fn crud_keys_are_byte_distinct<S: CredentialStore>(store: &S) {
    store.put(b"crud:key".to_vec(), b"a".to_vec()).expect("put key");
    store.put(b"crud:key\x00".to_vec(), b"b".to_vec()).expect("put key+null");
    assert_eq!(store.get(b"crud:key").expect("get key"), Some(Bytes::from("a")));
    assert_eq!(store.get(b"crud:key\x00").expect("get key+null"), Some(Bytes::from("b")));
}

/// A 32 KiB record round-trips byte for byte.
pub fn crud_large_record_roundtrip<S: CredentialStore>(store: &S) {
    let big = vec![0xCDu8; 32 * 1024];
    store.put(b"crud:big".to_vec(), big.clone()).expect("put large record");
    assert_eq!(store.get(b"crud:big").expect("get large record"), Some(Bytes::from(big)));
}

/// Keys as long as real cache keys (percent-encoded authority, realm, scope
/// digest) round-trip and stay enumerable by their leading components.
pub fn crud_realistic_key_roundtrip<S: CredentialStore>(store: &S) {
    let prefix = "accesstoken|uid.tid%40https%3A%2F%2Flogin.example.com%2Fhome|\
                  https%3A%2F%2Flogin.example.com%2Fcontoso%2Fv2.0|";
    let scope_digest = "5f".repeat(96);
    let keys: Vec<Vec<u8>> = ["client-a", "client-b"]
        .iter()
        .map(|client| format!("{prefix}{client}|contoso|{scope_digest}|").into_bytes())
        .collect();
    assert!(keys.iter().all(|k| k.len() >= 256), "keys should be realistic in length");

    for (i, key) in keys.iter().enumerate() {
        store.put(key.clone(), format!("record-{i}").into_bytes()).expect("put long key");
    }
    for (i, key) in keys.iter().enumerate() {
        let value = store.get(key).expect("get long key");
        assert_eq!(value, Some(Bytes::from(format!("record-{i}"))));
    }

    let listed = store.enumerate(prefix.as_bytes()).expect("enumerate long prefix");
    let listed: Vec<&[u8]> = listed.iter().map(|kv| kv.key.as_ref()).collect();
    assert_eq!(listed, keys.iter().map(Vec::as_slice).collect::<Vec<_>>());

    store.delete(&keys[0]).expect("delete long key");
    assert_eq!(store.get(&keys[0]).expect("get after delete"), None);
}

// ============================================================================
// Enumerate
// ============================================================================

/// `enumerate` returns only keys under the prefix, in key order.
pub fn enumerate_filters_and_orders<S: CredentialStore>(store: &S) {
    for key in [b"enum:c".as_slice(), b"enum:a", b"enum:b", b"enun:x", b"enu"] {
        store.put(key.to_vec(), b"v".to_vec()).expect("put");
    }
    let results = store.enumerate(b"enum:").expect("enumerate");
    let keys: Vec<&[u8]> = results.iter().map(|kv| kv.key.as_ref()).collect();
    assert_eq!(keys, vec![b"enum:a".as_slice(), b"enum:b", b"enum:c"]);
}

/// `enumerate` with a prefix nothing matches returns an empty vec.
pub fn enumerate_unmatched_prefix_is_empty<S: CredentialStore>(store: &S) {
    let results = store.enumerate(b"nothing-here:").expect("enumerate");
    assert!(results.is_empty(), "unmatched prefix should be empty: {results:?}");
}

/// A returned snapshot does not change when the store is written afterwards.
pub fn enumerate_returns_snapshot<S: CredentialStore>(store: &S) {
    store.put(b"snap:1".to_vec(), b"a".to_vec()).expect("put");
    let snapshot = store.enumerate(b"snap:").expect("enumerate");
    store.put(b"snap:2".to_vec(), b"b".to_vec()).expect("put after snapshot");
    store.delete(b"snap:1").expect("delete after snapshot");

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].value, Bytes::from("a"));
}

// ============================================================================
// Concurrent
// ============================================================================

/// Parallel writers to the same key leave exactly one complete record.
pub fn concurrent_writers_same_key<S: CredentialStore>(store: &S) {
    const WRITERS: usize = 8;
    let barrier = Barrier::new(WRITERS);
    std::thread::scope(|scope| {
        for writer in 0..WRITERS {
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                let record = format!("writer-{writer}-").repeat(64).into_bytes();
                store.put(b"conc:shared".to_vec(), record).expect("concurrent put");
            });
        }
    });

    let value = store.get(b"conc:shared").expect("get").expect("key should exist");
    let text = String::from_utf8(value.to_vec()).expect("utf-8 record");
    let first = text.split('-').nth(1).expect("writer id");
    assert_eq!(
        text,
        format!("writer-{first}-").repeat(64),
        "record must come from a single writer, not a mix"
    );
}

/// Parallel writers to different keys all land.
pub fn concurrent_writers_different_keys<S: CredentialStore>(store: &S) {
    const WRITERS: usize = 8;
    std::thread::scope(|scope| {
        for writer in 0..WRITERS {
            scope.spawn(move || {
                let key = format!("par:{writer:02}").into_bytes();
                store.put(key, b"v".to_vec()).expect("concurrent put");
            });
        }
    });

    assert_eq!(store.enumerate(b"par:").expect("enumerate").len(), WRITERS);
}

// ============================================================================
// Convenience runner
// ============================================================================

/// Runs the full conformance suite against one store.
///
/// Every check uses its own key prefix, so the suite can share a store.
pub fn run_all<S: CredentialStore>(store: &S) {
    crud_get_returns_none_for_missing_key(store);
    crud_put_then_get_returns_record(store);
    crud_put_overwrites_existing(store);
    crud_delete_nonexistent_is_noop(store);
    crud_delete_removes_key(store);
    crud_keys_are_byte_distinct(store);
    crud_large_record_roundtrip(store);
    crud_realistic_key_roundtrip(store);

    enumerate_filters_and_orders(store);
    enumerate_unmatched_prefix_is_empty(store);
    enumerate_returns_snapshot(store);

    concurrent_writers_same_key(store);
    concurrent_writers_different_keys(store);
}
