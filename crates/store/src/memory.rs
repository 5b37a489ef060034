//! In-memory credential store implementation.
//!
//! [`MemoryStore`] keeps records in a [`BTreeMap`] behind a
//! [`parking_lot::RwLock`]. It is the reference implementation of
//! [`CredentialStore`] and the store used by tests and by applications that
//! share a cache within a single process.
//!
//! # Example
//!
//! ```
//! use tokencache_store::{CredentialStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.put(b"greeting".to_vec(), b"hello".to_vec()).unwrap();
//! assert_eq!(store.get(b"greeting").unwrap().unwrap().as_ref(), b"hello");
//! ```
//!
//! # Performance Characteristics
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | get | O(log n) |
//! | put | O(log n) |
//! | delete | O(log n) |
//! | enumerate | O(log n + k) where k is result size |
//!
//! # Fail Points
//!
//! With the `failpoints` feature enabled, the following fail points can be
//! configured through [`fail::cfg`] to inject persistence failures:
//!
//! - `memory-store-get`, `memory-store-put`, `memory-store-delete`, `memory-store-enumerate`

use std::{collections::BTreeMap, ops::Bound, sync::Arc};

use bytes::Bytes;
use parking_lot::RwLock;

use crate::{
    error::{StoreError, StoreResult},
    size_limits::SizeLimits,
    store::{CredentialStore, prefix_upper_bound},
    types::KeyValue,
};

/// In-memory credential store using [`BTreeMap`].
///
/// # Cloning
///
/// `MemoryStore` is cheaply cloneable via [`Arc`]. All clones share the same
/// underlying records, which is how several accessors in one process observe
/// each other's writes.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<BTreeMap<Vec<u8>, Bytes>>>,
    limits: SizeLimits,
}

impl MemoryStore {
    /// Creates an empty store with default [`SizeLimits`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store enforcing the given size limits on writes.
    #[must_use]
    pub fn with_limits(limits: SizeLimits) -> Self {
        Self { data: Arc::default(), limits }
    }

    /// Returns the number of records currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns `true` if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl CredentialStore for MemoryStore {
    #[tracing::instrument(skip(self, key), fields(key_len = key.len()))]
    fn get(&self, key: &[u8]) -> StoreResult<Option<Bytes>> {
        fail::fail_point!("memory-store-get", |_| Err(StoreError::io("injected read failure")));
        self.limits.check_key(key)?;

        Ok(self.data.read().get(key).cloned())
    }

    #[tracing::instrument(
        skip(self, key, record),
        fields(key_len = key.len(), record_len = record.len())
    )]
    fn put(&self, key: Vec<u8>, record: Vec<u8>) -> StoreResult<()> {
        fail::fail_point!("memory-store-put", |_| Err(StoreError::io("injected write failure")));
        self.limits.check_write(&key, &record)?;

        self.data.write().insert(key, Bytes::from(record));
        Ok(())
    }

    #[tracing::instrument(skip(self, key), fields(key_len = key.len()))]
    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        fail::fail_point!("memory-store-delete", |_| {
            Err(StoreError::io("injected delete failure"))
        });
        self.limits.check_key(key)?;

        self.data.write().remove(key);
        Ok(())
    }

    #[tracing::instrument(skip(self, prefix), fields(prefix_len = prefix.len()))]
    fn enumerate(&self, prefix: &[u8]) -> StoreResult<Vec<KeyValue>> {
        fail::fail_point!("memory-store-enumerate", |_| {
            Err(StoreError::io("injected enumerate failure"))
        });

        let start = Bound::Included(prefix);
        let upper = prefix_upper_bound(prefix);
        let end = match upper.as_deref() {
            Some(end) => Bound::Excluded(end),
            None => Bound::Unbounded,
        };

        // The read guard makes the result a consistent snapshot.
        let data = self.data.read();
        let results = data
            .range::<[u8], _>((start, end))
            .map(|(k, v)| KeyValue::new(Bytes::copy_from_slice(k), v.clone()))
            .collect();

        Ok(results)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let store = MemoryStore::new();

        store.put(b"key1".to_vec(), b"value1".to_vec()).unwrap();
        assert_eq!(store.get(b"key1").unwrap(), Some(Bytes::from("value1")));

        store.delete(b"key1").unwrap();
        assert_eq!(store.get(b"key1").unwrap(), None);
    }

    #[test]
    fn test_enumerate_respects_prefix_boundary() {
        let store = MemoryStore::new();

        store.put(b"rt|alice|".to_vec(), b"1".to_vec()).unwrap();
        store.put(b"rt|alice|x".to_vec(), b"2".to_vec()).unwrap();
        store.put(b"rt|alicia|".to_vec(), b"3".to_vec()).unwrap();
        store.put(b"rt}".to_vec(), b"4".to_vec()).unwrap();

        let results = store.enumerate(b"rt|alice|").unwrap();
        let keys: Vec<&[u8]> = results.iter().map(|kv| kv.key.as_ref()).collect();
        assert_eq!(keys, vec![b"rt|alice|".as_slice(), b"rt|alice|x"]);
    }

    #[test]
    fn test_enumerate_empty_prefix_returns_everything() {
        let store = MemoryStore::new();
        store.put(b"a".to_vec(), b"1".to_vec()).unwrap();
        store.put(b"\xff".to_vec(), b"2".to_vec()).unwrap();

        assert_eq!(store.enumerate(b"").unwrap().len(), 2);
    }

    #[test]
    fn test_clone_shares_data() {
        let store1 = MemoryStore::new();
        let store2 = store1.clone();

        store1.put(b"key".to_vec(), b"value".to_vec()).unwrap();
        assert_eq!(store2.get(b"key").unwrap(), Some(Bytes::from("value")));
        assert_eq!(store2.len(), 1);
    }

    #[test]
    fn test_put_rejects_oversized_record() {
        let store = MemoryStore::with_limits(SizeLimits::new(16, 8).unwrap());

        let result = store.put(b"key".to_vec(), vec![0u8; 9]);
        assert!(matches!(result, Err(StoreError::SizeLimitExceeded { kind: "record", .. })));
        assert!(store.is_empty(), "rejected write must not leave an entry");
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_writes() {
        let store = MemoryStore::new();
        store.put(b"p:1".to_vec(), b"a".to_vec()).unwrap();

        let snapshot = store.enumerate(b"p:").unwrap();
        store.put(b"p:2".to_vec(), b"b".to_vec()).unwrap();
        store.delete(b"p:1").unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].value, Bytes::from("a"));
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            /// Every key returned by `enumerate` starts with the prefix, and
            /// every stored key with the prefix is returned.
            #[test]
            fn enumerate_matches_prefix_filter(
                keys in proptest::collection::btree_set(
                    proptest::collection::vec(any::<u8>(), 0..8),
                    0..30,
                ),
                prefix in proptest::collection::vec(any::<u8>(), 0..3),
            ) {
                let store = MemoryStore::new();
                for key in &keys {
                    store.put(key.clone(), b"v".to_vec()).unwrap();
                }

                let results = store.enumerate(&prefix).unwrap();
                let expected: Vec<&Vec<u8>> =
                    keys.iter().filter(|k| k.starts_with(&prefix)).collect();

                prop_assert_eq!(results.len(), expected.len());
                for (kv, key) in results.iter().zip(expected) {
                    prop_assert_eq!(kv.key.as_ref(), key.as_slice());
                }
            }
        }
    }
}
