//! Credential store trait definition.
//!
//! [`CredentialStore`] is the leaf persistence contract of the token cache:
//! durable key/record storage addressed by opaque byte keys. It has no
//! knowledge of credentials, accounts or matching rules. Those live in the
//! accessor layer built on top of it.
//!
//! # Consistency
//!
//! Implementations guarantee atomicity per key only:
//!
//! - a concurrent `put` and `get` on the same key never observes a partially written record
//! - `enumerate` returns a snapshot taken while the call runs
//! - there are no multi-key transactions
//!
//! # Implementing a Store
//!
//! 1. Implement [`CredentialStore`]
//! 2. Map medium-specific failures to [`StoreError`](crate::StoreError)
//! 3. Run the [`conformance`](crate::conformance) suite against it
//!
//! See [`MemoryStore`](crate::MemoryStore) for a reference implementation.

use std::sync::Arc;

use bytes::Bytes;

use crate::{error::StoreResult, types::KeyValue};

/// Durable key/record persistence shared by cooperating applications.
///
/// Stores must be thread-safe (`Send + Sync`); the accessor calls them from
/// any thread without external locking.
///
/// | Method | Description |
/// |--------|-------------|
/// | [`get`](CredentialStore::get) | Read one record |
/// | [`put`](CredentialStore::put) | Insert or overwrite one record |
/// | [`delete`](CredentialStore::delete) | Remove one record (absent is a no-op) |
/// | [`enumerate`](CredentialStore::enumerate) | Snapshot all records under a key prefix |
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use tokencache_store::{CredentialStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.put(b"accesstoken|alice|".to_vec(), b"{}".to_vec()).unwrap();
/// assert_eq!(store.get(b"accesstoken|alice|").unwrap(), Some(Bytes::from("{}")));
/// ```
pub trait CredentialStore: Send + Sync {
    /// Retrieves the record stored at `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))` if the key exists
    /// - `Ok(None)` if the key doesn't exist
    /// - `Err(...)` on persistence failures
    #[must_use = "store operations may fail and errors must be handled"]
    fn get(&self, key: &[u8]) -> StoreResult<Option<Bytes>>;

    /// Stores `record` at `key`, overwriting any existing record.
    #[must_use = "store operations may fail and errors must be handled"]
    fn put(&self, key: Vec<u8>, record: Vec<u8>) -> StoreResult<()>;

    /// Deletes the record at `key`.
    ///
    /// If the key doesn't exist, this is a no-op (returns `Ok(())`).
    #[must_use = "store operations may fail and errors must be handled"]
    fn delete(&self, key: &[u8]) -> StoreResult<()>;

    /// Returns every record whose key starts with `prefix`, in key order.
    ///
    /// An empty prefix enumerates the whole store.
    #[must_use = "store operations may fail and errors must be handled"]
    fn enumerate(&self, prefix: &[u8]) -> StoreResult<Vec<KeyValue>>;
}

impl<S: CredentialStore + ?Sized> CredentialStore for Arc<S> {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Bytes>> {
        (**self).get(key)
    }

    fn put(&self, key: Vec<u8>, record: Vec<u8>) -> StoreResult<()> {
        (**self).put(key, record)
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        (**self).delete(key)
    }

    fn enumerate(&self, prefix: &[u8]) -> StoreResult<Vec<KeyValue>> {
        (**self).enumerate(prefix)
    }
}

/// Computes the exclusive upper bound of the key range covered by `prefix`.
///
/// Returns `None` when the prefix is empty or consists solely of `0xFF`
/// bytes, in which case the range is unbounded above.
#[must_use]
pub fn prefix_upper_bound(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(b"abc", Some(b"abd".to_vec()))]
    #[case(b"ab\xff", Some(b"ac".to_vec()))]
    #[case(b"\xff\xff", None)]
    #[case(b"", None)]
    fn upper_bound_of_prefix(#[case] prefix: &[u8], #[case] expected: Option<Vec<u8>>) {
        assert_eq!(prefix_upper_bound(prefix), expected);
    }
}
