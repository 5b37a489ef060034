//! Shared test utilities for credential store testing.
//!
//! Feature-gated behind `testutil` so none of it leaks into production
//! builds. Enable it in `[dev-dependencies]`:
//!
//! ```toml
//! [dev-dependencies]
//! tokencache-store = { path = "../store", features = ["testutil"] }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

use bytes::Bytes;

use crate::{
    error::{StoreError, StoreResult},
    memory::MemoryStore,
    store::CredentialStore,
    types::KeyValue,
};

/// Create a deterministic test key from a prefix and index.
///
/// Produces keys like `"prefix:000042"`; the zero-padding keeps
/// lexicographic and numeric ordering aligned.
#[must_use]
pub fn make_key(prefix: &str, idx: usize) -> Vec<u8> {
    format!("{prefix}:{idx:06}").into_bytes()
}

/// Create a [`MemoryStore`] pre-populated with `count` keys under `prefix`.
///
/// # Panics
///
/// Panics if any `put` fails (should not happen with `MemoryStore`).
#[must_use]
pub fn populated_store(prefix: &str, count: usize) -> MemoryStore {
    let store = MemoryStore::new();
    for i in 0..count {
        store.put(make_key(prefix, i), format!("record-{i}").into_bytes()).expect("populate put");
    }
    store
}

/// Store wrapper whose operations can be switched to fail on demand.
///
/// Used to prove that callers surface persistence failures instead of
/// treating them as cache misses.
#[derive(Debug, Default)]
pub struct FlakyStore<S = MemoryStore> {
    inner: S,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl<S: CredentialStore> FlakyStore<S> {
    /// Wraps `inner`; all operations succeed until a failure switch is set.
    pub fn new(inner: S) -> Self {
        Self { inner, fail_reads: AtomicBool::new(false), fail_writes: AtomicBool::new(false) }
    }

    /// Makes `get` and `enumerate` fail while `fail` is `true`.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes `put` and `delete` fail while `fail` is `true`.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns the wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn check_read(&self) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::io("simulated read failure"));
        }
        Ok(())
    }

    fn check_write(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::permission_denied("simulated write failure"));
        }
        Ok(())
    }
}

impl<S: CredentialStore> CredentialStore for FlakyStore<S> {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Bytes>> {
        self.check_read()?;
        self.inner.get(key)
    }

    fn put(&self, key: Vec<u8>, record: Vec<u8>) -> StoreResult<()> {
        self.check_write()?;
        self.inner.put(key, record)
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        self.check_write()?;
        self.inner.delete(key)
    }

    fn enumerate(&self, prefix: &[u8]) -> StoreResult<Vec<KeyValue>> {
        self.check_read()?;
        self.inner.enumerate(prefix)
    }
}

/// Assert that a [`StoreResult`] is `Ok`, returning the inner value.
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use tokencache_store::{StoreResult, assert_store_ok};
///
/// let result: StoreResult<i32> = Ok(42);
/// assert_eq!(assert_store_ok!(result), 42);
/// ```
#[macro_export]
macro_rules! assert_store_ok {
    ($result:expr) => {
        match $result {
            Ok(val) => val,
            Err(e) => panic!("expected Ok, got StoreError: {e:?}"),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(val) => val,
            Err(e) => panic!("{}: expected Ok, got StoreError: {e:?}", $msg),
        }
    };
}

/// Assert that a result is an error matching the given variant pattern.
///
/// ```no_run
/// // Requires the `testutil` feature to be enabled.
/// use tokencache_store::{StoreError, StoreResult, assert_store_error};
///
/// let result: StoreResult<()> = Err(StoreError::io("disk"));
/// assert_store_error!(result, StoreError::Io { .. });
/// ```
#[macro_export]
macro_rules! assert_store_error {
    ($result:expr, $pattern:pat) => {
        match &$result {
            Err($pattern) => {},
            other => panic!("expected {}, got: {other:?}", stringify!($pattern)),
        }
    };
}
