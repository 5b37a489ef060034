//! Cache accessor error types and result alias.
//!
//! A cache miss is not an error. Lookups return `Ok(None)` when nothing
//! satisfies the request; [`CacheError`] is reserved for real failures.
//!
//! # Error Types
//!
//! - [`CacheError::StoreRead`] - The credential store failed or returned a corrupted record
//! - [`CacheError::StoreWrite`] - The credential store failed to persist or delete a record
//! - [`CacheError::MalformedKeyInput`] - A key component was blank or failed normalization
//! - [`CacheError::AmbiguousMatch`] - Several equally ranked, conflicting candidates matched
//! - [`CacheError::Unsupported`] - An optional operation is not enabled for this cache
//! - [`CacheError::PartialRemoval`] - A sign-out deleted some records but not all
//!
//! The accessor never retries; retry policy belongs to the caller.

use std::sync::Arc;

use thiserror::Error;
use tokencache_store::{BoxError, StoreError};

use crate::model::CredentialKind;

/// Result type alias for cache accessor operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors surfaced by the shared cache accessor.
///
/// # Non-exhaustive
///
/// New variants may be added in future minor releases. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum CacheError {
    /// Reading from the credential store failed.
    #[error("failed to read {key} from credential store")]
    StoreRead {
        /// Key (or key prefix) being read.
        key: String,
        /// The underlying store or decode error.
        #[source]
        source: BoxError,
    },

    /// Writing to the credential store failed.
    #[error("failed to write {key} to credential store")]
    StoreWrite {
        /// Key being written or deleted.
        key: String,
        /// The underlying store or encode error.
        #[source]
        source: BoxError,
    },

    /// Caller supplied key input that fails normalization.
    #[error("malformed {field}: {reason}")]
    MalformedKeyInput {
        /// Which input was rejected (`"authority"`, `"client_id"`, ...).
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// Several candidates tied on every ranking criterion but disagree.
    #[error("{count} conflicting {kind} candidates matched the request")]
    AmbiguousMatch {
        /// Credential kind being looked up.
        kind: CredentialKind,
        /// Number of tied candidates.
        count: usize,
    },

    /// The optional operation is not available on this cache.
    #[error("operation {operation} is not supported by this cache")]
    Unsupported {
        /// Name of the operation.
        operation: &'static str,
    },

    /// Removing an account's records stopped short of all of them.
    #[error("removed {removed} credentials but failed to remove {failed}")]
    PartialRemoval {
        /// Records deleted before and after the failures.
        removed: usize,
        /// Records still in the store.
        failed: usize,
        /// The first delete failure.
        #[source]
        source: BoxError,
    },
}

impl CacheError {
    /// Wraps a store failure on a read path.
    #[must_use]
    pub fn store_read(key: impl Into<String>, source: StoreError) -> Self {
        Self::StoreRead { key: key.into(), source: Arc::new(source) }
    }

    /// Wraps a store failure on a write path.
    #[must_use]
    pub fn store_write(key: impl Into<String>, source: StoreError) -> Self {
        Self::StoreWrite { key: key.into(), source: Arc::new(source) }
    }

    /// Creates a `MalformedKeyInput` error.
    #[must_use]
    pub fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedKeyInput { field, reason: reason.into() }
    }

    /// Creates an `Unsupported` error for the named operation.
    #[must_use]
    pub fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported { operation }
    }

    /// Creates a `PartialRemoval` error wrapping the first delete failure.
    #[must_use]
    pub fn partial_removal(removed: usize, failed: usize, first: CacheError) -> Self {
        Self::PartialRemoval { removed, failed, source: Arc::new(first) }
    }

    /// Returns the error kind used for metrics and logging.
    ///
    /// A [`PartialRemoval`](Self::PartialRemoval) counts as a store write failure.
    #[must_use]
    pub fn kind(&self) -> CacheErrorKind {
        match self {
            Self::StoreRead { .. } => CacheErrorKind::StoreRead,
            Self::StoreWrite { .. } => CacheErrorKind::StoreWrite,
            Self::MalformedKeyInput { .. } => CacheErrorKind::MalformedKeyInput,
            Self::AmbiguousMatch { .. } => CacheErrorKind::AmbiguousMatch,
            Self::Unsupported { .. } => CacheErrorKind::Unsupported,
            Self::PartialRemoval { .. } => CacheErrorKind::StoreWrite,
        }
    }
}

/// Error categories, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheErrorKind {
    /// See [`CacheError::StoreRead`].
    StoreRead,
    /// See [`CacheError::StoreWrite`].
    StoreWrite,
    /// See [`CacheError::MalformedKeyInput`].
    MalformedKeyInput,
    /// See [`CacheError::AmbiguousMatch`].
    AmbiguousMatch,
    /// See [`CacheError::Unsupported`].
    Unsupported,
}
