//! Credential store error types and result alias.
//!
//! Every [`CredentialStore`](crate::CredentialStore) implementation maps its
//! internal failures to [`StoreError`]. A missing key is not an error: reads
//! return `Ok(None)` and deletes of absent keys succeed.
//!
//! # Error Types
//!
//! - [`StoreError::Io`] - The persistence medium could not be read or written
//! - [`StoreError::PermissionDenied`] - The medium refused access to a key
//! - [`StoreError::Corrupted`] - A stored record or key failed to decode
//! - [`StoreError::SizeLimitExceeded`] - A key or record exceeds configured limits
//! - [`StoreError::Internal`] - Backend-specific internal errors
//!
//! # Example
//!
//! ```
//! use tokencache_store::{StoreError, StoreResult};
//!
//! fn load(key: &str) -> StoreResult<Vec<u8>> {
//!     Err(StoreError::io(format!("keychain unavailable for {key}")))
//! }
//! ```

use std::sync::Arc;

use thiserror::Error;

/// A boxed error type for source chain tracking.
pub type BoxError = Arc<dyn std::error::Error + Send + Sync>;

/// Result type alias for credential store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during credential store operations.
///
/// Errors preserve their source chain via the `#[source]` attribute so the
/// accessor layer can surface the underlying cause to its callers.
///
/// # Non-exhaustive
///
/// New variants may be added in future minor releases. Downstream match
/// expressions must include a wildcard arm (`_ =>`).
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// I/O fault on the persistence medium.
    #[error("I/O error: {message}")]
    Io {
        /// Description of the failure.
        message: String,
        /// The underlying error that caused this failure.
        #[source]
        source: Option<BoxError>,
    },

    /// The persistence medium denied access.
    #[error("Permission denied: {message}")]
    PermissionDenied {
        /// Description of the denied operation.
        message: String,
        /// The underlying error that caused this failure.
        #[source]
        source: Option<BoxError>,
    },

    /// A stored record or key could not be decoded.
    ///
    /// This typically indicates on-disk corruption or a record written by an
    /// incompatible version.
    #[error("Corrupted record: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
        /// The underlying decode error.
        #[source]
        source: Option<BoxError>,
    },

    /// A key or record exceeds the configured size limit.
    #[error("{kind} size {actual} exceeds limit {limit}")]
    SizeLimitExceeded {
        /// Which part was too large (`"key"` or `"record"`).
        kind: &'static str,
        /// Actual size in bytes.
        actual: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// Internal store error.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
        /// The underlying error that caused this internal failure.
        #[source]
        source: Option<BoxError>,
    },
}

/// Errors produced when validating configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A numeric field is below its allowed minimum.
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        /// Name of the offending field.
        field: &'static str,
        /// Minimum accepted value.
        min: String,
        /// Value that was supplied.
        value: String,
    },

    /// A required string field is empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Name of the offending field.
        field: &'static str,
    },
}

impl StoreError {
    /// Creates a new `Io` error with the given message.
    #[must_use]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io { message: message.into(), source: None }
    }

    /// Creates a new `Io` error with a message and source error.
    #[must_use]
    pub fn io_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Io { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `PermissionDenied` error with the given message.
    #[must_use]
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied { message: message.into(), source: None }
    }

    /// Creates a new `Corrupted` error with the given message.
    #[must_use]
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted { message: message.into(), source: None }
    }

    /// Creates a new `Corrupted` error with a message and source error.
    #[must_use]
    pub fn corrupted_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Corrupted { message: message.into(), source: Some(Arc::new(source)) }
    }

    /// Creates a new `SizeLimitExceeded` error.
    #[must_use]
    pub fn size_limit_exceeded(kind: &'static str, actual: usize, limit: usize) -> Self {
        Self::SizeLimitExceeded { kind, actual, limit }
    }

    /// Creates a new `Internal` error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Maps a [`std::io::Error`] to the matching variant.
    ///
    /// `PermissionDenied` keeps its own variant; everything else is `Io`.
    #[must_use]
    pub fn from_io(context: impl Into<String>, err: std::io::Error) -> Self {
        let message = context.into();
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => {
                Self::PermissionDenied { message, source: Some(Arc::new(err)) }
            },
            _ => Self::Io { message, source: Some(Arc::new(err)) },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn from_io_maps_permission_denied() {
        let err = StoreError::from_io(
            "open",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(err, StoreError::PermissionDenied { .. }));
        assert!(err.source().is_some());
    }

    #[test]
    fn from_io_maps_other_kinds_to_io() {
        let err =
            StoreError::from_io("read", std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(err.to_string(), "I/O error: read");
    }

    #[test]
    fn size_limit_display() {
        let err = StoreError::size_limit_exceeded("key", 600, 512);
        assert_eq!(err.to_string(), "key size 600 exceeds limit 512");
    }
}
