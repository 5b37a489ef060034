//! Key and record bounds enforced by every credential store.
//!
//! A store holds a [`SizeLimits`] and calls [`SizeLimits::check_write`]
//! before persisting anything, so an oversized record never reaches the
//! medium and a rejected save leaves no entry. Reads, deletes and prefix
//! scans go through [`SizeLimits::check_key`].
//!
//! The default key bound leaves room for the longest cache key: an access
//! token key carries an account id, a percent-encoded authority, a client id,
//! a realm and a 64-character scope signature. The record bound covers an
//! access token record with a large JWT secret.

use crate::{ConfigError, StoreError};

/// Default maximum key size in bytes.
pub const DEFAULT_MAX_KEY_SIZE: usize = 1024;

/// Default maximum record size in bytes.
pub const DEFAULT_MAX_RECORD_SIZE: usize = 64 * 1024;

/// Upper bounds on key and record sizes, both at least one byte.
///
/// ```
/// use tokencache_store::SizeLimits;
///
/// let limits = SizeLimits::new(256, 16 * 1024).unwrap();
/// assert!(limits.check_write(b"refreshtoken|alice|", b"{}").is_ok());
/// assert!(limits.check_key(&[b'k'; 257]).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimits {
    max_key_size: usize,
    max_record_size: usize,
}

fn at_least_one(field: &'static str, value: usize) -> Result<usize, ConfigError> {
    if value == 0 {
        return Err(ConfigError::BelowMinimum { field, min: "1".into(), value: "0".into() });
    }
    Ok(value)
}

impl SizeLimits {
    /// Creates limits with the given bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BelowMinimum`] if either bound is zero.
    pub fn new(max_key_size: usize, max_record_size: usize) -> Result<Self, ConfigError> {
        Ok(Self {
            max_key_size: at_least_one("max_key_size", max_key_size)?,
            max_record_size: at_least_one("max_record_size", max_record_size)?,
        })
    }

    #[must_use]
    pub fn max_key_size(&self) -> usize {
        self.max_key_size
    }

    #[must_use]
    pub fn max_record_size(&self) -> usize {
        self.max_record_size
    }

    /// Rejects a key (or scan prefix) longer than the key bound.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SizeLimitExceeded`] with kind `"key"`.
    pub fn check_key(&self, key: &[u8]) -> Result<(), StoreError> {
        if key.len() > self.max_key_size {
            return Err(StoreError::size_limit_exceeded("key", key.len(), self.max_key_size));
        }
        Ok(())
    }

    /// Rejects a write whose key or record exceeds its bound.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SizeLimitExceeded`] naming the offending part.
    pub fn check_write(&self, key: &[u8], record: &[u8]) -> Result<(), StoreError> {
        self.check_key(key)?;
        if record.len() > self.max_record_size {
            return Err(StoreError::size_limit_exceeded(
                "record",
                record.len(),
                self.max_record_size,
            ));
        }
        Ok(())
    }
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self { max_key_size: DEFAULT_MAX_KEY_SIZE, max_record_size: DEFAULT_MAX_RECORD_SIZE }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::zero_key(0, 1024, "max_key_size")]
    #[case::zero_record(1, 0, "max_record_size")]
    fn zero_bounds_are_rejected(
        #[case] max_key: usize,
        #[case] max_record: usize,
        #[case] field: &str,
    ) {
        let err = SizeLimits::new(max_key, max_record).unwrap_err();
        assert!(err.to_string().contains(field), "error should name {field}: {err}");
    }

    #[test]
    fn oversized_record_names_the_record() {
        let limits = SizeLimits::new(10, 20).unwrap();
        let err = limits.check_write(&[0u8; 5], &[0u8; 21]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::SizeLimitExceeded { kind: "record", actual: 21, limit: 20 }
        ));
    }

    #[test]
    fn oversized_key_is_reported_before_the_record() {
        let limits = SizeLimits::new(4, 4).unwrap();
        let err = limits.check_write(b"too-long", b"also-too-long").unwrap_err();
        assert!(matches!(err, StoreError::SizeLimitExceeded { kind: "key", .. }));
    }

    proptest! {
        #[test]
        fn bounds_are_inclusive(max_key in 1usize..64, max_record in 1usize..64) {
            let limits = SizeLimits::new(max_key, max_record).unwrap();
            prop_assert!(limits.check_write(&vec![0u8; max_key], &vec![0u8; max_record]).is_ok());
            prop_assert!(limits.check_key(&vec![0u8; max_key + 1]).is_err());
            prop_assert!(
                limits.check_write(&vec![0u8; max_key], &vec![0u8; max_record + 1]).is_err()
            );
        }
    }
}
