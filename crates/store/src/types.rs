//! Common types returned by credential store operations.

use bytes::Bytes;

/// Key/record pair returned from [`enumerate`](crate::CredentialStore::enumerate).
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use tokencache_store::KeyValue;
///
/// let kv = KeyValue::new(Bytes::from("refreshtoken|alice|"), Bytes::from("{}"));
/// assert_eq!(kv.key_str(), Some("refreshtoken|alice|"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// The key identifying this entry.
    pub key: Bytes,

    /// The serialized record stored at this key.
    pub value: Bytes,
}

impl KeyValue {
    /// Creates a new key/record pair.
    pub fn new(key: Bytes, value: Bytes) -> Self {
        Self { key, value }
    }

    /// Returns the key as UTF-8, if it is valid UTF-8.
    #[must_use]
    pub fn key_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.key).ok()
    }
}
