use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Token material, wiped from memory on drop and redacted in `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(Zeroizing<String>);

impl TokenSecret {
    /// Wraps the given token string.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    /// Returns the raw token for sending on the wire.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TokenSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenSecret(<{} bytes redacted>)", self.0.len())
    }
}

impl From<&str> for TokenSecret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TokenSecret {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
