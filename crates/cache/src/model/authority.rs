//! Authority URI normalization.
//!
//! Equivalent authority spellings must collide to the same cache key, so every
//! authority is parsed once into a canonical form:
//!
//! - scheme and host lowercased, default port dropped
//! - path segments lowercased, empty segments (and so trailing slashes) removed
//! - query, fragment and userinfo rejected

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{CacheError, CacheResult};

/// A normalized authority such as `https://login.example.com/contoso`.
///
/// # Examples
///
/// ```
/// use tokencache::Authority;
///
/// let a = Authority::parse("HTTPS://Login.Example.com:443/Tenant/").unwrap();
/// assert_eq!(a.as_str(), "https://login.example.com/tenant");
/// assert_eq!(a.environment(), "login.example.com");
/// assert_eq!(a.tenant(), Some("tenant"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Authority {
    canonical: String,
    environment: String,
    tenant: Option<String>,
}

impl Authority {
    /// Parses and normalizes an authority URI.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::MalformedKeyInput`] when the input is empty, not
    /// an absolute `http(s)` URL with a host, or carries userinfo, a query or
    /// a fragment.
    pub fn parse(input: &str) -> CacheResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(CacheError::malformed("authority", "must not be empty"));
        }

        let url = Url::parse(trimmed)
            .map_err(|e| CacheError::malformed("authority", format!("{trimmed}: {e}")))?;

        let scheme = url.scheme();
        if scheme != "https" && scheme != "http" {
            return Err(CacheError::malformed("authority", format!("unsupported scheme {scheme}")));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(CacheError::malformed("authority", "userinfo is not allowed"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(CacheError::malformed("authority", "query and fragment are not allowed"));
        }
        let Some(host) = url.host_str() else {
            return Err(CacheError::malformed("authority", "missing host"));
        };

        let environment = match url.port() {
            Some(port) => format!("{}:{port}", host.to_ascii_lowercase()),
            None => host.to_ascii_lowercase(),
        };

        let segments: Vec<String> = url
            .path_segments()
            .map(|segments| {
                segments.filter(|s| !s.is_empty()).map(str::to_ascii_lowercase).collect()
            })
            .unwrap_or_default();

        let mut canonical = format!("{scheme}://{environment}");
        for segment in &segments {
            canonical.push('/');
            canonical.push_str(segment);
        }

        Ok(Self { canonical, environment, tenant: segments.into_iter().next() })
    }

    /// Returns the canonical authority string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Returns the host (with non-default port) shared by every realm of this authority.
    #[must_use]
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Returns the first path segment, conventionally the tenant.
    #[must_use]
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for Authority {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Authority {
    type Error = CacheError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Authority> for String {
    fn from(value: Authority) -> Self {
        value.canonical
    }
}
