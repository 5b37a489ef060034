//! Normalized scope sets.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An unordered set of OAuth scopes, normalized on construction.
///
/// Scopes are trimmed, case-folded and deduplicated, and iterate in a
/// deterministic order, so semantically identical requests always compare
/// equal and hash to the same [`signature`](ScopeSet::signature).
///
/// # Examples
///
/// ```
/// use tokencache::ScopeSet;
///
/// let granted = ScopeSet::new(["User.Read", "Mail.Read", "user.read"]);
/// assert_eq!(granted.len(), 2);
/// assert!(granted.is_superset(&ScopeSet::parse("mail.read")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ScopeSet(BTreeSet<String>);

impl ScopeSet {
    /// Builds a normalized set from individual scopes.
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            scopes
                .into_iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }

    /// Parses a space-delimited scope string, as sent on the wire.
    #[must_use]
    pub fn parse(scopes: &str) -> Self {
        Self::new(scopes.split_whitespace())
    }

    /// Returns `true` if every scope in `other` is also in `self`.
    #[must_use]
    pub fn is_superset(&self, other: &ScopeSet) -> bool {
        self.0.is_superset(&other.0)
    }

    /// Number of distinct scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set holds no scopes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates scopes in their canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Stable hex SHA-256 over the canonical scope list, used in cache keys.
    #[must_use]
    pub fn signature(&self) -> String {
        let mut hasher = Sha256::new();
        for (i, scope) in self.0.iter().enumerate() {
            if i > 0 {
                hasher.update(b" ");
            }
            hasher.update(scope.as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for ScopeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for scope in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(scope)?;
            first = false;
        }
        Ok(())
    }
}

impl From<Vec<String>> for ScopeSet {
    fn from(value: Vec<String>) -> Self {
        Self::new(value)
    }
}

impl From<ScopeSet> for Vec<String> {
    fn from(value: ScopeSet) -> Self {
        value.0.into_iter().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ScopeSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}
