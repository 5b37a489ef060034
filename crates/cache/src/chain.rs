//! Refresh token rotation.
//!
//! Redeeming a refresh token may rotate it: the authority returns a new one
//! and the old one stops working. Applications sharing a family race on this,
//! and the loser is left holding a stale token. The chain takes the token the
//! caller presented and the token currently stored for the same slot and
//! decides which one the caller should use.
//!
//! ```text
//!   Presented ──resolve(stored)──► Resolved(Unchanged | Rotated | Revoked)
//! ```

use crate::model::RefreshToken;

/// Outcome of resolving a presented refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshResolution {
    /// The stored token is the one presented.
    Unchanged(RefreshToken),
    /// Another party stored a newer token; use it instead.
    Rotated(RefreshToken),
    /// Nothing is stored for the slot; the caller must re-authenticate.
    Revoked,
}

impl RefreshResolution {
    /// The token to use, or `None` when revoked.
    #[must_use]
    pub fn into_current(self) -> Option<RefreshToken> {
        match self {
            Self::Unchanged(token) | Self::Rotated(token) => Some(token),
            Self::Revoked => None,
        }
    }

    #[must_use]
    pub fn is_rotated(&self) -> bool {
        matches!(self, Self::Rotated(_))
    }
}

/// A refresh token moving through resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshChain {
    Presented(RefreshToken),
    Resolved(RefreshResolution),
}

impl RefreshChain {
    #[must_use]
    pub fn present(token: RefreshToken) -> Self {
        Self::Presented(token)
    }

    /// The presented token, while unresolved.
    #[must_use]
    pub fn presented(&self) -> Option<&RefreshToken> {
        match self {
            Self::Presented(token) => Some(token),
            Self::Resolved(_) => None,
        }
    }

    /// Resolves against the token currently stored for the presented slot.
    ///
    /// Tokens are compared by secret. Resolving an already resolved chain
    /// keeps the first resolution.
    #[must_use]
    pub fn resolve(self, stored: Option<RefreshToken>) -> Self {
        let Self::Presented(presented) = self else {
            return self;
        };
        let resolution = match stored {
            None => RefreshResolution::Revoked,
            Some(stored) if stored.secret == presented.secret => {
                RefreshResolution::Unchanged(stored)
            },
            Some(stored) => RefreshResolution::Rotated(stored),
        };
        Self::Resolved(resolution)
    }

    #[must_use]
    pub fn into_resolution(self) -> Option<RefreshResolution> {
        match self {
            Self::Resolved(resolution) => Some(resolution),
            Self::Presented(_) => None,
        }
    }
}
