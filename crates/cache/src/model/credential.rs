//! Credential records and their persisted JSON layout.
//!
//! Every record is persisted as the JSON encoding of [`Credential`], an
//! internally tagged enum:
//!
//! ```json
//! { "credential_type": "refresh_token", "secret": "...", "account_id": "uid@host", ... }
//! ```
//!
//! Records carry the owning account as an [`AccountId`] string only.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokencache_store::StoreError;

use super::{Account, AccountId, Authority, ScopeSet, TokenSecret};

/// The kinds of record the cache holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    AccessToken,
    RefreshToken,
    IdToken,
    Account,
    AdfsToken,
}

impl CredentialKind {
    /// Leading component of every cache key for this kind.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::AccessToken => "accesstoken",
            Self::RefreshToken => "refreshtoken",
            Self::IdToken => "idtoken",
            Self::Account => "account",
            Self::AdfsToken => "adfstoken",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AccessToken => "access token",
            Self::RefreshToken => "refresh token",
            Self::IdToken => "ID token",
            Self::Account => "account",
            Self::AdfsToken => "ADFS token",
        };
        f.write_str(name)
    }
}

/// Short-lived bearer token for one scope set in one realm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct AccessToken {
    #[builder(into)]
    pub secret: TokenSecret,
    pub account_id: AccountId,
    #[builder(into)]
    pub client_id: String,
    pub authority: Authority,
    #[builder(into)]
    pub realm: String,
    pub scopes: ScopeSet,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Resilience window some authorities grant past `expires_at`.
    pub extended_expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Returns `true` if the token is past `expires_at` at `now`.
    ///
    /// Provided for the caller; the cache itself returns expired tokens.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Long-lived token, shared by every client of a family when `family_id` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct RefreshToken {
    #[builder(into)]
    pub secret: TokenSecret,
    pub account_id: AccountId,
    /// Client that obtained the token.
    #[builder(into)]
    pub client_id: String,
    /// Issuing authority; only its environment is key-significant.
    pub authority: Authority,
    #[builder(into)]
    pub family_id: Option<String>,
}

impl RefreshToken {
    #[must_use]
    pub fn is_family_token(&self) -> bool {
        self.family_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct IdToken {
    /// The raw JWT as issued.
    #[builder(into)]
    pub raw: TokenSecret,
    pub account_id: AccountId,
    #[builder(into)]
    pub client_id: String,
    pub authority: Authority,
    #[builder(into)]
    pub realm: String,
}

/// An [`Account`] as cached for one authority and realm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account: Account,
    pub authority: Authority,
    pub realm: String,
}

/// Token from an authority without tenant structure; keyed by client and scopes only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bon::Builder)]
pub struct AdfsToken {
    #[builder(into)]
    pub secret: TokenSecret,
    #[builder(into)]
    pub refresh_secret: Option<TokenSecret>,
    pub account_id: Option<AccountId>,
    #[builder(into)]
    pub client_id: String,
    pub scopes: ScopeSet,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AdfsToken {
    /// Returns `true` if the token is past `expires_at` at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Any record the cache persists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "credential_type", rename_all = "snake_case")]
pub enum Credential {
    AccessToken(AccessToken),
    RefreshToken(RefreshToken),
    IdToken(IdToken),
    Account(AccountRecord),
    AdfsToken(AdfsToken),
}

impl Credential {
    #[must_use]
    pub fn kind(&self) -> CredentialKind {
        match self {
            Self::AccessToken(_) => CredentialKind::AccessToken,
            Self::RefreshToken(_) => CredentialKind::RefreshToken,
            Self::IdToken(_) => CredentialKind::IdToken,
            Self::Account(_) => CredentialKind::Account,
            Self::AdfsToken(_) => CredentialKind::AdfsToken,
        }
    }

    /// Encodes the record for the credential store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Internal`] if serialization fails.
    pub fn encode(&self) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(self)
            .map_err(|e| StoreError::internal(format!("encode {} record: {e}", self.kind())))
    }

    /// Decodes a record read from the credential store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupted`] if the bytes are not a valid record.
    pub fn decode(bytes: &[u8]) -> Result<Self, StoreError> {
        serde_json::from_slice(bytes)
            .map_err(|e| StoreError::corrupted_with_source("undecodable credential record", e))
    }
}

impl From<AccessToken> for Credential {
    fn from(value: AccessToken) -> Self {
        Self::AccessToken(value)
    }
}

impl From<RefreshToken> for Credential {
    fn from(value: RefreshToken) -> Self {
        Self::RefreshToken(value)
    }
}

impl From<IdToken> for Credential {
    fn from(value: IdToken) -> Self {
        Self::IdToken(value)
    }
}

impl From<AccountRecord> for Credential {
    fn from(value: AccountRecord) -> Self {
        Self::Account(value)
    }
}

impl From<AdfsToken> for Credential {
    fn from(value: AdfsToken) -> Self {
        Self::AdfsToken(value)
    }
}
