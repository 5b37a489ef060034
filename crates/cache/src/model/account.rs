//! Principals and their stable identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Authority;
use crate::error::{CacheError, CacheResult};

/// A signed-in principal, as supplied by the account resolver.
///
/// Two accounts are the same principal when their `unique_user_id` (ignoring
/// surrounding whitespace) and canonical `home_authority` match. The username
/// and profile fields are display data and take no part in equality or keys.
/// [`AccountId`] is built from exactly the same two parts, so equal accounts
/// and equal ids always coincide.
#[derive(Debug, Clone, Serialize, Deserialize, bon::Builder)]
pub struct Account {
    /// Directory-unique user identifier (object id plus tenant id, typically).
    #[builder(into)]
    pub unique_user_id: String,
    /// Authority that issued the principal's home identity.
    pub home_authority: Authority,
    /// Sign-in name, for display.
    #[builder(into)]
    pub username: Option<String>,
    /// Tenant-local object id.
    #[builder(into)]
    pub local_account_id: Option<String>,
    /// Home realm (tenant).
    #[builder(into)]
    pub realm: Option<String>,
    /// Full display name.
    #[builder(into)]
    pub name: Option<String>,
    #[builder(into)]
    pub given_name: Option<String>,
    #[builder(into)]
    pub family_name: Option<String>,
}

impl Account {
    /// Derives the stable identifier stored on every credential of this account.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::MalformedKeyInput`] if the unique user id is blank.
    pub fn id(&self) -> CacheResult<AccountId> {
        AccountId::new(&self.unique_user_id, &self.home_authority)
    }

    /// Returns `true` if `other` is the same principal.
    #[must_use]
    pub fn same_principal(&self, other: &Account) -> bool {
        self == other
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.unique_user_id.trim() == other.unique_user_id.trim()
            && self.home_authority == other.home_authority
    }
}

impl Eq for Account {}

/// Weak reference from a credential to its owning account.
///
/// Formatted as `<unique_user_id>@<canonical home authority>`. Records hold this string
/// rather than a copy of the account, so removing an account never has to
/// rewrite its tokens first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Builds the identifier from its parts.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::MalformedKeyInput`] if `unique_user_id` is blank.
    pub fn new(unique_user_id: &str, home_authority: &Authority) -> CacheResult<Self> {
        let uid = unique_user_id.trim();
        if uid.is_empty() {
            return Err(CacheError::malformed("account", "unique user id must not be empty"));
        }
        Ok(Self(format!("{uid}@{home_authority}")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
