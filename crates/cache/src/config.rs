//! Cache accessor configuration.
//!
//! ```
//! use tokencache::{AccessTokenRanking, CacheConfig};
//!
//! let config = CacheConfig::builder()
//!     .family_id("1")
//!     .access_token_ranking(AccessTokenRanking::MostSpecific)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.adfs_realm(), "adfs");
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tokencache_store::ConfigError;

/// Default client family shared by first-party applications.
pub const DEFAULT_FAMILY_ID: &str = "1";

/// Sentinel realm standing in for the missing tenant of ADFS authorities.
pub const DEFAULT_ADFS_REALM: &str = "adfs";

/// How equally matching access tokens are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessTokenRanking {
    /// Latest `issued_at` first, then fewest scopes.
    #[default]
    LatestIssued,
    /// Fewest scopes first, then latest `issued_at`.
    MostSpecific,
}

/// Optional accessor operations that a cache may enable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    GetAdfsToken,
    SaveAdfsToken,
    SaveIdToken,
    GetIdToken,
    SaveAccount,
    GetAccount,
    GetAllAccounts,
    RemoveAccount,
}

impl Capability {
    /// Every optional operation.
    pub const ALL: [Capability; 8] = [
        Self::GetAdfsToken,
        Self::SaveAdfsToken,
        Self::SaveIdToken,
        Self::GetIdToken,
        Self::SaveAccount,
        Self::GetAccount,
        Self::GetAllAccounts,
        Self::RemoveAccount,
    ];

    /// Accessor method name, as reported in `Unsupported` errors.
    #[must_use]
    pub fn operation(self) -> &'static str {
        match self {
            Self::GetAdfsToken => "get_adfs_token",
            Self::SaveAdfsToken => "save_adfs_token",
            Self::SaveIdToken => "save_id_token",
            Self::GetIdToken => "get_id_token",
            Self::SaveAccount => "save_account",
            Self::GetAccount => "get_account",
            Self::GetAllAccounts => "get_all_accounts",
            Self::RemoveAccount => "remove_account",
        }
    }
}

/// The set of enabled optional operations. Defaults to all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    #[must_use]
    pub fn all() -> Self {
        Self(Capability::ALL.into_iter().collect())
    }

    /// No optional operations; only the required contract is available.
    #[must_use]
    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    #[must_use]
    pub fn with(mut self, capability: Capability) -> Self {
        self.0.insert(capability);
        self
    }

    #[must_use]
    pub fn without(mut self, capability: Capability) -> Self {
        self.0.remove(&capability);
        self
    }

    #[must_use]
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }
}

impl Default for CapabilitySet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Configuration for [`SharedTokenCache`](crate::SharedTokenCache).
///
/// Deserialized configuration must be checked with [`validate`](Self::validate);
/// the builder validates on `build()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    /// Client family this application participates in, `None` to opt out.
    pub(crate) family_id: Option<String>,
    pub(crate) adfs_realm: String,
    pub(crate) access_token_ranking: AccessTokenRanking,
    pub(crate) capabilities: CapabilitySet,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            family_id: Some(DEFAULT_FAMILY_ID.to_owned()),
            adfs_realm: DEFAULT_ADFS_REALM.to_owned(),
            access_token_ranking: AccessTokenRanking::default(),
            capabilities: CapabilitySet::default(),
        }
    }
}

#[bon::bon]
impl CacheConfig {
    /// Creates a validated configuration.
    ///
    /// Leaving `family_id` unset keeps the default family; use
    /// [`without_family`](Self::without_family) to opt out.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] if `family_id` or `adfs_realm` is blank.
    #[builder]
    pub fn new(
        #[builder(into, default = DEFAULT_FAMILY_ID.to_owned())] family_id: String,
        #[builder(into, default = DEFAULT_ADFS_REALM.to_owned())] adfs_realm: String,
        #[builder(default)] access_token_ranking: AccessTokenRanking,
        #[builder(default)] capabilities: CapabilitySet,
    ) -> Result<Self, ConfigError> {
        let config =
            Self { family_id: Some(family_id), adfs_realm, access_token_ranking, capabilities };
        config.validate()?;
        Ok(config)
    }

    /// Returns this configuration with family sharing disabled.
    #[must_use]
    pub fn without_family(mut self) -> Self {
        self.family_id = None;
        self
    }

    /// Checks the constraints the builder enforces.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Empty`] if `family_id` or `adfs_realm` is blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.family_id.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err(ConfigError::Empty { field: "family_id" });
        }
        if self.adfs_realm.trim().is_empty() {
            return Err(ConfigError::Empty { field: "adfs_realm" });
        }
        Ok(())
    }

    #[must_use]
    pub fn family_id(&self) -> Option<&str> {
        self.family_id.as_deref()
    }

    #[must_use]
    pub fn adfs_realm(&self) -> &str {
        &self.adfs_realm
    }

    #[must_use]
    pub fn access_token_ranking(&self) -> AccessTokenRanking {
        self.access_token_ranking
    }

    #[must_use]
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.family_id(), Some("1"));
        assert_eq!(config.adfs_realm(), "adfs");
        assert_eq!(config.access_token_ranking(), AccessTokenRanking::LatestIssued);
        assert!(Capability::ALL.iter().all(|c| config.capabilities().contains(*c)));
        assert_eq!(CacheConfig::builder().build().unwrap(), config);
    }

    #[test]
    fn builder_rejects_blank_values() {
        let err = CacheConfig::builder().family_id(" ").build().unwrap_err();
        assert_eq!(err, ConfigError::Empty { field: "family_id" });

        let err = CacheConfig::builder().adfs_realm("").build().unwrap_err();
        assert_eq!(err, ConfigError::Empty { field: "adfs_realm" });
    }

    #[test]
    fn deserializes_partial_config() {
        let config: CacheConfig = serde_json::from_str(
            r#"{ "family_id": null, "capabilities": ["save_id_token", "get_id_token"] }"#,
        )
        .unwrap();
        config.validate().unwrap();
        assert_eq!(config.family_id(), None);
        assert!(config.capabilities().contains(Capability::GetIdToken));
        assert!(!config.capabilities().contains(Capability::SaveAccount));
        assert_eq!(config.adfs_realm(), "adfs");
    }

    #[test]
    fn deserialize_rejects_unknown_fields() {
        let result = serde_json::from_str::<CacheConfig>(r#"{ "familyid": "1" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn deserialized_blank_realm_fails_validation() {
        let config: CacheConfig = serde_json::from_str(r#"{ "adfs_realm": "  " }"#).unwrap();
        assert_eq!(config.validate(), Err(ConfigError::Empty { field: "adfs_realm" }));
    }

    #[test]
    fn capability_set_edits() {
        let set = CapabilitySet::none().with(Capability::GetAccount);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Capability::GetAccount]);
        let without = CapabilitySet::all().without(Capability::RemoveAccount);
        assert!(!without.contains(Capability::RemoveAccount));
    }
}
