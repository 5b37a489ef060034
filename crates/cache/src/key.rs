//! Key schema: deterministic mapping from credential identity to store keys.
//!
//! A key is the credential type tag followed by the key-significant
//! components of that type, each form-urlencoded and terminated by `|`:
//!
//! | Kind | Components |
//! |------|------------|
//! | access token | account, authority, client, realm, scope signature |
//! | refresh token | account, environment, `family:<id>` or `client:<id>` slot |
//! | ID token | account, authority, client, realm |
//! | account | account, authority, realm |
//! | ADFS token | client, sentinel realm, scope signature |
//!
//! Components never contain a raw `|`, so a prefix built from the leading
//! components of a key matches exactly the keys sharing those components.

use std::fmt;

use url::form_urlencoded::byte_serialize;

use crate::{
    error::{CacheError, CacheResult},
    model::{AccountId, Authority, CredentialKind, ScopeSet},
};

/// Component terminator.
pub const SEPARATOR: char = '|';

/// A complete store key for one credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0.into_bytes()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A key prefix used to enumerate candidates; always ends with [`SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPrefix(String);

impl KeyPrefix {
    /// Prefix matching every key of `kind`.
    #[must_use]
    pub fn for_kind(kind: CredentialKind) -> Self {
        Self(format!("{}{SEPARATOR}", kind.tag()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Returns `true` if `key` lies under this prefix.
    #[must_use]
    pub fn matches(&self, key: &[u8]) -> bool {
        key.starts_with(self.0.as_bytes())
    }
}

impl fmt::Display for KeyPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key-significant inputs; which ones a kind uses is listed in the module docs.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyParts<'a> {
    pub account: Option<&'a AccountId>,
    pub client_id: Option<&'a str>,
    pub family_id: Option<&'a str>,
    pub authority: Option<&'a Authority>,
    pub realm: Option<&'a str>,
    pub scopes: Option<&'a ScopeSet>,
}

/// One key component before encoding. `None` means the caller did not supply it.
struct Component {
    field: &'static str,
    value: Option<String>,
}

impl Component {
    fn new(field: &'static str, value: Option<String>) -> Self {
        Self { field, value }
    }
}

/// Inputs arrive normalized (see [`RequestParams`](crate::RequestParams));
/// only blanks are rejected.
fn non_blank(field: &'static str, value: Option<&str>) -> CacheResult<Option<String>> {
    match value {
        Some(v) if v.trim().is_empty() => Err(CacheError::malformed(field, "must not be empty")),
        Some(v) => Ok(Some(v.to_owned())),
        None => Ok(None),
    }
}

/// Refresh token slot: the family wins when both a family and a client are given.
fn refresh_slots(parts: &KeyParts<'_>) -> CacheResult<Vec<Component>> {
    let family = non_blank("family_id", parts.family_id)?.map(|f| format!("family:{f}"));
    let client = non_blank("client_id", parts.client_id)?.map(|c| format!("client:{c}"));
    Ok(match (family, client) {
        (None, None) => vec![Component::new("client_id", None)],
        (family, client) => family
            .into_iter()
            .chain(client)
            .map(|slot| Component::new("client_id", Some(slot)))
            .collect(),
    })
}

/// Returns the component lists for `kind`, one per alternative slot.
fn component_sets(
    kind: CredentialKind,
    parts: &KeyParts<'_>,
) -> CacheResult<Vec<Vec<Component>>> {
    let account = || Component::new("account", parts.account.map(|a| a.as_str().to_owned()));
    let authority =
        || Component::new("authority", parts.authority.map(|a| a.as_str().to_owned()));
    let client = non_blank("client_id", parts.client_id)?;
    let realm = non_blank("realm", parts.realm)?;
    let scopes = || Component::new("scopes", parts.scopes.map(ScopeSet::signature));

    Ok(match kind {
        CredentialKind::AccessToken => vec![vec![
            account(),
            authority(),
            Component::new("client_id", client),
            Component::new("realm", realm),
            scopes(),
        ]],
        CredentialKind::RefreshToken => {
            let environment = parts.authority.map(|a| a.environment().to_owned());
            refresh_slots(parts)?
                .into_iter()
                .map(|slot| {
                    vec![account(), Component::new("authority", environment.clone()), slot]
                })
                .collect()
        },
        CredentialKind::IdToken => vec![vec![
            account(),
            authority(),
            Component::new("client_id", client),
            Component::new("realm", realm),
        ]],
        CredentialKind::Account => {
            vec![vec![account(), authority(), Component::new("realm", realm)]]
        },
        CredentialKind::AdfsToken => vec![vec![
            Component::new("client_id", client),
            Component::new("realm", realm),
            scopes(),
        ]],
    })
}

fn push_component(out: &mut String, value: &str) {
    out.extend(byte_serialize(value.as_bytes()));
    out.push(SEPARATOR);
}

/// Derives the store key for one credential.
///
/// For refresh tokens a `family_id` selects the family slot, otherwise the
/// client slot is used.
///
/// # Errors
///
/// Returns [`CacheError::MalformedKeyInput`] naming the first component
/// that is missing or blank.
pub fn derive_key(kind: CredentialKind, parts: &KeyParts<'_>) -> CacheResult<CacheKey> {
    let sets = component_sets(kind, parts)?;
    let Some(components) = sets.into_iter().next() else {
        return Err(CacheError::malformed("client_id", "required"));
    };

    let mut key = KeyPrefix::for_kind(kind).0;
    for component in components {
        let Some(value) = component.value else {
            return Err(CacheError::malformed(component.field, "required"));
        };
        push_component(&mut key, &value);
    }
    Ok(CacheKey(key))
}

/// Derives the enumeration prefixes for a lookup where only some inputs are known.
///
/// Each prefix holds the leading components that were supplied and stops at
/// the first missing one. Refresh token lookups with both a family and a
/// client yield the family prefix first, then the client prefix.
///
/// # Errors
///
/// Returns [`CacheError::MalformedKeyInput`] if a supplied input is blank.
pub fn derive_candidate_keys(
    kind: CredentialKind,
    parts: &KeyParts<'_>,
) -> CacheResult<Vec<KeyPrefix>> {
    let mut prefixes: Vec<KeyPrefix> = Vec::new();
    for components in component_sets(kind, parts)? {
        let mut prefix = KeyPrefix::for_kind(kind).0;
        for value in components.into_iter().map_while(|c| c.value) {
            push_component(&mut prefix, &value);
        }
        let prefix = KeyPrefix(prefix);
        if !prefixes.contains(&prefix) {
            prefixes.push(prefix);
        }
    }
    Ok(prefixes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn authority(s: &str) -> Authority {
        Authority::parse(s).unwrap()
    }

    fn account(uid: &str) -> AccountId {
        AccountId::new(uid, &authority("https://login.example.com/home")).unwrap()
    }

    const UID: &str = "uid%40https%3A%2F%2Flogin.example.com%2Fhome";

    #[test]
    fn access_token_key_layout() {
        let id = account("uid");
        let auth = authority("https://login.example.com/contoso");
        let scopes = ScopeSet::parse("user.read");
        let key = derive_key(
            CredentialKind::AccessToken,
            &KeyParts {
                account: Some(&id),
                client_id: Some("app"),
                authority: Some(&auth),
                realm: Some("contoso"),
                scopes: Some(&scopes),
                ..KeyParts::default()
            },
        )
        .unwrap();

        let expected = format!(
            "accesstoken|{UID}|https%3A%2F%2Flogin.example.com%2Fcontoso|app|contoso|{}|",
            scopes.signature()
        );
        assert_eq!(key.as_str(), expected);
    }

    #[test]
    fn refresh_token_key_uses_environment_and_slot() {
        let id = account("uid");
        let a = authority("https://login.example.com/tenant-a");
        let b = authority("https://login.example.com/tenant-b");
        let key = |auth: &Authority, family: Option<&str>| {
            derive_key(
                CredentialKind::RefreshToken,
                &KeyParts {
                    account: Some(&id),
                    client_id: Some("app"),
                    family_id: family,
                    authority: Some(auth),
                    ..KeyParts::default()
                },
            )
            .unwrap()
        };

        assert_eq!(key(&a, None), key(&b, None), "realms of one environment share refresh tokens");
        assert_eq!(
            key(&a, None).as_str(),
            format!("refreshtoken|{UID}|login.example.com|client%3Aapp|")
        );
        assert_eq!(
            key(&a, Some("1")).as_str(),
            format!("refreshtoken|{UID}|login.example.com|family%3A1|")
        );
    }

    #[test]
    fn adfs_key_has_no_authority_or_account() {
        let scopes = ScopeSet::parse("openid");
        let key = derive_key(
            CredentialKind::AdfsToken,
            &KeyParts {
                client_id: Some("app"),
                realm: Some("adfs"),
                scopes: Some(&scopes),
                ..KeyParts::default()
            },
        )
        .unwrap();
        assert_eq!(key.as_str(), format!("adfstoken|app|adfs|{}|", scopes.signature()));
    }

    #[test]
    fn missing_component_is_malformed() {
        let id = account("uid");
        let err = derive_key(
            CredentialKind::IdToken,
            &KeyParts { account: Some(&id), client_id: Some("app"), ..KeyParts::default() },
        )
        .unwrap_err();
        assert!(matches!(err, CacheError::MalformedKeyInput { field: "authority", .. }));
    }

    #[test]
    fn blank_client_is_malformed() {
        let err = derive_candidate_keys(
            CredentialKind::RefreshToken,
            &KeyParts { client_id: Some("  "), ..KeyParts::default() },
        )
        .unwrap_err();
        assert!(matches!(err, CacheError::MalformedKeyInput { field: "client_id", .. }));
    }

    #[test]
    fn candidate_prefixes_stop_at_first_missing_component() {
        let id = account("uid");
        let prefixes = derive_candidate_keys(
            CredentialKind::AccessToken,
            &KeyParts { account: Some(&id), client_id: Some("app"), ..KeyParts::default() },
        )
        .unwrap();
        assert_eq!(prefixes, vec![KeyPrefix(format!("accesstoken|{UID}|"))]);

        let all = derive_candidate_keys(CredentialKind::Account, &KeyParts::default()).unwrap();
        assert_eq!(all, vec![KeyPrefix::for_kind(CredentialKind::Account)]);
    }

    #[test]
    fn refresh_candidates_prefer_family() {
        let id = account("uid");
        let auth = authority("https://login.example.com/t");
        let prefixes = derive_candidate_keys(
            CredentialKind::RefreshToken,
            &KeyParts {
                account: Some(&id),
                client_id: Some("app"),
                family_id: Some("1"),
                authority: Some(&auth),
                ..KeyParts::default()
            },
        )
        .unwrap();
        let strs: Vec<&str> = prefixes.iter().map(KeyPrefix::as_str).collect();
        assert_eq!(
            strs,
            vec![
                format!("refreshtoken|{UID}|login.example.com|family%3A1|"),
                format!("refreshtoken|{UID}|login.example.com|client%3Aapp|"),
            ]
        );
    }

    #[test]
    fn full_key_lies_under_its_prefixes() {
        let id = account("uid");
        let auth = authority("https://login.example.com/t");
        let parts = KeyParts {
            account: Some(&id),
            client_id: Some("app"),
            authority: Some(&auth),
            realm: Some("t"),
            ..KeyParts::default()
        };
        let key = derive_key(CredentialKind::IdToken, &parts).unwrap();
        let prefixes =
            derive_candidate_keys(CredentialKind::IdToken, &KeyParts { realm: None, ..parts })
                .unwrap();
        for prefix in prefixes {
            assert!(prefix.matches(key.as_bytes()), "{key} not under {prefix}");
        }
    }

    proptest! {
        /// Same inputs give the same key; a separator inside a component never
        /// lets two different inputs collide.
        #[test]
        fn keys_are_deterministic_and_collision_free(
            client_a in "[a-z|%+ ]{1,10}",
            client_b in "[a-z|%+ ]{1,10}",
            realm in "[a-z|]{1,6}",
        ) {
            let scopes = ScopeSet::default();
            let key = |client: &str| {
                derive_key(
                    CredentialKind::AdfsToken,
                    &KeyParts {
                        client_id: Some(client),
                        realm: Some(realm.as_str()),
                        scopes: Some(&scopes),
                        ..KeyParts::default()
                    },
                )
            };
            prop_assume!(!client_a.trim().is_empty() && !client_b.trim().is_empty());

            let a1 = key(&client_a).unwrap();
            prop_assert_eq!(&a1, &key(&client_a).unwrap());
            if client_a != client_b {
                prop_assert_ne!(a1, key(&client_b).unwrap());
            }
        }
    }
}
