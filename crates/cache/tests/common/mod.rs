//! Fixtures shared by the accessor integration tests.

#![allow(dead_code, clippy::expect_used)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use tokencache::{
    AccessToken, Account, AdfsToken, Authority, CacheConfig, IdToken, RefreshToken, RequestContext,
    RequestParams, ScopeSet, SharedCacheAccessor, SharedTokenCache,
};
use tokencache_store::{CredentialStore, MemoryStore};

pub const AUTHORITY: &str = "https://login.example.com/contoso";
pub const APP_A: &str = "app-a";
pub const APP_B: &str = "app-b";

pub fn authority() -> Authority {
    Authority::parse(AUTHORITY).expect("fixture authority")
}

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).single().expect("fixture time")
}

pub fn account(uid: &str) -> Account {
    account_at(uid, AUTHORITY)
}

/// Account whose home identity was issued by `home`.
pub fn account_at(uid: &str, home: &str) -> Account {
    Account::builder()
        .unique_user_id(uid)
        .home_authority(Authority::parse(home).expect("fixture home authority"))
        .username(format!("{uid}@example.com"))
        .realm("contoso")
        .build()
}

pub fn alice() -> Account {
    account("alice.tid")
}

pub fn bob() -> Account {
    account("bob.tid")
}

pub fn params(client_id: &str, scopes: &str) -> RequestParams {
    RequestParams::builder()
        .authority(authority())
        .client_id(client_id)
        .scopes(ScopeSet::parse(scopes))
        .build()
}

pub fn ctx() -> RequestContext {
    RequestContext::with_correlation_id("test-correlation").tag("suite", "integration")
}

/// Access token for `account` as a token response would produce it.
pub fn access_token(account: &Account, secret: &str, scopes: &str, minutes: i64) -> AccessToken {
    let issued = epoch() + Duration::minutes(minutes);
    AccessToken::builder()
        .secret(secret)
        .account_id(account.id().expect("fixture account id"))
        .client_id(APP_A)
        .authority(authority())
        .realm("contoso")
        .scopes(ScopeSet::parse(scopes))
        .issued_at(issued)
        .expires_at(issued + Duration::hours(1))
        .build()
}

pub fn refresh_token(
    account: &Account,
    client_id: &str,
    family: Option<&str>,
    secret: &str,
) -> RefreshToken {
    RefreshToken::builder()
        .secret(secret)
        .account_id(account.id().expect("fixture account id"))
        .client_id(client_id)
        .authority(authority())
        .maybe_family_id(family)
        .build()
}

pub fn id_token(account: &Account, raw: &str) -> IdToken {
    IdToken::builder()
        .raw(raw)
        .account_id(account.id().expect("fixture account id"))
        .client_id(APP_A)
        .authority(authority())
        .realm("contoso")
        .build()
}

pub fn adfs_token(secret: &str, scopes: &str, minutes: i64) -> AdfsToken {
    let issued = epoch() + Duration::minutes(minutes);
    AdfsToken::builder()
        .secret(secret)
        .client_id(APP_A)
        .scopes(ScopeSet::parse(scopes))
        .issued_at(issued)
        .expires_at(issued + Duration::hours(1))
        .build()
}

pub fn cache() -> SharedTokenCache<MemoryStore> {
    cache_with(MemoryStore::new(), CacheConfig::default())
}

pub fn cache_with<S: CredentialStore>(store: S, config: CacheConfig) -> SharedTokenCache<S> {
    SharedTokenCache::new(store, config).expect("valid config")
}

/// Saves an `APP_A` access token for `account` granted `scopes`.
pub fn save_access<S: CredentialStore>(
    cache: &SharedTokenCache<S>,
    account: &Account,
    secret: &str,
    scopes: &str,
    minutes: i64,
) {
    let token = access_token(account, secret, scopes, minutes);
    cache
        .save_access_token(token, account, &params(APP_A, scopes), &ctx())
        .expect("save access token");
}

/// Saves a refresh token for `account` obtained by `client_id`.
pub fn save_refresh<S: CredentialStore>(
    cache: &SharedTokenCache<S>,
    account: &Account,
    client_id: &str,
    family: Option<&str>,
    secret: &str,
) -> RefreshToken {
    let token = refresh_token(account, client_id, family, secret);
    cache
        .save_shared_refresh_token(account, token.clone(), &ctx())
        .expect("save refresh token");
    token
}
