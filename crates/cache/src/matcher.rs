//! Candidate selection.
//!
//! The key schema narrows a lookup to candidates under a prefix; the matcher
//! decides which of them satisfies the request. No match is `Ok(None)`.
//! Ties on issue time and scope breadth fall back to the scope sets
//! themselves, so only candidates granted the same scopes can tie. Tied
//! candidates that disagree on the secret are an
//! [`AmbiguousMatch`](CacheError::AmbiguousMatch); identical duplicates are
//! collapsed.

use std::cmp::{Ordering, Reverse};

use chrono::{DateTime, Utc};

use crate::{
    config::AccessTokenRanking,
    error::{CacheError, CacheResult},
    model::{
        AccessToken, AccountId, AccountRecord, AdfsToken, Authority, CredentialKind, IdToken,
        RefreshToken, ScopeSet, TokenSecret,
    },
};

/// An access token lookup.
#[derive(Debug, Clone, Copy)]
pub struct AccessTokenRequest<'a> {
    pub account_id: &'a AccountId,
    pub client_id: &'a str,
    pub authority: &'a Authority,
    pub realm: &'a str,
    pub scopes: &'a ScopeSet,
}

impl AccessTokenRequest<'_> {
    /// Identity fields equal and granted scopes cover the requested ones.
    #[must_use]
    pub fn matches(&self, token: &AccessToken) -> bool {
        &token.account_id == self.account_id
            && token.client_id == self.client_id
            && &token.authority == self.authority
            && token.realm == self.realm
            && token.scopes.is_superset(self.scopes)
    }
}

/// Which refresh token slot a lookup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode<'a> {
    /// Any client of the family; the client id is ignored.
    Family(&'a str),
    /// Only a non-family token obtained by exactly this client.
    Strict(&'a str),
}

/// A refresh token lookup.
#[derive(Debug, Clone, Copy)]
pub struct RefreshTokenRequest<'a> {
    pub account_id: &'a AccountId,
    /// Authority environment; refresh tokens are shared across its realms.
    pub environment: &'a str,
    pub mode: RefreshMode<'a>,
}

impl RefreshTokenRequest<'_> {
    #[must_use]
    pub fn matches(&self, token: &RefreshToken) -> bool {
        if &token.account_id != self.account_id || token.authority.environment() != self.environment
        {
            return false;
        }
        match self.mode {
            RefreshMode::Family(family) => token.family_id.as_deref() == Some(family),
            RefreshMode::Strict(client) => token.family_id.is_none() && token.client_id == client,
        }
    }
}

/// An ID token or account record lookup.
#[derive(Debug, Clone, Copy)]
pub struct ExactRequest<'a> {
    pub account_id: &'a AccountId,
    /// Required for ID tokens, `None` for account records.
    pub client_id: Option<&'a str>,
    pub authority: &'a Authority,
    pub realm: &'a str,
}

impl ExactRequest<'_> {
    #[must_use]
    pub fn matches_id_token(&self, token: &IdToken) -> bool {
        &token.account_id == self.account_id
            && Some(token.client_id.as_str()) == self.client_id
            && &token.authority == self.authority
            && token.realm == self.realm
    }

    #[must_use]
    pub fn matches_account(&self, record: &AccountRecord) -> bool {
        record.account.id().is_ok_and(|id| &id == self.account_id)
            && &record.authority == self.authority
            && record.realm == self.realm
    }
}

/// Tokens ranked by issue time and scope breadth.
trait Ranked {
    fn secret(&self) -> &TokenSecret;
    fn issued_at(&self) -> DateTime<Utc>;
    fn scopes(&self) -> &ScopeSet;
}

impl Ranked for AccessToken {
    fn secret(&self) -> &TokenSecret {
        &self.secret
    }

    fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }
}

impl Ranked for AdfsToken {
    fn secret(&self) -> &TokenSecret {
        &self.secret
    }

    fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }
}

/// Total order over candidates; only equal scope sets compare equal.
fn compare<T: Ranked>(a: &T, b: &T, ranking: AccessTokenRanking) -> Ordering {
    let latest = |t: &T| Reverse(t.issued_at());
    let ranked = match ranking {
        AccessTokenRanking::LatestIssued => {
            (latest(a), a.scopes().len()).cmp(&(latest(b), b.scopes().len()))
        },
        AccessTokenRanking::MostSpecific => {
            (a.scopes().len(), latest(a)).cmp(&(b.scopes().len(), latest(b)))
        },
    };
    ranked.then_with(|| a.scopes().cmp(b.scopes()))
}

fn select_ranked<T: Ranked>(
    kind: CredentialKind,
    mut matching: Vec<T>,
    ranking: AccessTokenRanking,
) -> CacheResult<Option<T>> {
    matching.sort_by(|a, b| compare(a, b, ranking));
    let mut iter = matching.into_iter();
    let Some(best) = iter.next() else {
        return Ok(None);
    };

    let mut conflicting: Vec<T> = Vec::new();
    for other in iter.take_while(|t| compare(t, &best, ranking) == Ordering::Equal) {
        if other.secret() != best.secret()
            && !conflicting.iter().any(|c| c.secret() == other.secret())
        {
            conflicting.push(other);
        }
    }
    if !conflicting.is_empty() {
        return Err(CacheError::AmbiguousMatch { kind, count: conflicting.len() + 1 });
    }
    Ok(Some(best))
}

/// Picks the best access token for `request` under `ranking`.
///
/// # Errors
///
/// Returns [`CacheError::AmbiguousMatch`] if the top-ranked candidates have
/// different secrets.
pub fn select_access_token(
    candidates: impl IntoIterator<Item = AccessToken>,
    request: &AccessTokenRequest<'_>,
    ranking: AccessTokenRanking,
) -> CacheResult<Option<AccessToken>> {
    let matching = candidates.into_iter().filter(|t| request.matches(t)).collect();
    select_ranked(CredentialKind::AccessToken, matching, ranking)
}

/// Picks the best ADFS token for `client_id` covering `scopes`.
///
/// # Errors
///
/// Returns [`CacheError::AmbiguousMatch`] if the top-ranked candidates have
/// different secrets.
pub fn select_adfs_token(
    candidates: impl IntoIterator<Item = AdfsToken>,
    client_id: &str,
    scopes: &ScopeSet,
    ranking: AccessTokenRanking,
) -> CacheResult<Option<AdfsToken>> {
    let matching = candidates
        .into_iter()
        .filter(|t| t.client_id == client_id && t.scopes.is_superset(scopes))
        .collect();
    select_ranked(CredentialKind::AdfsToken, matching, ranking)
}

/// Selects the single candidate satisfying `predicate`.
///
/// # Errors
///
/// Returns [`CacheError::AmbiguousMatch`] if more than one distinct
/// candidate satisfies it.
pub fn select_exact<T: PartialEq>(
    kind: CredentialKind,
    candidates: impl IntoIterator<Item = T>,
    predicate: impl Fn(&T) -> bool,
) -> CacheResult<Option<T>> {
    let mut distinct: Vec<T> = Vec::new();
    for candidate in candidates.into_iter().filter(|c| predicate(c)) {
        if !distinct.contains(&candidate) {
            distinct.push(candidate);
        }
    }
    if distinct.len() > 1 {
        return Err(CacheError::AmbiguousMatch { kind, count: distinct.len() });
    }
    Ok(distinct.pop())
}

/// Selects the refresh token for `request`.
///
/// # Errors
///
/// Returns [`CacheError::AmbiguousMatch`] if several different tokens match.
pub fn select_refresh_token(
    candidates: impl IntoIterator<Item = RefreshToken>,
    request: &RefreshTokenRequest<'_>,
) -> CacheResult<Option<RefreshToken>> {
    select_exact(CredentialKind::RefreshToken, candidates, |t| request.matches(t))
}
