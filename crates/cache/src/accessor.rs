//! The shared cache accessor contract.
//!
//! [`SharedCacheAccessor`] is what an identity client library talks to.
//! The required operations cover access and refresh tokens. The optional
//! ones (ADFS tokens, ID tokens, account records) default to
//! [`CacheError::Unsupported`] and are advertised through
//! [`capabilities`](SharedCacheAccessor::capabilities).
//!
//! Every operation takes a [`RequestContext`], which is recorded on tracing
//! spans and otherwise ignored.

use crate::{
    cache::SharedRefreshTokens,
    chain::RefreshResolution,
    config::{Capability, CapabilitySet},
    context::RequestContext,
    error::{CacheError, CacheResult},
    model::{AccessToken, Account, AccountRecord, AdfsToken, IdToken, RefreshToken},
    params::RequestParams,
};

fn unsupported<T>(capability: Capability) -> CacheResult<T> {
    Err(CacheError::unsupported(capability.operation()))
}

/// Save, lookup and removal of cached credentials shared between applications.
///
/// Implementations are synchronous and safe to share across threads. Single
/// store operations are atomic per key; sequences of them are not.
pub trait SharedCacheAccessor: Send + Sync {
    /// Stores an access token for `account`, overwriting an entry with the same key.
    ///
    /// The token's account, client, authority and realm are taken from
    /// `account` and `params`; its scopes are kept.
    ///
    /// # Errors
    ///
    /// [`CacheError::StoreWrite`] if persisting fails, or
    /// [`CacheError::MalformedKeyInput`] if a key input is invalid.
    fn save_access_token(
        &self,
        token: AccessToken,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<()>;

    /// Finds the best access token whose scopes cover `params.scopes()`.
    ///
    /// Expired tokens are returned; expiry is for the caller to judge.
    ///
    /// # Errors
    ///
    /// [`CacheError::StoreRead`] on store failure or corruption, and
    /// [`CacheError::AmbiguousMatch`] when the best candidates conflict.
    fn get_access_token(
        &self,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<Option<AccessToken>>;

    /// Stores a refresh token in its family slot, or its client slot when it
    /// has no family.
    ///
    /// # Errors
    ///
    /// [`CacheError::StoreWrite`] if persisting fails.
    fn save_shared_refresh_token(
        &self,
        account: &Account,
        token: RefreshToken,
        context: &RequestContext,
    ) -> CacheResult<()>;

    /// Finds the refresh token usable by `params.client_id()`: the family token
    /// first, then the client's own token.
    ///
    /// # Errors
    ///
    /// [`CacheError::StoreRead`] on store failure or corruption.
    fn get_shared_refresh_token(
        &self,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<Option<RefreshToken>>;

    /// Resolves `old_token` against what is stored for its slot now.
    ///
    /// # Errors
    ///
    /// [`CacheError::StoreRead`] on store failure or corruption.
    fn resolve_refresh_chain(
        &self,
        old_token: &RefreshToken,
        account: &Account,
        context: &RequestContext,
    ) -> CacheResult<RefreshResolution>;

    /// Returns the token currently stored in `old_token`'s slot, which may be
    /// `old_token` itself, or `None` if the slot is empty.
    ///
    /// # Errors
    ///
    /// [`CacheError::StoreRead`] on store failure or corruption.
    fn get_latest_refresh_token(
        &self,
        old_token: &RefreshToken,
        account: &Account,
        context: &RequestContext,
    ) -> CacheResult<Option<RefreshToken>> {
        self.resolve_refresh_chain(old_token, account, context).map(RefreshResolution::into_current)
    }

    /// Lists every refresh token visible to `client_id` across all accounts.
    ///
    /// The store is read once when this is called; records are decoded as the
    /// iterator advances.
    ///
    /// # Errors
    ///
    /// [`CacheError::StoreRead`] if the snapshot cannot be taken. Records that
    /// fail to decode surface as `Err` items.
    fn get_all_shared_refresh_tokens(
        &self,
        client_id: &str,
        context: &RequestContext,
    ) -> CacheResult<SharedRefreshTokens>;

    /// Deletes `token` if it is still the one stored in its slot.
    ///
    /// An empty slot, or one holding a different (rotated) token, is left
    /// alone and reported as success.
    ///
    /// # Errors
    ///
    /// [`CacheError::StoreRead`] or [`CacheError::StoreWrite`] on store failure.
    fn remove_shared_refresh_token(
        &self,
        account: &Account,
        token: &RefreshToken,
        context: &RequestContext,
    ) -> CacheResult<()>;

    /// The optional operations this accessor supports.
    fn capabilities(&self) -> CapabilitySet;

    /// Finds an ADFS token for `params.client_id()` covering `params.scopes()`.
    ///
    /// # Errors
    ///
    /// [`CacheError::Unsupported`] unless [`Capability::GetAdfsToken`] is enabled.
    fn get_adfs_token(
        &self,
        _params: &RequestParams,
        _context: &RequestContext,
    ) -> CacheResult<Option<AdfsToken>> {
        unsupported(Capability::GetAdfsToken)
    }

    /// Stores an ADFS token, keyed by client and scopes only.
    ///
    /// # Errors
    ///
    /// [`CacheError::Unsupported`] unless [`Capability::SaveAdfsToken`] is enabled.
    fn save_adfs_token(
        &self,
        _token: AdfsToken,
        _account: &Account,
        _params: &RequestParams,
        _context: &RequestContext,
    ) -> CacheResult<()> {
        unsupported(Capability::SaveAdfsToken)
    }

    /// # Errors
    ///
    /// [`CacheError::Unsupported`] unless [`Capability::SaveIdToken`] is enabled.
    fn save_id_token(
        &self,
        _token: IdToken,
        _account: &Account,
        _params: &RequestParams,
        _context: &RequestContext,
    ) -> CacheResult<()> {
        unsupported(Capability::SaveIdToken)
    }

    /// # Errors
    ///
    /// [`CacheError::Unsupported`] unless [`Capability::GetIdToken`] is enabled.
    fn get_id_token(
        &self,
        _account: &Account,
        _params: &RequestParams,
        _context: &RequestContext,
    ) -> CacheResult<Option<IdToken>> {
        unsupported(Capability::GetIdToken)
    }

    /// Stores the account record for `params.authority()` and realm.
    ///
    /// # Errors
    ///
    /// [`CacheError::Unsupported`] unless [`Capability::SaveAccount`] is enabled.
    fn save_account(
        &self,
        _account: &Account,
        _params: &RequestParams,
        _context: &RequestContext,
    ) -> CacheResult<()> {
        unsupported(Capability::SaveAccount)
    }

    /// # Errors
    ///
    /// [`CacheError::Unsupported`] unless [`Capability::GetAccount`] is enabled.
    fn get_account(
        &self,
        _account: &Account,
        _params: &RequestParams,
        _context: &RequestContext,
    ) -> CacheResult<Option<AccountRecord>> {
        unsupported(Capability::GetAccount)
    }

    /// Every distinct principal with a cached account record.
    ///
    /// # Errors
    ///
    /// [`CacheError::Unsupported`] unless [`Capability::GetAllAccounts`] is enabled.
    fn get_all_accounts(&self, _context: &RequestContext) -> CacheResult<Vec<Account>> {
        unsupported(Capability::GetAllAccounts)
    }

    /// Signs `account` out: deletes its access, refresh and ID tokens, ADFS
    /// tokens and account records. Returns the number of records removed.
    ///
    /// # Errors
    ///
    /// [`CacheError::Unsupported`] unless [`Capability::RemoveAccount`] is enabled,
    /// [`CacheError::StoreRead`] if the records cannot be listed, and
    /// [`CacheError::PartialRemoval`] if some deletes failed; every record is
    /// still attempted and the error carries how many were removed.
    fn remove_account(&self, _account: &Account, _context: &RequestContext) -> CacheResult<usize> {
        unsupported(Capability::RemoveAccount)
    }
}

impl<A: SharedCacheAccessor + ?Sized> SharedCacheAccessor for std::sync::Arc<A> {
    fn save_access_token(
        &self,
        token: AccessToken,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<()> {
        (**self).save_access_token(token, account, params, context)
    }

    fn get_access_token(
        &self,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<Option<AccessToken>> {
        (**self).get_access_token(account, params, context)
    }

    fn save_shared_refresh_token(
        &self,
        account: &Account,
        token: RefreshToken,
        context: &RequestContext,
    ) -> CacheResult<()> {
        (**self).save_shared_refresh_token(account, token, context)
    }

    fn get_shared_refresh_token(
        &self,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<Option<RefreshToken>> {
        (**self).get_shared_refresh_token(account, params, context)
    }

    fn resolve_refresh_chain(
        &self,
        old_token: &RefreshToken,
        account: &Account,
        context: &RequestContext,
    ) -> CacheResult<RefreshResolution> {
        (**self).resolve_refresh_chain(old_token, account, context)
    }

    fn get_latest_refresh_token(
        &self,
        old_token: &RefreshToken,
        account: &Account,
        context: &RequestContext,
    ) -> CacheResult<Option<RefreshToken>> {
        (**self).get_latest_refresh_token(old_token, account, context)
    }

    fn get_all_shared_refresh_tokens(
        &self,
        client_id: &str,
        context: &RequestContext,
    ) -> CacheResult<SharedRefreshTokens> {
        (**self).get_all_shared_refresh_tokens(client_id, context)
    }

    fn remove_shared_refresh_token(
        &self,
        account: &Account,
        token: &RefreshToken,
        context: &RequestContext,
    ) -> CacheResult<()> {
        (**self).remove_shared_refresh_token(account, token, context)
    }

    fn capabilities(&self) -> CapabilitySet {
        (**self).capabilities()
    }

    fn get_adfs_token(
        &self,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<Option<AdfsToken>> {
        (**self).get_adfs_token(params, context)
    }

    fn save_adfs_token(
        &self,
        token: AdfsToken,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<()> {
        (**self).save_adfs_token(token, account, params, context)
    }

    fn save_id_token(
        &self,
        token: IdToken,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<()> {
        (**self).save_id_token(token, account, params, context)
    }

    fn get_id_token(
        &self,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<Option<IdToken>> {
        (**self).get_id_token(account, params, context)
    }

    fn save_account(
        &self,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<()> {
        (**self).save_account(account, params, context)
    }

    fn get_account(
        &self,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<Option<AccountRecord>> {
        (**self).get_account(account, params, context)
    }

    fn get_all_accounts(&self, context: &RequestContext) -> CacheResult<Vec<Account>> {
        (**self).get_all_accounts(context)
    }

    fn remove_account(&self, account: &Account, context: &RequestContext) -> CacheResult<usize> {
        (**self).remove_account(account, context)
    }
}
