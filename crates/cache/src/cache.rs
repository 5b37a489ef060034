//! [`SharedTokenCache`]: the accessor over a [`CredentialStore`].

use std::iter::FusedIterator;

use tokencache_store::{CredentialStore, KeyValue};

use crate::{
    accessor::SharedCacheAccessor,
    chain::{RefreshChain, RefreshResolution},
    config::{CacheConfig, Capability, CapabilitySet},
    context::RequestContext,
    error::{CacheError, CacheResult},
    key::{CacheKey, KeyParts, KeyPrefix, derive_candidate_keys, derive_key},
    matcher::{
        AccessTokenRequest, ExactRequest, RefreshMode, RefreshTokenRequest, select_access_token,
        select_adfs_token, select_exact, select_refresh_token,
    },
    metrics::CacheMetrics,
    model::{
        AccessToken, Account, AccountId, AccountRecord, AdfsToken, Authority, Credential,
        CredentialKind, IdToken, RefreshToken,
    },
    params::{RequestParams, normalize_id},
};

/// Decodes one enumerated record, reporting failures as corrupted reads.
fn decode_record(record: &KeyValue) -> CacheResult<Credential> {
    Credential::decode(&record.value).map_err(|e| {
        let key = String::from_utf8_lossy(&record.key).into_owned();
        tracing::warn!(key = %key, error = %e, "undecodable credential record");
        CacheError::store_read(key, e)
    })
}

/// Refresh tokens visible to one client, decoded lazily from a store snapshot.
///
/// Returned by
/// [`get_all_shared_refresh_tokens`](SharedCacheAccessor::get_all_shared_refresh_tokens).
/// A token is visible when the client obtained it or it belongs to the
/// configured family.
#[derive(Debug)]
pub struct SharedRefreshTokens {
    records: std::vec::IntoIter<KeyValue>,
    client_id: String,
    family_id: Option<String>,
}

fn visible_to(client_id: &str, family_id: Option<&str>, token: &RefreshToken) -> bool {
    token.client_id == client_id || (family_id.is_some() && token.family_id.as_deref() == family_id)
}

impl Iterator for SharedRefreshTokens {
    type Item = CacheResult<RefreshToken>;

    fn next(&mut self) -> Option<Self::Item> {
        for record in self.records.by_ref() {
            match decode_record(&record) {
                Ok(Credential::RefreshToken(token))
                    if visible_to(&self.client_id, self.family_id.as_deref(), &token) =>
                {
                    return Some(Ok(token));
                },
                Ok(_) => {},
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.records.len()))
    }
}

impl FusedIterator for SharedRefreshTokens {}

/// Shared token cache over any [`CredentialStore`].
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Utc};
/// use tokencache::{
///     AccessToken, Account, Authority, CacheConfig, RequestContext, RequestParams, ScopeSet,
///     SharedCacheAccessor, SharedTokenCache,
/// };
/// use tokencache_store::MemoryStore;
///
/// let cache = SharedTokenCache::new(MemoryStore::new(), CacheConfig::default()).unwrap();
/// let authority = Authority::parse("https://login.example.com/contoso").unwrap();
/// let account = Account::builder()
///     .unique_user_id("uid.tid")
///     .home_authority(authority.clone())
///     .build();
/// let params = RequestParams::builder()
///     .authority(authority.clone())
///     .client_id("app")
///     .scopes(ScopeSet::parse("user.read"))
///     .build();
/// let ctx = RequestContext::with_correlation_id("req-1");
///
/// let now = Utc::now();
/// let token = AccessToken::builder()
///     .secret("at-secret")
///     .account_id(account.id().unwrap())
///     .client_id("app")
///     .authority(authority)
///     .realm("contoso")
///     .scopes(ScopeSet::parse("user.read mail.read"))
///     .issued_at(now)
///     .expires_at(now + Duration::hours(1))
///     .build();
/// cache.save_access_token(token, &account, &params, &ctx).unwrap();
///
/// let found = cache.get_access_token(&account, &params, &ctx).unwrap().unwrap();
/// assert_eq!(found.secret.expose(), "at-secret");
/// ```
#[derive(Debug)]
pub struct SharedTokenCache<S> {
    store: S,
    config: CacheConfig,
    metrics: CacheMetrics,
}

impl<S: CredentialStore> SharedTokenCache<S> {
    /// Creates a cache over `store`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`](tokencache_store::ConfigError) if `config` is invalid.
    pub fn new(store: S, config: CacheConfig) -> Result<Self, tokencache_store::ConfigError> {
        config.validate()?;
        Ok(Self { store, config, metrics: CacheMetrics::new() })
    }

    /// Replaces the metrics sink, e.g. to share counters between caches.
    #[must_use]
    pub fn with_metrics(mut self, metrics: CacheMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    #[must_use]
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    fn require(&self, capability: Capability) -> CacheResult<()> {
        if self.config.capabilities().contains(capability) {
            Ok(())
        } else {
            Err(CacheError::unsupported(capability.operation()))
        }
    }

    fn track<T>(&self, result: CacheResult<T>) -> CacheResult<T> {
        result.inspect_err(|e| self.metrics.record_error(e.kind()))
    }

    fn track_lookup<T>(
        &self,
        kind: CredentialKind,
        result: CacheResult<Option<T>>,
    ) -> CacheResult<Option<T>> {
        match &result {
            Ok(Some(_)) => {
                self.metrics.record_hit();
                tracing::debug!(%kind, "cache hit");
            },
            Ok(None) => {
                self.metrics.record_miss();
                tracing::debug!(%kind, "cache miss");
            },
            Err(_) => {},
        }
        self.track(result)
    }

    fn read(&self, key: &CacheKey) -> CacheResult<Option<Credential>> {
        let Some(bytes) =
            self.store.get(key.as_bytes()).map_err(|e| CacheError::store_read(key.as_str(), e))?
        else {
            return Ok(None);
        };
        Credential::decode(&bytes).map(Some).map_err(|e| {
            tracing::warn!(key = %key, error = %e, "undecodable credential record");
            CacheError::store_read(key.as_str(), e)
        })
    }

    fn scan(&self, prefix: &KeyPrefix) -> CacheResult<Vec<KeyValue>> {
        self.store
            .enumerate(prefix.as_bytes())
            .map_err(|e| CacheError::store_read(prefix.as_str(), e))
    }

    /// Enumerates `prefix` and decodes every record under it.
    fn scan_decoded(&self, prefix: &KeyPrefix) -> CacheResult<Vec<Credential>> {
        self.scan(prefix)?.iter().map(decode_record).collect()
    }

    fn write(&self, key: CacheKey, credential: &Credential) -> CacheResult<()> {
        let record = credential.encode().map_err(|e| CacheError::store_write(key.as_str(), e))?;
        let display = key.to_string();
        self.store.put(key.into_bytes(), record).map_err(|e| CacheError::store_write(display, e))?;
        self.metrics.record_save();
        Ok(())
    }

    fn remove(&self, key: &[u8]) -> CacheResult<()> {
        self.store
            .delete(key)
            .map_err(|e| CacheError::store_write(String::from_utf8_lossy(key), e))?;
        self.metrics.record_removals(1);
        Ok(())
    }

    /// Store key of a refresh token slot, from normalized client and family ids.
    fn refresh_key(
        account_id: &AccountId,
        client_id: &str,
        family_id: Option<&str>,
        authority: &Authority,
    ) -> CacheResult<CacheKey> {
        derive_key(
            CredentialKind::RefreshToken,
            &KeyParts {
                account: Some(account_id),
                client_id: Some(client_id),
                family_id,
                authority: Some(authority),
                ..KeyParts::default()
            },
        )
    }

    fn read_refresh(
        &self,
        key: &CacheKey,
        request: &RefreshTokenRequest<'_>,
    ) -> CacheResult<Option<RefreshToken>> {
        let candidate = match self.read(key)? {
            Some(Credential::RefreshToken(token)) => Some(token),
            _ => None,
        };
        select_refresh_token(candidate, request)
    }

    /// Reads whatever is stored now in the slot `presented` was keyed under.
    fn current_refresh_token(
        &self,
        account_id: &AccountId,
        presented: &RefreshToken,
    ) -> CacheResult<(CacheKey, Option<RefreshToken>)> {
        let client_id = normalize_id(&presented.client_id);
        let family_id = presented.family_id.as_deref().map(normalize_id);
        let key =
            Self::refresh_key(account_id, &client_id, family_id.as_deref(), &presented.authority)?;
        let mode = match family_id.as_deref() {
            Some(family) => RefreshMode::Family(family),
            None => RefreshMode::Strict(&client_id),
        };
        let request = RefreshTokenRequest {
            account_id,
            environment: presented.authority.environment(),
            mode,
        };
        let current = self.read_refresh(&key, &request)?;
        Ok((key, current))
    }

    fn exact_key(
        kind: CredentialKind,
        account_id: &AccountId,
        client_id: Option<&str>,
        params: &RequestParams,
    ) -> CacheResult<CacheKey> {
        derive_key(
            kind,
            &KeyParts {
                account: Some(account_id),
                client_id,
                authority: Some(params.authority()),
                realm: Some(params.effective_realm()?),
                ..KeyParts::default()
            },
        )
    }

    fn adfs_parts<'a>(&'a self, params: &'a RequestParams) -> KeyParts<'a> {
        KeyParts {
            client_id: Some(params.client_id()),
            realm: Some(self.config.adfs_realm()),
            scopes: Some(params.scopes()),
            ..KeyParts::default()
        }
    }

    fn store_access_token(
        &self,
        mut token: AccessToken,
        account: &Account,
        params: &RequestParams,
    ) -> CacheResult<()> {
        token.account_id = account.id()?;
        params.client_id().clone_into(&mut token.client_id);
        token.authority = params.authority().clone();
        token.realm = params.effective_realm()?.to_owned();
        let key = derive_key(
            CredentialKind::AccessToken,
            &KeyParts {
                account: Some(&token.account_id),
                client_id: Some(&token.client_id),
                authority: Some(&token.authority),
                realm: Some(&token.realm),
                scopes: Some(&token.scopes),
                ..KeyParts::default()
            },
        )?;
        self.write(key, &Credential::AccessToken(token))
    }

    fn find_access_token(
        &self,
        account: &Account,
        params: &RequestParams,
    ) -> CacheResult<Option<AccessToken>> {
        let account_id = account.id()?;
        let realm = params.effective_realm()?;
        let prefixes = derive_candidate_keys(
            CredentialKind::AccessToken,
            &KeyParts {
                account: Some(&account_id),
                client_id: Some(params.client_id()),
                authority: Some(params.authority()),
                realm: Some(realm),
                ..KeyParts::default()
            },
        )?;

        let mut candidates = Vec::new();
        for prefix in &prefixes {
            for credential in self.scan_decoded(prefix)? {
                if let Credential::AccessToken(token) = credential {
                    candidates.push(token);
                }
            }
        }
        let request = AccessTokenRequest {
            account_id: &account_id,
            client_id: params.client_id(),
            authority: params.authority(),
            realm,
            scopes: params.scopes(),
        };
        select_access_token(candidates, &request, self.config.access_token_ranking())
    }

    fn store_refresh_token(&self, account: &Account, mut token: RefreshToken) -> CacheResult<()> {
        token.account_id = account.id()?;
        token.client_id = normalize_id(&token.client_id);
        token.family_id = token.family_id.as_deref().map(normalize_id);
        let key = Self::refresh_key(
            &token.account_id,
            &token.client_id,
            token.family_id.as_deref(),
            &token.authority,
        )?;
        self.write(key, &Credential::RefreshToken(token))
    }

    /// Family slot first (request override, else configured family), then the client slot.
    fn find_shared_refresh_token(
        &self,
        account: &Account,
        params: &RequestParams,
    ) -> CacheResult<Option<RefreshToken>> {
        let account_id = account.id()?;
        let environment = params.authority().environment();
        let family = params.family_id().or(self.config.family_id());

        let mut modes = Vec::with_capacity(2);
        if let Some(family) = family {
            modes.push(RefreshMode::Family(family));
        }
        modes.push(RefreshMode::Strict(params.client_id()));

        for mode in modes {
            let family_id = match mode {
                RefreshMode::Family(family) => Some(family),
                RefreshMode::Strict(_) => None,
            };
            let key = derive_key(
                CredentialKind::RefreshToken,
                &KeyParts {
                    account: Some(&account_id),
                    client_id: Some(params.client_id()),
                    family_id,
                    authority: Some(params.authority()),
                    ..KeyParts::default()
                },
            )?;
            let request = RefreshTokenRequest { account_id: &account_id, environment, mode };
            if let Some(token) = self.read_refresh(&key, &request)? {
                return Ok(Some(token));
            }
        }
        Ok(None)
    }

    fn resolve_chain(
        &self,
        old_token: &RefreshToken,
        account: &Account,
    ) -> CacheResult<RefreshResolution> {
        let account_id = account.id()?;
        let (_, stored) = self.current_refresh_token(&account_id, old_token)?;
        let chain = RefreshChain::present(old_token.clone()).resolve(stored);
        Ok(chain.into_resolution().unwrap_or(RefreshResolution::Revoked))
    }

    fn snapshot_refresh_tokens(&self, client_id: &str) -> CacheResult<SharedRefreshTokens> {
        if client_id.trim().is_empty() {
            return Err(CacheError::malformed("client_id", "must not be empty"));
        }
        let records = self.scan(&KeyPrefix::for_kind(CredentialKind::RefreshToken))?;
        tracing::debug!(count = records.len(), "refresh token snapshot taken");
        Ok(SharedRefreshTokens {
            records: records.into_iter(),
            client_id: normalize_id(client_id),
            family_id: self.config.family_id().map(normalize_id),
        })
    }

    fn delete_refresh_token(&self, account: &Account, token: &RefreshToken) -> CacheResult<()> {
        let account_id = account.id()?;
        match self.current_refresh_token(&account_id, token)? {
            (key, Some(stored)) if stored.secret == token.secret => self.remove(key.as_bytes()),
            (_, Some(_)) => {
                tracing::debug!("stored refresh token was rotated; leaving it in place");
                Ok(())
            },
            (_, None) => Ok(()),
        }
    }

    fn find_adfs_token(&self, params: &RequestParams) -> CacheResult<Option<AdfsToken>> {
        self.require(Capability::GetAdfsToken)?;
        let parts = KeyParts { scopes: None, ..self.adfs_parts(params) };
        let mut candidates = Vec::new();
        for prefix in derive_candidate_keys(CredentialKind::AdfsToken, &parts)? {
            for credential in self.scan_decoded(&prefix)? {
                if let Credential::AdfsToken(token) = credential {
                    candidates.push(token);
                }
            }
        }
        select_adfs_token(
            candidates,
            params.client_id(),
            params.scopes(),
            self.config.access_token_ranking(),
        )
    }

    fn store_adfs_token(
        &self,
        mut token: AdfsToken,
        account: &Account,
        params: &RequestParams,
    ) -> CacheResult<()> {
        self.require(Capability::SaveAdfsToken)?;
        token.account_id = Some(account.id()?);
        params.client_id().clone_into(&mut token.client_id);
        let key = derive_key(
            CredentialKind::AdfsToken,
            &KeyParts { scopes: Some(&token.scopes), ..self.adfs_parts(params) },
        )?;
        self.write(key, &Credential::AdfsToken(token))
    }

    fn store_id_token(
        &self,
        mut token: IdToken,
        account: &Account,
        params: &RequestParams,
    ) -> CacheResult<()> {
        self.require(Capability::SaveIdToken)?;
        token.account_id = account.id()?;
        params.client_id().clone_into(&mut token.client_id);
        token.authority = params.authority().clone();
        token.realm = params.effective_realm()?.to_owned();
        let key = Self::exact_key(
            CredentialKind::IdToken,
            &token.account_id,
            Some(params.client_id()),
            params,
        )?;
        self.write(key, &Credential::IdToken(token))
    }

    fn find_id_token(
        &self,
        account: &Account,
        params: &RequestParams,
    ) -> CacheResult<Option<IdToken>> {
        self.require(Capability::GetIdToken)?;
        let account_id = account.id()?;
        let client_id = Some(params.client_id());
        let key = Self::exact_key(CredentialKind::IdToken, &account_id, client_id, params)?;
        let candidate = match self.read(&key)? {
            Some(Credential::IdToken(token)) => Some(token),
            _ => None,
        };
        let request = ExactRequest {
            account_id: &account_id,
            client_id: Some(params.client_id()),
            authority: params.authority(),
            realm: params.effective_realm()?,
        };
        select_exact(CredentialKind::IdToken, candidate, |t| request.matches_id_token(t))
    }

    fn store_account(&self, account: &Account, params: &RequestParams) -> CacheResult<()> {
        self.require(Capability::SaveAccount)?;
        let account_id = account.id()?;
        let key = Self::exact_key(CredentialKind::Account, &account_id, None, params)?;
        let record = AccountRecord {
            account: account.clone(),
            authority: params.authority().clone(),
            realm: params.effective_realm()?.to_owned(),
        };
        self.write(key, &Credential::Account(record))
    }

    fn find_account(
        &self,
        account: &Account,
        params: &RequestParams,
    ) -> CacheResult<Option<AccountRecord>> {
        self.require(Capability::GetAccount)?;
        let account_id = account.id()?;
        let key = Self::exact_key(CredentialKind::Account, &account_id, None, params)?;
        let candidate = match self.read(&key)? {
            Some(Credential::Account(record)) => Some(record),
            _ => None,
        };
        let request = ExactRequest {
            account_id: &account_id,
            client_id: None,
            authority: params.authority(),
            realm: params.effective_realm()?,
        };
        select_exact(CredentialKind::Account, candidate, |r| request.matches_account(r))
    }

    /// Distinct principals, in key order of their first record.
    fn list_accounts(&self) -> CacheResult<Vec<Account>> {
        self.require(Capability::GetAllAccounts)?;
        let mut accounts: Vec<Account> = Vec::new();
        for credential in self.scan_decoded(&KeyPrefix::for_kind(CredentialKind::Account))? {
            if let Credential::Account(record) = credential
                && !accounts.contains(&record.account)
            {
                accounts.push(record.account);
            }
        }
        Ok(accounts)
    }

    fn sign_out(&self, account: &Account) -> CacheResult<usize> {
        self.require(Capability::RemoveAccount)?;
        let account_id = account.id()?;
        let parts = KeyParts { account: Some(&account_id), ..KeyParts::default() };

        let mut doomed: Vec<Vec<u8>> = Vec::new();
        for kind in [
            CredentialKind::AccessToken,
            CredentialKind::RefreshToken,
            CredentialKind::IdToken,
            CredentialKind::Account,
        ] {
            for prefix in derive_candidate_keys(kind, &parts)? {
                doomed.extend(self.scan(&prefix)?.into_iter().map(|kv| kv.key.to_vec()));
            }
        }
        // ADFS keys carry no account component.
        for record in self.scan(&KeyPrefix::for_kind(CredentialKind::AdfsToken))? {
            if let Credential::AdfsToken(token) = decode_record(&record)?
                && token.account_id.as_ref() == Some(&account_id)
            {
                doomed.push(record.key.to_vec());
            }
        }

        // Every key gets a delete attempt; failures are reported together.
        let mut removed = 0;
        let mut failures = Vec::new();
        for key in &doomed {
            match self.remove(key) {
                Ok(()) => removed += 1,
                Err(e) => failures.push(e),
            }
        }
        tracing::info!(removed, failed = failures.len(), "account signed out");

        let failed = failures.len();
        match failures.into_iter().next() {
            None => Ok(removed),
            Some(first) => Err(CacheError::partial_removal(removed, failed, first)),
        }
    }
}

impl<S: CredentialStore> SharedCacheAccessor for SharedTokenCache<S> {
    #[tracing::instrument(
        skip_all,
        fields(
            client_id = %params.client_id(),
            authority = %params.authority(),
            correlation_id = context.correlation_id(),
        )
    )]
    fn save_access_token(
        &self,
        token: AccessToken,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<()> {
        self.track(self.store_access_token(token, account, params))
    }

    #[tracing::instrument(
        skip_all,
        fields(
            client_id = %params.client_id(),
            scopes = %params.scopes(),
            correlation_id = context.correlation_id(),
        )
    )]
    fn get_access_token(
        &self,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<Option<AccessToken>> {
        self.track_lookup(CredentialKind::AccessToken, self.find_access_token(account, params))
    }

    #[tracing::instrument(
        skip_all,
        fields(
            client_id = %token.client_id,
            family_id = token.family_id.as_deref(),
            correlation_id = context.correlation_id(),
        )
    )]
    fn save_shared_refresh_token(
        &self,
        account: &Account,
        token: RefreshToken,
        context: &RequestContext,
    ) -> CacheResult<()> {
        self.track(self.store_refresh_token(account, token))
    }

    #[tracing::instrument(
        skip_all,
        fields(client_id = %params.client_id(), correlation_id = context.correlation_id())
    )]
    fn get_shared_refresh_token(
        &self,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<Option<RefreshToken>> {
        self.track_lookup(
            CredentialKind::RefreshToken,
            self.find_shared_refresh_token(account, params),
        )
    }

    #[tracing::instrument(
        skip_all,
        fields(client_id = %old_token.client_id, correlation_id = context.correlation_id())
    )]
    fn resolve_refresh_chain(
        &self,
        old_token: &RefreshToken,
        account: &Account,
        context: &RequestContext,
    ) -> CacheResult<RefreshResolution> {
        let result = self.resolve_chain(old_token, account);
        match &result {
            Ok(RefreshResolution::Rotated(_)) => {
                self.metrics.record_rotation();
                tracing::info!("refresh token was rotated by another client");
            },
            Ok(RefreshResolution::Revoked) => tracing::debug!("no refresh token stored for slot"),
            _ => {},
        }
        self.track(result)
    }

    #[tracing::instrument(
        skip_all,
        fields(client_id = %client_id, correlation_id = context.correlation_id())
    )]
    fn get_all_shared_refresh_tokens(
        &self,
        client_id: &str,
        context: &RequestContext,
    ) -> CacheResult<SharedRefreshTokens> {
        self.track(self.snapshot_refresh_tokens(client_id))
    }

    #[tracing::instrument(
        skip_all,
        fields(client_id = %token.client_id, correlation_id = context.correlation_id())
    )]
    fn remove_shared_refresh_token(
        &self,
        account: &Account,
        token: &RefreshToken,
        context: &RequestContext,
    ) -> CacheResult<()> {
        self.track(self.delete_refresh_token(account, token))
    }

    fn capabilities(&self) -> CapabilitySet {
        self.config.capabilities().clone()
    }

    #[tracing::instrument(
        skip_all,
        fields(client_id = %params.client_id(), correlation_id = context.correlation_id())
    )]
    fn get_adfs_token(
        &self,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<Option<AdfsToken>> {
        self.track_lookup(CredentialKind::AdfsToken, self.find_adfs_token(params))
    }

    #[tracing::instrument(
        skip_all,
        fields(client_id = %params.client_id(), correlation_id = context.correlation_id())
    )]
    fn save_adfs_token(
        &self,
        token: AdfsToken,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<()> {
        self.track(self.store_adfs_token(token, account, params))
    }

    #[tracing::instrument(
        skip_all,
        fields(client_id = %params.client_id(), correlation_id = context.correlation_id())
    )]
    fn save_id_token(
        &self,
        token: IdToken,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<()> {
        self.track(self.store_id_token(token, account, params))
    }

    #[tracing::instrument(
        skip_all,
        fields(client_id = %params.client_id(), correlation_id = context.correlation_id())
    )]
    fn get_id_token(
        &self,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<Option<IdToken>> {
        self.track_lookup(CredentialKind::IdToken, self.find_id_token(account, params))
    }

    #[tracing::instrument(
        skip_all,
        fields(authority = %params.authority(), correlation_id = context.correlation_id())
    )]
    fn save_account(
        &self,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<()> {
        self.track(self.store_account(account, params))
    }

    #[tracing::instrument(
        skip_all,
        fields(authority = %params.authority(), correlation_id = context.correlation_id())
    )]
    fn get_account(
        &self,
        account: &Account,
        params: &RequestParams,
        context: &RequestContext,
    ) -> CacheResult<Option<AccountRecord>> {
        self.track_lookup(CredentialKind::Account, self.find_account(account, params))
    }

    #[tracing::instrument(skip_all, fields(correlation_id = context.correlation_id()))]
    fn get_all_accounts(&self, context: &RequestContext) -> CacheResult<Vec<Account>> {
        self.track(self.list_accounts())
    }

    #[tracing::instrument(skip_all, fields(correlation_id = context.correlation_id()))]
    fn remove_account(&self, account: &Account, context: &RequestContext) -> CacheResult<usize> {
        self.track(self.sign_out(account))
    }
}
