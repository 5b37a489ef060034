use crate::{
    error::{CacheError, CacheResult},
    model::{Authority, ScopeSet},
};

/// Normal form of a client or family id: surrounding whitespace removed.
pub(crate) fn normalize_id(value: &str) -> String {
    value.trim().to_owned()
}

/// Normal form of a realm: trimmed and lowercased, like an authority tenant.
pub(crate) fn normalize_realm(value: &str) -> String {
    value.trim().to_lowercase()
}

/// The client-side half of a lookup or save: who is asking, where, for what.
///
/// Inputs are normalized on construction, so keys and records derived from
/// the same params always agree. Blank values survive normalization and are
/// rejected as [`CacheError::MalformedKeyInput`] when a key is derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    authority: Authority,
    client_id: String,
    realm: Option<String>,
    scopes: ScopeSet,
    family_id: Option<String>,
}

#[bon::bon]
impl RequestParams {
    /// Builds normalized params; see the type docs.
    #[builder]
    pub fn new(
        authority: Authority,
        #[builder(into)] client_id: String,
        // Defaults to the authority's tenant segment.
        #[builder(into)] realm: Option<String>,
        #[builder(default)] scopes: ScopeSet,
        // Overrides the configured client family for this request.
        #[builder(into)] family_id: Option<String>,
    ) -> Self {
        Self {
            authority,
            client_id: normalize_id(&client_id),
            realm: realm.as_deref().map(normalize_realm),
            scopes,
            family_id: family_id.as_deref().map(normalize_id),
        }
    }

    #[must_use]
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    #[must_use]
    pub fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }

    #[must_use]
    pub fn family_id(&self) -> Option<&str> {
        self.family_id.as_deref()
    }

    /// The realm key component: the explicit realm, else the authority tenant.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::MalformedKeyInput`] if neither is available.
    pub fn effective_realm(&self) -> CacheResult<&str> {
        self.realm.as_deref().or_else(|| self.authority.tenant()).ok_or_else(|| {
            CacheError::malformed("realm", "no realm given and authority has no tenant")
        })
    }
}
