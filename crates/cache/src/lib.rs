//! Shared, multi-principal OAuth2/OIDC token cache.
//!
//! Applications that trust each other enough to share credentials on a device
//! use one [`SharedTokenCache`] over a common [`CredentialStore`]. The cache
//! decides which stored credential answers a request; acquiring tokens from
//! the network and judging expiry are left to the caller.
//!
//! # Layers
//!
//! ```text
//! SharedCacheAccessor ── save / get / remove, capability gating, tracing
//!   ├── key      credential identity → store key or enumeration prefix
//!   ├── matcher  candidates → best credential, or AmbiguousMatch
//!   └── chain    presented refresh token → Unchanged | Rotated | Revoked
//! CredentialStore ── get / put / delete / enumerate on opaque keys
//! ```
//!
//! # Consistency
//!
//! Each store operation is atomic per key. Multi-step sequences (read then
//! write, read then delete) are not, so two applications redeeming the same
//! family refresh token race; the loser reconciles with
//! [`get_latest_refresh_token`](SharedCacheAccessor::get_latest_refresh_token).
//!
//! # Records
//!
//! Records are JSON-encoded [`Credential`] values and reference their owner
//! through an [`AccountId`] only. Nothing is ever expired or evicted by the
//! cache.
//!
//! [`CredentialStore`]: tokencache_store::CredentialStore

#![deny(unsafe_code)]

pub mod accessor;
pub mod cache;
pub mod chain;
pub mod config;
pub mod context;
pub mod error;
pub mod key;
pub mod matcher;
pub mod metrics;
pub mod model;
pub mod params;

pub use accessor::SharedCacheAccessor;
pub use cache::{SharedRefreshTokens, SharedTokenCache};
pub use chain::{RefreshChain, RefreshResolution};
pub use config::{AccessTokenRanking, CacheConfig, Capability, CapabilitySet};
pub use context::RequestContext;
pub use error::{CacheError, CacheErrorKind, CacheResult};
pub use key::{CacheKey, KeyParts, KeyPrefix, derive_candidate_keys, derive_key};
pub use metrics::{CacheMetrics, CacheMetricsSnapshot};
pub use model::{
    AccessToken, Account, AccountId, AccountRecord, AdfsToken, Authority, Credential,
    CredentialKind, IdToken, RefreshToken, ScopeSet, TokenSecret,
};
pub use params::RequestParams;
