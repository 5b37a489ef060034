//! Data model: principals, credential records and normalized key inputs.

mod account;
mod authority;
mod credential;
mod scope;
mod secret;

pub use account::{Account, AccountId};
pub use authority::Authority;
pub use credential::{
    AccessToken, AccountRecord, AdfsToken, Credential, CredentialKind, IdToken, RefreshToken,
};
pub use scope::ScopeSet;
pub use secret::TokenSecret;
