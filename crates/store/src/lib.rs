//! Credential store contract and backends for the shared token cache.
//!
//! This crate provides the [`CredentialStore`] trait, the leaf persistence
//! layer underneath the token cache accessor. A store keeps serialized
//! credential records under opaque byte keys and knows nothing about tokens,
//! accounts or matching rules.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Identity client library                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │                       tokencache                            │
//! │     SharedTokenCache: key schema, matcher, refresh chain    │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    tokencache-store                         │
//! │             CredentialStore trait                           │
//! │          (get, put, delete, enumerate)                      │
//! ├──────────────┬──────────────────────────────────────────────┤
//! │ MemoryStore  │  FileStore  │  platform keychain (external)  │
//! └──────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use tokencache_store::{CredentialStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.put(b"refreshtoken|alice|".to_vec(), b"{...}".to_vec()).unwrap();
//!
//! let records = store.enumerate(b"refreshtoken|").unwrap();
//! assert_eq!(records.len(), 1);
//! ```
//!
//! # Available Stores
//!
//! | Store | Use Case | Persistence |
//! |-------|----------|-------------|
//! | [`MemoryStore`] | Testing, single-process sharing | No |
//! | [`FileStore`] | Durable sharing through a directory | Yes |
//!
//! # Feature Flags
//!
//! - **`testutil`**: Enables the `testutil` module (key generators,
//!   [`FlakyStore`](testutil::FlakyStore), assertion macros).
//! - **`failpoints`**: Compiles the `fail` fail points inside [`MemoryStore`].

#![deny(unsafe_code)]

pub mod conformance;
pub mod error;
pub mod file;
pub mod memory;
pub mod size_limits;
pub mod store;
#[cfg(any(test, feature = "testutil"))]
#[allow(clippy::expect_used, clippy::panic)]
pub mod testutil;
pub mod types;

pub use error::{BoxError, ConfigError, StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use size_limits::{DEFAULT_MAX_KEY_SIZE, DEFAULT_MAX_RECORD_SIZE, SizeLimits};
pub use store::CredentialStore;
pub use types::KeyValue;
