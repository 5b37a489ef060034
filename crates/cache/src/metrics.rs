//! Lock-free counters for cache accessor activity.
//!
//! ```
//! use tokencache::{CacheErrorKind, CacheMetrics};
//!
//! let metrics = CacheMetrics::new();
//! metrics.record_hit();
//! metrics.record_error(CacheErrorKind::StoreRead);
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.hits, 1);
//! assert_eq!(snapshot.error_store_read, 1);
//! ```

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::error::CacheErrorKind;

/// Point-in-time copy of [`CacheMetrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    /// Lookups that returned a credential.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Records written.
    pub saves: u64,
    /// Records deleted.
    pub removals: u64,
    /// Refresh chain resolutions that found a newer token.
    pub rotations_detected: u64,

    // Error counts by category
    pub error_store_read: u64,
    pub error_store_write: u64,
    pub error_malformed_key_input: u64,
    pub error_ambiguous_match: u64,
    pub error_unsupported: u64,
}

impl CacheMetricsSnapshot {
    /// Hit ratio in `0.0..=1.0`, or `0.0` before any lookup.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }

    #[must_use]
    pub fn total_errors(&self) -> u64 {
        self.error_store_read
            + self.error_store_write
            + self.error_malformed_key_input
            + self.error_ambiguous_match
            + self.error_unsupported
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    saves: AtomicU64,
    removals: AtomicU64,
    rotations_detected: AtomicU64,
    error_store_read: AtomicU64,
    error_store_write: AtomicU64,
    error_malformed_key_input: AtomicU64,
    error_ambiguous_match: AtomicU64,
    error_unsupported: AtomicU64,
}

/// Shared activity counters. Clones observe the same counters.
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    inner: Arc<Counters>,
}

impl CacheMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.inner.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.inner.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_save(&self) {
        self.inner.saves.fetch_add(1, Ordering::Relaxed);
    }

    /// Counts `count` deleted records.
    pub fn record_removals(&self, count: u64) {
        self.inner.removals.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_rotation(&self) {
        self.inner.rotations_detected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self, kind: CacheErrorKind) {
        let counter = match kind {
            CacheErrorKind::StoreRead => &self.inner.error_store_read,
            CacheErrorKind::StoreWrite => &self.inner.error_store_write,
            CacheErrorKind::MalformedKeyInput => &self.inner.error_malformed_key_input,
            CacheErrorKind::AmbiguousMatch => &self.inner.error_ambiguous_match,
            CacheErrorKind::Unsupported => &self.inner.error_unsupported,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> CacheMetricsSnapshot {
        let c = &self.inner;
        CacheMetricsSnapshot {
            hits: c.hits.load(Ordering::Relaxed),
            misses: c.misses.load(Ordering::Relaxed),
            saves: c.saves.load(Ordering::Relaxed),
            removals: c.removals.load(Ordering::Relaxed),
            rotations_detected: c.rotations_detected.load(Ordering::Relaxed),
            error_store_read: c.error_store_read.load(Ordering::Relaxed),
            error_store_write: c.error_store_write.load(Ordering::Relaxed),
            error_malformed_key_input: c.error_malformed_key_input.load(Ordering::Relaxed),
            error_ambiguous_match: c.error_ambiguous_match.load(Ordering::Relaxed),
            error_unsupported: c.error_unsupported.load(Ordering::Relaxed),
        }
    }
}
