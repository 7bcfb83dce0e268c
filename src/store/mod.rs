// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Term store backends
//!
//! A term store is the memo table behind [`RangeResolver`](crate::RangeResolver):
//! a key-value map from index to term that may have arbitrary holes.
//!
//! - [`MemoryStore`]: In-memory map, lost on exit (default)
//! - [`DiskStore`]: Persistent JSON file with file locking and versioning
//! - [`NoOpStore`]: Remembers nothing; every fetch is all holes
//! - [`RetryingStore`]: Decorator retrying transient failures of another store
//!
//! # Examples
//!
//! ```rust,ignore
//! use fibcache::store::{DiskStore, MemoryStore, RetryConfig, RetryLayer};
//! use fibcache::RangeResolver;
//! use std::sync::Arc;
//! use tower::Layer;
//!
//! // Disk store with retries on transient I/O failures
//! let store = RetryLayer::new(RetryConfig::CONSERVATIVE).layer(DiskStore::new("terms.json").validate()?);
//! let resolver = RangeResolver::new(Arc::new(store));
//!
//! // Memory store
//! let resolver = RangeResolver::new(Arc::new(MemoryStore::new()));
//! ```

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;
use crate::sequence::{SparseSnapshot, TermBatch, TermRange};

mod disk;
mod memory;
mod noop;
mod retry;

pub use disk::DiskStore;
pub use memory::MemoryStore;
pub use noop::NoOpStore;
pub use retry::{RetryConfig, RetryLayer, RetryingStore};

/// Statistics about store usage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of `fetch_range` calls
    pub fetches: u64,
    /// Number of `store_terms` calls
    pub writes: u64,
    /// Fetched positions that held a term
    pub hits: u64,
    /// Fetched positions that were holes
    pub holes: u64,
    /// Total terms written across all batches
    pub terms_written: u64,
    /// Current number of stored terms
    pub entries: usize,
}

impl StoreStats {
    /// Share of fetched positions served from the store, as a percentage (0.0 to 100.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.holes;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Records the outcome of one fetch.
    pub(crate) fn record_fetch(&mut self, snapshot: &SparseSnapshot) {
        let holes = snapshot.holes() as u64;
        self.fetches += 1;
        self.holes += holes;
        self.hits += snapshot.len() as u64 - holes;
    }

    /// Records one written batch.
    pub(crate) fn record_write(&mut self, batch: &TermBatch) {
        self.writes += 1;
        self.terms_written += batch.len() as u64;
    }
}

impl fmt::Display for StoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fetches={}, writes={}, hits={}, holes={}, terms_written={}, entries={}, hit_rate={:.1}%",
            self.fetches,
            self.writes,
            self.hits,
            self.holes,
            self.terms_written,
            self.entries,
            self.hit_rate()
        )
    }
}

/// Trait for term store backends
///
/// # Thread Safety
///
/// Implementations must be thread-safe and support concurrent access. Use interior
/// mutability (e.g., `Mutex`, `RwLock`) as needed.
///
/// # Error Handling
///
/// Unlike a best-effort cache, a failed read or write is reported to the caller.
/// A store must never drop part of a batch silently: either every pair is upserted
/// or an error is returned.
#[async_trait]
pub trait TermStore: Send + Sync {
    /// Returns one slot per index of `range`, ascending, `None` where unknown.
    async fn fetch_range(&self, range: TermRange) -> Result<SparseSnapshot, StoreError>;

    /// Upserts every pair in `batch`.
    async fn store_terms(&self, batch: &TermBatch) -> Result<(), StoreError>;

    /// Removes every stored term.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Returns current store statistics
    async fn stats(&self) -> StoreStats;

    /// Returns a human-readable name for this backend, used in logs and spans
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Term;

    #[test]
    fn test_hit_rate() {
        let stats = StoreStats {
            hits: 3,
            holes: 1,
            ..Default::default()
        };
        assert_eq!(stats.hit_rate(), 75.0);
        assert_eq!(StoreStats::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_record_fetch_counts_holes() {
        let mut stats = StoreStats::default();
        let term = |v: u32| Some(Term::from(v));
        stats.record_fetch(&SparseSnapshot::new(0, vec![term(0), None, None, term(2)]));
        assert_eq!(stats.fetches, 1);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.holes, 2);
    }

    #[test]
    fn test_display() {
        let stats = StoreStats {
            fetches: 2,
            writes: 1,
            hits: 4,
            holes: 4,
            terms_written: 4,
            entries: 4,
        };
        assert_eq!(
            stats.to_string(),
            "fetches=2, writes=1, hits=4, holes=4, terms_written=4, entries=4, hit_rate=50.0%"
        );
    }
}
