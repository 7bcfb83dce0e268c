// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Memoized range resolution against a sparse term store.
//!
//! [`RangeResolver`] produces every term of a [`TermRange`] by reading whatever the
//! store already knows, filling the holes, and writing the newly computed terms back:
//!
//! 1. **Fetch** a [`SparseSnapshot`] covering the range.
//! 2. **Fill** holes left to right by snapshot position. Positions 0 and 1 are seeded
//!    from [`TermFormula`] at their absolute index; every later hole is the sum of the
//!    two values before it.
//! 3. **Persist** the filled terms in a single batch, skipped when nothing was filled.
//! 4. **Return** the resolved terms in ascending index order.
//!
//! The fill is a strict sequential scan over exact integers and cannot fail, so
//! persisting only starts after every hole in the range is filled. Store errors
//! propagate unchanged; retry policy belongs to the store (see
//! [`RetryingStore`](crate::store::RetryingStore)).
//!
//! # Examples
//!
//! ```rust
//! use fibcache::{RangeResolver, Term, TermRange};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), fibcache::SequenceError> {
//! let resolver = RangeResolver::with_memory_store();
//! let sequence = resolver.resolve(TermRange::new(18, 21)?).await?;
//! let expected: Vec<Term> = [2584u32, 4181, 6765, 10946].map(Term::from).to_vec();
//! assert_eq!(sequence.terms(), expected.as_slice());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, Instrument};

use super::formula::TermFormula;
use super::types::{ResolvedSequence, SparseSnapshot, Term, TermBatch, TermKey, TermRange};
use crate::errors::{SequenceError, StoreError};
use crate::store::{DiskStore, MemoryStore, NoOpStore, TermStore};
use crate::tracing::spans;

/// Counts of how each term of a resolution was obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillStats {
    /// Terms served from the store
    pub cached: usize,
    /// Holes seeded with the closed-form formula (positions 0 and 1 only)
    pub seeded: usize,
    /// Holes filled by the recurrence
    pub recurred: usize,
}

impl FillStats {
    /// Number of terms computed during this resolution.
    pub fn computed(&self) -> usize {
        self.seeded + self.recurred
    }
}

impl fmt::Display for FillStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cached={}, seeded={}, recurred={}",
            self.cached, self.seeded, self.recurred
        )
    }
}

/// Outcome of filling a snapshot: the complete terms plus what must be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilledSnapshot {
    pub terms: Vec<Term>,
    pub batch: TermBatch,
    pub stats: FillStats,
}

/// Fills every hole of `snapshot`, left to right by position.
///
/// Pure: never touches a store. Positions below 2 are seeded from the formula at
/// their absolute index, later positions add the two preceding resolved values.
pub fn fill_snapshot(snapshot: &SparseSnapshot) -> FilledSnapshot {
    let mut terms: Vec<Term> = Vec::with_capacity(snapshot.len());
    let mut batch = TermBatch::new();
    let mut stats = FillStats::default();

    for (pos, (index, slot)) in snapshot.iter().enumerate() {
        let value = match slot {
            Some(value) => {
                stats.cached += 1;
                value.clone()
            }
            None if pos < 2 => {
                stats.seeded += 1;
                let value = TermFormula::term_at(index);
                batch.insert(TermKey::new(index), value.clone());
                value
            }
            None => {
                stats.recurred += 1;
                let value = &terms[pos - 1] + &terms[pos - 2];
                batch.insert(TermKey::new(index), value.clone());
                value
            }
        };
        terms.push(value);
    }

    FilledSnapshot {
        terms,
        batch,
        stats,
    }
}

/// Resolves term ranges through an injected [`TermStore`].
///
/// Stateless apart from the store handle; cheap to clone and share between tasks.
/// Concurrent resolutions of overlapping ranges may both write the same index, which
/// is harmless because the value for an index never changes.
#[derive(Clone)]
pub struct RangeResolver {
    store: Arc<dyn TermStore>,
}

impl fmt::Debug for RangeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RangeResolver")
            .field("store", &self.store.name())
            .finish()
    }
}

impl RangeResolver {
    /// Creates a resolver backed by any store implementation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use fibcache::{MemoryStore, RangeResolver};
    ///
    /// let resolver = RangeResolver::new(Arc::new(MemoryStore::new()));
    /// ```
    pub fn new(store: Arc<dyn TermStore>) -> Self {
        Self { store }
    }

    /// Creates a resolver with an unbounded in-memory store.
    pub fn with_memory_store() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Creates a resolver with a validated disk store at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or is not writable.
    pub fn with_disk_store(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let store = DiskStore::new(path.as_ref()).validate()?;
        Ok(Self::new(Arc::new(store)))
    }

    /// Creates a resolver that computes every term and remembers nothing.
    pub fn without_store() -> Self {
        Self::new(Arc::new(NoOpStore))
    }

    /// The store this resolver reads from and writes to.
    pub fn store(&self) -> &Arc<dyn TermStore> {
        &self.store
    }

    /// Resolves every term of `range`, persisting newly computed terms.
    pub async fn resolve(&self, range: TermRange) -> Result<ResolvedSequence, SequenceError> {
        self.resolve_with_stats(range)
            .await
            .map(|(sequence, _)| sequence)
    }

    /// Like [`resolve`](Self::resolve), also reporting how each term was obtained.
    pub async fn resolve_with_stats(
        &self,
        range: TermRange,
    ) -> Result<(ResolvedSequence, FillStats), SequenceError> {
        let store_name = self.store.name();

        async move {
            let snapshot = self
                .store
                .fetch_range(range)
                .instrument(spans::store_fetch(range, store_name))
                .await?;

            if !snapshot.covers(&range) {
                return Err(StoreError::MalformedSnapshot {
                    start: range.start(),
                    expected: range.len(),
                    actual: snapshot.len(),
                }
                .into());
            }

            let filled = spans::fill_snapshot(range.start(), snapshot.len(), snapshot.holes())
                .in_scope(|| fill_snapshot(&snapshot));

            if filled.batch.is_empty() {
                debug!("Range fully cached, skipping store write");
            } else {
                self.store
                    .store_terms(&filled.batch)
                    .instrument(spans::persist_terms(filled.batch.len(), store_name))
                    .await?;
            }

            info!(stats = %filled.stats, "Resolved term range");
            Ok((ResolvedSequence::new(range, filled.terms), filled.stats))
        }
        .instrument(spans::resolve_range(range, store_name))
        .await
    }
}
