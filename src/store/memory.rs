// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory term store

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use super::{StoreStats, TermStore};
use crate::errors::StoreError;
use crate::sequence::{Index, SparseSnapshot, Term, TermBatch, TermRange};

/// Internal state for memory store
#[derive(Debug, Default)]
struct MemoryStoreState {
    /// Stored terms by index
    terms: HashMap<Index, Term>,
    /// Store statistics
    stats: StoreStats,
}

/// In-memory term store
///
/// Terms live in a `HashMap` behind an async mutex, so the store is shared safely
/// between concurrent resolutions. Nothing survives the process.
///
/// # Examples
///
/// ```rust
/// use fibcache::MemoryStore;
///
/// // Empty store
/// let store = MemoryStore::new();
///
/// // Store pre-seeded with known terms
/// let store = MemoryStore::from_terms([(18u64, 2584u32), (19, 4181)]);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryStoreState>,
}

impl MemoryStore {
    /// Creates an empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding the given `(index, term)` pairs
    pub fn from_terms<T>(terms: impl IntoIterator<Item = (Index, T)>) -> Self
    where
        T: Into<Term>,
    {
        let terms: HashMap<Index, Term> = terms
            .into_iter()
            .map(|(index, term)| (index, term.into()))
            .collect();
        let stats = StoreStats {
            entries: terms.len(),
            ..Default::default()
        };
        Self {
            state: Mutex::new(MemoryStoreState { terms, stats }),
        }
    }

    /// Returns the stored term at `index`, without touching statistics
    pub async fn get(&self, index: Index) -> Option<Term> {
        self.state.lock().await.terms.get(&index).cloned()
    }
}

#[async_trait]
impl TermStore for MemoryStore {
    async fn fetch_range(&self, range: TermRange) -> Result<SparseSnapshot, StoreError> {
        let mut state = self.state.lock().await;

        let snapshot = SparseSnapshot::collect(range, |index| state.terms.get(&index).cloned());
        state.stats.record_fetch(&snapshot);

        debug!(
            range = %range,
            holes = snapshot.holes(),
            "Fetched range (memory)"
        );
        Ok(snapshot)
    }

    async fn store_terms(&self, batch: &TermBatch) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;

        state
            .terms
            .extend(batch.iter().map(|(key, term)| (key.index(), term.clone())));
        state.stats.record_write(batch);
        state.stats.entries = state.terms.len();

        debug!(count = batch.len(), "Stored terms (memory)");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        debug!(entries = state.terms.len(), "Clearing memory store");
        state.terms.clear();
        state.stats.entries = 0;
        Ok(())
    }

    async fn stats(&self) -> StoreStats {
        let state = self.state.lock().await;
        state.stats.clone()
    }

    fn name(&self) -> &'static str {
        "MemoryStore"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::TermKey;

    fn batch(pairs: &[(Index, u64)]) -> TermBatch {
        pairs
            .iter()
            .map(|&(i, v)| (TermKey::new(i), Term::from(v)))
            .collect()
    }

    fn slots(values: &[Option<u64>]) -> Vec<Option<Term>> {
        values.iter().map(|v| v.map(Term::from)).collect()
    }

    #[tokio::test]
    async fn test_memory_store_basic_operations() {
        let store = MemoryStore::new();
        let range = TermRange::new(0, 3).unwrap();

        // All holes initially
        let snapshot = store.fetch_range(range).await.unwrap();
        assert_eq!(snapshot, SparseSnapshot::empty(range));

        store
            .store_terms(&batch(&[(0, 0), (1, 1), (3, 2)]))
            .await
            .unwrap();

        let snapshot = store.fetch_range(range).await.unwrap();
        assert_eq!(snapshot.slots(), slots(&[Some(0), Some(1), None, Some(2)]));

        let stats = store.stats().await;
        assert_eq!(stats.fetches, 2);
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.holes, 5);
        assert_eq!(stats.entries, 3);
    }

    #[tokio::test]
    async fn test_memory_store_zero_is_not_a_hole() {
        let store = MemoryStore::from_terms([(0u64, 0u32)]);
        let snapshot = store.fetch_range(TermRange::new(0, 0).unwrap()).await.unwrap();
        assert_eq!(snapshot.slots(), slots(&[Some(0)]));
    }

    #[tokio::test]
    async fn test_memory_store_upsert_overwrites() {
        let store = MemoryStore::from_terms([(5u64, 999u32)]);
        store.store_terms(&batch(&[(5, 5)])).await.unwrap();
        assert_eq!(store.get(5).await, Some(Term::from(5u32)));
        assert_eq!(store.stats().await.entries, 1);
    }

    #[tokio::test]
    async fn test_memory_store_clear() {
        let store = MemoryStore::from_terms((0..10).map(|i| (i, i)));
        assert_eq!(store.stats().await.entries, 10);

        store.clear().await.unwrap();

        assert_eq!(store.stats().await.entries, 0);
        assert_eq!(store.get(3).await, None);
    }
}
