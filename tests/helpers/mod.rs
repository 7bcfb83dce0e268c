// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Test helpers for fibcache integration tests
//!
//! Provides a recording term store so tests can assert on exactly what the
//! resolver read and wrote.

use std::sync::Mutex;

use async_trait::async_trait;
use fibcache::{
    Index, MemoryStore, SparseSnapshot, StoreError, StoreStats, Term, TermBatch, TermRange,
    TermStore,
};

/// Which store operation a failure is injected into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
pub enum FailOn {
    Fetch,
    Store,
}

/// Recording TermStore for testing RangeResolver logic
///
/// Delegates to a [`MemoryStore`] and keeps every fetched range and every written
/// batch. Failures and malformed snapshots can be injected.
///
/// # Example
///
/// ```rust,ignore
/// let spy = Arc::new(SpyStore::with_terms([(18, 2584), (19, 4181)]));
/// let resolver = RangeResolver::new(spy.clone());
///
/// resolver.resolve(TermRange::new(18, 21)?).await?;
/// assert_eq!(spy.batches().len(), 1);
/// ```
#[derive(Default)]
pub struct SpyStore {
    inner: MemoryStore,
    fetches: Mutex<Vec<TermRange>>,
    batches: Mutex<Vec<TermBatch>>,
    failure: Mutex<Option<(FailOn, StoreError)>>,
    truncate_snapshots: bool,
}

#[allow(dead_code)]
impl SpyStore {
    /// Create an empty SpyStore
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a SpyStore already holding the given terms
    pub fn with_terms<T: Into<Term>>(terms: impl IntoIterator<Item = (Index, T)>) -> Self {
        Self {
            inner: MemoryStore::from_terms(terms),
            ..Self::default()
        }
    }

    /// Fail the next call of `on` with `error`
    pub fn fail_next(self, on: FailOn, error: StoreError) -> Self {
        *self.failure.lock().unwrap() = Some((on, error));
        self
    }

    /// Drop the last slot of every snapshot returned
    pub fn truncating(mut self) -> Self {
        self.truncate_snapshots = true;
        self
    }

    /// Ranges passed to `fetch_range`, in call order
    pub fn fetches(&self) -> Vec<TermRange> {
        self.fetches.lock().unwrap().clone()
    }

    /// Batches passed to `store_terms`, in call order
    pub fn batches(&self) -> Vec<TermBatch> {
        self.batches.lock().unwrap().clone()
    }

    /// Current stored value at `index`
    pub async fn stored(&self, index: Index) -> Option<Term> {
        self.inner.get(index).await
    }

    fn take_failure(&self, on: FailOn) -> Option<StoreError> {
        let mut failure = self.failure.lock().unwrap();
        match failure.as_ref() {
            Some((target, _)) if *target == on => failure.take().map(|(_, error)| error),
            _ => None,
        }
    }
}

#[async_trait]
impl TermStore for SpyStore {
    async fn fetch_range(&self, range: TermRange) -> Result<SparseSnapshot, StoreError> {
        self.fetches.lock().unwrap().push(range);
        if let Some(error) = self.take_failure(FailOn::Fetch) {
            return Err(error);
        }

        let snapshot = self.inner.fetch_range(range).await?;
        if self.truncate_snapshots {
            let mut slots = snapshot.slots().to_vec();
            slots.pop();
            return Ok(SparseSnapshot::new(snapshot.start(), slots));
        }
        Ok(snapshot)
    }

    async fn store_terms(&self, batch: &TermBatch) -> Result<(), StoreError> {
        self.batches.lock().unwrap().push(batch.clone());
        if let Some(error) = self.take_failure(FailOn::Store) {
            return Err(error);
        }
        self.inner.store_terms(batch).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.inner.clear().await
    }

    async fn stats(&self) -> StoreStats {
        self.inner.stats().await
    }

    fn name(&self) -> &'static str {
        "SpyStore"
    }
}

/// Reference values computed by plain iteration
#[allow(dead_code)]
pub fn reference_terms(start: Index, end: Index) -> Vec<Term> {
    let (mut a, mut b) = (Term::from(0u32), Term::from(1u32));
    let mut terms = Vec::new();
    for index in 0..=end {
        if index >= start {
            terms.push(a.clone());
        }
        let next = &a + &b;
        a = std::mem::replace(&mut b, next);
    }
    terms
}

/// Terms from small literals
#[allow(dead_code)]
pub fn terms(values: &[u64]) -> Vec<Term> {
    values.iter().copied().map(Term::from).collect()
}

/// Build a batch from `(index, term)` pairs
#[allow(dead_code)]
pub fn batch(pairs: &[(Index, u64)]) -> TermBatch {
    pairs
        .iter()
        .map(|&(index, term)| (fibcache::TermKey::new(index), Term::from(term)))
        .collect()
}
