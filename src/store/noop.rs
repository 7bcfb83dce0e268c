//! No-operation store that disables memoization entirely

use async_trait::async_trait;

use super::{StoreStats, TermStore};
use crate::errors::StoreError;
use crate::sequence::{SparseSnapshot, TermBatch, TermRange};

/// A no-operation store that remembers nothing
///
/// Every fetch returns a snapshot of holes and every write is discarded, so each
/// resolution seeds its first two positions from the formula and recurs the rest.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use fibcache::{NoOpStore, RangeResolver};
///
/// let resolver = RangeResolver::new(Arc::new(NoOpStore));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpStore;

#[async_trait]
impl TermStore for NoOpStore {
    async fn fetch_range(&self, range: TermRange) -> Result<SparseSnapshot, StoreError> {
        Ok(SparseSnapshot::empty(range))
    }

    async fn store_terms(&self, _batch: &TermBatch) -> Result<(), StoreError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn stats(&self) -> StoreStats {
        StoreStats::default()
    }

    fn name(&self) -> &'static str {
        "NoOpStore"
    }
}
