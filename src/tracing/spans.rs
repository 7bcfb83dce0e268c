//! Span creation helpers for fibcache operations.
//!
//! Telemetry is kept out of business logic: instead of `#[instrument]` attributes,
//! each instrumented operation has a span helper here and attaches it with
//! [`tracing::Instrument`].
//!
//! Usage pattern:
//! ```rust,ignore
//! pub async fn my_operation(&self, range: TermRange) -> Result<T, E> {
//!     async move {
//!         // Business logic here
//!     }
//!     .instrument(spans::my_operation(range))
//!     .await
//! }
//! ```

use tracing::{Level, Span};

use crate::sequence::{Index, TermRange};

/// Create span for resolving a term range.
///
/// Parent: None (root span for this operation, or the HTTP request span)
/// Children: store_fetch, fill_snapshot, persist_terms
#[inline]
pub(crate) fn resolve_range(range: TermRange, store: &'static str) -> Span {
    tracing::span!(
        Level::INFO,
        "fibcache.resolve_range",
        start = range.start(),
        end = range.end(),
        store = store,
    )
}

/// Create span for fetching a sparse snapshot from the store.
///
/// Parent: resolve_range span
#[inline]
pub(crate) fn store_fetch(range: TermRange, store: &'static str) -> Span {
    tracing::debug_span!(
        "fibcache.store_fetch",
        start = range.start(),
        end = range.end(),
        store = store,
    )
}

/// Create span for filling the holes of a snapshot.
///
/// Parent: resolve_range span
#[inline]
pub(crate) fn fill_snapshot(start: Index, len: usize, holes: usize) -> Span {
    tracing::debug_span!(
        "fibcache.fill_snapshot",
        start = start,
        len = len,
        holes = holes,
    )
}

/// Create span for writing newly computed terms back to the store.
///
/// Parent: resolve_range span
#[inline]
pub(crate) fn persist_terms(count: usize, store: &'static str) -> Span {
    tracing::debug_span!("fibcache.persist_terms", count = count, store = store)
}

/// Create span for one HTTP sequence request.
///
/// Parent: None
/// Children: resolve_range span
#[inline]
pub(crate) fn sequence_request(from: Option<&str>, to: Option<&str>) -> Span {
    tracing::span!(
        Level::INFO,
        "fibcache.sequence_request",
        from = from.unwrap_or_default(),
        to = to.unwrap_or_default(),
    )
}
