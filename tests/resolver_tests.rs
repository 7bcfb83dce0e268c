// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for RangeResolver against recording and persistent stores
//!
//! These tests pin down what the resolver reads from and writes to its store:
//! which positions are seeded from the formula, which come from the recurrence,
//! and when a write is skipped entirely.

mod helpers;

use std::sync::Arc;

use fibcache::{
    DiskStore, ErrorKind, RangeResolver, SequenceError, StoreError, TermFormula, TermRange,
    TermStore,
};
use helpers::{batch, reference_terms, terms, FailOn, SpyStore};
use tempfile::TempDir;

fn range(start: i64, end: i64) -> TermRange {
    TermRange::new(start, end).unwrap()
}

#[tokio::test]
async fn test_empty_store_from_zero() {
    let spy = Arc::new(SpyStore::new());
    let resolver = RangeResolver::new(spy.clone());

    let sequence = resolver.resolve(range(0, 3)).await.unwrap();

    assert_eq!(sequence.terms(), terms(&[0, 1, 1, 2]));
    assert_eq!(spy.fetches(), vec![range(0, 3)]);
    assert_eq!(
        spy.batches(),
        vec![batch(&[(0, 0), (1, 1), (2, 1), (3, 2)])]
    );
}

#[tokio::test]
async fn test_empty_store_mid_sequence() {
    let spy = Arc::new(SpyStore::new());
    let resolver = RangeResolver::new(spy.clone());

    let sequence = resolver.resolve(range(18, 21)).await.unwrap();

    assert_eq!(sequence.terms(), terms(&[2584, 4181, 6765, 10946]));
    assert_eq!(
        spy.batches(),
        vec![batch(&[(18, 2584), (19, 4181), (20, 6765), (21, 10946)])]
    );
}

#[tokio::test]
async fn test_fully_cached_range_skips_write() {
    let spy = Arc::new(SpyStore::with_terms([
        (18, 2584u32),
        (19, 4181),
        (20, 6765),
        (21, 10946),
    ]));
    let resolver = RangeResolver::new(spy.clone());

    let (sequence, stats) = resolver.resolve_with_stats(range(18, 21)).await.unwrap();

    assert_eq!(sequence.terms(), terms(&[2584, 4181, 6765, 10946]));
    assert_eq!(stats.cached, 4);
    assert_eq!(stats.computed(), 0);
    assert!(spy.batches().is_empty(), "No write expected for a warm range");
}

#[tokio::test]
async fn test_cached_head_uses_recurrence_only() {
    let spy = Arc::new(SpyStore::with_terms([(10, 55u32), (11, 89)]));
    let resolver = RangeResolver::new(spy.clone());

    let (sequence, stats) = resolver.resolve_with_stats(range(10, 14)).await.unwrap();

    assert_eq!(sequence.terms(), terms(&[55, 89, 144, 233, 377]));
    assert_eq!(stats.seeded, 0);
    assert_eq!(stats.recurred, 3);
    assert_eq!(
        spy.batches(),
        vec![batch(&[(12, 144), (13, 233), (14, 377)])]
    );
}

#[tokio::test]
async fn test_single_index_range() {
    let spy = Arc::new(SpyStore::new());
    let resolver = RangeResolver::new(spy.clone());

    let sequence = resolver.resolve(TermRange::single(7).unwrap()).await.unwrap();

    assert_eq!(sequence.terms(), terms(&[13]));
    assert_eq!(spy.batches(), vec![batch(&[(7, 13)])]);
}

#[tokio::test]
async fn test_range_across_u64_boundary() {
    let resolver = RangeResolver::with_memory_store();

    let sequence = resolver.resolve(range(90, 100)).await.unwrap();

    assert_eq!(sequence.len(), 11);
    assert_eq!(sequence.terms(), reference_terms(90, 100).as_slice());
    assert_eq!(
        sequence.get(93).map(ToString::to_string).as_deref(),
        Some("12200160415121876738")
    );
    assert_eq!(
        sequence.get(100).map(ToString::to_string).as_deref(),
        Some("354224848179261915075")
    );
}

#[tokio::test]
async fn test_thousandth_terms() {
    let spy = Arc::new(SpyStore::new());
    let resolver = RangeResolver::new(spy.clone());

    let sequence = resolver.resolve(range(1000, 1003)).await.unwrap();

    assert_eq!(sequence.terms(), reference_terms(1000, 1003).as_slice());
    let f1000 = sequence.get(1000).unwrap().to_string();
    assert_eq!(f1000.len(), 209);
    assert!(f1000.starts_with("43466557686937456435"));
    assert_eq!(spy.stored(1003).await.as_ref(), sequence.get(1003));
}

#[tokio::test]
async fn test_large_range_from_zero_is_exact() {
    let resolver = RangeResolver::with_memory_store();

    let sequence = resolver.resolve(range(0, 500)).await.unwrap();

    assert_eq!(sequence.terms(), reference_terms(0, 500).as_slice());
}

#[tokio::test]
async fn test_high_seed_positions_match_formula() {
    // Seeds above the f64 exact limit come from exact doubling
    let resolver = RangeResolver::without_store();

    let sequence = resolver.resolve(range(80, 83)).await.unwrap();

    assert_eq!(sequence.terms(), reference_terms(80, 83).as_slice());
    assert_eq!(sequence.get(80), Some(&TermFormula::term_at(80)));
}

#[tokio::test]
async fn test_overlapping_requests_reuse_cache() {
    let spy = Arc::new(SpyStore::new());
    let resolver = RangeResolver::new(spy.clone());

    resolver.resolve(range(0, 10)).await.unwrap();
    let (sequence, stats) = resolver.resolve_with_stats(range(5, 15)).await.unwrap();

    assert_eq!(sequence.terms(), reference_terms(5, 15).as_slice());
    assert_eq!(stats.cached, 6);
    assert_eq!(stats.recurred, 5);

    let batches = spy.batches();
    assert_eq!(batches.len(), 2);
    let second: Vec<u64> = batches[1].keys().map(|key| key.index()).collect();
    assert_eq!(second, (11..=15).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_fetch_failure_propagates_without_write() {
    let spy = Arc::new(
        SpyStore::new().fail_next(FailOn::Fetch, StoreError::unavailable("SpyStore", "down")),
    );
    let resolver = RangeResolver::new(spy.clone());

    let err = resolver.resolve(range(0, 3)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Store);
    assert!(matches!(
        err,
        SequenceError::Store(StoreError::Unavailable { .. })
    ));
    assert!(spy.batches().is_empty());
}

#[tokio::test]
async fn test_store_failure_propagates() {
    let spy = Arc::new(SpyStore::new().fail_next(
        FailOn::Store,
        StoreError::unavailable("SpyStore", "read-only"),
    ));
    let resolver = RangeResolver::new(spy.clone());

    let err = resolver.resolve(range(3, 6)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store);

    // The failed batch was attempted once and nothing was persisted
    assert_eq!(spy.batches().len(), 1);
    assert_eq!(spy.stored(3).await, None);
}

#[tokio::test]
async fn test_malformed_snapshot_is_rejected() {
    let spy = Arc::new(SpyStore::new().truncating());
    let resolver = RangeResolver::new(spy.clone());

    let err = resolver.resolve(range(0, 4)).await.unwrap_err();

    assert!(matches!(
        err,
        SequenceError::Store(StoreError::MalformedSnapshot {
            start: 0,
            expected: 5,
            actual: 4
        })
    ));
    assert!(spy.batches().is_empty());
}

#[tokio::test]
async fn test_cached_neighbours_are_trusted() {
    // The recurrence builds on whatever the store holds, even wrong values
    let spy = Arc::new(SpyStore::with_terms([(50, 1u32), (51, 1)]));
    let resolver = RangeResolver::new(spy.clone());

    let sequence = resolver.resolve(range(50, 52)).await.unwrap();

    assert_eq!(sequence.terms(), terms(&[1, 1, 2]));
    assert_eq!(spy.batches(), vec![batch(&[(52, 2)])]);
}

#[tokio::test]
async fn test_disk_store_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("terms.json");

    {
        let resolver = RangeResolver::with_disk_store(&path).unwrap();
        resolver.resolve(range(0, 20)).await.unwrap();
    }

    let store = Arc::new(DiskStore::new(&path).validate().unwrap());
    let resolver = RangeResolver::new(store.clone());
    let (sequence, stats) = resolver.resolve_with_stats(range(15, 20)).await.unwrap();

    assert_eq!(sequence.terms(), reference_terms(15, 20).as_slice());
    assert_eq!(stats.cached, 6);
    assert_eq!(store.stats().await.writes, 0);
}

#[tokio::test]
async fn test_concurrent_resolutions_agree() {
    let resolver = RangeResolver::with_memory_store();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let resolver = resolver.clone();
            tokio::spawn(async move { resolver.resolve(range(i * 5, i * 5 + 20)).await })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let start = i as u64 * 5;
        let sequence = handle.await.unwrap().unwrap();
        assert_eq!(sequence.terms(), reference_terms(start, start + 20).as_slice());
    }
}
