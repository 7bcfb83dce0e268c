// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tower-based retry layer with exponential backoff for term stores.
//!
//! [`RetryLayer`] wraps any [`TermStore`] in a [`RetryingStore`] that retries
//! transient failures (see [`StoreError::is_retryable`]). The resolver itself never
//! retries; the service opts in through the `STORE_RETRY_PROFILE` setting.

use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use tower::Layer;
use tracing::{debug, warn};

use super::{StoreStats, TermStore};
use crate::errors::StoreError;
use crate::sequence::{SparseSnapshot, TermBatch, TermRange};

/// How a [`RetryingStore`] spaces out its attempts.
///
/// Attempt `n` (counting from zero) waits `min(base_delay * 2^n, max_delay)` before
/// the next call. `max_retries` excludes the first call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryConfig {
    /// Three retries from 100ms, capped at 30s
    pub const STANDARD: Self = Self {
        max_retries: 3,
        base_delay: Duration::from_millis(100),
        max_delay: Duration::from_secs(30),
    };

    /// Five quick retries for a local store that recovers fast
    pub const AGGRESSIVE: Self = Self {
        max_retries: 5,
        base_delay: Duration::from_millis(50),
        max_delay: Duration::from_secs(10),
    };

    /// Slow retries for a disk store shared with other processes
    pub const CONSERVATIVE: Self = Self {
        max_retries: 3,
        base_delay: Duration::from_millis(500),
        max_delay: Duration::from_secs(60),
    };

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_delays(mut self, base_delay: Duration, max_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self.max_delay = max_delay;
        self
    }

    /// Delay before retrying after failed attempt `attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// A Tower layer wrapping term stores in a [`RetryingStore`].
///
/// ```rust
/// use fibcache::store::{MemoryStore, RetryConfig, RetryLayer};
/// use tower::Layer;
///
/// let store = RetryLayer::new(RetryConfig::CONSERVATIVE.with_max_retries(5))
///     .layer(MemoryStore::new());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RetryLayer {
    config: Arc<RetryConfig>,
}

impl RetryLayer {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }
}

impl From<RetryConfig> for RetryLayer {
    fn from(config: RetryConfig) -> Self {
        Self::new(config)
    }
}

impl<S> Layer<S> for RetryLayer {
    type Service = RetryingStore<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RetryingStore {
            inner,
            config: self.config.clone(),
        }
    }
}

/// A term store decorator that retries transient failures.
///
/// Fetches and writes are retried; `clear` is passed through once. A batch write
/// is an idempotent upsert, so replaying it after a partial failure is safe.
#[derive(Clone, Debug)]
pub struct RetryingStore<S> {
    inner: S,
    config: Arc<RetryConfig>,
}

impl<S> RetryingStore<S> {
    /// The wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn with_retries<T, F, Fut>(
        &self,
        operation: &'static str,
        mut call: F,
    ) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut attempt = 0u32;
        loop {
            match call().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(operation, attempt, "Store call succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if !error.is_retryable() {
                        debug!(
                            operation,
                            error = %error,
                            "Non-retryable store error, not retrying"
                        );
                        return Err(error);
                    }

                    if attempt >= self.config.max_retries {
                        warn!(
                            operation,
                            error = %error,
                            attempts = attempt + 1,
                            "Max retries exceeded"
                        );
                        return Err(error);
                    }

                    let delay = self.config.backoff(attempt);
                    warn!(
                        operation,
                        error = %error,
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis(),
                        "Retryable store error, backing off"
                    );

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl<S: TermStore> TermStore for RetryingStore<S> {
    async fn fetch_range(&self, range: TermRange) -> Result<SparseSnapshot, StoreError> {
        self.with_retries("fetch_range", || self.inner.fetch_range(range))
            .await
    }

    async fn store_terms(&self, batch: &TermBatch) -> Result<(), StoreError> {
        self.with_retries("store_terms", || self.inner.store_terms(batch))
            .await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.inner.clear().await
    }

    async fn stats(&self) -> StoreStats {
        self.inner.stats().await
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
