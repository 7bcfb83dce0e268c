// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! # fibcache
//!
//! Memoized Fibonacci range resolution over a sparse key-value store.
//!
//! A caller asks for every term of an inclusive index range. The
//! [`RangeResolver`] reads whatever its [`TermStore`](store::TermStore) already
//! knows, fills the holes (closed form for the first two positions of the range,
//! the recurrence after that), writes the new terms back in one batch and returns
//! the full sequence. Terms are [`num_bigint::BigUint`], so any index is exact.
//!
//! ## Main Components
//!
//! - [`TermFormula`]: Closed-form term at a single index
//! - [`RangeResolver`]: Memoizing range resolution
//! - [`store`]: Memory, disk and no-op stores plus a retry decorator
//! - [`RangeRequest`]: Validation of raw range bounds
//! - [`api`]: HTTP endpoints over axum
//!
//! ## Example
//!
//! ```rust
//! use fibcache::{RangeRequest, RangeResolver, Term};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), fibcache::SequenceError> {
//! let resolver = RangeResolver::with_memory_store();
//!
//! let range = RangeRequest::new(Some("0"), Some("6")).validate()?;
//! let sequence = resolver.resolve(range).await?;
//! assert_eq!(sequence.terms(), [0u32, 1, 1, 2, 3, 5, 8].map(Term::from));
//!
//! // Terms are arbitrary precision
//! let range = RangeRequest::new(Some("100"), Some("100")).validate()?;
//! let sequence = resolver.resolve(range).await?;
//! assert_eq!(sequence.terms()[0].to_string(), "354224848179261915075");
//! # Ok(())
//! # }
//! ```
//!
//! ## Running the service
//!
//! The `fibcache` binary reads [`ServiceConfig`] from the environment and serves
//! `GET /fibonacci?from=<start>&to=<end>`.

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod request;
pub mod sequence;
pub mod store;

// Span helpers for instrumented operations
pub(crate) mod tracing;

pub use config::{Environment, RetryProfile, ServiceConfig, ServiceConfigBuilder, StoreBackend};
pub use errors::{ConfigError, ErrorKind, SequenceError, StoreError, ValidationErrors};
pub use request::RangeRequest;
pub use sequence::{
    FillStats, Index, RangeResolver, ResolvedSequence, SparseSnapshot, Term, TermBatch, TermFormula,
    TermKey, TermRange,
};
pub use store::{DiskStore, MemoryStore, NoOpStore, StoreStats, TermStore};
