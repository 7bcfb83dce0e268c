//! Span helpers for resolution and request handling.
//!
//! Span tree for one HTTP request:
//!
//! ```text
//! fibcache.sequence_request
//! └── fibcache.resolve_range
//!     ├── fibcache.store_fetch
//!     ├── fibcache.fill_snapshot
//!     └── fibcache.persist_terms
//! ```

pub(crate) mod spans;
