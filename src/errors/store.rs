// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for term store backends.

/// Errors raised by a [`TermStore`](crate::store::TermStore) backend.
///
/// Store failures are never treated as cache misses: the resolver propagates
/// them unchanged so the caller can surface a system error.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem I/O failed while reading or writing the backing file.
    #[error("Store I/O error at {path}: {details}")]
    Io {
        /// Path that caused the error
        path: String,
        /// Details about the I/O error
        details: String,
        /// The underlying I/O error, if available
        #[source]
        source: Option<std::io::Error>,
    },

    /// Persisted data could not be encoded or decoded.
    #[error("Serialization error: {details}")]
    Serialization {
        /// Details about the serialization error
        details: String,
        /// The underlying serialization error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A stored entry is present but unusable (bad key or value).
    #[error("Corrupt store entry '{key}': {details}")]
    CorruptEntry {
        /// Raw key of the offending entry
        key: String,
        /// Why the entry was rejected
        details: String,
    },

    /// A backend returned a snapshot that does not cover the requested range.
    #[error("Malformed snapshot: expected {expected} entries starting at {start}, got {actual}")]
    MalformedSnapshot {
        /// First index that was requested
        start: u64,
        /// Number of entries requested
        expected: usize,
        /// Number of entries returned
        actual: usize,
    },

    /// The backend could not be reached or refused the request.
    #[error("{backend} unavailable: {details}")]
    Unavailable {
        /// Backend name (see [`TermStore::name`](crate::store::TermStore::name))
        backend: &'static str,
        /// Details reported by the backend
        details: String,
    },
}

impl StoreError {
    /// Create an `Io` error from a path and an I/O error.
    pub fn io(path: impl Into<String>, details: impl Into<String>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            details: details.into(),
            source: Some(source),
        }
    }

    /// Create a `Serialization` error from any serialization error.
    pub fn serialization(
        details: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        StoreError::Serialization {
            details: details.into(),
            source: Box::new(source),
        }
    }

    /// Create a `CorruptEntry` error.
    pub fn corrupt_entry(key: impl Into<String>, details: impl Into<String>) -> Self {
        StoreError::CorruptEntry {
            key: key.into(),
            details: details.into(),
        }
    }

    /// Create an `Unavailable` error.
    pub fn unavailable(backend: &'static str, details: impl Into<String>) -> Self {
        StoreError::Unavailable {
            backend,
            details: details.into(),
        }
    }

    /// Whether retrying the same operation may succeed.
    ///
    /// I/O and availability failures are transient. Serialization problems,
    /// corrupt entries and malformed snapshots will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::Io { .. } | StoreError::Unavailable { .. } => true,
            StoreError::Serialization { .. }
            | StoreError::CorruptEntry { .. }
            | StoreError::MalformedSnapshot { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let io = StoreError::io(
            "terms.json",
            "write failed",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert!(io.is_retryable());
        assert!(StoreError::unavailable("MemoryStore", "down").is_retryable());
        assert!(!StoreError::corrupt_entry("x", "not an index").is_retryable());
        assert!(!StoreError::MalformedSnapshot {
            start: 0,
            expected: 4,
            actual: 3
        }
        .is_retryable());
    }

    #[test]
    fn test_display_includes_details() {
        let err = StoreError::unavailable("DiskStore", "lock timeout");
        assert_eq!(err.to_string(), "DiskStore unavailable: lock timeout");
    }
}
