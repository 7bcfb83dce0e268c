// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for the fibcache library.
//!
//! Errors are split the same way the request pipeline is:
//!
//! - [`ValidationErrors`] - field-level problems with raw request parameters
//! - [`StoreError`] - failures of a [`TermStore`](crate::store::TermStore) backend
//! - [`ConfigError`] - invalid service configuration
//! - [`SequenceError`] - the unified error returned by range construction,
//!   [`TermFormula`](crate::TermFormula) and [`RangeResolver`](crate::RangeResolver)
//!
//! Every [`SequenceError`] has an [`ErrorKind`] so the HTTP layer can map it to a
//! status code without inspecting messages.
//!
//! # Examples
//!
//! ```rust
//! use fibcache::{ErrorKind, SequenceError, TermRange};
//!
//! match TermRange::new(2, 1) {
//!     Err(SequenceError::InvalidArgument { reason }) => {
//!         assert_eq!(reason, "end must be greater than or equal to start");
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//!
//! let err = TermRange::parse("abc", "3").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::TypeMismatch);
//! ```

use std::fmt;

mod config;
mod store;
mod validation;

pub use config::ConfigError;
pub use store::StoreError;
pub use validation::{Check, Field, FieldError, ValidationErrors};

/// Machine-checkable category of a [`SequenceError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller supplied an out-of-domain value (negative bound or inverted range).
    InvalidArgument,
    /// Caller supplied a value that is not an integer.
    TypeMismatch,
    /// The term store failed.
    Store,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::Store => "store",
        }
    }

    /// Returns `true` for kinds caused by the caller's input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ErrorKind::InvalidArgument | ErrorKind::TypeMismatch)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for range resolution.
///
/// `StoreError` and `ValidationErrors` convert into `SequenceError` via `From`, so
/// `?` propagates them without wrapping code.
#[derive(Debug, thiserror::Error)]
pub enum SequenceError {
    /// A range bound or formula order is outside the supported domain.
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// Description such as "start must be positive"
        reason: String,
    },

    /// A range bound could not be interpreted as an integer.
    #[error("Type mismatch: {reason}")]
    TypeMismatch {
        /// Description such as "start must be integer"
        reason: String,
    },

    /// Raw request parameters failed one or more field checks.
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationErrors),

    /// The term store failed to fetch or persist.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl SequenceError {
    /// Create an `InvalidArgument` error with a reason.
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        SequenceError::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create a `TypeMismatch` error with a reason.
    pub fn type_mismatch(reason: impl Into<String>) -> Self {
        SequenceError::TypeMismatch {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SequenceError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            SequenceError::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            SequenceError::Validation(errors) if errors.has_type_errors() => {
                ErrorKind::TypeMismatch
            }
            SequenceError::Validation(_) => ErrorKind::InvalidArgument,
            SequenceError::Store(_) => ErrorKind::Store,
        }
    }

    /// Human-readable reason without the kind prefix.
    pub fn reason(&self) -> String {
        match self {
            SequenceError::InvalidArgument { reason } | SequenceError::TypeMismatch { reason } => {
                reason.clone()
            }
            SequenceError::Validation(errors) => errors.to_string(),
            SequenceError::Store(err) => err.to_string(),
        }
    }
}
