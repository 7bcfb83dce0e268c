// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Validation of raw range parameters.
//!
//! [`RangeRequest`] holds the bounds exactly as they arrived (for example as query
//! string values) and collects every problem with them at once, so a caller sees
//! `start: is required` and `end: is required` together rather than one at a time.

use tracing::debug;

use crate::errors::{Check, Field, SequenceError, ValidationErrors};
use crate::sequence::types::{parse_bound, ParsedBound};
use crate::sequence::TermRange;

/// Unvalidated range bounds.
///
/// # Examples
///
/// ```rust
/// use fibcache::{RangeRequest, SequenceError};
///
/// let range = RangeRequest::new(Some("18"), Some("21")).validate()?;
/// assert_eq!((range.start(), range.end()), (18, 21));
///
/// let err = RangeRequest::new(None, Some("x")).validate().unwrap_err();
/// assert_eq!(err.reason(), "start: is required\nend: must be integer");
/// # Ok::<(), SequenceError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RangeRequest<'a> {
    start: Option<&'a str>,
    end: Option<&'a str>,
}

impl<'a> RangeRequest<'a> {
    pub fn new(start: Option<&'a str>, end: Option<&'a str>) -> Self {
        Self { start, end }
    }

    /// Checks both bounds and builds a [`TermRange`].
    ///
    /// Each field goes through required, type and range checks independently; the
    /// cross-field check runs only when both bounds are `i64` integers. On failure every
    /// problem is reported in a [`SequenceError::Validation`].
    pub fn validate(&self) -> Result<TermRange, SequenceError> {
        let mut errors = ValidationErrors::new();

        let start = check_bound(Field::Start, self.start, &mut errors);
        let end = check_bound(Field::End, self.end, &mut errors);

        if let (Some(start), Some(end)) = (start, end) {
            if end < start {
                errors.add(
                    Field::End,
                    Check::CrossField,
                    "must be greater than or equal to start",
                );
            }
        }

        if !errors.is_empty() {
            debug!(errors = %errors, "Rejected range request");
            return Err(SequenceError::Validation(errors));
        }

        match (start, end) {
            (Some(start), Some(end)) => TermRange::new(start, end),
            _ => Err(SequenceError::invalid_argument("start and end are required")),
        }
    }
}

/// Runs the per-field checks, returning the parsed value when it fits in an `i64`.
fn check_bound(field: Field, raw: Option<&str>, errors: &mut ValidationErrors) -> Option<i64> {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        errors.add(field, Check::Required, "is required");
        return None;
    };

    match parse_bound(raw) {
        ParsedBound::Value(value) => {
            if value < 0 {
                errors.add(field, Check::Range, "must be positive");
            }
            Some(value)
        }
        ParsedBound::TooLarge => {
            errors.add(
                field,
                Check::Range,
                format!("must be less than or equal to {}", i64::MAX),
            );
            None
        }
        ParsedBound::NotInteger => {
            errors.add(field, Check::Type, "must be integer");
            None
        }
    }
}
