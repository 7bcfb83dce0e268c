// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for term ranges, sparse snapshots and resolved sequences.

use std::collections::BTreeMap;
use std::fmt;
use std::num::IntErrorKind;
use std::ops::RangeInclusive;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::ser::{Error as _, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::value::RawValue;

use crate::errors::SequenceError;

/// Position within the sequence, 0-based.
pub type Index = u64;

/// Value of the sequence at an [`Index`]. Unbounded, so every index has an exact term.
pub type Term = BigUint;

/// Newly computed terms keyed by their canonical index key.
pub type TermBatch = BTreeMap<TermKey, Term>;

/// Outcome of parsing one raw range bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ParsedBound {
    /// A signed integer. Values below `i64::MIN` saturate, they fail the sign check anyway.
    Value(i64),
    /// An integer above `i64::MAX`.
    TooLarge,
    /// Not a decimal integer at all.
    NotInteger,
}

/// Parses a decimal integer bound, ignoring surrounding whitespace.
pub(crate) fn parse_bound(raw: &str) -> ParsedBound {
    match raw.trim().parse::<i64>() {
        Ok(value) => ParsedBound::Value(value),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => ParsedBound::TooLarge,
            IntErrorKind::NegOverflow => ParsedBound::Value(i64::MIN),
            _ => ParsedBound::NotInteger,
        },
    }
}

/// Inclusive, validated range of indices to resolve.
///
/// A `TermRange` always satisfies `0 <= start <= end`; constructing one is the
/// validation step of resolution.
///
/// # Examples
///
/// ```
/// use fibcache::TermRange;
///
/// let range = TermRange::new(18, 21)?;
/// assert_eq!(range.len(), 4);
/// assert_eq!(range.indices().collect::<Vec<_>>(), vec![18, 19, 20, 21]);
/// # Ok::<(), fibcache::SequenceError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TermRange {
    start: Index,
    end: Index,
}

impl TermRange {
    /// Validates signed bounds and builds a range.
    ///
    /// Checks run in order and the first failure is returned:
    /// start ≥ 0, end ≥ 0, end ≥ start.
    pub fn new(start: i64, end: i64) -> Result<Self, SequenceError> {
        if start < 0 {
            return Err(SequenceError::invalid_argument("start must be positive"));
        }
        if end < 0 {
            return Err(SequenceError::invalid_argument("end must be positive"));
        }
        if end < start {
            return Err(SequenceError::invalid_argument(
                "end must be greater than or equal to start",
            ));
        }

        Ok(Self {
            start: start as Index,
            end: end as Index,
        })
    }

    /// Parses raw bounds, failing with `TypeMismatch` before any range check runs.
    ///
    /// Integers too large for `i64` fail with `InvalidArgument`.
    pub fn parse(start: &str, end: &str) -> Result<Self, SequenceError> {
        let (raw_start, raw_end) = (parse_bound(start), parse_bound(end));

        for (name, bound) in [("start", raw_start), ("end", raw_end)] {
            if bound == ParsedBound::NotInteger {
                return Err(SequenceError::type_mismatch(format!("{name} must be integer")));
            }
        }

        match (raw_start, raw_end) {
            (ParsedBound::Value(start), ParsedBound::Value(end)) => Self::new(start, end),
            (ParsedBound::TooLarge, _) => Err(SequenceError::invalid_argument(format!(
                "start must be less than or equal to {}",
                i64::MAX
            ))),
            _ => Err(SequenceError::invalid_argument(format!(
                "end must be less than or equal to {}",
                i64::MAX
            ))),
        }
    }

    /// A range holding a single index.
    pub fn single(order: Index) -> Result<Self, SequenceError> {
        let order = i64::try_from(order).map_err(|_| {
            SequenceError::invalid_argument(format!(
                "order must be less than or equal to {}",
                i64::MAX
            ))
        })?;
        Self::new(order, order)
    }

    pub fn start(&self) -> Index {
        self.start
    }

    pub fn end(&self) -> Index {
        self.end
    }

    /// Number of indices in the range (never zero).
    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    /// Always `false`; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn indices(&self) -> RangeInclusive<Index> {
        self.start..=self.end
    }

    pub fn contains(&self, index: Index) -> bool {
        self.indices().contains(&index)
    }
}

impl fmt::Display for TermRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Canonical external key of a stored term: the decimal string of its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermKey(Index);

impl TermKey {
    pub fn new(index: Index) -> Self {
        Self(index)
    }

    pub fn index(&self) -> Index {
        self.0
    }
}

impl From<Index> for TermKey {
    fn from(index: Index) -> Self {
        Self(index)
    }
}

impl fmt::Display for TermKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TermKey {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Index>().map(Self)
    }
}

/// Cache contents for a range: one optional term per index, ascending.
///
/// `None` is a hole ("not currently known") and is never the same as a term of `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseSnapshot {
    start: Index,
    slots: Vec<Option<Term>>,
}

impl SparseSnapshot {
    /// Builds a snapshot from slots beginning at `start`.
    pub fn new(start: Index, slots: Vec<Option<Term>>) -> Self {
        Self { start, slots }
    }

    /// A snapshot of `range` with every position a hole.
    pub fn empty(range: TermRange) -> Self {
        Self::new(range.start(), vec![None; range.len()])
    }

    /// Builds a snapshot of `range` by looking up each index in order.
    pub fn collect<F>(range: TermRange, lookup: F) -> Self
    where
        F: FnMut(Index) -> Option<Term>,
    {
        Self::new(range.start(), range.indices().map(lookup).collect())
    }

    pub fn start(&self) -> Index {
        self.start
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of holes.
    pub fn holes(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }

    /// Whether this snapshot covers exactly `range`.
    pub fn covers(&self, range: &TermRange) -> bool {
        self.start == range.start() && self.slots.len() == range.len()
    }

    /// `(index, slot)` pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (Index, Option<&Term>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(move |(pos, slot)| (self.start + pos as Index, slot.as_ref()))
    }

    pub fn slots(&self) -> &[Option<Term>] {
        &self.slots
    }
}

/// Fully resolved terms for a range, ascending, without holes.
///
/// Serializes as a bare JSON array of exact integers, e.g. `[0,1,1,2]`. Terms beyond
/// `u64` are written digit for digit, never as floats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSequence {
    range: TermRange,
    terms: Vec<Term>,
}

impl ResolvedSequence {
    pub(crate) fn new(range: TermRange, terms: Vec<Term>) -> Self {
        debug_assert_eq!(range.len(), terms.len());
        Self { range, terms }
    }

    pub fn range(&self) -> TermRange {
        self.range
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn into_terms(self) -> Vec<Term> {
        self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Term at an absolute index, if it is inside the range.
    pub fn get(&self, index: Index) -> Option<&Term> {
        if !self.range.contains(index) {
            return None;
        }
        self.terms.get((index - self.range.start()) as usize)
    }

    /// `(index, term)` pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (Index, &Term)> + '_ {
        self.range.indices().zip(self.terms.iter())
    }
}

impl Serialize for ResolvedSequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.terms.len()))?;
        for term in &self.terms {
            let number = RawValue::from_string(term.to_str_radix(10)).map_err(S::Error::custom)?;
            seq.serialize_element(&number)?;
        }
        seq.end()
    }
}
