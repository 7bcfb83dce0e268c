// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Fibonacci term engine.
//!
//! This module provides:
//! - Strong types for ranges, snapshots and resolved sequences
//! - The closed-form [`TermFormula`]
//! - The memoizing [`RangeResolver`]

pub mod formula;
pub mod resolver;
pub mod types;

pub use formula::TermFormula;
pub use resolver::{fill_snapshot, FillStats, FilledSnapshot, RangeResolver};
pub use types::{Index, ResolvedSequence, SparseSnapshot, Term, TermBatch, TermKey, TermRange};
