// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Closed-form evaluation of single Fibonacci terms.
//!
//! [`TermFormula`] computes F(n) without consulting any other term. It is the seed
//! source for the first two positions of a snapshot; every other hole is filled by
//! the recurrence in [`RangeResolver`](crate::RangeResolver).
//!
//! # Accuracy boundary
//!
//! Binet's identity `round((φⁿ - ψⁿ) / √5)` evaluated in `f64` is exact only up to
//! [`BINET_EXACT_LIMIT`]. Past the cutover the formula switches to fast doubling
//! over arbitrary-precision integers, so every order has an exact term.

use tracing::trace;

use super::types::{Index, Term};
use crate::config::constants::BINET_EXACT_LIMIT;
use crate::errors::SequenceError;

/// Pure closed-form term function.
///
/// # Examples
///
/// ```
/// use fibcache::{Term, TermFormula};
///
/// assert_eq!(TermFormula::value_at(0)?, Term::from(0u32));
/// assert_eq!(TermFormula::value_at(21)?, Term::from(10946u32));
/// assert_eq!(TermFormula::term_at(100).to_string(), "354224848179261915075");
/// assert!(TermFormula::value_at(-1).is_err());
/// # Ok::<(), fibcache::SequenceError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TermFormula;

impl TermFormula {
    /// Value of the sequence at a signed order.
    ///
    /// Negative orders fail with `InvalidArgument` ("order must be positive").
    pub fn value_at(order: i64) -> Result<Term, SequenceError> {
        if order < 0 {
            return Err(SequenceError::invalid_argument("order must be positive"));
        }
        Ok(Self::term_at(order as Index))
    }

    /// Value of the sequence at a non-negative index.
    pub fn term_at(order: Index) -> Term {
        let value = if order <= BINET_EXACT_LIMIT {
            Term::from(binet(order))
        } else {
            fast_doubling(order)
        };

        trace!(order, bits = value.bits(), "Evaluated closed-form term");
        value
    }
}

/// Binet's formula in `f64`, rounded half away from zero.
fn binet(order: Index) -> u64 {
    let sqrt_five = 5f64.sqrt();
    let phi = (1.0 + sqrt_five) / 2.0;
    let psi = (1.0 - sqrt_five) / 2.0;
    let n = order as f64;

    ((phi.powf(n) - psi.powf(n)) / sqrt_five).round() as u64
}

/// Exact F(n) by fast doubling:
/// `F(2k) = F(k)·(2F(k+1) − F(k))`, `F(2k+1) = F(k)² + F(k+1)²`.
fn fast_doubling(order: Index) -> Term {
    let (mut a, mut b) = (Term::from(0u32), Term::from(1u32));
    let bits = Index::BITS - order.leading_zeros();

    for bit in (0..bits).rev() {
        // F(k+1) >= F(k), so the subtraction never underflows.
        let even = &a * (&b * 2u32 - &a);
        let odd = &a * &a + &b * &b;
        (a, b) = if (order >> bit) & 1 == 0 {
            (even, odd)
        } else {
            let next = &even + &odd;
            (odd, next)
        };
    }

    a
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn iterative(order: Index) -> Term {
        let (mut a, mut b) = (Term::from(0u32), Term::from(1u32));
        for _ in 0..order {
            let next = &a + &b;
            a = b;
            b = next;
        }
        a
    }

    fn term(value: &str) -> Term {
        value.parse().unwrap()
    }

    #[test]
    fn test_first_terms() {
        assert_eq!(TermFormula::value_at(0).unwrap(), Term::from(0u32));
        assert_eq!(TermFormula::value_at(1).unwrap(), Term::from(1u32));
        assert_eq!(TermFormula::value_at(2).unwrap(), Term::from(1u32));
        assert_eq!(TermFormula::value_at(3).unwrap(), Term::from(2u32));
    }

    #[test]
    fn test_high_order() {
        assert_eq!(TermFormula::value_at(21).unwrap(), Term::from(10946u32));
    }

    #[test]
    fn test_negative_order() {
        let err = TermFormula::value_at(-1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.reason(), "order must be positive");
    }

    #[test]
    fn test_orders_beyond_u64() {
        assert_eq!(TermFormula::term_at(93), term("12200160415121876738"));
        assert_eq!(TermFormula::term_at(94), term("19740274219868223167"));
        assert_eq!(TermFormula::term_at(100), term("354224848179261915075"));
    }

    #[test]
    fn test_thousandth_term() {
        let value = TermFormula::term_at(1000).to_string();
        assert_eq!(value.len(), 209);
        assert!(value.starts_with("43466557686937456435"));
        assert!(value.ends_with("849228875"));
    }

    #[test]
    fn test_exact_across_cutover() {
        for order in 0..=200 {
            assert_eq!(TermFormula::term_at(order), iterative(order), "order {order}");
        }
    }

    #[test]
    fn test_fast_doubling_matches_binet_below_cutover() {
        for order in 0..=BINET_EXACT_LIMIT {
            assert_eq!(fast_doubling(order), Term::from(binet(order)), "order {order}");
        }
    }
}
