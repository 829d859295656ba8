//! The combination operators used by the bottom-up evaluation engine.
//!
//! A query kind selects a pair of operators (⊕, ⊗) with identities 0 and 1
//! such that:
//! 1. (R, ⊕) is a commutative monoid with identity 0
//! 2. (R, ⊗) is a monoid with identity 1
//! 3. ⊗ distributes over ⊕
//! 4. ⊗ by 0 annihilates R
//!
//! | query | ⊗ (And) | 1   | ⊕ (Or) | 0   |
//! |-------|---------|-----|--------|-----|
//! | Count | `*`     | 1   | `+`    | 0   |
//! | Min   | `+`     | 0   | `min`  | +∞  |
//! | Max   | `+`     | 0   | `max`  | −∞  |
//!
//! Over the reals, Count is the probability semiring and Min/Max are the
//! tropical semirings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::repr::{model::Assignment, wmc::LiteralWeights};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Query {
    /// weighted model counting
    Count,
    /// minimize a linear objective over the models
    Min,
    /// maximize a linear objective over the models
    Max,
}

impl Query {
    /// identity of ⊗, the weight of a `True` node
    #[inline]
    pub fn one(self) -> f64 {
        match self {
            Query::Count => 1.0,
            Query::Min | Query::Max => 0.0,
        }
    }

    /// identity of ⊕, the weight of a `False` node
    #[inline]
    pub fn zero(self) -> f64 {
        match self {
            Query::Count => 0.0,
            Query::Min => f64::INFINITY,
            Query::Max => f64::NEG_INFINITY,
        }
    }

    /// ⊗, combines the children of an `And` node
    #[inline]
    pub fn times(self, a: f64, b: f64) -> f64 {
        match self {
            Query::Count => a * b,
            Query::Min | Query::Max => a + b,
        }
    }

    /// ⊕, combines the branches of an `Or` node
    #[inline]
    pub fn plus(self, a: f64, b: f64) -> f64 {
        match self {
            Query::Count => a + b,
            Query::Min => f64::min(a, b),
            Query::Max => f64::max(a, b),
        }
    }

    /// contribution of a variable left free along an `Or` branch, given the
    /// weights of its positive and negative literals
    #[inline]
    pub fn free(self, pos: f64, neg: f64) -> f64 {
        self.plus(pos, neg)
    }

    /// true iff `a` is at least as good as `b` for this query
    ///
    /// Count ranks larger masses first.
    #[inline]
    pub fn prefers(self, a: f64, b: f64) -> bool {
        match self {
            Query::Count | Query::Max => a >= b,
            Query::Min => a <= b,
        }
    }

    /// Weight of an assignment under `weights`: the product of the weights of
    /// its true literals for Count, their sum (a dot product with the
    /// indicator vector) for Min and Max.
    pub fn assignment_weight(self, assignment: &Assignment, weights: &LiteralWeights) -> f64 {
        assert_eq!(
            2 * assignment.num_vars(),
            weights.len(),
            "assignment and weights disagree on the number of literals"
        );
        assignment
            .assignment_iter()
            .fold(self.one(), |acc, lit| self.times(acc, weights.literal(lit)))
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Count => write!(f, "count"),
            Query::Min => write!(f, "min"),
            Query::Max => write!(f, "max"),
        }
    }
}
