//! A generic data structure for tracking variable labels throughout the library
use std::fmt;

use bit_set::BitSet;
use serde::{Deserialize, Serialize};

/// a label for each distinct variable in a circuit
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, Copy, PartialOrd, Ord)]
pub struct VarLabel(u64);

impl VarLabel {
    #[inline]
    pub fn new(v: u64) -> VarLabel {
        VarLabel(v)
    }

    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn new_usize(v: usize) -> VarLabel {
        VarLabel::new(v as u64)
    }

    pub fn value_usize(&self) -> usize {
        self.0 as usize
    }

    /// index of the positive literal of this variable in a literal-indexed vector
    #[inline]
    pub fn pos_index(&self) -> usize {
        2 * self.value_usize()
    }

    /// index of the negative literal of this variable in a literal-indexed vector
    #[inline]
    pub fn neg_index(&self) -> usize {
        2 * self.value_usize() + 1
    }
}

impl fmt::Display for VarLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Literal, a variable label and its corresponding truth assignment
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Copy, PartialOrd, Ord)]
pub struct Literal {
    label: VarLabel,
    polarity: bool,
}

impl Literal {
    pub fn new(label: VarLabel, polarity: bool) -> Literal {
        Literal { label, polarity }
    }

    /// Builds a literal from its position in a literal-indexed vector:
    /// `2x` is the positive literal of `x`, `2x + 1` the negative one
    pub fn from_index(index: usize) -> Literal {
        Literal::new(VarLabel::new_usize(index / 2), index % 2 == 0)
    }

    /// Builds a literal from a DIMACS-style signed integer, where `|lit| - 1`
    /// is the variable and the sign is the polarity. Returns `None` on 0.
    pub fn from_dimacs(lit: i64) -> Option<Literal> {
        if lit == 0 {
            return None;
        }
        Some(Literal::new(
            VarLabel::new(lit.unsigned_abs() - 1),
            lit > 0,
        ))
    }

    pub fn label(&self) -> VarLabel {
        self.label
    }

    pub fn polarity(&self) -> bool {
        self.polarity
    }

    /// position of this literal in a literal-indexed vector
    #[inline]
    pub fn index(&self) -> usize {
        if self.polarity {
            self.label.pos_index()
        } else {
            self.label.neg_index()
        }
    }

    pub fn negated(&self) -> Literal {
        Literal::new(self.label, !self.polarity)
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Literal")
            .field("label", &self.label)
            .field("polarity", &self.polarity)
            .finish()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.polarity {
            write!(f, "{}", self.label)
        } else {
            write!(f, "!{}", self.label)
        }
    }
}

/// A structure that contains sets of variables
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct VarSet {
    b: BitSet,
}

impl VarSet {
    pub fn new() -> VarSet {
        VarSet { b: BitSet::new() }
    }

    pub fn singleton(v: VarLabel) -> VarSet {
        let mut s = VarSet::new();
        s.insert(v);
        s
    }

    /// unions self with other
    pub fn union_with(&mut self, other: &VarSet) {
        self.b.union_with(&other.b);
    }

    pub fn insert(&mut self, v: VarLabel) {
        self.b.insert(v.value_usize());
    }

    pub fn contains(&self, v: VarLabel) -> bool {
        self.b.contains(v.value_usize())
    }

    pub fn len(&self) -> usize {
        self.b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.b.is_empty()
    }

    pub fn is_disjoint(&self, other: &VarSet) -> bool {
        self.b.is_disjoint(&other.b)
    }

    /// the variables of `self` absent from `other`, in increasing order
    pub fn difference(&self, other: &VarSet) -> Vec<VarLabel> {
        self.b
            .difference(&other.b)
            .map(VarLabel::new_usize)
            .collect()
    }

    /// iterates the variables in increasing order
    pub fn iter(&self) -> impl Iterator<Item = VarLabel> + '_ {
        self.b.iter().map(VarLabel::new_usize)
    }
}

impl FromIterator<VarLabel> for VarSet {
    fn from_iter<I: IntoIterator<Item = VarLabel>>(iter: I) -> Self {
        let mut s = VarSet::new();
        for v in iter {
            s.insert(v);
        }
        s
    }
}

#[test]
fn test_literal_index() {
    let x = VarLabel::new(3);
    assert_eq!(Literal::new(x, true).index(), 6);
    assert_eq!(Literal::new(x, false).index(), 7);
    assert_eq!(Literal::from_index(7), Literal::new(x, false));
    assert_eq!(Literal::from_dimacs(-4), Some(Literal::new(x, false)));
    assert_eq!(Literal::from_dimacs(0), None);
}

#[test]
fn test_varset_difference() {
    let a: VarSet = [0, 2, 5].iter().map(|v| VarLabel::new(*v)).collect();
    let b: VarSet = [2].iter().map(|v| VarLabel::new(*v)).collect();
    assert_eq!(a.difference(&b), vec![VarLabel::new(0), VarLabel::new(5)]);
    assert!(b.difference(&a).is_empty());
    assert!(!a.is_disjoint(&b));
}
