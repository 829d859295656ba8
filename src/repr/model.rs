//! Models and partial models of logical sentences

use std::fmt;

use super::var_label::{Literal, VarLabel};

/// An assignment of truth values to the variables of a circuit.
///
/// Viewed as a literal indicator vector of length `2 * num_vars`, the entry
/// `2x` is 1 iff `x` is true and `2x + 1` is 1 iff `x` is false; a variable
/// that was never assigned has both entries 0.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Assignment {
    /// None if variable is unset
    assignments: Vec<Option<bool>>,
}

impl Assignment {
    /// an assignment over `num_vars` variables with every variable unset
    pub fn new(num_vars: usize) -> Assignment {
        Assignment {
            assignments: vec![None; num_vars],
        }
    }

    pub fn from_vec(assignments: Vec<Option<bool>>) -> Assignment {
        Assignment { assignments }
    }

    /// Creates an assignment from a total model (assignment to all vars)
    pub fn from_total_model(assignments: Vec<bool>) -> Assignment {
        Assignment {
            assignments: assignments.into_iter().map(Some).collect(),
        }
    }

    /// Builds an assignment from a 0/1 literal indicator vector
    pub fn from_indicator(indicator: &[f64]) -> Assignment {
        assert!(indicator.len() % 2 == 0, "indicator length must be even");
        let assignments = indicator
            .chunks(2)
            .map(|pair| match (pair[0] == 1.0, pair[1] == 1.0) {
                (true, false) => Some(true),
                (false, true) => Some(false),
                _ => None,
            })
            .collect();
        Assignment { assignments }
    }

    pub fn num_vars(&self) -> usize {
        self.assignments.len()
    }

    pub fn set(&mut self, label: VarLabel, value: bool) {
        self.assignments[label.value_usize()] = Some(value);
    }

    /// Sets the variable of `lit` so that `lit` holds
    pub fn set_literal(&mut self, lit: Literal) {
        self.set(lit.label(), lit.polarity());
    }

    /// Returns the value of a variable (None if unset)
    pub fn get(&self, label: VarLabel) -> Option<bool> {
        self.assignments[label.value_usize()]
    }

    /// True iff the literal is made true by this assignment
    pub fn lit_implied(&self, lit: Literal) -> bool {
        match self.get(lit.label()) {
            Some(v) => v == lit.polarity(),
            None => false,
        }
    }

    /// value of the literal-indicator vector at `index`
    pub fn indicator(&self, index: usize) -> f64 {
        if self.lit_implied(Literal::from_index(index)) {
            1.0
        } else {
            0.0
        }
    }

    /// The full 0/1 literal indicator vector
    pub fn to_indicator(&self) -> Vec<f64> {
        (0..2 * self.num_vars()).map(|i| self.indicator(i)).collect()
    }

    /// Produces an iterator of all the assigned literals
    pub fn assignment_iter(&self) -> impl Iterator<Item = Literal> + '_ {
        self.assignments.iter().enumerate().filter_map(|(idx, x)| {
            x.as_ref()
                .map(|v| Literal::new(VarLabel::new_usize(idx), *v))
        })
    }

    pub fn unassigned_vars(&self) -> impl Iterator<Item = VarLabel> + '_ {
        self.assignments
            .iter()
            .enumerate()
            .filter_map(|(idx, x)| match x {
                None => Some(VarLabel::new_usize(idx)),
                Some(_) => None,
            })
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lits: Vec<String> = self
            .assignment_iter()
            .map(|lit| {
                let v = lit.label().value() as i64 + 1;
                if lit.polarity() {
                    v.to_string()
                } else {
                    (-v).to_string()
                }
            })
            .collect();
        write!(f, "{}", lits.join(" "))
    }
}

#[test]
fn test_indicator() {
    let mut m = Assignment::new(3);
    m.set(VarLabel::new(0), true);
    m.set(VarLabel::new(2), false);
    assert_eq!(m.to_indicator(), vec![1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    assert_eq!(Assignment::from_indicator(&m.to_indicator()), m);
    assert_eq!(m.unassigned_vars().collect::<Vec<_>>(), vec![VarLabel::new(1)]);
    assert_eq!(format!("{}", m), "1 -3");
}
