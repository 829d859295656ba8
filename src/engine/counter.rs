//! Weighted model counting

use crate::repr::{
    circuit::Circuit, model::Assignment, var_label::Literal, wmc::LiteralWeights,
};
use crate::util::semiring::Query;

use super::Engine;

/// Weighted model counter for a d-DNNF circuit
#[derive(Debug, Clone, Copy)]
pub struct Counter<'a> {
    engine: Engine<'a>,
}

impl<'a> Counter<'a> {
    pub fn new(circuit: &'a Circuit) -> Counter<'a> {
        Counter {
            engine: Engine::new(circuit, Query::Count),
        }
    }

    /// number of satisfying assignments over the circuit's variables
    /// ```
    /// use ddnnf::repr::Circuit;
    /// use ddnnf::engine::Counter;
    ///
    /// let c = Circuit::from_nnf_str("nnf 3 2 1\nL 1\nL -1\nO 0 2 0 1\n").unwrap();
    /// assert_eq!(Counter::new(&c).count(), 2.0);
    /// ```
    pub fn count(&self) -> f64 {
        let num_vars = self.engine.circuit().num_vars();
        self.engine.evaluate(&LiteralWeights::uniform(num_vars))
    }

    /// total weight of the satisfying assignments under non-negative literal
    /// weights
    pub fn count_weighted(&self, weights: &LiteralWeights) -> f64 {
        self.engine.evaluate(weights)
    }

    /// weight of `assignment` (the product of its true literals' weights)
    /// divided by the total weight
    pub fn probability(&self, assignment: &Assignment, weights: &LiteralWeights) -> f64 {
        let partition = self.engine.evaluate(weights);
        Query::Count.assignment_weight(assignment, weights) / partition
    }

    /// Probability that every literal of `term` holds, computed by zeroing the
    /// complement of each literal and dividing by the unconstrained total.
    pub fn term_probability(&self, term: &[Literal], weights: &LiteralWeights) -> f64 {
        let num_vars = self.engine.circuit().num_vars();
        let partition = self.engine.evaluate(weights);
        let mut conditioned = weights.clone();
        for lit in term {
            assert!(
                lit.label().value_usize() < num_vars,
                "variable {} out of range",
                lit.label()
            );
            conditioned.condition(*lit);
        }
        self.engine.evaluate(&conditioned) / partition
    }
}

#[cfg(test)]
mod test_counter {
    use super::*;
    use crate::repr::var_label::VarLabel;

    /// x0 ∨ ¬x0
    fn tautology() -> Circuit {
        Circuit::from_nnf_str("nnf 3 2 1\nL 1\nL -1\nO 0 2 0 1\n").unwrap()
    }

    #[test]
    fn counts_tautology() {
        let c = tautology();
        let counter = Counter::new(&c);
        assert_eq!(counter.count(), 2.0);
        let x = Literal::new(VarLabel::new(0), true);
        assert_eq!(counter.term_probability(&[x], &LiteralWeights::uniform(1)), 0.5);
    }

    #[test]
    fn probability_of_assignment() {
        let c = tautology();
        let counter = Counter::new(&c);
        let w = LiteralWeights::from_vec(vec![3.0, 1.0]);
        assert_eq!(counter.count_weighted(&w), 4.0);
        let m = Assignment::from_total_model(vec![true]);
        assert_eq!(counter.probability(&m, &w), 0.75);
        let m = Assignment::from_total_model(vec![false]);
        assert_eq!(counter.probability(&m, &w), 0.25);
    }
}
