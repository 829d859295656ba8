//! Per-literal marginal probabilities.
//!
//! The marginal of `x` is the mass left after zeroing the weight of `¬x`,
//! divided by the unconstrained mass. That is one full counting pass per
//! variable, so the variables are split into contiguous ranges and each worker
//! perturbs its own copy of the weights.

use tracing::debug;

use crate::repr::{
    circuit::Circuit,
    var_label::{Literal, VarLabel},
    wmc::LiteralWeights,
};
use crate::util::{parallel::WorkerPool, semiring::Query};

use super::Engine;

#[derive(Debug, Clone, Copy)]
pub struct Marginalizer<'a> {
    engine: Engine<'a>,
    pool: WorkerPool,
}

impl<'a> Marginalizer<'a> {
    pub fn new(circuit: &'a Circuit) -> Marginalizer<'a> {
        Marginalizer {
            engine: Engine::new(circuit, Query::Count),
            pool: WorkerPool::available(),
        }
    }

    pub fn with_workers(mut self, num_workers: usize) -> Marginalizer<'a> {
        self.pool = WorkerPool::with_workers(num_workers);
        self
    }

    /// marginals under uniform weights
    pub fn marginals(&self) -> Vec<f64> {
        let num_vars = self.engine.circuit().num_vars();
        self.marginals_weighted(&LiteralWeights::uniform(num_vars))
    }

    /// Literal-indexed marginals under `weights`: entry `2x` is `P(x)` and
    /// entry `2x + 1` is `1 - P(x)`.
    ///
    /// ```
    /// use ddnnf::repr::{Circuit, LiteralWeights};
    /// use ddnnf::engine::Marginalizer;
    ///
    /// let c = Circuit::from_nnf_str("nnf 3 2 1\nL 1\nL -1\nO 0 2 0 1\n").unwrap();
    /// let w = LiteralWeights::from_vec(vec![3.0, 1.0]);
    /// assert_eq!(Marginalizer::new(&c).marginals_weighted(&w), vec![0.75, 0.25]);
    /// ```
    pub fn marginals_weighted(&self, weights: &LiteralWeights) -> Vec<f64> {
        let num_vars = self.engine.circuit().num_vars();
        if num_vars == 0 {
            return Vec::new();
        }
        let partition = self.engine.evaluate(weights);
        debug!(partition, num_vars, "computing marginals");
        self.pool
            .run(num_vars, |_, vars| {
                let mut local = weights.clone();
                let mut chunk = Vec::with_capacity(2 * vars.len());
                for x in vars.map(VarLabel::new_usize) {
                    let pos = Literal::new(x, true);
                    let saved = local.condition(pos);
                    let p = self.engine.evaluate(&local) / partition;
                    chunk.push(p);
                    chunk.push(1.0 - p);
                    local.set_literal(pos.negated(), saved);
                }
                chunk
            })
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod test_marginalizer {
    use super::*;

    /// (x0 ∧ x1) ∨ ¬x0
    fn decision() -> Circuit {
        Circuit::from_nnf_str("nnf 5 4 2\nL 1\nL 2\nL -1\nA 2 0 1\nO 1 2 3 2\n").unwrap()
    }

    #[test]
    fn uniform_marginals() {
        let c = decision();
        // models: {x0, x1}, {¬x0, x1}, {¬x0, ¬x1}
        let m = Marginalizer::new(&c).with_workers(2).marginals();
        let expected = [1.0 / 3.0, 2.0 / 3.0, 2.0 / 3.0, 1.0 / 3.0];
        assert_eq!(m.len(), 4);
        for (got, want) in m.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{} != {}", got, want);
        }
    }

    #[test]
    fn worker_count_does_not_change_result() {
        let c = decision();
        let w = LiteralWeights::from_vec(vec![0.2, 0.8, 0.9, 0.1]);
        let one = Marginalizer::new(&c).with_workers(1).marginals_weighted(&w);
        let many = Marginalizer::new(&c).with_workers(8).marginals_weighted(&w);
        assert_eq!(one, many);
        for x in 0..2 {
            assert!((one[2 * x] + one[2 * x + 1] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn no_variables() {
        let c = Circuit::from_nnf_str("nnf 1 0 0\nA 0\n").unwrap();
        assert!(Marginalizer::new(&c).marginals().is_empty());
    }
}
