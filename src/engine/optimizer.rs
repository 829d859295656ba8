//! Linear objective optimization over the models of a d-DNNF circuit.
//!
//! The objective assigns a cost to every literal and the value of a model is
//! the sum over its true literals. A min (or max) pass computes the optimum
//! at every node and every `Or` edge; the traceback then follows the best
//! edge of each `Or` node down from the root.

use rand::Rng;
use tracing::debug;

use crate::repr::{
    circuit::Circuit, model::Assignment, var_label::VarLabel, wmc::LiteralWeights,
};
use crate::sample::probability::Probability;
use crate::util::semiring::Query;

use super::{EdgeWeights, Engine, Traceback};

pub struct Optimizer<'a> {
    engine: Engine<'a>,
    node_weights: Vec<f64>,
    edge_weights: EdgeWeights,
}

impl<'a> Optimizer<'a> {
    /// `query` must be [`Query::Min`] or [`Query::Max`]
    pub fn new(circuit: &'a Circuit, query: Query) -> Optimizer<'a> {
        assert!(query != Query::Count, "the optimizer needs a min or max query");
        Optimizer {
            engine: Engine::new(circuit, query),
            node_weights: vec![query.zero(); circuit.num_nodes()],
            edge_weights: EdgeWeights::new(circuit, query),
        }
    }

    pub fn minimizer(circuit: &'a Circuit) -> Optimizer<'a> {
        Optimizer::new(circuit, Query::Min)
    }

    pub fn maximizer(circuit: &'a Circuit) -> Optimizer<'a> {
        Optimizer::new(circuit, Query::Max)
    }

    pub fn query(&self) -> Query {
        self.engine.query()
    }

    /// A best model of the circuit under `objective`.
    ///
    /// Panics if the circuit has no model: the traceback would reach `False`.
    pub fn optimize(&mut self, objective: &LiteralWeights) -> Assignment {
        self.engine
            .push_weights_with_edges(objective, &mut self.node_weights, &mut self.edge_weights);
        debug!(
            query = %self.query(),
            optimum = self.node_weights[self.engine.circuit().root()],
            "optimized"
        );
        OptimalTrace {
            circuit: self.engine.circuit(),
            query: self.query(),
            objective,
            edge_weights: &self.edge_weights,
        }
        .trace()
    }

    /// Optimizes `obj1` with probability `gamma` and `obj2` otherwise; a single
    /// draw decides for the whole assignment.
    pub fn optimize_mixed<R: Rng + ?Sized>(
        &mut self,
        obj1: &LiteralWeights,
        obj2: &LiteralWeights,
        gamma: f64,
        rng: &mut R,
    ) -> Assignment {
        assert_eq!(obj1.len(), obj2.len(), "objectives differ in length");
        let gamma = Probability::new(gamma);
        if rng.gen_bool(gamma.as_f64()) {
            self.optimize(obj1)
        } else {
            self.optimize(obj2)
        }
    }

    /// Optimum found by the last call to [`Optimizer::optimize`], i.e. the
    /// root weight of the last pass
    pub fn last_optimum(&self) -> f64 {
        self.node_weights[self.engine.circuit().root()]
    }

    /// Value of `assignment` under `objective`, computed directly as the dot
    /// product of the literal indicator vector with the objective.
    pub fn value(&self, assignment: &Assignment, objective: &LiteralWeights) -> f64 {
        self.query().assignment_weight(assignment, objective)
    }
}

struct OptimalTrace<'t> {
    circuit: &'t Circuit,
    query: Query,
    objective: &'t LiteralWeights,
    edge_weights: &'t EdgeWeights,
}

impl<'t> OptimalTrace<'t> {
    fn assign_free(&self, label: &[VarLabel], assignment: &mut Assignment) {
        for &x in label {
            let pos = self.objective[x.pos_index()];
            let neg = self.objective[x.neg_index()];
            assignment.set(x, self.query.prefers(pos, neg));
        }
    }
}

impl<'t> Traceback for OptimalTrace<'t> {
    fn circuit(&self) -> &Circuit {
        self.circuit
    }

    /// Follows the best edge; on ties the later child wins.
    fn choose_branch(&mut self, parent: usize, assignment: &mut Assignment) -> usize {
        let mut best_child = parent;
        let mut best_score = self.query.zero();
        for (edge, &child) in self
            .circuit
            .edge_range(parent)
            .zip(self.circuit.children(parent))
        {
            let score = self.edge_weights.by_id(edge);
            if self.query.prefers(score, best_score) {
                best_child = child;
                best_score = score;
            }
        }
        self.assign_free(self.circuit.edge_label(parent, best_child), assignment);
        best_child
    }

    fn visit_false(&mut self, node: usize) {
        panic!("optimal traceback reached false node {}", node);
    }
}

#[cfg(test)]
mod test_optimizer {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// (x0 ∧ x1) ∨ ¬x0
    fn decision() -> Circuit {
        Circuit::from_nnf_str("nnf 5 4 2\nL 1\nL 2\nL -1\nA 2 0 1\nO 1 2 3 2\n").unwrap()
    }

    #[test]
    fn tautology_has_value_one() {
        let c = Circuit::from_nnf_str("nnf 3 2 1\nL 1\nL -1\nO 0 2 0 1\n").unwrap();
        let objective = LiteralWeights::from_vec(vec![1.0, 1.0]);
        for mut opt in [Optimizer::minimizer(&c), Optimizer::maximizer(&c)] {
            let m = opt.optimize(&objective);
            assert!(c.satisfied_by(&m));
            assert_eq!(opt.value(&m, &objective), 1.0);
            assert_eq!(opt.last_optimum(), 1.0);
        }
    }

    #[test]
    fn picks_best_branch_and_free_variables() {
        let c = decision();
        let objective = LiteralWeights::from_vec(vec![1.0, 5.0, 2.0, -3.0]);

        let mut min = Optimizer::minimizer(&c);
        let m = min.optimize(&objective);
        assert_eq!(m, Assignment::from_total_model(vec![false, false]));
        assert_eq!(min.value(&m, &objective), 2.0);

        let mut max = Optimizer::maximizer(&c);
        let m = max.optimize(&objective);
        assert_eq!(m, Assignment::from_total_model(vec![false, true]));
        assert_eq!(max.value(&m, &objective), 7.0);
    }

    #[test]
    fn later_child_wins_ties() {
        // both branches of x0 ∨ ¬x0 score 0
        let c = Circuit::from_nnf_str("nnf 3 2 1\nL 1\nL -1\nO 0 2 0 1\n").unwrap();
        let objective = LiteralWeights::from_vec(vec![0.0, 0.0]);
        let m = Optimizer::minimizer(&c).optimize(&objective);
        assert_eq!(m, Assignment::from_total_model(vec![false]));
        let m = Optimizer::maximizer(&c).optimize(&objective);
        assert_eq!(m, Assignment::from_total_model(vec![false]));
    }

    #[test]
    fn free_variable_ties_pick_positive_literal() {
        // ¬x0 is strictly best and leaves x1 free with equal weights
        let c = decision();
        let objective = LiteralWeights::from_vec(vec![5.0, 0.0, 1.0, 1.0]);
        let m = Optimizer::minimizer(&c).optimize(&objective);
        assert_eq!(m, Assignment::from_total_model(vec![false, true]));
        let objective = LiteralWeights::from_vec(vec![-5.0, 0.0, 1.0, 1.0]);
        let m = Optimizer::maximizer(&c).optimize(&objective);
        assert_eq!(m, Assignment::from_total_model(vec![false, true]));
    }

    #[test]
    fn mixed_objective_follows_gamma() {
        let c = decision();
        let prefer_true = LiteralWeights::from_vec(vec![-10.0, 0.0, -10.0, 0.0]);
        let prefer_false = LiteralWeights::from_vec(vec![0.0, -10.0, 0.0, -10.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut opt = Optimizer::minimizer(&c);
        let m = opt.optimize_mixed(&prefer_true, &prefer_false, 1.0, &mut rng);
        assert_eq!(m, Assignment::from_total_model(vec![true, true]));
        let m = opt.optimize_mixed(&prefer_true, &prefer_false, 0.0, &mut rng);
        assert_eq!(m, Assignment::from_total_model(vec![false, false]));
    }

    #[test]
    #[should_panic]
    fn unsatisfiable_circuit_panics() {
        let c = Circuit::from_nnf_str("nnf 1 0 0\nO 0 0\n").unwrap();
        Optimizer::minimizer(&c).optimize(&LiteralWeights::uniform(0));
    }
}
