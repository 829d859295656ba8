//! Weighted sampling of models of a d-DNNF circuit.
//!
//! A counting pass weighs every node and `Or` edge. Walking down from the
//! root, each `Or` node then picks one branch with probability proportional to
//! the branch's mass and each free variable of that branch is drawn from its
//! own literal weights, which yields models with probability proportional to
//! the product of their literal weights.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::engine::{Engine, Evaluation, Traceback};
use crate::repr::{circuit::Circuit, model::Assignment, wmc::LiteralWeights};
use crate::sample::probability::Probability;
use crate::util::{parallel::WorkerPool, semiring::Query};

pub struct Sampler<'a> {
    engine: Engine<'a>,
    eval: Evaluation,
    /// the distribution the tables in `eval` were computed for
    weights: LiteralWeights,
    pool: WorkerPool,
}

impl<'a> Sampler<'a> {
    pub fn new(circuit: &'a Circuit) -> Sampler<'a> {
        Sampler {
            engine: Engine::new(circuit, Query::Count),
            eval: Evaluation::new(circuit, Query::Count),
            weights: LiteralWeights::uniform(circuit.num_vars()),
            pool: WorkerPool::available(),
        }
    }

    /// number of workers used by the batched samplers
    pub fn with_workers(mut self, num_workers: usize) -> Sampler<'a> {
        self.pool = WorkerPool::with_workers(num_workers);
        self
    }

    fn prepare(&mut self, weights: &LiteralWeights) {
        self.weights.clone_from(weights);
        self.engine.push_weights_with_edges(
            &self.weights,
            &mut self.eval.node_weights,
            &mut self.eval.edge_weights,
        );
        debug!(partition = self.eval.root_weight(), "prepared sampling tables");
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Assignment {
        WeightedTrace {
            circuit: self.engine.circuit(),
            weights: &self.weights,
            eval: &self.eval,
            rng,
        }
        .trace()
    }

    /// Draws `n` models split into contiguous ranges over the pool. Each
    /// worker draws from its own generator, seeded from `rng`.
    fn draw_many<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<Assignment> {
        let seeds: Vec<u64> = (0..self.pool.partition(n).len()).map(|_| rng.gen()).collect();
        self.pool
            .run(n, |worker, range| {
                let mut rng = ChaCha8Rng::seed_from_u64(seeds[worker]);
                range.map(|_| self.draw(&mut rng)).collect::<Vec<_>>()
            })
            .into_iter()
            .flatten()
            .collect()
    }

    /// a model drawn uniformly at random
    pub fn sample<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Assignment {
        let num_vars = self.engine.circuit().num_vars();
        self.prepare(&LiteralWeights::uniform(num_vars));
        self.draw(rng)
    }

    /// a model drawn with probability proportional to the product of its
    /// literal weights
    pub fn sample_weighted<R: Rng + ?Sized>(
        &mut self,
        weights: &LiteralWeights,
        rng: &mut R,
    ) -> Assignment {
        self.prepare(weights);
        self.draw(rng)
    }

    /// Samples under `dis1` with probability `gamma` and under `dis2`
    /// otherwise; a single draw decides for the whole model.
    pub fn sample_mixed<R: Rng + ?Sized>(
        &mut self,
        dis1: &LiteralWeights,
        dis2: &LiteralWeights,
        gamma: f64,
        rng: &mut R,
    ) -> Assignment {
        assert_eq!(dis1.len(), dis2.len(), "distributions differ in length");
        let gamma = Probability::new(gamma);
        if rng.gen_bool(gamma.as_f64()) {
            self.sample_weighted(dis1, rng)
        } else {
            self.sample_weighted(dis2, rng)
        }
    }

    /// `n` independent uniform models
    pub fn sample_many<R: Rng + ?Sized>(&mut self, n: usize, rng: &mut R) -> Vec<Assignment> {
        let num_vars = self.engine.circuit().num_vars();
        self.prepare(&LiteralWeights::uniform(num_vars));
        self.draw_many(n, rng)
    }

    /// `n` independent weighted models
    pub fn sample_many_weighted<R: Rng + ?Sized>(
        &mut self,
        weights: &LiteralWeights,
        n: usize,
        rng: &mut R,
    ) -> Vec<Assignment> {
        self.prepare(weights);
        self.draw_many(n, rng)
    }
}

struct WeightedTrace<'t, R: ?Sized> {
    circuit: &'t Circuit,
    weights: &'t LiteralWeights,
    eval: &'t Evaluation,
    rng: &'t mut R,
}

impl<'t, R: Rng + ?Sized> Traceback for WeightedTrace<'t, R> {
    fn circuit(&self) -> &Circuit {
        self.circuit
    }

    /// Bernoulli trials over the children in order, the k-th succeeding with
    /// the k-th edge's share of the mass not taken by earlier edges; the last
    /// child is taken when every other trial failed.
    fn choose_branch(&mut self, parent: usize, assignment: &mut Assignment) -> usize {
        let children = self.circuit.children(parent);
        let mut remaining = self.eval.node_weights[parent];
        let mut chosen = children[children.len() - 1];
        for (edge, &child) in self.circuit.edge_range(parent).zip(children) {
            let w = self.eval.edge_weights.by_id(edge);
            if self.rng.gen_bool(Probability::from_ratio(w, remaining).as_f64()) {
                chosen = child;
                break;
            }
            remaining -= w;
        }
        for &x in self.circuit.edge_label(parent, chosen) {
            let (low, high) = self.weights.var_weight(x);
            let p = Probability::from_ratio(high, low + high);
            assignment.set(x, self.rng.gen_bool(p.as_f64()));
        }
        chosen
    }

    fn visit_false(&mut self, node: usize) {
        trace!(node, "sampler reached false node");
    }
}

#[cfg(test)]
mod test_sampler {
    use super::*;
    use crate::repr::var_label::VarLabel;

    /// (x0 ∧ x1) ∨ ¬x0
    fn decision() -> Circuit {
        Circuit::from_nnf_str("nnf 5 4 2\nL 1\nL 2\nL -1\nA 2 0 1\nO 1 2 3 2\n").unwrap()
    }

    #[test]
    fn samples_are_models() {
        let c = decision();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut sampler = Sampler::new(&c);
        for _ in 0..100 {
            let m = sampler.sample(&mut rng);
            assert!(c.satisfied_by(&m));
            assert!(m.unassigned_vars().next().is_none());
        }
    }

    #[test]
    fn zero_weight_literals_are_never_drawn() {
        let c = decision();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut sampler = Sampler::new(&c);
        // x0 false and x1 true only
        let w = LiteralWeights::from_vec(vec![0.0, 1.0, 1.0, 0.0]);
        for _ in 0..50 {
            let m = sampler.sample_weighted(&w, &mut rng);
            assert_eq!(m, Assignment::from_total_model(vec![false, true]));
        }
    }

    #[test]
    fn mixed_sampling_follows_gamma() {
        let c = decision();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut sampler = Sampler::new(&c);
        let only_true = LiteralWeights::from_vec(vec![1.0, 0.0, 1.0, 0.0]);
        let only_false = LiteralWeights::from_vec(vec![0.0, 1.0, 0.0, 1.0]);
        let m = sampler.sample_mixed(&only_true, &only_false, 1.0, &mut rng);
        assert_eq!(m, Assignment::from_total_model(vec![true, true]));
        let m = sampler.sample_mixed(&only_true, &only_false, 0.0, &mut rng);
        assert_eq!(m, Assignment::from_total_model(vec![false, false]));
    }

    #[test]
    fn batches_are_reproducible() {
        let c = decision();
        let mut a = Sampler::new(&c).with_workers(3);
        let mut b = Sampler::new(&c).with_workers(3);
        let batch_a = a.sample_many(40, &mut ChaCha8Rng::seed_from_u64(9));
        let batch_b = b.sample_many(40, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(batch_a.len(), 40);
        assert_eq!(batch_a, batch_b);
        assert!(batch_a.iter().all(|m| c.satisfied_by(m)));
    }

    #[test]
    fn batch_frequencies() {
        let c = decision();
        let mut sampler = Sampler::new(&c).with_workers(4);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let batch = sampler.sample_many(6000, &mut rng);
        // three models, each with probability 1/3
        let x0 = batch
            .iter()
            .filter(|m| m.get(VarLabel::new(0)) == Some(true))
            .count() as f64
            / 6000.0;
        assert!((x0 - 1.0 / 3.0).abs() < 0.03, "frequency of x0 was {}", x0);
    }

    #[test]
    fn three_way_or_frequencies() {
        // ¬x0 ∨ (x0 ∧ x1) ∨ (x0 ∧ ¬x1), the first branch leaving x1 free
        let c = Circuit::from_nnf_str(
            "nnf 7 7 2\nL 1\nL 2\nL -2\nL -1\nA 2 0 1\nA 2 0 2\nO 0 3 3 4 5\n",
        )
        .unwrap();
        assert_eq!(c.children(6).len(), 3);
        let w = LiteralWeights::from_vec(vec![0.2, 0.8, 0.3, 0.7]);
        let n = 20000;
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let batch = Sampler::new(&c)
            .with_workers(4)
            .sample_many_weighted(&w, n, &mut rng);
        let expected = [
            ((true, true), 0.06),
            ((true, false), 0.14),
            ((false, true), 0.24),
            ((false, false), 0.56),
        ];
        for ((a, b), p) in expected {
            let model = Assignment::from_total_model(vec![a, b]);
            let freq = batch.iter().filter(|m| **m == model).count() as f64 / n as f64;
            assert!((freq - p).abs() < 0.02, "{} drawn with frequency {}", model, freq);
        }
    }

    #[test]
    fn false_nodes_are_skipped() {
        // x0 ∧ false: no model, the walk still terminates
        let c = Circuit::from_nnf_str("nnf 3 2 1\nL 1\nO 0 0\nA 2 0 1\n").unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let m = Sampler::new(&c).sample(&mut rng);
        assert_eq!(m.get(VarLabel::new(0)), Some(true));
    }
}
