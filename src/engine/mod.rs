//! Bottom-up weight propagation over a d-DNNF circuit and the queries built on
//! top of it.
//!
//! A single pass visits the nodes in index order (which is topological, so a
//! node's children are always resolved before it) and folds literal weights
//! up to the root using the operators of a [`Query`]. The optimizer and the
//! sampler additionally need to know how much each `Or` branch contributed,
//! so a second form of the pass records a weight per edge.

pub mod counter;
pub mod marginalizer;
pub mod optimizer;

use tracing::trace;

use crate::repr::{
    circuit::{Circuit, NodeKind},
    model::Assignment,
    var_label::VarLabel,
    wmc::LiteralWeights,
};
use crate::util::semiring::Query;

pub use self::counter::Counter;
pub use self::marginalizer::Marginalizer;
pub use self::optimizer::Optimizer;

/// Per-edge weights recorded by [`Engine::push_weights_with_edges`], indexed by
/// edge id (see [`Circuit::edge_range`]). Only edges out of `Or` nodes are
/// written; for those, the entry is the free-variable factor of the edge
/// combined with the weight of the child.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeWeights {
    weights: Vec<f64>,
}

impl EdgeWeights {
    pub fn new(circuit: &Circuit, query: Query) -> EdgeWeights {
        EdgeWeights {
            weights: vec![query.zero(); circuit.num_edges()],
        }
    }

    #[inline]
    pub fn by_id(&self, edge: usize) -> f64 {
        self.weights[edge]
    }

    /// weight of the edge `(parent, child)`, if that edge exists
    pub fn get(&self, circuit: &Circuit, parent: usize, child: usize) -> Option<f64> {
        circuit.edge_id(parent, child).map(|e| self.weights[e])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }
}

/// The tables produced by one bottom-up pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub node_weights: Vec<f64>,
    pub edge_weights: EdgeWeights,
}

impl Evaluation {
    pub fn new(circuit: &Circuit, query: Query) -> Evaluation {
        Evaluation {
            node_weights: vec![query.zero(); circuit.num_nodes()],
            edge_weights: EdgeWeights::new(circuit, query),
        }
    }

    /// the answer to the query, i.e. the weight of the root
    pub fn root_weight(&self) -> f64 {
        self.node_weights[self.node_weights.len() - 1]
    }
}

/// Evaluates a circuit under one query kind.
#[derive(Debug, Clone, Copy)]
pub struct Engine<'a> {
    circuit: &'a Circuit,
    query: Query,
}

impl<'a> Engine<'a> {
    pub fn new(circuit: &'a Circuit, query: Query) -> Engine<'a> {
        Engine { circuit, query }
    }

    pub fn circuit(&self) -> &'a Circuit {
        self.circuit
    }

    pub fn query(&self) -> Query {
        self.query
    }

    fn check_lengths(&self, weights: &LiteralWeights, node_weights: &[f64]) {
        assert_eq!(
            weights.len(),
            self.circuit.num_literals(),
            "expected one weight per literal"
        );
        assert_eq!(
            node_weights.len(),
            self.circuit.num_nodes(),
            "expected one slot per node"
        );
    }

    /// ⊗ over the free variables of an edge of their combined literal weights
    #[inline]
    pub fn free_factor(&self, label: &[VarLabel], weights: &LiteralWeights) -> f64 {
        let q = self.query;
        label.iter().fold(q.one(), |acc, &x| {
            q.times(acc, q.free(weights[x.pos_index()], weights[x.neg_index()]))
        })
    }

    /// Shared pass: `on_edge` receives the id and weight of every `Or` edge.
    #[inline]
    fn push<F: FnMut(usize, f64)>(
        &self,
        weights: &LiteralWeights,
        node_weights: &mut [f64],
        mut on_edge: F,
    ) {
        let q = self.query;
        let circuit = self.circuit;
        for index in 0..circuit.num_nodes() {
            node_weights[index] = match circuit.kind(index) {
                NodeKind::True => q.one(),
                NodeKind::False => q.zero(),
                NodeKind::Lit(lit) => weights.literal(lit),
                NodeKind::And => circuit
                    .children(index)
                    .iter()
                    .fold(q.one(), |acc, &c| q.times(acc, node_weights[c])),
                NodeKind::Or => {
                    let mut acc = q.zero();
                    for (edge, &c) in circuit.edge_range(index).zip(circuit.children(index)) {
                        let label = circuit.edge_label(index, c);
                        let w = q.times(self.free_factor(label, weights), node_weights[c]);
                        on_edge(edge, w);
                        acc = q.plus(acc, w);
                    }
                    acc
                }
            };
        }
    }

    /// Fills `node_weights` with the weight of every node; the root's entry
    /// is the answer to the query.
    pub fn push_weights(&self, weights: &LiteralWeights, node_weights: &mut [f64]) {
        self.check_lengths(weights, node_weights);
        self.push(weights, node_weights, |_, _| {});
        trace!(query = %self.query, root = node_weights[node_weights.len() - 1], "pushed weights");
    }

    /// Like [`Engine::push_weights`], also recording the weight of each `Or` edge.
    pub fn push_weights_with_edges(
        &self,
        weights: &LiteralWeights,
        node_weights: &mut [f64],
        edge_weights: &mut EdgeWeights,
    ) {
        self.check_lengths(weights, node_weights);
        assert_eq!(edge_weights.weights.len(), self.circuit.num_edges());
        let table = &mut edge_weights.weights;
        self.push(weights, node_weights, |edge, w| table[edge] = w);
        trace!(query = %self.query, root = node_weights[node_weights.len() - 1], "pushed weights and edges");
    }

    /// the root weight under `weights`
    pub fn evaluate(&self, weights: &LiteralWeights) -> f64 {
        let mut node_weights = vec![self.query.zero(); self.circuit.num_nodes()];
        self.push_weights(weights, &mut node_weights);
        node_weights[self.circuit.root()]
    }

    /// node and edge tables under `weights`
    pub fn evaluate_with_edges(&self, weights: &LiteralWeights) -> Evaluation {
        let mut eval = Evaluation::new(self.circuit, self.query);
        self.push_weights_with_edges(weights, &mut eval.node_weights, &mut eval.edge_weights);
        eval
    }
}

/// Top-down reconstruction of an assignment from the tables of a bottom-up
/// pass. Implementors decide which branch of an `Or` node to follow (and how to
/// set the free variables of that branch) and what reaching `False` means.
///
/// The walk is iterative. Children of an `And` node are visited in increasing
/// index order, each subtree completely before the next.
pub trait Traceback {
    fn circuit(&self) -> &Circuit;

    /// Picks the child of the `Or` node `parent` to descend into and assigns
    /// the free variables of the chosen edge.
    fn choose_branch(&mut self, parent: usize, assignment: &mut Assignment) -> usize;

    fn visit_false(&mut self, node: usize);

    /// walks from `start`, writing the literals met into `assignment`
    fn trace_from(&mut self, start: usize, assignment: &mut Assignment) {
        let mut stack = vec![start];
        while let Some(index) = stack.pop() {
            match self.circuit().kind(index) {
                NodeKind::True => {}
                NodeKind::False => self.visit_false(index),
                NodeKind::Lit(lit) => assignment.set_literal(lit),
                NodeKind::And => stack.extend(self.circuit().children(index).iter().rev()),
                NodeKind::Or => {
                    let child = self.choose_branch(index, assignment);
                    trace!(node = index, child, "or branch");
                    stack.push(child);
                }
            }
        }
    }

    /// walks from the root into a fresh assignment
    fn trace(&mut self) -> Assignment {
        let mut assignment = Assignment::new(self.circuit().num_vars());
        let root = self.circuit().root();
        self.trace_from(root, &mut assignment);
        assignment
    }
}
