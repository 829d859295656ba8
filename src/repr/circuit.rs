//! A deterministic decomposable negation normal form (d-DNNF) circuit stored
//! as an arena of nodes in topological order.
//!
//! Nodes are numbered `0 .. num_nodes()`; every child has a strictly smaller
//! index than its parent and the last node is the root. Children are kept
//! deduplicated in increasing index order, which is the order every pass
//! visits them in. Edges out of `Or` nodes carry the variables that are in the
//! parent's scope but not in the child's (the variables left free along that
//! branch); edges out of `And` nodes carry nothing.
//!
//! Determinism and decomposability are properties of how the circuit was
//! built and are not re-checked by the queries.

use std::fmt;
use std::ops::Range;

use rustc_hash::FxHashMap;

use super::model::Assignment;
use super::var_label::{Literal, VarLabel, VarSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    And,
    Or,
    Lit(Literal),
    True,
    False,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::And => write!(f, "and  "),
            NodeKind::Or => write!(f, "or   "),
            NodeKind::Lit(_) => write!(f, "lit  "),
            NodeKind::True => write!(f, "true "),
            NodeKind::False => write!(f, "false"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    /// every variable occurring in the sub-circuit rooted here
    scope: VarSet,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn scope(&self) -> &VarSet {
        &self.scope
    }
}

#[derive(Debug, Clone)]
pub struct Circuit {
    nodes: Vec<Node>,
    /// `children[offsets[i]..offsets[i + 1]]` are the children of node `i`
    children: Vec<usize>,
    offsets: Vec<usize>,
    /// free variables of each `Or` edge, keyed by `(parent, child)`
    edge_labels: FxHashMap<(usize, usize), Vec<VarLabel>>,
    num_vars: usize,
}

impl Circuit {
    /// an empty circuit over `num_vars` variables; nodes are appended
    /// bottom-up with the `add_*` methods
    pub fn new(num_vars: usize) -> Circuit {
        Circuit::with_capacity(0, num_vars)
    }

    pub fn with_capacity(num_nodes: usize, num_vars: usize) -> Circuit {
        let mut offsets = Vec::with_capacity(num_nodes + 1);
        offsets.push(0);
        Circuit {
            nodes: Vec::with_capacity(num_nodes),
            children: Vec::new(),
            offsets,
            edge_labels: FxHashMap::default(),
            num_vars,
        }
    }

    fn push(&mut self, kind: NodeKind, scope: VarSet) -> usize {
        self.nodes.push(Node { kind, scope });
        self.offsets.push(self.children.len());
        self.nodes.len() - 1
    }

    /// sorted, deduplicated children; panics if one is not yet in the circuit
    fn prepare_children(&self, children: &[usize]) -> Vec<usize> {
        let next = self.nodes.len();
        let mut c = children.to_vec();
        c.sort_unstable();
        c.dedup();
        if let Some(&last) = c.last() {
            assert!(
                last < next,
                "child {} must precede its parent {} in topological order",
                last,
                next
            );
        }
        c
    }

    pub fn add_true(&mut self) -> usize {
        self.push(NodeKind::True, VarSet::new())
    }

    pub fn add_false(&mut self) -> usize {
        self.push(NodeKind::False, VarSet::new())
    }

    pub fn add_literal(&mut self, lit: Literal) -> usize {
        assert!(
            lit.label().value_usize() < self.num_vars,
            "variable {} out of range for a circuit over {} variables",
            lit.label(),
            self.num_vars
        );
        self.push(NodeKind::Lit(lit), VarSet::singleton(lit.label()))
    }

    /// Appends a conjunction. Its children are expected to have pairwise
    /// disjoint scopes; an empty conjunction is the constant `True`.
    pub fn add_and(&mut self, children: &[usize]) -> usize {
        if children.is_empty() {
            return self.add_true();
        }
        let children = self.prepare_children(children);
        let mut scope = VarSet::new();
        for &c in children.iter() {
            scope.union_with(&self.nodes[c].scope);
        }
        self.children.extend_from_slice(&children);
        self.push(NodeKind::And, scope)
    }

    /// Appends a disjunction whose branches are expected to be mutually
    /// exclusive. The free-variable label of every outgoing edge is derived
    /// here. An empty disjunction is the constant `False`.
    pub fn add_or(&mut self, children: &[usize]) -> usize {
        if children.is_empty() {
            return self.add_false();
        }
        let children = self.prepare_children(children);
        let mut scope = VarSet::new();
        for &c in children.iter() {
            scope.union_with(&self.nodes[c].scope);
        }
        let parent = self.nodes.len();
        for &c in children.iter() {
            let label = scope.difference(&self.nodes[c].scope);
            self.edge_labels.insert((parent, c), label);
        }
        self.children.extend_from_slice(&children);
        self.push(NodeKind::Or, scope)
    }

    /// Overwrites the free-variable label of an existing `Or` edge. Only meant
    /// for use while the circuit is being built.
    pub fn set_edge_label(&mut self, parent: usize, child: usize, label: Vec<VarLabel>) {
        assert!(
            self.is_edge(parent, child) && self.nodes[parent].kind == NodeKind::Or,
            "({}, {}) is not an or-edge",
            parent,
            child
        );
        self.edge_labels.insert((parent, child), label);
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.children.len()
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_literals(&self) -> usize {
        2 * self.num_vars
    }

    /// index of the root, the last node
    pub fn root(&self) -> usize {
        assert!(!self.nodes.is_empty(), "an empty circuit has no root");
        self.nodes.len() - 1
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn kind(&self, index: usize) -> NodeKind {
        self.nodes[index].kind
    }

    pub fn scope(&self, index: usize) -> &VarSet {
        &self.nodes[index].scope
    }

    /// children of `index` in increasing index order
    pub fn children(&self, index: usize) -> &[usize] {
        &self.children[self.edge_range(index)]
    }

    pub fn num_children(&self, index: usize) -> usize {
        self.offsets[index + 1] - self.offsets[index]
    }

    /// Edge ids of the edges out of `index`, aligned with `children(index)`.
    /// Edge ids index flat per-edge tables such as
    /// [`EdgeWeights`](crate::engine::EdgeWeights).
    pub fn edge_range(&self, index: usize) -> Range<usize> {
        self.offsets[index]..self.offsets[index + 1]
    }

    /// edge id of `(parent, child)`, if that edge exists
    pub fn edge_id(&self, parent: usize, child: usize) -> Option<usize> {
        self.children(parent)
            .binary_search(&child)
            .ok()
            .map(|pos| self.offsets[parent] + pos)
    }

    pub fn is_edge(&self, parent: usize, child: usize) -> bool {
        self.edge_id(parent, child).is_some()
    }

    /// free variables of the edge `(parent, child)`; empty for `And` edges
    pub fn edge_label(&self, parent: usize, child: usize) -> &[VarLabel] {
        self.edge_labels
            .get(&(parent, child))
            .map(|l| l.as_slice())
            .unwrap_or(&[])
    }

    /// Nodes with an edge into `index`. This scans every edge.
    pub fn parents(&self, index: usize) -> Vec<usize> {
        (index + 1..self.num_nodes())
            .filter(|&p| self.is_edge(p, index))
            .collect()
    }

    pub fn num_parents(&self, index: usize) -> usize {
        self.parents(index).len()
    }

    /// Evaluates the circuit as a Boolean formula. Unset variables make both of
    /// their literals false.
    pub fn satisfied_by(&self, assignment: &Assignment) -> bool {
        let mut value = vec![false; self.num_nodes()];
        for index in 0..self.num_nodes() {
            value[index] = match self.kind(index) {
                NodeKind::True => true,
                NodeKind::False => false,
                NodeKind::Lit(lit) => assignment.lit_implied(lit),
                NodeKind::And => self.children(index).iter().all(|&c| value[c]),
                NodeKind::Or => self.children(index).iter().any(|&c| value[c]),
            };
        }
        value[self.root()]
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "variables: {}", self.num_vars())?;
        writeln!(f, "nodes:     {}", self.num_nodes())?;
        writeln!(f, "edges:     {}", self.num_edges())?;
        let width = self.num_nodes().to_string().len() + 1;
        for (index, node) in self.nodes.iter().enumerate() {
            write!(f, "{:<width$}[type]: {}", index, node.kind, width = width)?;
            if let NodeKind::Lit(lit) = node.kind {
                write!(f, " [sgn]: {}", if lit.polarity() { "+1" } else { "-1" })?;
            }
            write!(f, " [vars]:")?;
            for v in node.scope.iter() {
                write!(f, " {}", v)?;
            }
            let children = self.children(index);
            if !children.is_empty() {
                write!(f, " [children]:")?;
                for c in children {
                    write!(f, " {}", c)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test_circuit {
    use super::*;

    fn lit(v: u64, polarity: bool) -> Literal {
        Literal::new(VarLabel::new(v), polarity)
    }

    /// (x0 ∧ x1) ∨ ¬x0
    fn decision() -> Circuit {
        let mut c = Circuit::new(2);
        let a = c.add_literal(lit(0, true));
        let b = c.add_literal(lit(1, true));
        let na = c.add_literal(lit(0, false));
        let ab = c.add_and(&[b, a]);
        c.add_or(&[ab, na]);
        c
    }

    #[test]
    fn structure() {
        let c = decision();
        assert_eq!(c.num_nodes(), 5);
        assert_eq!(c.num_edges(), 4);
        assert_eq!(c.root(), 4);
        assert_eq!(c.children(3), &[0, 1]);
        assert_eq!(c.edge_id(4, 2), Some(2));
        assert_eq!(c.edge_id(4, 3), Some(3));
        assert_eq!(c.edge_id(4, 0), None);
        assert_eq!(c.parents(0), vec![3]);
        assert_eq!(c.num_parents(3), 1);
        assert_eq!(c.scope(4).iter().collect::<Vec<_>>(), vec![VarLabel::new(0), VarLabel::new(1)]);
    }

    #[test]
    fn or_edge_labels() {
        let c = decision();
        assert!(c.edge_label(4, 3).is_empty());
        assert_eq!(c.edge_label(4, 2), &[VarLabel::new(1)]);
        assert!(c.edge_label(3, 0).is_empty());
    }

    #[test]
    fn overwrite_or_edge_label() {
        let mut c = decision();
        c.set_edge_label(4, 2, vec![]);
        assert!(c.edge_label(4, 2).is_empty());
        c.set_edge_label(4, 3, vec![VarLabel::new(1)]);
        assert_eq!(c.edge_label(4, 3), &[VarLabel::new(1)]);
    }

    #[test]
    #[should_panic(expected = "is not an or-edge")]
    fn and_edges_have_no_label() {
        let mut c = decision();
        c.set_edge_label(3, 0, vec![VarLabel::new(1)]);
    }

    #[test]
    fn boolean_evaluation() {
        let c = decision();
        let m = |a, b| Assignment::from_total_model(vec![a, b]);
        assert!(c.satisfied_by(&m(true, true)));
        assert!(!c.satisfied_by(&m(true, false)));
        assert!(c.satisfied_by(&m(false, true)));
        assert!(c.satisfied_by(&m(false, false)));
    }

    #[test]
    fn empty_gates_are_constants() {
        let mut c = Circuit::new(0);
        let t = c.add_and(&[]);
        let f = c.add_or(&[]);
        assert_eq!(c.kind(t), NodeKind::True);
        assert_eq!(c.kind(f), NodeKind::False);
    }

    #[test]
    #[should_panic]
    fn children_precede_parents() {
        let mut c = Circuit::new(1);
        c.add_literal(lit(0, true));
        c.add_and(&[0, 1]);
    }

    #[test]
    fn display_lists_nodes() {
        let s = format!("{}", decision());
        assert!(s.contains("edges:     4"));
        assert!(s.contains("[children]: 2 3"));
    }
}
