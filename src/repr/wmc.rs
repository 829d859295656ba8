use crate::repr::var_label::{Literal, VarLabel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ops::Index;

/// Literal weights for weighted queries over a circuit. The weight of the
/// positive literal of variable `x` is stored at index `2x`, the weight of its
/// negative literal at `2x + 1`, so the vector always has `2 * num_vars`
/// entries.
///
/// For counting these are the (unnormalized) literal probabilities; for
/// optimization they are the coefficients of a linear objective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteralWeights {
    weights: Vec<f64>,
}

impl LiteralWeights {
    /// every literal weighted 1; counting with these counts models
    pub fn uniform(num_vars: usize) -> LiteralWeights {
        LiteralWeights::constant(num_vars, 1.0)
    }

    pub fn constant(num_vars: usize, w: f64) -> LiteralWeights {
        LiteralWeights {
            weights: vec![w; 2 * num_vars],
        }
    }

    /// wraps a literal-indexed vector
    /// ```
    /// use ddnnf::repr::{Literal, VarLabel, LiteralWeights};
    ///
    /// let weights = LiteralWeights::from_vec(vec![0.7, 0.3, 1.0, 0.0]);
    /// assert_eq!(weights.num_vars(), 2);
    /// assert_eq!(weights.literal(Literal::new(VarLabel::new(0), false)), 0.3);
    /// ```
    pub fn from_vec(weights: Vec<f64>) -> LiteralWeights {
        assert!(
            weights.len() % 2 == 0,
            "a literal weight vector has two entries per variable, got {}",
            weights.len()
        );
        LiteralWeights { weights }
    }

    /// Parametrize from a mapping of variables to `(low, high)` weights;
    /// variables absent from the map get `(1, 1)`.
    /// ```
    /// use ddnnf::repr::{VarLabel, LiteralWeights};
    /// use std::collections::HashMap;
    ///
    /// let weights = LiteralWeights::from_var_weights(
    ///     &HashMap::from([(VarLabel::new(1), (0.3, 0.7))]),
    ///     2,
    /// );
    /// assert_eq!(weights.as_slice(), &[1.0, 1.0, 0.7, 0.3]);
    /// ```
    pub fn from_var_weights(var_to_val: &HashMap<VarLabel, (f64, f64)>, num_vars: usize) -> Self {
        let mut r = LiteralWeights::uniform(num_vars);
        for (&label, &(low, high)) in var_to_val.iter() {
            r.set_weight(label, low, high);
        }
        r
    }

    pub fn num_vars(&self) -> usize {
        self.weights.len() / 2
    }

    /// number of literals, i.e. `2 * num_vars`
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.weights
    }

    #[inline]
    pub fn literal(&self, lit: Literal) -> f64 {
        self.weights[lit.index()]
    }

    pub fn set_literal(&mut self, lit: Literal, w: f64) {
        self.weights[lit.index()] = w;
    }

    /// gives you the weight of `(low, high)` literals for a given VarLabel
    pub fn var_weight(&self, label: VarLabel) -> (f64, f64) {
        (self.weights[label.neg_index()], self.weights[label.pos_index()])
    }

    pub fn set_weight(&mut self, label: VarLabel, low: f64, high: f64) {
        self.weights[label.neg_index()] = low;
        self.weights[label.pos_index()] = high;
    }

    /// Restricts the weights to assignments where `lit` holds by zeroing the
    /// weight of its complement. Returns the weight that was overwritten.
    pub fn condition(&mut self, lit: Literal) -> f64 {
        let idx = lit.negated().index();
        std::mem::replace(&mut self.weights[idx], 0.0)
    }

    /// returns whether or not the weights are normalized, i.e. each
    /// true/false weight pair sums to one
    pub fn has_smoothed_weights(&self) -> bool {
        self.weights
            .chunks(2)
            .all(|pair| (pair[0] + pair[1] - 1.0).abs() < 1e-9)
    }
}

impl Index<usize> for LiteralWeights {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.weights[index]
    }
}

impl Default for LiteralWeights {
    fn default() -> Self {
        LiteralWeights {
            weights: Vec::new(),
        }
    }
}

#[test]
fn test_condition() {
    let mut w = LiteralWeights::from_vec(vec![0.2, 0.8, 0.5, 0.5]);
    let x = VarLabel::new(0);
    let old = w.condition(Literal::new(x, true));
    assert_eq!(old, 0.8);
    assert_eq!(w.var_weight(x), (0.0, 0.2));
    assert!(!w.has_smoothed_weights());
    w.set_weight(x, 0.8, 0.2);
    assert!(w.has_smoothed_weights());
}
