//! Weighted queries over deterministic decomposable negation normal form
//! (d-DNNF) circuits.
//!
//! A [`repr::Circuit`] is loaded once (usually from a `.nnf` file) and then
//! shared by reference with the query engines in [`engine`] and [`sample`]:
//! weighted model counting, linear optimization over models, weighted
//! sampling of models and per-literal marginals. Every query is a single
//! bottom-up pass over the circuit, optionally followed by a top-down walk.
//!
//! ```
//! use ddnnf::engine::{Counter, Optimizer};
//! use ddnnf::repr::{Circuit, LiteralWeights};
//!
//! let c = Circuit::from_nnf_str("nnf 3 2 1\nL 1\nL -1\nO 0 2 0 1\n").unwrap();
//! assert_eq!(Counter::new(&c).count(), 2.0);
//!
//! let objective = LiteralWeights::from_vec(vec![1.0, 1.0]);
//! let mut opt = Optimizer::minimizer(&c);
//! let model = opt.optimize(&objective);
//! assert_eq!(opt.value(&model, &objective), 1.0);
//! ```

pub mod engine;
pub mod error;
pub mod repr;
pub mod sample;
pub mod serialize;
pub mod util;
