//! Core datastructures: circuits, variables and literals, assignments and
//! literal weights

pub mod circuit;
pub mod model;
pub mod var_label;
pub mod wmc;

pub use self::circuit::{Circuit, Node, NodeKind};
pub use self::model::Assignment;
pub use self::var_label::{Literal, VarLabel, VarSet};
pub use self::wmc::LiteralWeights;
