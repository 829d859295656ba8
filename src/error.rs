//! Errors reported while loading a circuit.
use thiserror::Error;

/// Why a `.nnf` file could not be turned into a circuit. Any of these means the
/// input must be discarded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read circuit: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing `nnf <nodes> <edges> <variables>` header")]
    MissingHeader,

    #[error("line {line}: malformed header `{text}`")]
    MalformedHeader { line: usize, text: String },

    #[error("line {line}: malformed node `{text}`")]
    MalformedNode { line: usize, text: String },

    #[error("line {line}: literal with variable 0")]
    ZeroLiteral { line: usize },

    #[error("line {line}: variable {var} out of range for {num_vars} variables")]
    VariableOutOfRange {
        line: usize,
        var: u64,
        num_vars: usize,
    },

    #[error("line {line}: node {node} refers to child {child}, which does not precede it")]
    ChildOutOfOrder {
        line: usize,
        node: usize,
        child: usize,
    },

    #[error("line {line}: expected {expected} children, found {found}")]
    ChildCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("header declares {expected} nodes but {found} were read")]
    MissingNodes { expected: usize, found: usize },

    #[error("line {line}: more nodes than the {expected} declared in the header")]
    TooManyNodes { line: usize, expected: usize },

    #[error("circuit has no nodes")]
    Empty,

    #[error("line {line}: {num_vars} variables do not fit a literal weight vector")]
    TooManyVariables { line: usize, num_vars: usize },
}
