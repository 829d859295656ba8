//! Loader for the `.nnf` text format produced by d-DNNF compilers.
//!
//! ```text
//! nnf <nodes> <edges> <variables>
//! L <signed literal>             literal; |lit| - 1 is the variable
//! A <k> <child_1> ... <child_k>  conjunction; `A 0` is true
//! O <j> <c> <child_1> ... <child_c>
//!                                disjunction; `O j 0` is false
//! ```
//!
//! Nodes are listed bottom-up: a node may only refer to nodes on earlier lines,
//! and the last node is the root. Blank lines and comment lines (`c ...`) are
//! skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::error::LoadError;
use crate::repr::{circuit::Circuit, var_label::Literal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub num_vars: usize,
}

/// Builds a circuit one `.nnf` line at a time.
struct NnfParser {
    header: Option<Header>,
    circuit: Circuit,
}

impl NnfParser {
    fn new() -> NnfParser {
        NnfParser {
            header: None,
            circuit: Circuit::new(0),
        }
    }

    fn parse_line(&mut self, line: usize, text: &str) -> Result<(), LoadError> {
        let items: Vec<&str> = text.split_whitespace().collect();
        if items.is_empty() || items[0] == "c" {
            return Ok(());
        }
        match self.header {
            None => {
                let header = parse_header(line, &items)?;
                debug!(
                    nodes = header.num_nodes,
                    edges = header.num_edges,
                    variables = header.num_vars,
                    "read nnf header"
                );
                if header.num_nodes == 0 {
                    return Err(LoadError::Empty);
                }
                if !literal_vector_fits(header.num_vars) {
                    return Err(LoadError::TooManyVariables {
                        line,
                        num_vars: header.num_vars,
                    });
                }
                // the header is untrusted, so nothing is reserved up front
                self.circuit = Circuit::new(header.num_vars);
                self.header = Some(header);
                Ok(())
            }
            Some(header) => {
                if self.circuit.num_nodes() == header.num_nodes {
                    return Err(LoadError::TooManyNodes {
                        line,
                        expected: header.num_nodes,
                    });
                }
                match items[0] {
                    "L" => self.parse_literal(line, text, &items),
                    "A" => self.parse_and(line, text, &items),
                    "O" => self.parse_or(line, text, &items),
                    _ => Err(malformed(line, text)),
                }
            }
        }
    }

    fn parse_literal(&mut self, line: usize, text: &str, items: &[&str]) -> Result<(), LoadError> {
        if items.len() != 2 {
            return Err(malformed(line, text));
        }
        let value: i64 = items[1].parse().map_err(|_| malformed(line, text))?;
        let lit = Literal::from_dimacs(value).ok_or(LoadError::ZeroLiteral { line })?;
        let num_vars = self.circuit.num_vars();
        if lit.label().value_usize() >= num_vars {
            return Err(LoadError::VariableOutOfRange {
                line,
                var: lit.label().value(),
                num_vars,
            });
        }
        self.circuit.add_literal(lit);
        Ok(())
    }

    fn parse_and(&mut self, line: usize, text: &str, items: &[&str]) -> Result<(), LoadError> {
        if items.len() < 2 {
            return Err(malformed(line, text));
        }
        let expected: usize = items[1].parse().map_err(|_| malformed(line, text))?;
        let children = self.parse_children(line, text, &items[2..])?;
        if children.len() != expected {
            return Err(LoadError::ChildCount {
                line,
                expected,
                found: children.len(),
            });
        }
        self.circuit.add_and(&children);
        Ok(())
    }

    fn parse_or(&mut self, line: usize, text: &str, items: &[&str]) -> Result<(), LoadError> {
        if items.len() < 3 {
            return Err(malformed(line, text));
        }
        // the decision variable `j` is not needed by any query
        let _: usize = items[1].parse().map_err(|_| malformed(line, text))?;
        let expected: usize = items[2].parse().map_err(|_| malformed(line, text))?;
        if expected == 0 {
            // `O j 0`, also spelled `O 0 0 0`
            return match &items[3..] {
                [] | ["0"] => {
                    self.circuit.add_false();
                    Ok(())
                }
                _ => Err(malformed(line, text)),
            };
        }
        let children = self.parse_children(line, text, &items[3..])?;
        if children.len() != expected {
            return Err(LoadError::ChildCount {
                line,
                expected,
                found: children.len(),
            });
        }
        self.circuit.add_or(&children);
        Ok(())
    }

    fn parse_children(&self, line: usize, text: &str, items: &[&str]) -> Result<Vec<usize>, LoadError> {
        let node = self.circuit.num_nodes();
        items
            .iter()
            .map(|item| {
                let child: usize = item.parse().map_err(|_| malformed(line, text))?;
                if child >= node {
                    return Err(LoadError::ChildOutOfOrder { line, node, child });
                }
                Ok(child)
            })
            .collect()
    }

    fn finish(self) -> Result<Circuit, LoadError> {
        let header = self.header.ok_or(LoadError::MissingHeader)?;
        if self.circuit.num_nodes() != header.num_nodes {
            return Err(LoadError::MissingNodes {
                expected: header.num_nodes,
                found: self.circuit.num_nodes(),
            });
        }
        if self.circuit.num_edges() != header.num_edges {
            warn!(
                declared = header.num_edges,
                found = self.circuit.num_edges(),
                "edge count differs from the nnf header"
            );
        }
        Ok(self.circuit)
    }
}

/// whether `2 * num_vars` weights can be addressed by a single allocation
fn literal_vector_fits(num_vars: usize) -> bool {
    num_vars
        .checked_mul(2 * std::mem::size_of::<f64>())
        .map_or(false, |bytes| bytes <= isize::MAX as usize)
}

fn malformed(line: usize, text: &str) -> LoadError {
    LoadError::MalformedNode {
        line,
        text: text.trim().to_owned(),
    }
}

fn parse_header(line: usize, items: &[&str]) -> Result<Header, LoadError> {
    let bad = || LoadError::MalformedHeader {
        line,
        text: items.join(" "),
    };
    if items.len() != 4 || !(items[0] == "nnf" || items[0] == "Nnf") {
        return Err(bad());
    }
    let field = |i: usize| items[i].parse::<usize>().map_err(|_| bad());
    Ok(Header {
        num_nodes: field(1)?,
        num_edges: field(2)?,
        num_vars: field(3)?,
    })
}

impl Circuit {
    /// Loads a circuit from the contents of a `.nnf` file
    /// ```
    /// use ddnnf::repr::Circuit;
    ///
    /// let c = Circuit::from_nnf_str("nnf 3 2 1\nL 1\nL -1\nO 0 2 0 1\n").unwrap();
    /// assert_eq!(c.num_nodes(), 3);
    /// assert_eq!(c.num_vars(), 1);
    /// ```
    pub fn from_nnf_str(s: &str) -> Result<Circuit, LoadError> {
        Circuit::from_reader(s.as_bytes())
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Circuit, LoadError> {
        let mut parser = NnfParser::new();
        for (idx, text) in reader.lines().enumerate() {
            parser.parse_line(idx + 1, &text?)?;
        }
        parser.finish()
    }

    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Circuit, LoadError> {
        let file = File::open(path.as_ref())?;
        let circuit = Circuit::from_reader(BufReader::new(file))?;
        debug!(
            nodes = circuit.num_nodes(),
            edges = circuit.num_edges(),
            "loaded circuit"
        );
        Ok(circuit)
    }
}

#[cfg(test)]
mod test_nnf {
    use super::*;
    use crate::repr::{circuit::NodeKind, var_label::VarLabel};

    #[test]
    fn loads_tautology() {
        let c = Circuit::from_nnf_str("nnf 3 2 1\nL 1\nL -1\nO 0 2 0 1\n").unwrap();
        assert_eq!(c.kind(0), NodeKind::Lit(Literal::new(VarLabel::new(0), true)));
        assert_eq!(c.kind(1), NodeKind::Lit(Literal::new(VarLabel::new(0), false)));
        assert_eq!(c.kind(2), NodeKind::Or);
        assert_eq!(c.children(2), &[0, 1]);
        assert!(c.edge_label(2, 0).is_empty());
    }

    #[test]
    fn constants_and_comments() {
        let src = "c a comment\nnnf 5 2 2\n\nL 2\nA 0\nO 0 0\nO 0 0 0\nA 2 0 1\n";
        let c = Circuit::from_nnf_str(src).unwrap();
        assert_eq!(c.kind(1), NodeKind::True);
        assert_eq!(c.kind(2), NodeKind::False);
        assert_eq!(c.kind(3), NodeKind::False);
        assert_eq!(c.kind(4), NodeKind::And);
    }

    #[test]
    fn or_labels_are_derived() {
        // x1 ∨ (¬x1 ∧ x2)
        let src = "nnf 5 4 2\nL 1\nL -1\nL 2\nA 2 1 2\nO 1 2 0 3\n";
        let c = Circuit::from_nnf_str(src).unwrap();
        assert_eq!(c.edge_label(4, 0), &[VarLabel::new(1)]);
        assert!(c.edge_label(4, 3).is_empty());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            Circuit::from_nnf_str("cnf 1 0 1\nL 1\n"),
            Err(LoadError::MalformedHeader { line: 1, .. })
        ));
        assert!(matches!(
            Circuit::from_nnf_str("nnf 1 0 1\nL 0\n"),
            Err(LoadError::ZeroLiteral { line: 2 })
        ));
        assert!(matches!(
            Circuit::from_nnf_str("nnf 1 0 1\nL 2\n"),
            Err(LoadError::VariableOutOfRange { var: 1, .. })
        ));
        assert!(matches!(
            Circuit::from_nnf_str("nnf 2 1 1\nL 1\nA 1 1\n"),
            Err(LoadError::ChildOutOfOrder { node: 1, child: 1, .. })
        ));
        assert!(matches!(
            Circuit::from_nnf_str("nnf 2 1 1\nL 1\nA 2 0\n"),
            Err(LoadError::ChildCount { expected: 2, found: 1, .. })
        ));
        assert!(matches!(
            Circuit::from_nnf_str("nnf 2 0 1\nL 1\n"),
            Err(LoadError::MissingNodes { expected: 2, found: 1 })
        ));
        assert!(matches!(
            Circuit::from_nnf_str("nnf 1 0 1\nL 1\nL -1\n"),
            Err(LoadError::TooManyNodes { line: 3, .. })
        ));
        assert!(matches!(
            Circuit::from_nnf_str("nnf 1 0 1\nX 1\n"),
            Err(LoadError::MalformedNode { line: 2, .. })
        ));
        assert!(matches!(
            Circuit::from_nnf_str("nnf 100000000000000 0 1\nL 1\n"),
            Err(LoadError::MissingNodes { expected: 100000000000000, found: 1 })
        ));
        assert!(matches!(
            Circuit::from_nnf_str("nnf 1 0 9223372036854775807\nA 0\n"),
            Err(LoadError::TooManyVariables { line: 1, .. })
        ));
        assert!(matches!(Circuit::from_nnf_str(""), Err(LoadError::MissingHeader)));
        assert!(matches!(Circuit::from_nnf_str("nnf 0 0 0\n"), Err(LoadError::Empty)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            Circuit::from_file("/nonexistent/circuit.nnf"),
            Err(LoadError::Io(_))
        ));
    }
}
