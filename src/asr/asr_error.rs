use std::error::Error;
use std::fmt;

/// What is wrong with the positions of a node's probability rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionProblem {
    Missing,
    Duplicated,
    OutOfRange,
}

impl fmt::Display for PositionProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionProblem::Missing => write!(f, "is missing"),
            PositionProblem::Duplicated => write!(f, "appears more than once"),
            PositionProblem::OutOfRange => write!(f, "lies outside of the alignment"),
        }
    }
}

/// Errors of the ancestral reconstruction. Any of them aborts the reconstruction of the whole
/// tree, since a single bad node would spread wrong gap decisions to all of its ancestors.
#[derive(Debug, Clone, PartialEq)]
pub enum AsrError {
    MissingNodeData {
        node: String,
    },
    IncompletePositions {
        node: String,
        position: usize,
        problem: PositionProblem,
    },
    NonNumericProbability {
        node: String,
        position: usize,
        column: char,
        value: String,
    },
    UnknownNodeId {
        node: String,
        parent: String,
    },
    SequenceLengthMismatch {
        node: String,
        expected: usize,
        actual: usize,
    },
    UnprocessedChild {
        node: String,
        child: String,
    },
}

impl fmt::Display for AsrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsrError::MissingNodeData { node } => {
                write!(f, "No probabilities found for node {}", node)
            }
            AsrError::IncompletePositions {
                node,
                position,
                problem,
            } => write!(
                f,
                "Probabilities for node {}: position {} {}",
                node, position, problem
            ),
            AsrError::NonNumericProbability {
                node,
                position,
                column,
                value,
            } => write!(
                f,
                "Probability \"{}\" for node {} at position {} in column {} is not a number",
                value, node, position, column
            ),
            AsrError::UnknownNodeId { node, parent } => write!(
                f,
                "Child {} of node {} has no sequence, the id is unknown",
                node, parent
            ),
            AsrError::SequenceLengthMismatch {
                node,
                expected,
                actual,
            } => write!(
                f,
                "Sequence of node {} has length {}, but the alignment length is {}",
                node, actual, expected
            ),
            AsrError::UnprocessedChild { node, child } => write!(
                f,
                "Node {} was visited before its child {} had been processed",
                node, child
            ),
        }
    }
}

impl Error for AsrError {}
