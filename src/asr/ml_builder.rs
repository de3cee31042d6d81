use anyhow::bail;
use log::debug;

use crate::asr::{AncestralSequences, AsrError, PositionProblem};
use crate::probabilities::ProbabilityIndex;
use crate::tree::{NodeIdx, Tree};
use crate::Result;

/// Picks the most likely symbol per position of an internal node.
#[derive(Debug, Clone, Copy)]
pub struct MLSequenceBuilder<'a> {
    index: &'a ProbabilityIndex,
    msa_len: usize,
}

impl<'a> MLSequenceBuilder<'a> {
    pub fn new(index: &'a ProbabilityIndex, msa_len: usize) -> Self {
        Self { index, msa_len }
    }

    /// Ungapped maximum likelihood sequence of the node with the given id.
    pub fn build(&self, node_id: &str) -> Result<Vec<u8>> {
        let probs = self.index.node_probs(node_id)?;
        if probs.nrows() != self.msa_len {
            let (offset, problem) = if probs.nrows() < self.msa_len {
                (probs.nrows(), PositionProblem::Missing)
            } else {
                (self.msa_len, PositionProblem::OutOfRange)
            };
            bail!(AsrError::IncompletePositions {
                node: node_id.to_string(),
                position: self.index.first_position() + offset,
                problem,
            });
        }
        let alphabet = self.index.alphabet();
        Ok(probs
            .row_iter()
            .map(|row| alphabet.symbol(max_likelihood_column(row.iter())))
            .collect())
    }

    /// Builds the sequences of all internal nodes that have none yet.
    pub fn build_all(&self, tree: &Tree, seqs: &mut AncestralSequences) -> Result<()> {
        let pending: Vec<NodeIdx> = tree
            .preorder()
            .iter()
            .filter(|idx| matches!(idx, NodeIdx::Internal(_)) && !seqs.contains(idx))
            .copied()
            .collect();
        debug!("Building {} maximum likelihood sequences", pending.len());
        for (idx, seq) in build_pending(self, tree, &pending)? {
            seqs.insert(idx, seq);
        }
        Ok(())
    }
}

cfg_if::cfg_if! {
if #[cfg(feature = "par-asr")] {
fn build_pending(
    builder: &MLSequenceBuilder,
    tree: &Tree,
    pending: &[NodeIdx],
) -> Result<Vec<(NodeIdx, Vec<u8>)>> {
    use rayon::prelude::*;
    pending
        .par_iter()
        .map(|idx| Ok((*idx, builder.build(tree.node_id(idx))?)))
        .collect()
}
} else {
fn build_pending(
    builder: &MLSequenceBuilder,
    tree: &Tree,
    pending: &[NodeIdx],
) -> Result<Vec<(NodeIdx, Vec<u8>)>> {
    pending
        .iter()
        .map(|idx| Ok((*idx, builder.build(tree.node_id(idx))?)))
        .collect()
}
}
}

/// Column of the largest probability. Ties go to the first maximal column.
pub fn max_likelihood_column<'p>(probs: impl IntoIterator<Item = &'p f64>) -> usize {
    let mut best = 0;
    let mut best_prob = f64::NEG_INFINITY;
    for (column, &prob) in probs.into_iter().enumerate() {
        if prob > best_prob {
            best = column;
            best_prob = prob;
        }
    }
    best
}
