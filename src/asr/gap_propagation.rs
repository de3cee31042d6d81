use anyhow::bail;
use log::debug;

use crate::alphabets::GAP;
use crate::asr::{AncestralSequences, AsrError};
use crate::sequences::Sequences;
use crate::tree::{NodeIdx, Tree};
use crate::Result;

/// Accumulated gap weights per node and alignment column.
///
/// A positive weight means that the children of the node, weighted by branch length, favour a
/// gap in that column. Leaves are never stored and carry a weight of zero.
#[derive(Debug, Clone, PartialEq)]
pub struct GapWeights {
    weights: Vec<Option<Vec<f64>>>,
}

impl GapWeights {
    pub fn new(tree_len: usize) -> Self {
        Self {
            weights: vec![None; tree_len],
        }
    }

    pub fn get(&self, node_idx: &NodeIdx) -> Option<&[f64]> {
        self.weights[usize::from(node_idx)].as_deref()
    }

    /// Weight of a node in one column, zero for nodes without stored weights.
    pub fn weight(&self, node_idx: &NodeIdx, column: usize) -> f64 {
        self.get(node_idx).map_or(0.0, |weights| weights[column])
    }

    pub fn set(&mut self, node_idx: &NodeIdx, weights: Vec<f64>) {
        self.weights[usize::from(node_idx)] = Some(weights);
    }

    pub fn is_processed(&self, node_idx: &NodeIdx) -> bool {
        self.weights[usize::from(node_idx)].is_some()
    }
}

/// Turns ungapped maximum likelihood sequences into gapped ones, visiting internal nodes
/// children first.
#[derive(Debug, Clone, Copy)]
pub struct GapPropagator<'a> {
    tree: &'a Tree,
    leaves: &'a Sequences,
    msa_len: usize,
}

impl<'a> GapPropagator<'a> {
    pub fn new(tree: &'a Tree, leaves: &'a Sequences, msa_len: usize) -> Self {
        Self {
            tree,
            leaves,
            msa_len,
        }
    }

    /// Places gaps in the sequences of all internal nodes and returns the weights that decided
    /// them.
    pub fn propagate(&self, seqs: &mut AncestralSequences) -> Result<GapWeights> {
        let mut weights = GapWeights::new(self.tree.len());
        self.propagate_in_order(&self.tree.internal_postorder(), seqs, &mut weights)?;
        Ok(weights)
    }

    /// Processes the given internal nodes in the given order. Bails with
    /// [`AsrError::UnprocessedChild`] if a node comes before one of its internal children.
    pub fn propagate_in_order(
        &self,
        order: &[NodeIdx],
        seqs: &mut AncestralSequences,
        weights: &mut GapWeights,
    ) -> Result<()> {
        for node_idx in order {
            self.propagate_node(node_idx, seqs, weights)?;
        }
        debug!("Propagated gaps through {} internal nodes", order.len());
        Ok(())
    }

    fn propagate_node(
        &self,
        node_idx: &NodeIdx,
        seqs: &mut AncestralSequences,
        weights: &mut GapWeights,
    ) -> Result<()> {
        let node_id = self.tree.node_id(node_idx);
        let mut node_weights = vec![0.0; self.msa_len];
        for (child_idx, blen) in self.tree.children_with_blens(node_idx) {
            if matches!(child_idx, NodeIdx::Internal(_)) && !weights.is_processed(&child_idx) {
                bail!(AsrError::UnprocessedChild {
                    node: node_id.to_string(),
                    child: self.tree.node_id(&child_idx).to_string(),
                });
            }
            let child_seq = self.child_seq(&child_idx, node_id, seqs)?;
            for (column, weight) in node_weights.iter_mut().enumerate() {
                *weight += weights.weight(&child_idx, column);
                if child_seq[column] == GAP {
                    *weight += blen;
                } else {
                    *weight -= blen;
                }
            }
        }

        let Some(seq) = seqs.get_mut(node_idx) else {
            bail!(AsrError::MissingNodeData {
                node: node_id.to_string()
            });
        };
        self.check_len(node_id, seq)?;
        for (symbol, weight) in seq.iter_mut().zip(node_weights.iter()) {
            if *weight > 0.0 {
                *symbol = GAP;
            }
        }
        weights.set(node_idx, node_weights);
        Ok(())
    }

    fn child_seq<'s>(
        &'s self,
        child_idx: &NodeIdx,
        parent_id: &str,
        seqs: &'s AncestralSequences,
    ) -> Result<&'s [u8]> {
        let child_id = self.tree.node_id(child_idx);
        let seq = match child_idx {
            NodeIdx::Leaf(_) => self.leaves.record_by_id(child_id).map(|rec| rec.seq()),
            NodeIdx::Internal(_) => seqs.get(child_idx),
        };
        let Some(seq) = seq else {
            bail!(AsrError::UnknownNodeId {
                node: child_id.to_string(),
                parent: parent_id.to_string(),
            });
        };
        self.check_len(child_id, seq)?;
        Ok(seq)
    }

    fn check_len(&self, node_id: &str, seq: &[u8]) -> Result<()> {
        if seq.len() != self.msa_len {
            bail!(AsrError::SequenceLengthMismatch {
                node: node_id.to_string(),
                expected: self.msa_len,
                actual: seq.len(),
            });
        }
        Ok(())
    }
}
