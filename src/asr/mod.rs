use anyhow::bail;
use bio::io::fasta::Record;
use hashbrown::HashMap;
use log::{info, warn};

use crate::probabilities::{ProbabilityIndex, ProbabilityTable};
use crate::sequences::{sequence_ids_are_unique, validate_taxa_ids, Sequences};
use crate::tree::{
    branch_lengths_are_valid, internal_ids_are_present, node_ids_are_unique, NodeIdx, Tree,
};
use crate::Result;

mod asr_error;
pub use asr_error::*;
pub mod gap_propagation;
pub mod ml_builder;

use gap_propagation::GapPropagator;
use ml_builder::MLSequenceBuilder;

/// Reconstructed sequences of the internal nodes, keyed by node index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AncestralSequences {
    seqs: HashMap<NodeIdx, Vec<u8>>,
}

impl AncestralSequences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, node_idx: &NodeIdx) -> bool {
        self.seqs.contains_key(node_idx)
    }

    pub fn get(&self, node_idx: &NodeIdx) -> Option<&[u8]> {
        self.seqs.get(node_idx).map(|seq| seq.as_slice())
    }

    pub fn get_by_id(&self, tree: &Tree, id: &str) -> Option<&[u8]> {
        tree.try_idx(id).ok().and_then(|idx| self.get(&idx))
    }

    /// Inserts the sequence of a node only if the node has none yet, returns whether it did.
    pub fn insert(&mut self, node_idx: NodeIdx, seq: Vec<u8>) -> bool {
        if self.seqs.contains_key(&node_idx) {
            return false;
        }
        self.seqs.insert(node_idx, seq);
        true
    }

    pub(crate) fn get_mut(&mut self, node_idx: &NodeIdx) -> Option<&mut Vec<u8>> {
        self.seqs.get_mut(node_idx)
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    /// FASTA records named by node id, in tree preorder.
    pub fn to_records(&self, tree: &Tree) -> Vec<Record> {
        tree.preorder()
            .iter()
            .filter_map(|idx| {
                self.get(idx)
                    .map(|seq| Record::with_attrs(tree.node_id(idx), None, seq))
            })
            .collect()
    }
}

pub trait AncestralSequenceReconstruction {
    fn reconstruct_ancestral_seqs(
        &self,
        leaf_seqs: &Sequences,
        tree: &Tree,
    ) -> Result<AncestralSequences> {
        if leaf_seqs.len() != tree.n {
            bail!(
                "Alignment has {} sequences, but tree has {} leaves.",
                leaf_seqs.len(),
                tree.n
            );
        }
        node_ids_are_unique(tree)?;
        sequence_ids_are_unique(leaf_seqs)?;
        validate_taxa_ids(tree, leaf_seqs)?;
        internal_ids_are_present(tree)?;
        branch_lengths_are_valid(tree)?;
        leaf_seqs.check_aligned()?;

        self.reconstruct_ancestral_seqs_unchecked(leaf_seqs, tree)
    }

    fn reconstruct_ancestral_seqs_unchecked(
        &self,
        leaf_seqs: &Sequences,
        tree: &Tree,
    ) -> Result<AncestralSequences>;
}

/// Maximum likelihood ancestral states with gaps placed by branch length weighted voting of
/// the children.
#[derive(Debug, Clone)]
pub struct GapWeightedAsr {
    index: ProbabilityIndex,
}

impl GapWeightedAsr {
    pub fn new(table: &ProbabilityTable, first_position: usize) -> Result<Self> {
        Ok(Self {
            index: table.index(first_position)?,
        })
    }

    pub fn index(&self) -> &ProbabilityIndex {
        &self.index
    }

    /// Ids in the probability table that are not internal nodes of the tree.
    pub fn unknown_table_nodes(&self, tree: &Tree) -> Vec<String> {
        let internal_ids: Vec<&str> = tree
            .internals()
            .iter()
            .map(|node| node.id.as_str())
            .collect();
        self.index
            .node_ids()
            .into_iter()
            .filter(|id| !internal_ids.contains(id))
            .map(|id| id.to_string())
            .collect()
    }
}

impl AncestralSequenceReconstruction for GapWeightedAsr {
    fn reconstruct_ancestral_seqs_unchecked(
        &self,
        leaf_seqs: &Sequences,
        tree: &Tree,
    ) -> Result<AncestralSequences> {
        let unknown = self.unknown_table_nodes(tree);
        if !unknown.is_empty() {
            warn!(
                "Ignoring probabilities of {} nodes that are not internal tree nodes: {:?}",
                unknown.len(),
                unknown
            );
        }
        if self.index.alphabet().has_gap() {
            info!("Probability table has a gap column, gaps can also be maximum likelihood states");
        }
        let msa_len = leaf_seqs.msa_len();
        let mut ancestral = AncestralSequences::new();

        info!("Building maximum likelihood sequences");
        MLSequenceBuilder::new(&self.index, msa_len).build_all(tree, &mut ancestral)?;

        info!("Propagating gaps from the leaves to the root");
        GapPropagator::new(tree, leaf_seqs, msa_len).propagate(&mut ancestral)?;

        info!(
            "Finished reconstructing {} ancestral sequences successfully",
            ancestral.len()
        );
        Ok(ancestral)
    }
}

#[cfg(test)]
#[cfg_attr(coverage, coverage(off))]
mod tests;
