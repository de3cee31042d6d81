use bio::io::fasta::Record;

use crate::sequences::Sequences;
use crate::tree::Tree;

mod phyloinfo_builder;
pub use phyloinfo_builder::*;

/// The PhyloInfo struct bundles the tree and the aligned leaf sequences an ancestral
/// reconstruction runs on.
///
/// The struct can be built using the PhyloInfoBuilder from a fasta sequence file and a newick
/// tree file. The sequences need to be aligned and their ids need to match the tree leaves.
#[derive(Debug, Clone)]
pub struct PhyloInfo {
    /// Phylogenetic tree.
    pub tree: Tree,
    /// Aligned leaf sequences.
    pub sequences: Sequences,
}

impl PhyloInfo {
    /// Returns the number of sites in the alignment.
    pub fn msa_length(&self) -> usize {
        self.sequences.msa_len()
    }

    /// Returns the leaf sequence with the given id, if there is one.
    pub fn leaf_seq_by_id(&self, id: &str) -> Option<&Record> {
        self.sequences.record_by_id(id)
    }

    /// Alignment columns in which every leaf has a gap.
    pub fn all_gap_columns(&self) -> Vec<usize> {
        let n = self.sequences.len();
        self.sequences
            .gap_counts()
            .into_iter()
            .enumerate()
            .filter(|&(_, count)| n > 0 && count == n)
            .map(|(column, _)| column)
            .collect()
    }
}
