use std::path::{Path, PathBuf};

use anyhow::bail;
use log::{info, warn};

use crate::alphabets::sequence_type;
use crate::io::{self, DataError};
use crate::phylo_info::PhyloInfo;
use crate::sequences::{sequence_ids_are_unique, validate_taxa_ids, Sequences};
use crate::tree::{node_ids_are_unique, Tree};
use crate::Result;

pub struct PhyloInfoBuilder {
    sequence_file: PathBuf,
    tree_file: PathBuf,
}

impl PhyloInfoBuilder {
    /// Creates a new PhyloInfoBuilder struct with the sequence and tree file paths set.
    ///
    /// # Arguments
    /// * `sequence_file` - File path to the sequence fasta file.
    /// * `tree_file` - File path to the tree newick file.
    ///
    /// # Example
    /// ```
    /// use std::path::PathBuf;
    /// use asr_gaps::phylo_info::PhyloInfoBuilder;
    /// let builder = PhyloInfoBuilder::with_attrs(
    ///     PathBuf::from("./data/msa.fasta"),
    ///     PathBuf::from("./data/tree.tre"));
    /// ```
    pub fn with_attrs(sequence_file: PathBuf, tree_file: PathBuf) -> PhyloInfoBuilder {
        PhyloInfoBuilder {
            sequence_file,
            tree_file,
        }
    }

    /// Builds the PhyloInfo struct from the sequence file and the tree file.
    /// If the provided tree file has more than one tree, only the first tree will be processed.
    /// Bails if no sequences are provided.
    /// Bails if the IDs of the tree leaves and the sequences do not match.
    /// Bails if the sequences are not aligned.
    ///
    /// # Example
    /// ```
    /// use std::path::PathBuf;
    /// use asr_gaps::phylo_info::PhyloInfoBuilder;
    /// let info = PhyloInfoBuilder::with_attrs(
    ///     PathBuf::from("./data/msa.fasta"),
    ///     PathBuf::from("./data/tree.tre"))
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(info.msa_length(), 24);
    /// assert_eq!(info.sequences.len(), 6);
    /// assert_eq!(info.tree.leaves().len(), 6);
    /// assert_eq!(info.tree.len(), 11);
    /// ```
    pub fn build(self) -> Result<PhyloInfo> {
        let sequences = Sequences::new(io::read_sequences(&self.sequence_file)?);
        info!("{} sequence(s) read successfully", sequences.len());
        sequence_ids_are_unique(&sequences)?;
        info!(
            "Sequences look like {} sequences",
            sequence_type(&sequences.s)
        );

        let tree = self.read_tree(&sequences, &self.tree_file)?;

        if !sequences.aligned() {
            sequences.check_aligned()?;
        }
        info!("Sequences are aligned, alignment length {}", sequences.msa_len());
        let info = PhyloInfo { tree, sequences };
        let all_gaps = info.all_gap_columns();
        if !all_gaps.is_empty() {
            warn!(
                "{} alignment column(s) contain only gaps: {:?}",
                all_gaps.len(),
                all_gaps
            );
        }
        Ok(info)
    }

    fn read_tree(&self, sequences: &Sequences, tree_file: &Path) -> Result<Tree> {
        let mut trees = io::read_newick_from_file(tree_file)?;
        info!("{} tree(s) read successfully", trees.len());
        self.check_tree_number(&trees)?;
        let tree = trees.remove(0);
        node_ids_are_unique(&tree)?;
        validate_taxa_ids(&tree, sequences)?;
        Ok(tree)
    }

    /// Checks that there is at least one tree in the vector, bails with an error otherwise.
    /// Prints a warning if there is more than one tree because only the first tree will be processed.
    fn check_tree_number(&self, trees: &[Tree]) -> Result<()> {
        if trees.is_empty() {
            bail!(DataError {
                message: String::from("No trees in the tree file, aborting")
            });
        }
        if trees.len() > 1 {
            warn!("More than one tree in the tree file, only the first tree will be processed");
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage, coverage(off))]
pub mod private_tests {
    use std::path::PathBuf;

    use super::PhyloInfoBuilder as PIB;

    #[test]
    fn builder_attrs() {
        let fasta = PathBuf::from("./data/msa.fasta");
        let newick = PathBuf::from("./data/tree.tre");
        let builder = PIB::with_attrs(fasta.clone(), newick.clone());
        assert_eq!(builder.sequence_file, fasta);
        assert_eq!(builder.tree_file, newick);
        assert!(PIB::check_tree_number(&builder, &[]).is_err());
    }
}
