use std::collections::HashSet;

use anyhow::bail;
use bio::io::fasta::Record;
use hashbrown::HashMap;
use log::info;

use crate::alphabets::GAP;
use crate::asr::AsrError;
use crate::io::DataError;
use crate::tree::Tree;
use crate::Result;

/// Leaf sequences of the alignment, with a lookup by sequence id.
#[derive(Debug, Clone)]
pub struct Sequences {
    pub(crate) s: Vec<Record>,
    pub(crate) aligned: bool,
    pub(crate) msa_len: usize,
    index: HashMap<String, usize>,
}

impl PartialEq for Sequences {
    fn eq(&self, other: &Self) -> bool {
        self.s == other.s
    }
}

impl Sequences {
    pub fn new(s: Vec<Record>) -> Sequences {
        let len = s.first().map_or(0, |rec| rec.seq().len());
        let aligned = s.iter().all(|rec| rec.seq().len() == len);
        let index = s
            .iter()
            .enumerate()
            .map(|(i, rec)| (rec.id().to_string(), i))
            .collect();
        Sequences {
            s,
            aligned,
            msa_len: if aligned { len } else { 0 },
            index,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.s.iter()
    }

    pub fn len(&self) -> usize {
        self.s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    pub fn record(&self, idx: usize) -> &Record {
        &self.s[idx]
    }

    pub fn record_by_id(&self, id: &str) -> Option<&Record> {
        self.index.get(id).map(|&idx| &self.s[idx])
    }

    pub fn ids(&self) -> Vec<String> {
        self.s.iter().map(|rec| rec.id().to_string()).collect()
    }

    pub fn aligned(&self) -> bool {
        self.aligned
    }

    /// Alignment length, zero if the sequences are not aligned.
    pub fn msa_len(&self) -> usize {
        self.msa_len
    }

    /// Bails with the first sequence whose length differs from the first sequence's.
    pub fn check_aligned(&self) -> Result<()> {
        let expected = self.s.first().map_or(0, |rec| rec.seq().len());
        if let Some(rec) = self.s.iter().find(|rec| rec.seq().len() != expected) {
            bail!(AsrError::SequenceLengthMismatch {
                node: rec.id().to_string(),
                expected,
                actual: rec.seq().len(),
            });
        }
        Ok(())
    }

    /// Number of gap symbols per alignment column.
    pub fn gap_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.msa_len];
        for rec in self.s.iter() {
            for (count, &c) in counts.iter_mut().zip(rec.seq()) {
                if c == GAP {
                    *count += 1;
                }
            }
        }
        counts
    }
}

pub fn sequence_ids_are_unique(sequences: &Sequences) -> Result<()> {
    let mut seen = HashSet::with_capacity(sequences.len());
    for rec in sequences.iter() {
        if !seen.insert(rec.id()) {
            bail!(DataError {
                message: format!("Sequence id {} appears more than once", rec.id())
            });
        }
    }
    Ok(())
}

/// Checks that the ids of the tree leaves and the sequences match, bails with an error otherwise.
pub fn validate_taxa_ids(tree: &Tree, sequences: &Sequences) -> Result<()> {
    let tip_ids: HashSet<String> = HashSet::from_iter(tree.leaf_ids());
    let sequence_ids: HashSet<String> = HashSet::from_iter(sequences.ids());
    info!("Checking that tree tip and sequence IDs match");
    let mut missing_tips = sequence_ids.difference(&tip_ids).collect::<Vec<_>>();
    if !missing_tips.is_empty() {
        missing_tips.sort();
        bail!(DataError {
            message: format!("Mismatched IDs found, missing tree tip IDs: {missing_tips:?}")
        });
    }
    let mut missing_seqs = tip_ids.difference(&sequence_ids).collect::<Vec<_>>();
    if !missing_seqs.is_empty() {
        missing_seqs.sort();
        bail!(DataError {
            message: format!("Mismatched IDs found, missing sequence IDs: {missing_seqs:?}")
        });
    }
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage, coverage(off))]
mod tests;
