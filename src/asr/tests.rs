use assert_matches::assert_matches;

use crate::asr::{
    AncestralSequenceReconstruction, AncestralSequences, AsrError, GapWeightedAsr,
};
use crate::io::DataError;
use crate::probabilities::ProbabilityTable;
use crate::sequences::Sequences;
use crate::{record_wo_desc as record, tree};

const SYMBOLS: [&str; 4] = ["A", "C", "G", "T"];

/// Table in which the given symbol of every position is the most likely one.
fn peaked_table(ml_seqs: &[(&str, &str)]) -> ProbabilityTable {
    let header: Vec<&str> = ["node", "position"].into_iter().chain(SYMBOLS).collect();
    let mut rows = Vec::new();
    for (node, seq) in ml_seqs {
        for (position, symbol) in seq.chars().enumerate() {
            let mut row = vec![node.to_string(), position.to_string()];
            row.extend(SYMBOLS.iter().map(|s| {
                if s.starts_with(symbol) {
                    "0.7".to_string()
                } else {
                    "0.1".to_string()
                }
            }));
            rows.push(row);
        }
    }
    ProbabilityTable::from_rows(&header, rows).unwrap()
}

fn leaf_seqs() -> Sequences {
    Sequences::new(vec![
        record!("A", b"A-GT"),
        record!("B", b"--GT"),
        record!("C", b"AC-T"),
        record!("D", b"ACG-"),
    ])
}

#[test]
fn ancestral_sequences_are_write_once() {
    let tree = tree!("(A:1,B:1)R;");
    let mut seqs = AncestralSequences::new();
    assert!(seqs.is_empty());
    assert!(seqs.insert(tree.root, b"AC".to_vec()));
    assert!(!seqs.insert(tree.root, b"GT".to_vec()));
    assert_eq!(seqs.get(&tree.root).unwrap(), b"AC");
    assert_eq!(seqs.len(), 1);
}

#[test]
fn records_in_preorder() {
    let tree = tree!("((A:1,B:1)I1:1,(C:1,D:1)I2:1)R;");
    let mut seqs = AncestralSequences::new();
    for id in ["I2", "R", "I1"] {
        seqs.insert(tree.try_idx(id).unwrap(), id.as_bytes().to_vec());
    }
    let records = seqs.to_records(&tree);
    let ids: Vec<&str> = records.iter().map(|rec| rec.id()).collect();
    assert_eq!(ids, vec!["R", "I1", "I2"]);
    assert_eq!(records[1].seq(), b"I1");
    assert_eq!(records[0].desc(), None);
}

#[test]
fn full_reconstruction() {
    let tree = tree!("((A:1,B:2)I1:1,(C:0.5,D:1)I2:2)R:0;");
    let table = peaked_table(&[("I1", "ACGT"), ("I2", "ACGA"), ("R", "TCGA")]);
    let asr = GapWeightedAsr::new(&table, 0).unwrap();
    assert!(asr.unknown_table_nodes(&tree).is_empty());
    let seqs = asr.reconstruct_ancestral_seqs(&leaf_seqs(), &tree).unwrap();
    assert_eq!(seqs.len(), 3);
    assert_eq!(seqs.get_by_id(&tree, "I1").unwrap(), b"--GT");
    assert_eq!(seqs.get_by_id(&tree, "I2").unwrap(), b"ACG-");
    assert_eq!(seqs.get_by_id(&tree, "R").unwrap(), b"T-GA");
}

#[test]
fn reconstruction_is_repeatable() {
    let tree = tree!("((A:1,B:2)I1:1,(C:0.5,D:1)I2:2)R:0;");
    let table = peaked_table(&[("I1", "ACGT"), ("I2", "ACGA"), ("R", "TCGA")]);
    let asr = GapWeightedAsr::new(&table, 0).unwrap();
    let leaves = leaf_seqs();
    let first = asr.reconstruct_ancestral_seqs(&leaves, &tree).unwrap();
    let second = asr.reconstruct_ancestral_seqs(&leaves, &tree).unwrap();
    assert_eq!(first, second);
}

#[test]
fn extra_table_nodes_are_ignored() {
    let tree = tree!("((A:1,B:2)I1:1,(C:0.5,D:1)I2:2)R:0;");
    let table = peaked_table(&[
        ("I1", "ACGT"),
        ("I2", "ACGA"),
        ("R", "TCGA"),
        ("X", "AAAA"),
        ("A", "CCCC"),
    ]);
    let asr = GapWeightedAsr::new(&table, 0).unwrap();
    assert_eq!(asr.unknown_table_nodes(&tree), vec!["A", "X"]);
    let seqs = asr.reconstruct_ancestral_seqs(&leaf_seqs(), &tree).unwrap();
    assert_eq!(seqs.len(), 3);
}

#[test]
fn missing_internal_node_data() {
    let tree = tree!("((A:1,B:2)I1:1,(C:0.5,D:1)I2:2)R:0;");
    let table = peaked_table(&[("I1", "ACGT"), ("R", "TCGA")]);
    let asr = GapWeightedAsr::new(&table, 0).unwrap();
    let err = asr
        .reconstruct_ancestral_seqs(&leaf_seqs(), &tree)
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<AsrError>(),
        Some(&AsrError::MissingNodeData {
            node: "I2".to_string()
        })
    );
}

#[test]
fn leaf_count_mismatch() {
    let tree = tree!("((A:1,B:2)I1:1,C:0.5)R:0;");
    let table = peaked_table(&[("I1", "ACGT"), ("R", "TCGA")]);
    let asr = GapWeightedAsr::new(&table, 0).unwrap();
    let err = asr
        .reconstruct_ancestral_seqs(&leaf_seqs(), &tree)
        .unwrap_err();
    assert!(err.to_string().contains("tree has 3 leaves"));
}

#[test]
fn unaligned_leaves() {
    let tree = tree!("((A:1,B:2)I1:1,(C:0.5,D:1)I2:2)R:0;");
    let table = peaked_table(&[("I1", "ACGT"), ("I2", "ACGA"), ("R", "TCGA")]);
    let asr = GapWeightedAsr::new(&table, 0).unwrap();
    let leaves = Sequences::new(vec![
        record!("A", b"A-GT"),
        record!("B", b"--GT"),
        record!("C", b"AC-"),
        record!("D", b"ACG-"),
    ]);
    let err = asr.reconstruct_ancestral_seqs(&leaves, &tree).unwrap_err();
    assert_matches!(
        err.downcast_ref::<AsrError>(),
        Some(AsrError::SequenceLengthMismatch { node, expected: 4, actual: 3 }) if node == "C"
    );
}

#[test]
fn unlabelled_internal_node() {
    let tree = tree!("((A:1,B:2):1,(C:0.5,D:1)I2:2)R:0;");
    let table = peaked_table(&[("I2", "ACGA"), ("R", "TCGA")]);
    let asr = GapWeightedAsr::new(&table, 0).unwrap();
    let err = asr
        .reconstruct_ancestral_seqs(&leaf_seqs(), &tree)
        .unwrap_err();
    assert!(err.downcast_ref::<DataError>().is_some());
}

#[test]
fn duplicated_node_ids() {
    let tree = tree!("((A:1,B:2)I1:1,(C:0.5,D:1)I1:2)R:0;");
    let table = peaked_table(&[("I1", "ACGT"), ("R", "TCGA")]);
    let asr = GapWeightedAsr::new(&table, 0).unwrap();
    let err = asr
        .reconstruct_ancestral_seqs(&leaf_seqs(), &tree)
        .unwrap_err();
    assert!(err.to_string().contains("I1 appears more than once"));
}

#[test]
fn first_position_offset() {
    let tree = tree!("(A:2,B:1)R;");
    let table = ProbabilityTable::from_rows(
        &["node", "position", "A", "C"],
        vec![
            vec!["R".to_string(), "1".to_string(), "0.9".to_string(), "0.1".to_string()],
            vec!["R".to_string(), "2".to_string(), "0.2".to_string(), "0.8".to_string()],
        ],
    )
    .unwrap();
    let leaves = Sequences::new(vec![record!("A", b"-C"), record!("B", b"AC")]);
    let asr = GapWeightedAsr::new(&table, 1).unwrap();
    let seqs = asr.reconstruct_ancestral_seqs(&leaves, &tree).unwrap();
    assert_eq!(seqs.get(&tree.root).unwrap(), b"-C");
    assert!(GapWeightedAsr::new(&table, 0).is_err());
}

#[test]
fn gap_column_state_is_kept() {
    let tree = tree!("(A:2,B:1)R;");
    let table = crate::prob_table!(["node", "position", "A", "-"];
        ["R", "0", "0.3", "0.7"],
        ["R", "1", "0.6", "0.4"],
    );
    assert!(table.alphabet().has_gap());
    let leaves = Sequences::new(vec![record!("A", b"AA"), record!("B", b"AA")]);
    let asr = GapWeightedAsr::new(&table, 0).unwrap();
    let seqs = asr.reconstruct_ancestral_seqs(&leaves, &tree).unwrap();
    assert_eq!(seqs.get(&tree.root).unwrap(), b"-A");
}
