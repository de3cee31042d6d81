use assert_matches::assert_matches;

use crate::asr::AsrError;
use crate::io::DataError;
use crate::sequences::{sequence_ids_are_unique, validate_taxa_ids, Sequences};
use crate::{record_wo_desc as record, tree};

#[test]
fn aligned_sequences() {
    let seqs = Sequences::new(vec![
        record!("A", b"AC-T"),
        record!("B", b"A--T"),
        record!("C", b"ACGT"),
    ]);
    assert!(seqs.aligned());
    assert_eq!(seqs.msa_len(), 4);
    assert_eq!(seqs.len(), 3);
    assert!(seqs.check_aligned().is_ok());
    assert_eq!(seqs.gap_counts(), vec![0, 1, 2, 0]);
    assert_eq!(seqs.record_by_id("B").unwrap().seq(), b"A--T");
    assert!(seqs.record_by_id("D").is_none());
    assert_eq!(seqs.ids(), vec!["A", "B", "C"]);
}

#[test]
fn unaligned_sequences() {
    let seqs = Sequences::new(vec![record!("A", b"AC-T"), record!("B", b"A-T")]);
    assert!(!seqs.aligned());
    assert_eq!(seqs.msa_len(), 0);
    let err = seqs.check_aligned().unwrap_err();
    assert_matches!(
        err.downcast_ref::<AsrError>(),
        Some(AsrError::SequenceLengthMismatch {
            node,
            expected: 4,
            actual: 3
        }) if node == "B"
    );
}

#[test]
fn empty_sequences() {
    let seqs = Sequences::new(vec![]);
    assert!(seqs.is_empty());
    assert!(seqs.aligned());
    assert_eq!(seqs.msa_len(), 0);
}

#[test]
fn duplicate_sequence_ids() {
    let seqs = Sequences::new(vec![record!("A", b"AC"), record!("A", b"AG")]);
    let err = sequence_ids_are_unique(&seqs).unwrap_err();
    assert!(err.downcast_ref::<DataError>().is_some());
    let seqs = Sequences::new(vec![record!("A", b"AC"), record!("B", b"AG")]);
    assert!(sequence_ids_are_unique(&seqs).is_ok());
}

#[test]
fn taxa_ids_match() {
    let tree = tree!("((A:1,B:1)E:1,C:1)R;");
    let seqs = Sequences::new(vec![
        record!("C", b"AC"),
        record!("A", b"AC"),
        record!("B", b"AG"),
    ]);
    assert!(validate_taxa_ids(&tree, &seqs).is_ok());
}

#[test]
fn taxa_ids_mismatch() {
    let tree = tree!("((A:1,B:1)E:1,C:1)R;");
    let seqs = Sequences::new(vec![record!("A", b"AC"), record!("B", b"AG")]);
    let err = validate_taxa_ids(&tree, &seqs).unwrap_err();
    assert!(err.to_string().contains("missing sequence IDs: [\"C\"]"));

    let seqs = Sequences::new(vec![
        record!("A", b"AC"),
        record!("B", b"AG"),
        record!("C", b"AG"),
        record!("D", b"AG"),
    ]);
    let err = validate_taxa_ids(&tree, &seqs).unwrap_err();
    assert!(err.to_string().contains("missing tree tip IDs: [\"D\"]"));
}
