#[macro_export]
macro_rules! record_wo_desc {
    ($e1:expr,$e2:expr) => {{
        use bio::io::fasta::Record;
        Record::with_attrs($e1, None, $e2)
    }};
}

#[macro_export]
macro_rules! record {
    ($e1:expr,$e2:expr,$e3:expr) => {{
        use bio::io::fasta::Record;
        Record::with_attrs($e1, $e2, $e3)
    }};
}

#[macro_export]
macro_rules! tree {
    ($e:expr) => {{
        use $crate::tree::tree_parser::from_newick;
        from_newick($e).unwrap().pop().unwrap()
    }};
}

/// Builds a probability table from a header and rows of string cells.
#[macro_export]
macro_rules! prob_table {
    ($header:expr; $($row:expr),* $(,)?) => {{
        use $crate::probabilities::ProbabilityTable;
        ProbabilityTable::from_rows(
            &$header,
            vec![$($row.iter().map(|cell| cell.to_string()).collect::<Vec<String>>()),*],
        )
        .unwrap()
    }};
}

#[cfg(test)]
#[cfg_attr(coverage, coverage(off))]
pub mod tests {
    #[test]
    fn test_record_macro() {
        let record = record!("seq1", Some("description"), b"ATCG");
        assert_eq!(record.id(), "seq1");
        assert_eq!(record.desc(), Some("description"));
        assert_eq!(record.seq(), b"ATCG");

        let record = record!("seq2", None, b"TTTT");
        assert_eq!(record.id(), "seq2");
        assert_eq!(record.desc(), None);
    }

    #[test]
    fn test_record_wo_desc_macro() {
        let id = "test_seq";
        let seq = b"AA-A";
        let record = record_wo_desc!(id, seq);
        assert_eq!(record.id(), id);
        assert_eq!(record.seq(), seq);
        assert_eq!(record.desc(), None);
    }

    #[test]
    fn test_tree_macro() {
        let tree = tree!("(A,B)R;");
        assert_eq!(tree.leaves().len(), 2);

        let tree = tree!("((A,B)E,(C,D)F)R;");
        assert_eq!(tree.leaves().len(), 4);
        assert_eq!(tree.len(), 7);
    }

    #[test]
    fn test_prob_table_macro() {
        let table = prob_table!(["node", "position", "A", "C"];
            ["1", "0", "0.3", "0.7"],
            ["1", "1", "-", "0.2"],
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.alphabet().symbols(), b"AC");
    }
}
