use anyhow::bail;
use hashbrown::HashMap;
use itertools::Itertools;
use log::{debug, info};
use nalgebra::DMatrix;

use crate::alphabets::Alphabet;
use crate::asr::{AsrError, PositionProblem};
use crate::io::DataError;
use crate::Result;

pub static NODE_COLUMN: &str = "node";
pub static POSITION_COLUMN: &str = "position";
/// Cell values standing for "no probability given", read as zero.
pub static MISSING_PROBABILITIES: &[&str] = &["-", ""];

/// One row of the probability table, probabilities kept as the raw cell text.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityRow {
    pub node: String,
    pub position: usize,
    pub cells: Vec<String>,
}

/// Posterior probabilities of every alphabet symbol per internal node and alignment position.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityTable {
    alphabet: Alphabet,
    rows: Vec<ProbabilityRow>,
}

impl ProbabilityTable {
    /// Creates the table from a header and the rows of string cells.
    /// The header has to contain the `node` and `position` columns, every other column is a
    /// symbol of the alphabet, in header order.
    ///
    /// # Example
    /// ```
    /// use asr_gaps::probabilities::ProbabilityTable;
    /// let table = ProbabilityTable::from_rows(
    ///     &["node", "position", "A", "C", "G"],
    ///     vec![vec!["5".to_string(), "0".to_string(), "0.1".to_string(), "0.7".to_string(), "-".to_string()]],
    /// )
    /// .unwrap();
    /// assert_eq!(table.alphabet().symbols(), b"ACG");
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn from_rows<S: AsRef<str>>(header: &[S], rows: Vec<Vec<String>>) -> Result<Self> {
        let header: Vec<&str> = header.iter().map(|h| h.as_ref().trim()).collect();
        let node_col = Self::column_idx(&header, NODE_COLUMN)?;
        let pos_col = Self::column_idx(&header, POSITION_COLUMN)?;
        let symbol_cols: Vec<usize> = (0..header.len())
            .filter(|&i| i != node_col && i != pos_col)
            .collect();
        let alphabet = Alphabet::from_headers(
            &symbol_cols.iter().map(|&i| header[i]).collect::<Vec<_>>(),
        )?;
        debug!("Probability table alphabet: {}", alphabet);

        let mut table_rows = Vec::with_capacity(rows.len());
        for (row_num, row) in rows.into_iter().enumerate() {
            if row.len() != header.len() {
                bail!(DataError {
                    message: format!(
                        "Probability table row {} has {} cells, expected {}",
                        row_num + 1,
                        row.len(),
                        header.len()
                    )
                });
            }
            let node = row[node_col].trim().to_string();
            let position = match row[pos_col].trim().parse::<usize>() {
                Ok(position) => position,
                Err(_) => bail!(DataError {
                    message: format!(
                        "Invalid position \"{}\" in probability table row {}",
                        row[pos_col],
                        row_num + 1
                    )
                }),
            };
            let cells = symbol_cols.iter().map(|&i| row[i].trim().to_string()).collect();
            table_rows.push(ProbabilityRow {
                node,
                position,
                cells,
            });
        }
        Ok(ProbabilityTable {
            alphabet,
            rows: table_rows,
        })
    }

    fn column_idx(header: &[&str], name: &str) -> Result<usize> {
        match header.iter().position(|h| h.eq_ignore_ascii_case(name)) {
            Some(idx) => Ok(idx),
            None => bail!(DataError {
                message: format!("Probability table has no \"{}\" column", name)
            }),
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn rows(&self) -> &[ProbabilityRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Builds the per-node index in one pass over the rows. Positions of every node must be
    /// contiguous and start at `first_position`.
    pub fn index(&self, first_position: usize) -> Result<ProbabilityIndex> {
        ProbabilityIndex::new(self, first_position)
    }
}

/// Reads one probability cell, missing values become zero.
pub fn parse_probability(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if MISSING_PROBABILITIES.contains(&cell) {
        return Some(0.0);
    }
    cell.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Probabilities grouped by node: one matrix per node with a row per alignment position (in
/// position order) and a column per alphabet symbol.
#[derive(Debug, Clone)]
pub struct ProbabilityIndex {
    alphabet: Alphabet,
    first_position: usize,
    nodes: HashMap<String, DMatrix<f64>>,
}

impl ProbabilityIndex {
    pub fn new(table: &ProbabilityTable, first_position: usize) -> Result<Self> {
        info!("Indexing {} probability rows", table.len());
        let n_symbols = table.alphabet.len();
        let mut grouped: HashMap<&str, Vec<(usize, Vec<f64>)>> = HashMap::new();
        for row in table.rows.iter() {
            let mut probs = Vec::with_capacity(n_symbols);
            for (cell, &symbol) in row.cells.iter().zip(table.alphabet.symbols()) {
                match parse_probability(cell) {
                    Some(p) => probs.push(p),
                    None => bail!(AsrError::NonNumericProbability {
                        node: row.node.clone(),
                        position: row.position,
                        column: symbol as char,
                        value: cell.clone(),
                    }),
                }
            }
            grouped
                .entry(row.node.as_str())
                .or_default()
                .push((row.position, probs));
        }

        let mut nodes = HashMap::with_capacity(grouped.len());
        for (node, mut rows) in grouped.into_iter().sorted_by(|a, b| a.0.cmp(b.0)) {
            rows.sort_by_key(|(position, _)| *position);
            for (i, (position, _)) in rows.iter().enumerate() {
                let expected = first_position + i;
                if *position == expected {
                    continue;
                }
                let (position, problem) = if *position < first_position {
                    (*position, PositionProblem::OutOfRange)
                } else if i > 0 && rows[i - 1].0 == *position {
                    (*position, PositionProblem::Duplicated)
                } else {
                    (expected, PositionProblem::Missing)
                };
                bail!(AsrError::IncompletePositions {
                    node: node.to_string(),
                    position,
                    problem,
                });
            }
            let flat: Vec<f64> = rows.iter().flat_map(|(_, probs)| probs.iter().copied()).collect();
            nodes.insert(
                node.to_string(),
                DMatrix::from_row_slice(rows.len(), n_symbols, &flat),
            );
        }
        debug!("Indexed probabilities for {} nodes", nodes.len());
        Ok(ProbabilityIndex {
            alphabet: table.alphabet.clone(),
            first_position,
            nodes,
        })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn first_position(&self) -> usize {
        self.first_position
    }

    /// Probabilities of a node, bails if the table has no rows for it.
    pub fn node_probs(&self, node_id: &str) -> Result<&DMatrix<f64>> {
        match self.nodes.get(node_id) {
            Some(probs) => Ok(probs),
            None => bail!(AsrError::MissingNodeData {
                node: node_id.to_string()
            }),
        }
    }

    pub fn node_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.nodes.keys().map(|id| id.as_str()).collect();
        ids.sort();
        ids
    }
}
