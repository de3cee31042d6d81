use std::error::Error;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::bail;
use bio::io::fasta::{Reader, Record};
use csv::{ReaderBuilder, Trim};
use hashbrown::HashMap;
use log::{debug, info};

use crate::alphabets::{is_sequence_word, GAP, POSSIBLE_GAPS};
use crate::probabilities::ProbabilityTable;
use crate::tree::{tree_parser, Tree};
use crate::Result;

pub static DEFAULT_LINE_WIDTH: usize = 60;
pub static FASTA_EXTENSION: &str = "fasta";

pub struct DataError {
    pub message: String,
}
impl fmt::Debug for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}
impl Error for DataError {}

/// Reads sequences from a fasta file, returning a vector of fasta records.
/// All sequences are converted to uppercase and the gap placeholders `.` and `~` become `-`.
/// Sequence bodies may be wrapped over any number of lines.
///
/// # Arguments
/// * `path` - Path to the fasta file.
///
/// # Example
/// ```
/// use asr_gaps::io::read_sequences;
/// use std::path::PathBuf;
/// let records = read_sequences(&PathBuf::from("./data/msa.fasta")).unwrap();
/// # assert_eq!(records.len(), 6);
/// # for rec in records {
/// #    assert_eq!(rec.seq().len(), 24);
/// #    assert_eq!(rec.seq(), rec.seq().to_ascii_uppercase());
/// # }
/// ```
pub fn read_sequences(path: &Path) -> Result<Vec<Record>> {
    info!("Reading sequences from file {}", path.display());
    let reader = Reader::from_file(path)?;
    let mut sequences = Vec::new();

    for result in reader.records() {
        let rec = result?;
        if let Err(e) = rec.check() {
            bail!(DataError {
                message: e.to_string()
            });
        }
        let seq: Vec<u8> = rec
            .seq()
            .to_ascii_uppercase()
            .iter()
            .map(|c| if POSSIBLE_GAPS.contains(c) { GAP } else { *c })
            .collect();

        if !is_sequence_word(&seq) {
            bail!(DataError {
                message: format!(
                    "Invalid genetic sequence encountered for {}: {}",
                    rec.id(),
                    String::from_utf8_lossy(&seq)
                )
            });
        }

        sequences.push(Record::with_attrs(rec.id(), rec.desc(), &seq));
    }
    if sequences.is_empty() {
        bail!(DataError {
            message: String::from("No sequences found in file")
        });
    }

    info!("Read {} sequences successfully", sequences.len());
    Ok(sequences)
}

/// Reads newick trees from a file, returning a vector of trees.
///
/// # Example
/// ```
/// use asr_gaps::io::read_newick_from_file;
/// use std::path::PathBuf;
/// let trees = read_newick_from_file(&PathBuf::from("./data/tree.tre")).unwrap();
/// # assert_eq!(trees.len(), 1);
/// # assert_eq!(trees[0].leaves().len(), 6);
/// ```
pub fn read_newick_from_file(path: &Path) -> Result<Vec<Tree>> {
    info!("Reading newick trees from file {}", path.display());
    let newick = fs::read_to_string(path)?;
    info!("Read file successfully");
    tree_parser::from_newick(&newick)
}

/// Reads the table of ancestral state probabilities from a csv file with a header row.
///
/// # Example
/// ```
/// use asr_gaps::io::read_probability_table;
/// use std::path::PathBuf;
/// let table = read_probability_table(&PathBuf::from("./data/ancestrals.csv")).unwrap();
/// # assert_eq!(table.alphabet().len(), 20);
/// # assert_eq!(table.len(), 5 * 24);
/// ```
pub fn read_probability_table(path: &Path) -> Result<ProbabilityTable> {
    info!("Reading ancestral probabilities from file {}", path.display());
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)?;
    let header: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }
    if rows.is_empty() {
        bail!(DataError {
            message: String::from("No probabilities found in file")
        });
    }
    let table = ProbabilityTable::from_rows(&header, rows)?;
    info!("Read {} probability rows successfully", table.len());
    Ok(table)
}

/// Writes a single fasta record, wrapping the sequence after `line_width` symbols.
pub fn write_fasta_record<W: Write>(writer: &mut W, record: &Record, line_width: usize) -> Result<()> {
    if line_width == 0 {
        bail!(DataError {
            message: String::from("Line width must be positive")
        });
    }
    match record.desc() {
        Some(desc) => writeln!(writer, ">{} {}", record.id(), desc)?,
        None => writeln!(writer, ">{}", record.id())?,
    }
    for line in record.seq().chunks(line_width) {
        writer.write_all(line)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Writes fasta sequences to the given file path, wrapped after `line_width` symbols.
/// Will return an error if the file already exists, unless `overwrite` is set.
///
/// # Example
/// ```
/// # use std::io::Read;
/// use std::fs::File;
///
/// use bio::io::fasta::Record;
/// use asr_gaps::io::write_sequences_to_file;
/// let sequences = vec![
///    Record::with_attrs("seq1", None, b"ATGCA"),
///    Record::with_attrs("seq2", None, b"CGTA"),
/// ];
/// let dir = tempfile::tempdir().unwrap();
/// let output_path = dir.path().join("output.fasta");
/// write_sequences_to_file(&sequences, &output_path, 4, false).unwrap();
/// # let mut file_content = String::new();
/// # File::open(&output_path)
/// #   .unwrap()
/// #   .read_to_string(&mut file_content)
/// #   .unwrap();
/// # assert_eq!(file_content, ">seq1\nATGC\nA\n>seq2\nCGTA\n");
/// ```
pub fn write_sequences_to_file(
    sequences: &[Record],
    path: &Path,
    line_width: usize,
    overwrite: bool,
) -> Result<()> {
    info!("Writing sequences to file {}", path.display());
    if path.exists() && !overwrite {
        bail!(DataError {
            message: format!("File {} already exists", path.display())
        });
    }
    let mut writer = BufWriter::new(File::create(path)?);
    for rec in sequences {
        write_fasta_record(&mut writer, rec, line_width)?;
    }
    writer.flush()?;
    info!("Finished writing successfully");
    Ok(())
}

/// Writes every ancestral sequence into its own `<node id>.fasta` file inside `out_dir`,
/// creating the directory if needed. Returns the paths of the written files.
pub fn write_ancestral_sequences(
    sequences: &[Record],
    out_dir: &Path,
    line_width: usize,
    overwrite: bool,
) -> Result<Vec<PathBuf>> {
    info!(
        "Writing {} ancestral sequences to directory {}",
        sequences.len(),
        out_dir.display()
    );
    fs::create_dir_all(out_dir)?;
    let paths: Vec<PathBuf> = sequences
        .iter()
        .map(|rec| out_dir.join(format!("{}.{}", file_stem(rec.id()), FASTA_EXTENSION)))
        .collect();
    let mut owners: HashMap<&Path, &str> = HashMap::with_capacity(paths.len());
    for (rec, path) in sequences.iter().zip(paths.iter()) {
        if let Some(other) = owners.insert(path.as_path(), rec.id()) {
            bail!(DataError {
                message: format!(
                    "Nodes {} and {} would both be written to {}",
                    other,
                    rec.id(),
                    path.display()
                )
            });
        }
    }
    if !overwrite {
        if let Some(path) = paths.iter().find(|path| path.exists()) {
            bail!(DataError {
                message: format!("File {} already exists", path.display())
            });
        }
    }
    for (rec, path) in sequences.iter().zip(paths.iter()) {
        debug!("Writing sequence of node {} to {}", rec.id(), path.display());
        write_sequences_to_file(std::slice::from_ref(rec), path, line_width, true)?;
    }
    info!("Finished writing successfully");
    drop(owners);
    Ok(paths)
}

/// Replaces characters that can not appear in a file name.
fn file_stem(id: &str) -> String {
    id.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect()
}
