use std::fmt::Display;

use anyhow::bail;
use bio::io::fasta::Record;

use crate::io::DataError;
use crate::Result;

pub static AMINOACIDS: &[u8] = b"ARNDCQEGHILKMFPSTWYV";
pub static AMB_AMINOACIDS: &[u8] = b"BJZX";
pub static NUCLEOTIDES: &[u8] = b"TCAG";
pub static AMB_NUCLEOTIDES: &[u8] = b"RYSWKMBDHVNZX";
pub static GAP: u8 = b'-';
pub static POSSIBLE_GAPS: &[u8] = b"-.~";

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SequenceType {
    DNA,
    Protein,
}

impl Display for SequenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SequenceType::DNA => write!(f, "DNA"),
            SequenceType::Protein => write!(f, "protein"),
        }
    }
}

/// Ordered set of single-character symbols the ancestral states are chosen from.
///
/// The order is significant: it is the column order of the probability table and decides
/// which symbol wins when several are equally likely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<u8>,
}

impl Alphabet {
    /// Creates an alphabet from the given symbols, bails on duplicated or non-printable ones.
    ///
    /// # Example
    /// ```
    /// use asr_gaps::alphabets::Alphabet;
    /// let alphabet = Alphabet::new(b"ACGT").unwrap();
    /// assert_eq!(alphabet.len(), 4);
    /// assert_eq!(alphabet.index(&b'G'), Some(2));
    /// assert!(Alphabet::new(b"ACA").is_err());
    /// ```
    pub fn new(symbols: &[u8]) -> Result<Alphabet> {
        if symbols.is_empty() {
            bail!(DataError {
                message: String::from("Alphabet must contain at least one symbol")
            });
        }
        for (i, symbol) in symbols.iter().enumerate() {
            if !symbol.is_ascii_graphic() {
                bail!(DataError {
                    message: format!("Invalid alphabet symbol with code {}", symbol)
                });
            }
            if symbols[..i].contains(symbol) {
                bail!(DataError {
                    message: format!("Duplicated alphabet symbol {}", *symbol as char)
                });
            }
        }
        Ok(Alphabet {
            symbols: symbols.to_vec(),
        })
    }

    /// Creates an alphabet from probability table column headers, each of which has to be a
    /// single character.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Result<Alphabet> {
        let mut symbols = Vec::with_capacity(headers.len());
        for header in headers {
            let header = header.as_ref().trim();
            if header.len() != 1 {
                bail!(DataError {
                    message: format!(
                        "Probability column header \"{}\" is not a single character symbol",
                        header
                    )
                });
            }
            symbols.push(header.as_bytes()[0].to_ascii_uppercase());
        }
        Alphabet::new(&symbols)
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    pub fn symbol(&self, index: usize) -> u8 {
        self.symbols[index]
    }

    pub fn index(&self, symbol: &u8) -> Option<usize> {
        self.symbols
            .iter()
            .position(|s| s == &symbol.to_ascii_uppercase())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Whether the gap token itself is one of the symbols.
    pub fn has_gap(&self) -> bool {
        self.symbols.contains(&GAP)
    }
}

impl Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.symbols))
    }
}

/// Accepts amino acids, nucleotides, their ambiguity codes and gaps, in any case.
pub fn is_sequence_word(word: &[u8]) -> bool {
    word.iter().map(|c| c.to_ascii_uppercase()).all(|c| {
        AMINOACIDS.contains(&c)
            | AMB_AMINOACIDS.contains(&c)
            | NUCLEOTIDES.contains(&c)
            | AMB_NUCLEOTIDES.contains(&c)
            | POSSIBLE_GAPS.contains(&c)
    })
}

pub fn sequence_type(sequences: &[Record]) -> SequenceType {
    for record in sequences {
        if !record.seq().iter().all(|c| {
            let c = c.to_ascii_uppercase();
            NUCLEOTIDES.contains(&c) | AMB_NUCLEOTIDES.contains(&c) | POSSIBLE_GAPS.contains(&c)
        }) {
            return SequenceType::Protein;
        }
    }
    SequenceType::DNA
}
