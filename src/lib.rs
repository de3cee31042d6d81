use anyhow::Error;

pub mod alphabets;
pub mod asr;
pub mod io;
pub mod macros;
pub mod phylo_info;
pub mod probabilities;
pub mod sequences;
pub mod tree;

type Result<T> = std::result::Result<T, Error>;
