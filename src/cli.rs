use std::fmt::Display;
use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use log::LevelFilter;

use asr_gaps::io::DEFAULT_LINE_WIDTH;

use crate::Result;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub(super) struct Cli {
    /// Posterior probabilities of the ancestral states in csv format
    #[arg(short, long, value_name = "ANCESTRALS_FILE", default_value = "data/ancestrals.csv")]
    pub(super) ancestrals: PathBuf,

    /// Aligned leaf sequences in fasta format
    #[arg(short, long, value_name = "MSA_FILE", default_value = "data/msa.fasta")]
    pub(super) msa: PathBuf,

    /// Tree file in newick format
    #[arg(short, long, value_name = "TREE_FILE", default_value = "data/tree.tre")]
    pub(super) tree: PathBuf,

    /// Directory for the reconstructed sequences, one fasta file per internal node
    #[arg(short, long, value_name = "OUT_DIR", default_value = "output")]
    pub(super) out_dir: PathBuf,

    /// Number of symbols per line in the output files
    #[arg(short, long, default_value_t = DEFAULT_LINE_WIDTH)]
    pub(super) line_width: usize,

    /// Number of the first alignment position in the probability table
    #[arg(short, long, default_value_t = 0)]
    pub(super) first_position: usize,

    /// Also write all reconstructed sequences into this single fasta file
    #[arg(short, long, value_name = "COMBINED_FILE")]
    pub(super) combined: Option<PathBuf>,

    /// Replace existing output files
    #[arg(long)]
    pub(super) overwrite: bool,

    /// Also write the log into this file
    #[arg(long, value_name = "LOG_FILE")]
    pub(super) log_file: Option<PathBuf>,

    /// Log more, can be repeated
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub(super) verbose: u8,
}

pub(super) struct ConfigBuilder {
    ancestrals: PathBuf,
    msa: PathBuf,
    tree: PathBuf,
    out_dir: PathBuf,
    line_width: usize,
    first_position: usize,
    combined: Option<PathBuf>,
    overwrite: bool,
    log_file: Option<PathBuf>,
    verbose: u8,
}

impl From<Cli> for ConfigBuilder {
    fn from(cli: Cli) -> Self {
        ConfigBuilder {
            ancestrals: cli.ancestrals,
            msa: cli.msa,
            tree: cli.tree,
            out_dir: cli.out_dir,
            line_width: cli.line_width,
            first_position: cli.first_position,
            combined: cli.combined,
            overwrite: cli.overwrite,
            log_file: cli.log_file,
            verbose: cli.verbose,
        }
    }
}

impl ConfigBuilder {
    /// Checks the parameters and turns them into the run configuration.
    pub(super) fn setup(self) -> Result<Config> {
        if self.line_width == 0 {
            bail!("Line width must be positive");
        }
        for (name, path) in [
            ("Ancestrals", &self.ancestrals),
            ("Alignment", &self.msa),
            ("Tree", &self.tree),
        ] {
            if !path.is_file() {
                bail!("{} file {} does not exist", name, path.display());
            }
        }
        if self.out_dir.is_file() {
            bail!(
                "Output directory {} is an existing file",
                self.out_dir.display()
            );
        }
        let log_level = match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        Ok(Config {
            ancestrals: self.ancestrals,
            msa: self.msa,
            tree: self.tree,
            out_dir: self.out_dir,
            line_width: self.line_width,
            first_position: self.first_position,
            combined: self.combined,
            overwrite: self.overwrite,
            log_file: self.log_file,
            log_level,
        })
    }
}

#[derive(Debug)]
pub(super) struct Config {
    pub(super) ancestrals: PathBuf,
    pub(super) msa: PathBuf,
    pub(super) tree: PathBuf,
    pub(super) out_dir: PathBuf,
    pub(super) line_width: usize,
    pub(super) first_position: usize,
    pub(super) combined: Option<PathBuf>,
    pub(super) overwrite: bool,
    pub(super) log_file: Option<PathBuf>,
    pub(super) log_level: LevelFilter,
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Configuration:")?;
        writeln!(f, "  ancestrals: {}", self.ancestrals.display())?;
        writeln!(f, "  alignment: {}", self.msa.display())?;
        writeln!(f, "  tree: {}", self.tree.display())?;
        writeln!(f, "  output directory: {}", self.out_dir.display())?;
        if let Some(combined) = &self.combined {
            writeln!(f, "  combined output: {}", combined.display())?;
        }
        writeln!(f, "  line width: {}", self.line_width)?;
        writeln!(f, "  first position: {}", self.first_position)?;
        write!(f, "  overwrite: {}", self.overwrite)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use log::LevelFilter;
    use tempfile::tempdir;

    use super::{Cli, ConfigBuilder};

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["asr-gaps"]).unwrap();
        assert_eq!(cli.ancestrals, PathBuf::from("data/ancestrals.csv"));
        assert_eq!(cli.msa, PathBuf::from("data/msa.fasta"));
        assert_eq!(cli.tree, PathBuf::from("data/tree.tre"));
        assert_eq!(cli.out_dir, PathBuf::from("output"));
        assert_eq!(cli.line_width, 60);
        assert_eq!(cli.first_position, 0);
        assert!(cli.combined.is_none());
        assert!(!cli.overwrite);

        let cfg = ConfigBuilder::from(cli).setup().unwrap();
        assert_eq!(cfg.log_level, LevelFilter::Warn);
        assert!(cfg.to_string().contains("line width: 60"));
    }

    #[test]
    fn all_arguments() {
        let dir = tempdir().unwrap();
        let cli = Cli::try_parse_from([
            "asr-gaps",
            "--ancestrals",
            "data/ancestrals.csv",
            "-m",
            "data/msa.fasta",
            "-t",
            "data/tree.tre",
            "-o",
            dir.path().to_str().unwrap(),
            "-l",
            "80",
            "-f",
            "1",
            "--combined",
            "all.fasta",
            "--overwrite",
            "-vv",
        ])
        .unwrap();
        let cfg = ConfigBuilder::from(cli).setup().unwrap();
        assert_eq!(cfg.line_width, 80);
        assert_eq!(cfg.first_position, 1);
        assert_eq!(cfg.combined, Some(PathBuf::from("all.fasta")));
        assert!(cfg.overwrite);
        assert_eq!(cfg.log_level, LevelFilter::Debug);
    }

    #[test]
    fn invalid_setup() {
        let cli = Cli::try_parse_from(["asr-gaps", "-l", "0"]).unwrap();
        assert!(ConfigBuilder::from(cli).setup().is_err());

        let cli = Cli::try_parse_from(["asr-gaps", "-t", "data/nonexistent.tre"]).unwrap();
        let err = ConfigBuilder::from(cli).setup().unwrap_err();
        assert!(err.to_string().contains("Tree file"));

        let cli = Cli::try_parse_from(["asr-gaps", "-o", "data/tree.tre"]).unwrap();
        assert!(ConfigBuilder::from(cli).setup().is_err());

        assert!(Cli::try_parse_from(["asr-gaps", "-l", "many"]).is_err());
    }
}
