use std::result::Result::Ok;

use anyhow::{anyhow, bail, Error};
use clap::Parser;
use ftail::Ftail;
use log::{debug, info};

use asr_gaps::asr::{AncestralSequenceReconstruction, GapWeightedAsr};
use asr_gaps::io::{read_probability_table, write_ancestral_sequences, write_sequences_to_file};
use asr_gaps::phylo_info::PhyloInfoBuilder;

mod cli;
use crate::cli::{Cli, Config, ConfigBuilder};

type Result<T> = std::result::Result<T, Error>;

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            if !error.use_stderr() {
                error.exit();
            }
            bail!("Unable to parse command line arguments: \n {}", error)
        }
    };
    let cfg_build: ConfigBuilder = cli.into();
    let cfg = cfg_build.setup()?;
    setup_logging(&cfg)?;

    info!("Ancestral sequence reconstruction started.");
    info!("{}", cfg);

    let info = PhyloInfoBuilder::with_attrs(cfg.msa.clone(), cfg.tree.clone()).build()?;
    debug!("Tree: {}", info.tree.to_newick());

    let table = read_probability_table(&cfg.ancestrals)?;
    let asr = GapWeightedAsr::new(&table, cfg.first_position)?;
    let ancestral = asr.reconstruct_ancestral_seqs(&info.sequences, &info.tree)?;
    let records = ancestral.to_records(&info.tree);

    let paths = write_ancestral_sequences(&records, &cfg.out_dir, cfg.line_width, cfg.overwrite)?;
    info!(
        "Wrote {} ancestral sequences to {}",
        paths.len(),
        cfg.out_dir.display()
    );
    if let Some(combined) = &cfg.combined {
        write_sequences_to_file(&records, combined, cfg.line_width, cfg.overwrite)?;
        info!("Wrote all ancestral sequences to {}", combined.display());
    }

    info!("Ancestral sequence reconstruction finished.");
    Ok(())
}

fn setup_logging(cfg: &Config) -> Result<()> {
    let mut logger = Ftail::new().console(cfg.log_level);
    if let Some(log_file) = &cfg.log_file {
        let path = log_file
            .to_str()
            .ok_or_else(|| anyhow!("Log file path {} is not valid UTF-8", log_file.display()))?;
        logger = logger.single_file(path, true, cfg.log_level);
    }
    logger
        .init()
        .map_err(|e| anyhow!("Unable to set up logging: {:?}", e))
}
