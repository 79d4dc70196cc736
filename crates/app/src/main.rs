//! dna-fountain: recover a stored message from its droplets.
//!
//! Reads the droplet sequence file and the coverage table, runs the peeling
//! decoder and prints the message. Logs and the decode summary go to stderr.

use anyhow::Context;
use clap::Parser;
use dna_fountain_core::{decode_message, CoverageTable, DropletSet};
use std::fs;
use tracing::info;

mod config;

use config::{Cli, Config};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_cli(cli)?;
    if config.print_config {
        config.print();
    }

    run(&config)
}

fn run(config: &Config) -> anyhow::Result<()> {
    let fasta = fs::read_to_string(&config.droplets)
        .with_context(|| format!("reading droplet sequences from {}", config.droplets.display()))?;
    let droplets = DropletSet::from_fasta(&fasta)
        .with_context(|| format!("parsing droplet sequences in {}", config.droplets.display()))?;

    let csv = fs::read_to_string(&config.coverage)
        .with_context(|| format!("reading coverage table from {}", config.coverage.display()))?;
    let coverage = CoverageTable::parse(&csv)
        .with_context(|| format!("parsing coverage table in {}", config.coverage.display()))?;

    info!(
        droplets = droplets.len(),
        rows = coverage.len(),
        blocks = coverage.block_count(),
        "inputs loaded"
    );

    let message = decode_message(&droplets, &coverage, config.decoder).context("decoding message")?;

    match &config.output {
        Some(path) => {
            fs::write(path, &message.text).with_context(|| format!("writing message to {}", path.display()))?;
            info!(path = %path.display(), chars = message.text.len(), "message written");
        }
        None => println!("{}", message.text),
    }

    if config.print_stats {
        eprintln!("{}", message.stats);
    }

    Ok(())
}
