//! Configuration for the dna-fountain binary.
//!
//! Settings come from three layers, later ones winning:
//! 1. Built-in defaults (the input file names used by the stored data set)
//! 2. An optional TOML file given with `--config`
//! 3. Command-line flags
//!
//! # Example config file
//!
//! ```toml
//! droplets = "data/droplet_sequences.fasta"
//! coverage = "data/luby_blocks.csv"
//!
//! [decoder]
//! verify_consistency = true
//! max_passes = 500
//! max_blocks = 4096
//! ```

use anyhow::Context;
use clap::Parser;
use dna_fountain_core::{coverage::MAX_BLOCKS, DecoderConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_DROPLETS: &str = "input_files/droplet_sequences.fasta";
const DEFAULT_COVERAGE: &str = "input_files/luby_blocks.csv";

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "dna-fountain",
    about = "Recover a message from DNA fountain droplets",
    version
)]
pub struct Cli {
    /// Droplet sequence file (default: input_files/droplet_sequences.fasta)
    #[arg(long, value_name = "PATH")]
    pub droplets: Option<PathBuf>,

    /// Coverage table (default: input_files/luby_blocks.csv)
    #[arg(long, value_name = "PATH")]
    pub coverage: Option<PathBuf>,

    /// TOML config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Check every coverage row against the solution
    #[arg(long)]
    pub verify: bool,

    /// Stop peeling after this many passes
    #[arg(long, value_name = "N")]
    pub max_passes: Option<usize>,

    /// Refuse coverage tables describing more than N blocks
    #[arg(long, value_name = "N")]
    pub max_blocks: Option<usize>,

    /// Write the message here instead of stdout
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Print resolved configuration
    #[arg(long)]
    pub print_config: bool,

    /// Don't print the decode summary
    #[arg(long)]
    pub no_stats: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Settings read from a `--config` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub droplets: Option<PathBuf>,
    pub coverage: Option<PathBuf>,
    pub decoder: DecoderConfig,
}

impl FileConfig {
    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }
}

/// Complete configuration for a decode run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // === Files ===
    /// Droplet sequence file
    pub droplets: PathBuf,

    /// Coverage table file
    pub coverage: PathBuf,

    /// Output file path (None = stdout)
    pub output: Option<PathBuf>,

    // === Decoder ===
    pub decoder: DecoderConfig,

    // === Behavior ===
    /// Whether to print the resolved config
    pub print_config: bool,

    /// Whether to print the decode summary
    pub print_stats: bool,
}

impl Config {
    /// Build the configuration from parsed arguments, loading `--config` if
    /// given.
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let file = match &cli.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::layered(cli, file))
    }

    /// Apply command-line flags on top of file settings and defaults.
    pub fn layered(cli: Cli, file: FileConfig) -> Self {
        let mut decoder = file.decoder;
        if cli.verify {
            decoder.verify_consistency = true;
        }
        if cli.max_passes.is_some() {
            decoder.max_passes = cli.max_passes;
        }
        if cli.max_blocks.is_some() {
            decoder.max_blocks = cli.max_blocks;
        }

        Config {
            droplets: cli
                .droplets
                .or(file.droplets)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DROPLETS)),
            coverage: cli
                .coverage
                .or(file.coverage)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_COVERAGE)),
            output: cli.out,
            decoder,
            print_config: cli.print_config,
            print_stats: !cli.no_stats,
        }
    }

    /// Print the configuration in human-readable form.
    ///
    /// Goes to stderr so stdout carries only the message.
    pub fn print(&self) {
        eprintln!("=== Configuration ===");
        eprintln!("Droplets: {}", self.droplets.display());
        eprintln!("Coverage: {}", self.coverage.display());
        match &self.output {
            Some(path) => eprintln!("Output:   {}", path.display()),
            None => eprintln!("Output:   (stdout)"),
        }
        eprintln!();
        eprintln!("=== Decoder ===");
        eprintln!("Verify consistency: {}", self.decoder.verify_consistency);
        match self.decoder.max_passes {
            Some(n) => eprintln!("Max passes: {n}"),
            None => eprintln!("Max passes: rows x blocks"),
        }
        match self.decoder.max_blocks {
            Some(n) => eprintln!("Max blocks: {n}"),
            None => eprintln!("Max blocks: {MAX_BLOCKS}"),
        }
        eprintln!();
    }
}
