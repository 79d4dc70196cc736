//! dna-fountain-core: recover a message from DNA fountain droplets
//!
//! A message is split into 256-bit source blocks, XOR-combined into
//! Luby-Transform droplets and stored as nucleotide sequences. This library
//! reverses the storage side:
//! - Translates nucleotide sequences into bits
//! - Slices each droplet into index, payload and checksum fields
//! - Parses the coverage table saying which blocks each droplet combines
//! - Peels the XOR system until every source block is resolved
//! - Reassembles the blocks and decodes the text
//!
//! # Architecture
//!
//! - `bitio`: Bit strings and bit-level reading/writing
//! - `symbol`: Nucleotide → 2-bit codec
//! - `fasta`: Sequence file parsing
//! - `droplet`: Fixed-layout droplet records
//! - `coverage`: Droplet → block coverage table
//! - `decoder`: Peeling decoder
//! - `message`: Block assembly and text decoding
//! - `metrics`: Decode statistics
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and abort the decode
//! - **No partial results**: A stalled decode names the missing blocks
//! - **Deterministic**: Row ordering and tie-breaks are fixed
//!
//! # Example
//! ```no_run
//! use dna_fountain_core::{decode_message, CoverageTable, DecoderConfig, DropletSet};
//!
//! let droplets = DropletSet::from_fasta(&std::fs::read_to_string("droplets.fasta")?)?;
//! let coverage = CoverageTable::parse(&std::fs::read_to_string("blocks.csv")?)?;
//! let message = decode_message(&droplets, &coverage, DecoderConfig::default())?;
//! println!("{}", message.text);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bitio;
pub mod coverage;
pub mod decoder;
pub mod droplet;
pub mod error;
pub mod fasta;
pub mod message;
pub mod metrics;
pub mod symbol;

// Re-export commonly used types
pub use bitio::Bits;
pub use coverage::{CoverageEntry, CoverageTable};
pub use decoder::{DecodedBlocks, DecoderConfig, PeelingDecoder};
pub use droplet::{DropletRecord, DropletSet};
pub use error::{Error, Result};
pub use metrics::DecodeStats;

/// A fully recovered message.
#[derive(Debug, Clone)]
pub struct DecodedMessage {
    /// Decoded text
    pub text: String,

    /// Source blocks in index order
    pub blocks: Vec<Bits>,

    /// How the blocks were recovered
    pub stats: DecodeStats,
}

/// Decode every block, assemble them and decode the text.
///
/// # Errors
/// Any decoder or message error; nothing is returned on failure.
pub fn decode_message(
    droplets: &DropletSet,
    coverage: &CoverageTable,
    config: DecoderConfig,
) -> Result<DecodedMessage> {
    let (blocks, stats) = PeelingDecoder::new(coverage, config)
        .decode(droplets)?
        .into_parts();
    let text = message::decode_text(&message::assemble(&blocks))?;

    Ok(DecodedMessage { text, blocks, stats })
}
