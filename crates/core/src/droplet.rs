//! Droplet records.
//!
//! Each droplet's bit string has a fixed layout:
//!
//! ```text
//! +--------------------+
//! | index (16 bits)    |  bits [0, 16)
//! +--------------------+
//! | payload (256 bits) |  bits [16, 272)   XOR of the covered source blocks
//! +--------------------+
//! | checksum (16 bits) |  bits [272, 288)
//! +--------------------+
//! | ignored            |  anything after bit 288
//! +--------------------+
//! ```
//!
//! The index and checksum fields are exposed but never interpreted; which
//! blocks a droplet combines comes from the coverage table, not from the
//! index field.

use crate::bitio::{BitReader, Bits};
use crate::error::{RecordError, Result};
use crate::fasta::{droplet_id_from_name, parse_fasta};
use crate::symbol::encode_to_bits;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Width of the leading index field
pub const INDEX_BITS: usize = 16;

/// Width of the payload, which is also the source block size
pub const PAYLOAD_BITS: usize = 256;

/// Width of the trailing checksum field
pub const CHECKSUM_BITS: usize = 16;

/// Minimum bit length of a droplet
pub const RECORD_BITS: usize = INDEX_BITS + PAYLOAD_BITS + CHECKSUM_BITS;

/// One parsed droplet. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropletRecord {
    id: u32,
    raw_symbols: String,
    bits: Bits,
    index_field: u16,
    payload: Bits,
    checksum_field: u16,
}

impl DropletRecord {
    /// Slice a droplet bit string into its fields.
    ///
    /// `raw_symbols` is kept verbatim for diagnostics. Bits past
    /// [`RECORD_BITS`] are ignored.
    ///
    /// # Errors
    /// `RecordError::TruncatedRecord` if `bits` is shorter than [`RECORD_BITS`].
    pub fn from_bits(id: u32, raw_symbols: impl Into<String>, bits: Bits) -> Result<Self> {
        if bits.len() < RECORD_BITS {
            return Err(RecordError::TruncatedRecord {
                required: RECORD_BITS,
                actual: bits.len(),
            }
            .into());
        }

        let mut reader = BitReader::from_bits(&bits);
        let index_field = reader.read_bits(INDEX_BITS)? as u16;
        reader.skip(PAYLOAD_BITS)?;
        let checksum_field = reader.read_bits(CHECKSUM_BITS)? as u16;
        let payload = bits.slice(INDEX_BITS..INDEX_BITS + PAYLOAD_BITS)?;

        Ok(Self {
            id,
            raw_symbols: raw_symbols.into(),
            bits,
            index_field,
            payload,
            checksum_field,
        })
    }

    /// Translate a nucleotide sequence and slice it.
    pub fn from_sequence(id: u32, symbols: &str) -> Result<Self> {
        let bits = encode_to_bits(symbols)?;
        Self::from_bits(id, symbols, bits)
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// The sequence this record was translated from.
    pub fn raw_symbols(&self) -> &str {
        &self.raw_symbols
    }

    /// Full translated bit string, including any trailing bits.
    pub fn bits(&self) -> &Bits {
        &self.bits
    }

    pub fn index_field(&self) -> u16 {
        self.index_field
    }

    /// The 256-bit XOR combination of this droplet's covered blocks.
    pub fn payload(&self) -> &Bits {
        &self.payload
    }

    pub fn checksum_field(&self) -> u16 {
        self.checksum_field
    }
}

/// Droplets keyed by id.
#[derive(Debug, Clone, Default)]
pub struct DropletSet {
    droplets: BTreeMap<u32, DropletRecord>,
}

impl DropletSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from already parsed records.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = DropletRecord>,
    {
        let mut set = Self::new();
        for record in records {
            set.insert(record)?;
        }
        Ok(set)
    }

    /// Parse a sequence file into droplets.
    ///
    /// All-or-nothing: the first bad record aborts the load.
    ///
    /// # Errors
    /// Propagates sequence file, droplet name, symbol and record errors.
    pub fn from_fasta(text: &str) -> Result<Self> {
        let mut set = Self::new();
        for record in parse_fasta(text)? {
            let id = droplet_id_from_name(&record.name)?;
            set.insert(DropletRecord::from_sequence(id, &record.sequence)?)?;
        }
        debug!(droplets = set.len(), "loaded droplet sequences");
        Ok(set)
    }

    /// Add a droplet.
    ///
    /// A repeated id is accepted if its payload matches the stored one; the
    /// first record is kept.
    ///
    /// # Errors
    /// `RecordError::DuplicateDroplet` if the id exists with another payload.
    pub fn insert(&mut self, record: DropletRecord) -> Result<()> {
        if let Some(existing) = self.droplets.get(&record.id) {
            if existing.payload != record.payload {
                return Err(RecordError::DuplicateDroplet { id: record.id }.into());
            }
            warn!(droplet = record.id, "ignoring repeated droplet");
            return Ok(());
        }
        self.droplets.insert(record.id, record);
        Ok(())
    }

    pub fn get(&self, id: u32) -> Option<&DropletRecord> {
        self.droplets.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.droplets.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.droplets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.droplets.is_empty()
    }

    /// Droplets in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &DropletRecord> {
        self.droplets.values()
    }
}
