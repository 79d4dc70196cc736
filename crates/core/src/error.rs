//! Error types for the dna-fountain decoder.
//!
//! All operations return structured errors rather than panicking. Decoding
//! is a single-shot batch computation, so any error aborts the whole run and
//! no partial result is produced.

use thiserror::Error;

/// Top-level error type for all operations in the system.
///
/// Each variant corresponds to a specific failure domain:
/// - Bit I/O: packing, slicing and combining bit strings
/// - Symbol: translating nucleotide symbols into bits
/// - Record: parsing sequence files into droplet records
/// - Coverage: parsing the droplet → block coverage table
/// - Decode: the peeling decoder itself
/// - Message: turning recovered bits into text
#[derive(Debug, Error)]
pub enum Error {
    /// Bit I/O operation failed (e.g., reading past end of a bit string)
    #[error("bit I/O error: {0}")]
    BitIo(#[from] BitIoError),

    /// Sequence contained a symbol outside the nucleotide alphabet
    #[error("symbol error: {0}")]
    Symbol(#[from] SymbolError),

    /// Droplet record or sequence file could not be parsed
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// Coverage table row could not be parsed
    #[error("coverage error: {0}")]
    Coverage(#[from] CoverageError),

    /// Peeling decoder failed to resolve every source block
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Recovered bits are not a valid text message
    #[error("message error: {0}")]
    Message(#[from] MessageError),
}

/// Bit-level I/O errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BitIoError {
    /// Attempted to read past the end of the bit string
    #[error("unexpected end of bit stream")]
    UnexpectedEof,

    /// Attempted to read more bits than available
    #[error("insufficient bits: requested {requested}, available {available}")]
    InsufficientBits { requested: usize, available: usize },

    /// Invalid bit count (e.g., requesting more than 64 bits)
    #[error("invalid bit count: {0}")]
    InvalidBitCount(usize),

    /// XOR operands differ in length
    #[error("length mismatch: {left} bits vs {right} bits")]
    LengthMismatch { left: usize, right: usize },

    /// Binary text contained something other than '0' or '1'
    #[error("invalid binary digit {found:?} at position {position}")]
    InvalidBinaryDigit { found: char, position: usize },
}

/// Nucleotide symbol errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SymbolError {
    /// Character outside the A/G/C/T alphabet
    #[error("invalid symbol {symbol:?} at position {position}")]
    InvalidSymbol { symbol: char, position: usize },
}

/// Droplet record and sequence file errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Bit string is too short to hold index, payload and checksum fields
    #[error("truncated record: need at least {required} bits, got {actual}")]
    TruncatedRecord { required: usize, actual: usize },

    /// Sequence file is structurally invalid
    #[error("malformed sequence file at line {line}: {reason}")]
    MalformedFasta { line: usize, reason: String },

    /// Record name does not carry a droplet number
    #[error("record name {name:?} does not match droplet_n<id>")]
    MalformedDropletName { name: String },

    /// Two records share an id but carry different payloads
    #[error("droplet {id} appears twice with different payloads")]
    DuplicateDroplet { id: u32 },
}

/// Coverage table errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoverageError {
    /// Row is missing its droplet id or bracketed block list
    #[error("malformed coverage row at line {line}: {reason}")]
    MalformedCoverageRow { line: usize, reason: String },

    /// Programmatically built entry breaks the coverage set rules
    #[error("invalid coverage for droplet {droplet_id}: {reason}")]
    InvalidEntry { droplet_id: u32, reason: String },
}

/// Peeling decoder errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Coverage table has no entries, so there is nothing to solve
    #[error("coverage table is empty")]
    EmptyCoverage,

    /// Coverage table describes more blocks than the decoder will allocate
    #[error("coverage table describes {blocks} blocks, limit is {limit}")]
    TooManyBlocks { blocks: usize, limit: usize },

    /// Coverage table names a droplet that was not loaded
    #[error("coverage table references droplet {droplet_id} which has no sequence")]
    MissingDroplet { droplet_id: u32 },

    /// Two degree-1 droplets seed the same block with different payloads
    #[error("droplet {droplet_id} conflicts with an earlier resolution of block {block}")]
    ConflictingResolution { block: usize, droplet_id: u32 },

    /// A fully determined droplet disagrees with the resolved blocks
    #[error("droplet {droplet_id} is inconsistent with its resolved blocks")]
    InconsistentDroplet { droplet_id: u32 },

    /// Peeling stalled before every block was resolved
    #[error("decode stalled: {} of {total} blocks unresolved {unresolved:?}", .unresolved.len())]
    InsufficientCoverage { unresolved: Vec<usize>, total: usize },
}

/// Message assembly errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// Bit count is not a whole number of bytes
    #[error("message of {bits} bits is not byte aligned")]
    UnalignedMessage { bits: usize },

    /// Byte does not start a valid UTF-8 character
    #[error("invalid character byte {byte:#04x} at byte {position}")]
    InvalidCharacter { byte: u8, position: usize },
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
