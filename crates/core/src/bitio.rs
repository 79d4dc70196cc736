//! Bit strings and bit-level I/O.
//!
//! Droplets arrive as nucleotide strings that translate to 2 bits per symbol,
//! so nothing in this crate is byte aligned until the very end. [`Bits`] is
//! the owned bit string everything else passes around; [`BitWriter`] and
//! [`BitReader`] build and walk it.
//!
//! All three operate in MSB-first order: bit 0 of a `Bits` is the most
//! significant bit of its first byte.
//!
//! # Padding Rules
//! - `Bits`: unused low bits of the final byte are always zero, so two
//!   bit strings are equal exactly when their bits are equal
//! - BitReader: never reads past the logical bit length
//!
//! # Example
//! ```
//! use dna_fountain_core::bitio::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3).unwrap();
//! writer.write_bits(0b11, 2).unwrap();
//!
//! let bits = writer.finish_bits();
//! assert_eq!(bits.to_string(), "10111");
//!
//! let mut reader = BitReader::from_bits(&bits);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(2).unwrap(), 0b11);
//! assert!(reader.read_bits(1).is_err());
//! ```

use crate::error::{BitIoError, Error, Result};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// An owned bit string with an exact bit length.
///
/// # Invariants
/// - `bytes.len() == ceil(len / 8)`
/// - padding bits after `len` in the last byte are zero
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bits {
    bytes: Vec<u8>,
    len: usize,
}

impl Bits {
    /// Create an empty bit string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bit string of `len` zero bits.
    pub fn zeros(len: usize) -> Self {
        Self {
            bytes: vec![0; len.div_ceil(8)],
            len,
        }
    }

    /// Wrap whole bytes; the result is `8 * bytes.len()` bits long.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            len: bytes.len() * 8,
        }
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Backing bytes, MSB-first, with zeroed padding in the last byte.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Bit at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<bool> {
        if index >= self.len {
            return None;
        }
        Some(self.bytes[index / 8] & (0x80 >> (index % 8)) != 0)
    }

    /// Append one bit.
    pub fn push(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            self.bytes[self.len / 8] |= 0x80 >> (self.len % 8);
        }
        self.len += 1;
    }

    /// Append every bit of `other`.
    pub fn extend(&mut self, other: &Bits) {
        if self.len % 8 == 0 {
            // Byte aligned: other's padding becomes our padding
            self.bytes.extend_from_slice(&other.bytes);
            self.len += other.len;
            return;
        }
        for i in 0..other.len {
            self.push(other.bytes[i / 8] & (0x80 >> (i % 8)) != 0);
        }
    }

    /// Copy out the bits in `range`.
    ///
    /// # Errors
    /// `BitIoError::InsufficientBits` if the range ends past the string or
    /// starts after it ends.
    pub fn slice(&self, range: Range<usize>) -> Result<Bits> {
        if range.start > range.end || range.end > self.len {
            return Err(BitIoError::InsufficientBits {
                requested: range.end,
                available: self.len,
            }
            .into());
        }

        let mut reader = BitReader::from_bits(self);
        reader.skip(range.start)?;

        let mut writer = BitWriter::new();
        let mut remaining = range.end - range.start;
        while remaining > 0 {
            let count = remaining.min(64);
            writer.write_bits(reader.read_bits(count)?, count)?;
            remaining -= count;
        }

        Ok(writer.finish_bits())
    }

    /// XOR two equal-length bit strings into a new one.
    ///
    /// # Errors
    /// `BitIoError::LengthMismatch` if the lengths differ.
    pub fn xor(&self, other: &Bits) -> Result<Bits> {
        let mut out = self.clone();
        out.xor_assign(other)?;
        Ok(out)
    }

    /// XOR `other` into `self` in place.
    ///
    /// # Errors
    /// `BitIoError::LengthMismatch` if the lengths differ; `self` is left
    /// untouched in that case.
    pub fn xor_assign(&mut self, other: &Bits) -> Result<()> {
        if self.len != other.len {
            return Err(BitIoError::LengthMismatch {
                left: self.len,
                right: other.len,
            }
            .into());
        }
        for (dst, src) in self.bytes.iter_mut().zip(&other.bytes) {
            *dst ^= src;
        }
        Ok(())
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }
}

impl FromStr for Bits {
    type Err = Error;

    /// Parse a string of `'0'` and `'1'` characters.
    fn from_str(s: &str) -> Result<Self> {
        let mut bits = Bits::new();
        for (position, c) in s.chars().enumerate() {
            match c {
                '0' => bits.push(false),
                '1' => bits.push(true),
                found => return Err(BitIoError::InvalidBinaryDigit { found, position }.into()),
            }
        }
        Ok(bits)
    }
}

impl fmt::Display for Bits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len {
            let bit = self.bytes[i / 8] & (0x80 >> (i % 8)) != 0;
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

/// Writes bits MSB-first into a byte buffer.
///
/// Accumulates bits in a buffer and flushes complete bytes to the output.
///
/// # Invariants
/// - `bit_buffer` contains up to 7 bits (never a full byte)
/// - `bit_count` is always < 8
#[derive(Debug, Clone)]
pub struct BitWriter {
    /// Completed bytes
    bytes: Vec<u8>,
    /// Accumulator for the current partial byte (MSB-aligned)
    bit_buffer: u8,
    /// Number of bits in bit_buffer (0-7)
    bit_count: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            bit_buffer: 0,
            bit_count: 0,
        }
    }

    /// Write up to 64 bits to the output.
    ///
    /// Bits are written MSB-first. For example, writing value=0b101 with count=3
    /// writes bits 1, 0, 1 in that order.
    ///
    /// # Errors
    /// Returns `BitIoError::InvalidBitCount` if count > 64.
    pub fn write_bits(&mut self, value: u64, count: usize) -> Result<()> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        let mut remaining = count;
        while remaining > 0 {
            let bits_to_write = remaining.min(8 - self.bit_count as usize);

            // Top bits_to_write bits of what is left
            let shift = remaining - bits_to_write;
            let bits = ((value >> shift) & ((1u64 << bits_to_write) - 1)) as u8;

            self.bit_buffer |= bits << (8 - self.bit_count as usize - bits_to_write);
            self.bit_count += bits_to_write as u8;

            if self.bit_count == 8 {
                self.bytes.push(self.bit_buffer);
                self.bit_buffer = 0;
                self.bit_count = 0;
            }

            remaining -= bits_to_write;
        }

        Ok(())
    }

    /// Return the total number of bits written (including partial byte).
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 + self.bit_count as usize
    }

    /// Finish writing and return the exact-length bit string.
    pub fn finish_bits(mut self) -> Bits {
        let len = self.bit_len();
        if self.bit_count > 0 {
            self.bytes.push(self.bit_buffer);
        }
        Bits {
            bytes: self.bytes,
            len,
        }
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads bits MSB-first from a byte buffer.
///
/// # Invariants
/// - `bit_position` never exceeds `limit`
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Source data
    data: &'a [u8],
    /// Number of valid bits in `data`
    limit: usize,
    /// Current bit position (0 = MSB of first byte)
    bit_position: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader over whole bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            limit: data.len() * 8,
            bit_position: 0,
        }
    }

    /// Create a reader that stops at the logical end of `bits`.
    pub fn from_bits(bits: &'a Bits) -> Self {
        Self {
            data: &bits.bytes,
            limit: bits.len,
            bit_position: 0,
        }
    }

    /// Read up to 64 bits from the input.
    ///
    /// Bits are read MSB-first. For example, reading 3 bits from byte 0b10110000
    /// returns 0b101.
    ///
    /// # Errors
    /// - `BitIoError::InvalidBitCount` if count > 64
    /// - `BitIoError::UnexpectedEof` if not enough bits remain
    pub fn read_bits(&mut self, count: usize) -> Result<u64> {
        if count > 64 {
            return Err(BitIoError::InvalidBitCount(count).into());
        }

        if count > self.bits_remaining() {
            return Err(BitIoError::UnexpectedEof.into());
        }

        let mut result = 0u64;
        let mut remaining = count;

        while remaining > 0 {
            let byte_idx = self.bit_position / 8;
            let bit_offset = self.bit_position % 8;

            let bits_in_byte = 8 - bit_offset;
            let bits_to_read = remaining.min(bits_in_byte);

            let byte = self.data[byte_idx];
            let mask = ((1u16 << bits_to_read) - 1) as u8;
            let bits = (byte >> (bits_in_byte - bits_to_read)) & mask;

            result = (result << bits_to_read) | bits as u64;

            self.bit_position += bits_to_read;
            remaining -= bits_to_read;
        }

        Ok(result)
    }

    /// Advance past `count` bits without reading them.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        let available = self.bits_remaining();
        if count > available {
            return Err(BitIoError::InsufficientBits {
                requested: count,
                available,
            }
            .into());
        }
        self.bit_position += count;
        Ok(())
    }

    /// Return the number of bits remaining.
    pub fn bits_remaining(&self) -> usize {
        self.limit - self.bit_position
    }

    /// Return the current bit position.
    pub fn position(&self) -> usize {
        self.bit_position
    }

    pub fn is_empty(&self) -> bool {
        self.bit_position >= self.limit
    }
}
