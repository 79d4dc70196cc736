//! Nucleotide symbol codec.
//!
//! Droplets are stored as strings over a 4-letter alphabet. Each symbol
//! carries exactly 2 bits:
//!
//! ```text
//! A -> 00    G -> 01    C -> 10    T -> 11
//! ```
//!
//! Only the symbol → bit direction exists; this crate never writes
//! sequences.

use crate::bitio::{BitWriter, Bits};
use crate::error::{Result, SymbolError};

/// One nucleotide symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    A,
    G,
    C,
    T,
}

impl Symbol {
    /// Every symbol, in code order.
    pub const ALL: [Symbol; 4] = [Symbol::A, Symbol::G, Symbol::C, Symbol::T];

    /// Look up a symbol character. Lowercase (soft-masked) letters map to
    /// the same symbol.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' | 'a' => Some(Symbol::A),
            'G' | 'g' => Some(Symbol::G),
            'C' | 'c' => Some(Symbol::C),
            'T' | 't' => Some(Symbol::T),
            _ => None,
        }
    }

    /// The 2-bit code, in the low bits.
    pub fn code(self) -> u8 {
        match self {
            Symbol::A => 0b00,
            Symbol::G => 0b01,
            Symbol::C => 0b10,
            Symbol::T => 0b11,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Symbol::A => 'A',
            Symbol::G => 'G',
            Symbol::C => 'C',
            Symbol::T => 'T',
        }
    }
}

/// Translate a symbol string into bits, 2 per symbol, preserving order.
///
/// # Errors
/// `SymbolError::InvalidSymbol` naming the first character outside the
/// alphabet and its (0-based, character) position.
pub fn encode_to_bits(sequence: &str) -> Result<Bits> {
    let mut writer = BitWriter::new();
    for (position, c) in sequence.chars().enumerate() {
        let symbol = Symbol::from_char(c).ok_or(SymbolError::InvalidSymbol { symbol: c, position })?;
        writer.write_bits(u64::from(symbol.code()), 2)?;
    }
    Ok(writer.finish_bits())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_each_symbol_code() {
        let expected = ["00", "01", "10", "11"];
        for (symbol, code) in Symbol::ALL.iter().zip(expected) {
            let bits = encode_to_bits(&symbol.as_char().to_string()).unwrap();
            assert_eq!(bits.to_string(), code, "symbol {:?}", symbol);
        }
    }

    #[test]
    fn test_known_sequence() {
        let bits = encode_to_bits("AAGATCATTGGC").unwrap();
        assert_eq!(bits.to_string(), "000001001110001111010110");
    }

    #[test]
    fn test_length_doubles() {
        let long = "TGCA".repeat(36);
        for seq in ["", "A", "GT", "ACGTACGTA", long.as_str()] {
            assert_eq!(encode_to_bits(seq).unwrap().len(), seq.len() * 2);
        }
    }

    #[test]
    fn test_lowercase_accepted() {
        assert_eq!(
            encode_to_bits("acgt").unwrap(),
            encode_to_bits("ACGT").unwrap()
        );
    }

    #[test]
    fn test_invalid_symbol_reported() {
        let err = encode_to_bits("ACGNT").unwrap_err();
        assert!(matches!(
            err,
            Error::Symbol(SymbolError::InvalidSymbol { symbol: 'N', position: 3 })
        ));

        // Digits are not passed through as bits
        assert!(encode_to_bits("0101").is_err());
    }
}
