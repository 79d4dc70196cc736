//! Message assembly: resolved blocks → bit string → text.

use crate::bitio::Bits;
use crate::error::{MessageError, Result};

/// Concatenate blocks in the order given.
pub fn assemble(blocks: &[Bits]) -> Bits {
    let mut message = Bits::new();
    for block in blocks {
        message.extend(block);
    }
    message
}

/// Decode a bit string as UTF-8 text, bytes packed MSB first.
///
/// Every byte is kept, including NUL; nothing is replaced or trimmed.
///
/// # Errors
/// - `MessageError::UnalignedMessage` if the length is not a multiple of 8
/// - `MessageError::InvalidCharacter` at the first byte that does not start
///   a valid UTF-8 sequence
pub fn decode_text(bits: &Bits) -> Result<String> {
    if bits.len() % 8 != 0 {
        return Err(MessageError::UnalignedMessage { bits: bits.len() }.into());
    }

    let text = String::from_utf8(bits.as_bytes().to_vec()).map_err(|e| {
        let position = e.utf8_error().valid_up_to();
        let byte = e.as_bytes()[position];
        MessageError::InvalidCharacter { byte, position }
    })?;
    Ok(text)
}
