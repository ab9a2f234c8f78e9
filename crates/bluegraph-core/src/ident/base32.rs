//! Lowercase Base32 codec for the external content-identifier text form.
//!
//! RFC 4648 alphabet, lowercase, no padding. Decoding is strict: uppercase,
//! padding characters, and non-canonical trailing bits are all rejected so
//! that every identifier has exactly one textual spelling.

use super::CidError;

/// RFC 4648 Base32 alphabet in lowercase.
const ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// Encodes bytes as lowercase Base32 without padding.
#[must_use]
pub(crate) fn encode(input: &[u8]) -> String {
    let mut output = String::with_capacity(input.len().div_ceil(5) * 8);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for &byte in input {
        buffer = (buffer << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            let index = (buffer >> bits) & 0x1F;
            output.push(char::from(ALPHABET[index as usize]));
        }
    }
    if bits > 0 {
        let index = (buffer << (5 - bits)) & 0x1F;
        output.push(char::from(ALPHABET[index as usize]));
    }
    output
}

/// Decodes strict lowercase Base32 without padding.
pub(crate) fn decode(input: &str) -> Result<Vec<u8>, CidError> {
    let mut output = Vec::with_capacity(input.len() * 5 / 8 + 1);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for c in input.chars() {
        if c == '=' {
            return Err(CidError::ContainsPadding);
        }
        if c.is_ascii_uppercase() {
            return Err(CidError::ContainsUppercase);
        }
        let value = digit_value(c).ok_or(CidError::InvalidCharacter { character: c })?;
        buffer = (buffer << 5) | u32::from(value);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            output.push(((buffer >> bits) & 0xFF) as u8);
        }
    }

    // Leftover bits must be zero, otherwise two spellings decode to the
    // same bytes.
    if bits > 0 && (buffer & ((1 << bits) - 1)) != 0 {
        return Err(CidError::NonCanonicalEncoding);
    }
    Ok(output)
}

/// Maps a character to its alphabet index, or `None` if it is not Base32.
fn digit_value(c: char) -> Option<u8> {
    match c {
        'a'..='z' => Some(c as u8 - b'a'),
        '2'..='7' => Some(c as u8 - b'2' + 26),
        _ => None,
    }
}
