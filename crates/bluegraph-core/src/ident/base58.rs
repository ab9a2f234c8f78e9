//! Base58 codec for the textual blueId form.
//!
//! Uses the Bitcoin alphabet (no `0`, `O`, `I`, `l`). Leading zero bytes are
//! encoded as leading `1` characters, one per byte, so the codec round-trips
//! arbitrary byte strings exactly.

use super::BlueIdError;

/// The Bitcoin Base58 alphabet.
const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Encodes bytes as a Base58 string.
#[must_use]
pub(crate) fn encode(input: &[u8]) -> String {
    let leading_zeros = input.iter().take_while(|&&b| b == 0).count();

    // Base conversion: repeatedly fold bytes into little-endian base58 digits.
    let mut digits: Vec<u8> = Vec::with_capacity(input.len() * 138 / 100 + 1);
    for &byte in &input[leading_zeros..] {
        let mut carry = u32::from(byte);
        for digit in &mut digits {
            carry += u32::from(*digit) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut output = String::with_capacity(leading_zeros + digits.len());
    for _ in 0..leading_zeros {
        output.push('1');
    }
    for &digit in digits.iter().rev() {
        output.push(char::from(ALPHABET[digit as usize]));
    }
    output
}

/// Decodes a Base58 string into bytes.
///
/// Rejects any character outside the alphabet (including whitespace and the
/// ambiguous `0`, `O`, `I`, `l`).
pub(crate) fn decode(input: &str) -> Result<Vec<u8>, BlueIdError> {
    let leading_ones = input.bytes().take_while(|&b| b == b'1').count();

    let mut bytes: Vec<u8> = Vec::with_capacity(input.len() * 733 / 1000 + 1);
    for c in input[leading_ones..].chars() {
        let digit = digit_value(c).ok_or(BlueIdError::InvalidCharacter { character: c })?;
        let mut carry = u32::from(digit);
        for byte in &mut bytes {
            carry += u32::from(*byte) * 58;
            *byte = (carry & 0xFF) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xFF) as u8);
            carry >>= 8;
        }
    }

    let mut output = vec![0u8; leading_ones];
    output.extend(bytes.iter().rev());
    Ok(output)
}

/// Maps a character to its alphabet index, or `None` if it is not Base58.
fn digit_value(c: char) -> Option<u8> {
    if !c.is_ascii() {
        return None;
    }
    ALPHABET
        .iter()
        .position(|&a| a == c as u8)
        .map(|idx| idx as u8)
}
