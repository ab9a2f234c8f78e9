//! `BlueId`, the content address of a node's canonical form.
//!
//! # Binary Form
//!
//! ```text
//! +--------------------------------+
//! | digest (32 bytes, SHA-256)     |
//! +--------------------------------+
//! ```
//!
//! # Text Form
//!
//! Base58 (Bitcoin alphabet) of the raw digest, 42 to 44 characters.
//!
//! Parsing is fail-closed: the alphabet is strict and the decoded payload
//! must be exactly 32 bytes.

use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::base58;

/// Length of the raw digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// Errors from parsing or constructing a [`BlueId`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BlueIdError {
    /// The input was empty.
    #[error("empty input")]
    EmptyInput,

    /// A character outside the Base58 alphabet was encountered.
    #[error("invalid base58 character: {character:?}")]
    InvalidCharacter {
        /// The offending character.
        character: char,
    },

    /// The decoded payload was not exactly 32 bytes.
    #[error("invalid digest length: expected {DIGEST_LEN} bytes, got {got}")]
    InvalidLength {
        /// The decoded byte count.
        got: usize,
    },
}

/// A content address: the SHA-256 digest of a node's canonical form.
///
/// Instances always hold exactly 32 digest bytes and are cheap to clone and
/// compare. The text form is Base58 and round-trips exactly.
///
/// # Examples
///
/// ```
/// use bluegraph_core::BlueId;
///
/// let id = BlueId::from_digest([0x2A; 32]);
/// let text = id.to_base58();
/// let parsed: BlueId = text.parse().unwrap();
/// assert_eq!(id, parsed);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlueId {
    digest: [u8; DIGEST_LEN],
}

impl BlueId {
    /// Wraps a raw 32-byte digest.
    #[must_use]
    pub const fn from_digest(digest: [u8; DIGEST_LEN]) -> Self {
        Self { digest }
    }

    /// Parses the canonical Base58 text form.
    ///
    /// Enforces the strict alphabet (no whitespace, no `0`/`O`/`I`/`l`) and
    /// an exact 32-byte decoded length.
    pub fn from_base58(input: &str) -> Result<Self, BlueIdError> {
        if input.is_empty() {
            return Err(BlueIdError::EmptyInput);
        }
        let decoded = base58::decode(input)?;
        let digest: [u8; DIGEST_LEN] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| BlueIdError::InvalidLength { got: decoded.len() })?;
        Ok(Self { digest })
    }

    /// Returns the canonical Base58 text form.
    #[must_use]
    pub fn to_base58(&self) -> String {
        base58::encode(&self.digest)
    }

    /// Returns the raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }
}

impl fmt::Debug for BlueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BlueId").field(&self.to_base58()).finish()
    }
}

impl fmt::Display for BlueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl std::str::FromStr for BlueId {
    type Err = BlueIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_base58(s)
    }
}

impl Serialize for BlueId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_base58())
    }
}

impl<'de> Deserialize<'de> for BlueId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_id() -> BlueId {
        BlueId::from_digest([0xAB; DIGEST_LEN])
    }

    #[test]
    fn text_round_trip() {
        let id = make_test_id();
        let text = id.to_base58();
        let parsed = BlueId::from_base58(&text).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn text_length_bounds() {
        let text = make_test_id().to_base58();
        assert!(text.len() >= 42 && text.len() <= 44, "got {}", text.len());
    }

    #[test]
    fn leading_zero_digest_round_trips() {
        let mut digest = [0u8; DIGEST_LEN];
        digest[31] = 1;
        let id = BlueId::from_digest(digest);
        let parsed = BlueId::from_base58(&id.to_base58()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(BlueId::from_base58("").unwrap_err(), BlueIdError::EmptyInput);
    }

    #[test]
    fn rejects_invalid_character() {
        let err = BlueId::from_base58("0invalid").unwrap_err();
        assert_eq!(err, BlueIdError::InvalidCharacter { character: '0' });
    }

    #[test]
    fn rejects_whitespace() {
        let text = format!(" {}", make_test_id().to_base58());
        let err = BlueId::from_base58(&text).unwrap_err();
        assert_eq!(err, BlueIdError::InvalidCharacter { character: ' ' });
    }

    #[test]
    fn rejects_truncated() {
        let err = BlueId::from_base58("abc").unwrap_err();
        assert!(matches!(err, BlueIdError::InvalidLength { .. }));
    }

    #[test]
    fn rejects_oversized() {
        let text = base58::encode(&[0x11; 40]);
        let err = BlueId::from_base58(&text).unwrap_err();
        assert_eq!(err, BlueIdError::InvalidLength { got: 40 });
    }

    #[test]
    fn from_str_trait() {
        let id = make_test_id();
        let parsed: BlueId = id.to_base58().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn display_and_debug() {
        let id = make_test_id();
        let display = format!("{id}");
        let debug = format!("{id:?}");
        assert_eq!(display, id.to_base58());
        assert!(debug.contains("BlueId"));
    }

    #[test]
    fn serde_round_trip() {
        let id = make_test_id();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.to_base58()));
        let back: BlueId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn serde_rejects_malformed() {
        let result: Result<BlueId, _> = serde_json::from_str("\"not-an-id\"");
        assert!(result.is_err());
    }

    #[test]
    fn ordering_is_digest_ordering() {
        let low = BlueId::from_digest([0x01; DIGEST_LEN]);
        let high = BlueId::from_digest([0xFF; DIGEST_LEN]);
        assert!(low < high);
    }
}
