//! BlueId to external content-identifier translation.
//!
//! A blueId digest can be re-expressed as a CIDv1 for content-addressed
//! networks that expect multiformats identifiers:
//!
//! ```text
//! 'b' || base32lower_no_pad( version || codec || hash_fn || length || digest )
//!                             0x01       0x55     0x12       0x20     32 bytes
//! ```
//!
//! The transform is pure and total in the encode direction and fail-closed
//! in the decode direction: every tag byte is validated and the embedded
//! digest must be exactly 32 bytes, so decoding reproduces the original
//! digest bytes or fails.

use thiserror::Error;

use super::{BlueId, DIGEST_LEN, base32};

/// Multibase prefix for lowercase base32.
const MULTIBASE_PREFIX: char = 'b';

/// CID version tag (CIDv1).
const CID_VERSION: u8 = 0x01;

/// Codec tag for raw binary content.
const CODEC_RAW: u8 = 0x55;

/// Multihash function tag for SHA-256.
const HASH_FN_SHA2_256: u8 = 0x12;

/// Multihash digest length tag.
const HASH_LEN: u8 = 0x20;

/// Length of the binary CID payload: four tag bytes plus the digest.
const PAYLOAD_LEN: usize = 4 + DIGEST_LEN;

/// Errors from parsing an external content identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CidError {
    /// The input was empty.
    #[error("empty input")]
    EmptyInput,

    /// The multibase prefix was not lowercase base32 (`b`).
    #[error("unsupported multibase prefix: {got:?}, expected 'b'")]
    UnsupportedMultibase {
        /// The prefix character found.
        got: char,
    },

    /// A character outside the Base32 alphabet was encountered.
    #[error("invalid base32 character: {character:?}")]
    InvalidCharacter {
        /// The offending character.
        character: char,
    },

    /// The payload contained uppercase characters.
    #[error("base32 payload contains uppercase characters")]
    ContainsUppercase,

    /// The payload contained padding characters.
    #[error("base32 payload contains padding")]
    ContainsPadding,

    /// Trailing bits were non-zero, so the spelling is not canonical.
    #[error("non-canonical base32 encoding")]
    NonCanonicalEncoding,

    /// The decoded payload had the wrong length.
    #[error("invalid payload length: expected {PAYLOAD_LEN} bytes, got {got}")]
    InvalidLength {
        /// The decoded byte count.
        got: usize,
    },

    /// The CID version tag was not CIDv1.
    #[error("unsupported CID version tag: {tag:#04x}")]
    UnsupportedVersion {
        /// The version byte found.
        tag: u8,
    },

    /// The codec tag was not raw binary.
    #[error("unsupported codec tag: {tag:#04x}")]
    UnsupportedCodec {
        /// The codec byte found.
        tag: u8,
    },

    /// The multihash function tag was not SHA-256.
    #[error("unsupported hash function tag: {tag:#04x}")]
    UnsupportedHashFunction {
        /// The hash function byte found.
        tag: u8,
    },

    /// The multihash length tag did not declare a 32-byte digest.
    #[error("unsupported digest length tag: {tag:#04x}")]
    UnsupportedDigestLength {
        /// The length byte found.
        tag: u8,
    },
}

impl BlueId {
    /// Encodes this blueId as a CIDv1 text identifier.
    ///
    /// The result always starts with `bafkrei` (multibase prefix plus the
    /// fixed raw/SHA-256 header).
    #[must_use]
    pub fn to_cid(&self) -> String {
        let mut payload = [0u8; PAYLOAD_LEN];
        payload[0] = CID_VERSION;
        payload[1] = CODEC_RAW;
        payload[2] = HASH_FN_SHA2_256;
        payload[3] = HASH_LEN;
        payload[4..].copy_from_slice(self.as_bytes());

        let mut output = String::with_capacity(1 + PAYLOAD_LEN * 8 / 5 + 1);
        output.push(MULTIBASE_PREFIX);
        output.push_str(&base32::encode(&payload));
        output
    }

    /// Decodes a CIDv1 text identifier back into a blueId.
    ///
    /// Every tag byte is checked: version must be CIDv1, codec must be raw,
    /// the hash function must be SHA-256 with a 32-byte digest. Unknown tags
    /// are rejected rather than skipped.
    pub fn from_cid(input: &str) -> Result<Self, CidError> {
        let mut chars = input.chars();
        let prefix = chars.next().ok_or(CidError::EmptyInput)?;
        if prefix != MULTIBASE_PREFIX {
            return Err(CidError::UnsupportedMultibase { got: prefix });
        }

        let decoded = base32::decode(chars.as_str())?;
        if decoded.len() != PAYLOAD_LEN {
            return Err(CidError::InvalidLength { got: decoded.len() });
        }
        if decoded[0] != CID_VERSION {
            return Err(CidError::UnsupportedVersion { tag: decoded[0] });
        }
        if decoded[1] != CODEC_RAW {
            return Err(CidError::UnsupportedCodec { tag: decoded[1] });
        }
        if decoded[2] != HASH_FN_SHA2_256 {
            return Err(CidError::UnsupportedHashFunction { tag: decoded[2] });
        }
        if decoded[3] != HASH_LEN {
            return Err(CidError::UnsupportedDigestLength { tag: decoded[3] });
        }

        let mut digest = [0u8; DIGEST_LEN];
        digest.copy_from_slice(&decoded[4..]);
        Ok(Self::from_digest(digest))
    }
}
