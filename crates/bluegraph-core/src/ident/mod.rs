//! Content-address identifiers.
//!
//! A [`BlueId`] is the SHA-256 digest of a node's canonical form, spelled in
//! Base58 for document use. [`BlueId::to_cid`] and [`BlueId::from_cid`]
//! translate the same digest to and from the CIDv1 text form used by
//! external content-addressed networks; the translation is pure and
//! round-trips exactly.
//!
//! Both text codecs are strict: a given identifier has exactly one valid
//! spelling, and anything else is rejected at parse time.

mod base32;
mod base58;
mod blue_id;
mod cid;

pub use blue_id::{BlueId, BlueIdError, DIGEST_LEN};
pub use cid::CidError;
