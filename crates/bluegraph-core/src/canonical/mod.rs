//! Canonical serialization and content identity.
//!
//! A node's identity is the SHA-256 digest of its canonical JSON text,
//! carried as a [`BlueId`]. Two nodes hash equal exactly when their
//! canonical texts are byte-identical, so everything here is about making
//! that text deterministic:
//!
//! - object members are emitted in ascending byte order of their keys
//!   (a deliberate deviation from RFC 8785, which sorts by UTF-16 code
//!   units; the orders agree on ASCII keys),
//! - strings use minimal escaping only (`\"`, `\\`, and the short forms
//!   for control characters),
//! - no whitespace is emitted,
//! - numbers are rendered by `serde_json`'s formatter, which produces the
//!   shortest round-trippable decimal form.
//!
//! Names and features are presentation metadata and are excluded from the
//! canonical text entirely. A node whose only content is its scalar value
//! canonicalizes to the bare scalar, matching the wire shorthand.
//!
//! # Example
//!
//! ```
//! use bluegraph_core::{blue_id_of, Node};
//!
//! let a = Node::new()
//!     .with_property("x", Node::new().with_value(1_i64))
//!     .with_property("y", Node::new().with_value(2_i64));
//! let b = Node::new()
//!     .with_property("y", Node::new().with_value(2_i64))
//!     .with_property("x", Node::new().with_value(1_i64));
//!
//! assert_eq!(blue_id_of(&a)?, blue_id_of(&b)?);
//! # Ok::<(), bluegraph_core::CanonicalizeError>(())
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::ident::BlueId;
use crate::node::wire::{BLUE_ID_KEY, RESERVED_KEYS};
use crate::node::{Node, NodeValue};

pub use crate::node::wire::MAX_DEPTH;

/// Errors from canonicalizing a node.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CanonicalizeError {
    /// Nesting exceeded [`MAX_DEPTH`].
    #[error("node nested deeper than {max_depth} levels")]
    MaxDepthExceeded {
        /// The exceeded limit.
        max_depth: usize,
    },

    /// A property key collided with a reserved wire key.
    ///
    /// Such a node has no unambiguous document form, so it has no
    /// identity either.
    #[error("property key '{key}' collides with a reserved key")]
    ReservedPropertyKey {
        /// The colliding key.
        key: String,
    },
}

/// Renders the canonical JSON text of `node`.
///
/// # Errors
///
/// Returns [`CanonicalizeError`] if the node nests deeper than
/// [`MAX_DEPTH`] or uses a reserved key as a property name.
pub fn canonicalize(node: &Node) -> Result<String, CanonicalizeError> {
    let mut out = String::new();
    emit_node(node, &mut out, 0)?;
    Ok(out)
}

/// Computes the content identity of `node`.
///
/// # Errors
///
/// Returns [`CanonicalizeError`] if the node cannot be canonicalized.
pub fn blue_id_of(node: &Node) -> Result<BlueId, CanonicalizeError> {
    let canonical = canonicalize(node)?;
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(BlueId::from_digest(digest.into()))
}

/// One emitted object member; property children and reserved fields are
/// sorted together under their keys.
enum Member<'a> {
    Type(&'a Node),
    Value(&'a NodeValue),
    Items(&'a [Node]),
    Reference(&'a BlueId),
    Property(&'a Node),
}

fn emit_node(node: &Node, out: &mut String, depth: usize) -> Result<(), CanonicalizeError> {
    if depth > MAX_DEPTH {
        return Err(CanonicalizeError::MaxDepthExceeded {
            max_depth: MAX_DEPTH,
        });
    }

    // Scalar shorthand: value is the only content, so the scalar is the
    // whole canonical text. Name and features never count as content.
    let bare_scalar = node.value().is_some()
        && node.node_type().is_none()
        && node.items().is_none()
        && node.properties().is_none()
        && node.reference().is_none();
    if bare_scalar {
        if let Some(value) = node.value() {
            emit_scalar(value, out);
        }
        return Ok(());
    }

    let mut members: BTreeMap<&str, Member<'_>> = BTreeMap::new();
    if let Some(node_type) = node.node_type() {
        members.insert("type", Member::Type(node_type));
    }
    if let Some(value) = node.value() {
        members.insert("value", Member::Value(value));
    }
    if let Some(items) = node.items() {
        members.insert("items", Member::Items(items));
    }
    if let Some(id) = node.reference() {
        members.insert(BLUE_ID_KEY, Member::Reference(id));
    }
    if let Some(properties) = node.properties() {
        for (key, child) in properties {
            if RESERVED_KEYS.contains(&key.as_str()) {
                return Err(CanonicalizeError::ReservedPropertyKey { key: key.clone() });
            }
            members.insert(key, Member::Property(child));
        }
    }

    out.push('{');
    for (index, (key, member)) in members.iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        emit_string(key, out);
        out.push(':');
        match member {
            Member::Type(child) | Member::Property(child) => emit_node(child, out, depth + 1)?,
            Member::Value(value) => emit_scalar(value, out),
            Member::Items(items) => {
                out.push('[');
                for (item_index, item) in items.iter().enumerate() {
                    if item_index > 0 {
                        out.push(',');
                    }
                    emit_node(item, out, depth + 1)?;
                }
                out.push(']');
            },
            Member::Reference(id) => emit_string(&id.to_base58(), out),
        }
    }
    out.push('}');
    Ok(())
}

fn emit_scalar(value: &NodeValue, out: &mut String) {
    match value {
        NodeValue::Text(text) => emit_string(text, out),
        NodeValue::Number(number) => {
            let _ = write!(out, "{number}");
        },
        NodeValue::Bool(true) => out.push_str("true"),
        NodeValue::Bool(false) => out.push_str("false"),
    }
}

fn emit_string(text: &str, out: &mut String) {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{0009}' => out.push_str("\\t"),
            '\u{000A}' => out.push_str("\\n"),
            '\u{000C}' => out.push_str("\\f"),
            '\u{000D}' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            },
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use sha2::{Digest, Sha256};

    use super::*;

    fn value_node(value: impl Into<NodeValue>) -> Node {
        Node::new().with_value(value)
    }

    // =========================================================================
    // Canonical text
    // =========================================================================

    #[test]
    fn scalar_shorthand() {
        assert_eq!(canonicalize(&value_node(7_i64)).unwrap(), "7");
        assert_eq!(canonicalize(&value_node(true)).unwrap(), "true");
        assert_eq!(canonicalize(&value_node("hi")).unwrap(), "\"hi\"");
    }

    #[test]
    fn name_does_not_block_scalar_shorthand() {
        let node = value_node(7_i64).with_name("Seven");
        assert_eq!(canonicalize(&node).unwrap(), "7");
    }

    #[test]
    fn members_sort_by_byte_order() {
        let node = Node::new()
            .with_property("zeta", value_node(1_i64))
            .with_property("alpha", value_node(2_i64))
            .with_value(3_i64);
        assert_eq!(
            canonicalize(&node).unwrap(),
            r#"{"alpha":2,"value":3,"zeta":1}"#
        );
    }

    #[test]
    fn insertion_order_is_irrelevant() {
        let forward = Node::new()
            .with_property("a", value_node(1_i64))
            .with_property("b", value_node(2_i64));
        let backward = Node::new()
            .with_property("b", value_node(2_i64))
            .with_property("a", value_node(1_i64));
        assert_eq!(
            canonicalize(&forward).unwrap(),
            canonicalize(&backward).unwrap()
        );
    }

    #[test]
    fn name_and_features_are_excluded() {
        let plain = Node::new().with_property("x", value_node(1_i64));
        let decorated = Node::new()
            .with_name("Sample")
            .with_property("x", value_node(1_i64))
            .with_feature(crate::node::Feature::Blueprint {
                entries: std::collections::BTreeMap::new(),
            });
        assert_eq!(
            canonicalize(&plain).unwrap(),
            canonicalize(&decorated).unwrap()
        );
    }

    #[test]
    fn reference_emits_blue_id_member() {
        let id = BlueId::from_digest([1; crate::ident::DIGEST_LEN]);
        let node = Node::reference_to(id);
        assert_eq!(
            canonicalize(&node).unwrap(),
            format!(r#"{{"blueId":"{}"}}"#, id.to_base58())
        );
    }

    #[test]
    fn items_emit_in_order() {
        let node = Node::new().with_items(vec![value_node(1_i64), value_node(2_i64)]);
        assert_eq!(canonicalize(&node).unwrap(), r#"{"items":[1,2]}"#);
    }

    #[test]
    fn empty_containers_are_preserved() {
        let node = Node::new().with_items(Vec::new());
        assert_eq!(canonicalize(&node).unwrap(), r#"{"items":[]}"#);
        assert_eq!(canonicalize(&Node::new()).unwrap(), "{}");
    }

    #[test]
    fn string_escaping_is_minimal() {
        let node = value_node("line\nquote\"back\\slash\u{0001}café");
        assert_eq!(
            canonicalize(&node).unwrap(),
            "\"line\\nquote\\\"back\\\\slash\\u0001café\""
        );
    }

    // =========================================================================
    // Rejection
    // =========================================================================

    #[test]
    fn rejects_reserved_property_key() {
        let node = Node::new().with_property("value", value_node(1_i64));
        assert_eq!(
            canonicalize(&node).unwrap_err(),
            CanonicalizeError::ReservedPropertyKey {
                key: "value".to_owned()
            }
        );
    }

    #[test]
    fn rejects_excessive_depth() {
        let mut node = value_node(1_i64);
        for _ in 0..(MAX_DEPTH + 10) {
            node = Node::new().with_property("inner", node);
        }
        assert_eq!(
            canonicalize(&node).unwrap_err(),
            CanonicalizeError::MaxDepthExceeded {
                max_depth: MAX_DEPTH
            }
        );
    }

    // =========================================================================
    // Identity
    // =========================================================================

    #[test]
    fn blue_id_hashes_canonical_bytes() {
        let id = blue_id_of(&value_node(7_i64)).unwrap();
        let expected: [u8; 32] = Sha256::digest(b"7").into();
        assert_eq!(id.as_bytes(), &expected);
    }

    #[test]
    fn identity_tracks_canonical_equality() {
        let a = Node::new()
            .with_name("First")
            .with_property("x", value_node(1_i64));
        let b = Node::new()
            .with_name("Second")
            .with_property("x", value_node(1_i64));
        let c = Node::new().with_property("x", value_node(2_i64));

        assert_eq!(blue_id_of(&a).unwrap(), blue_id_of(&b).unwrap());
        assert_ne!(blue_id_of(&a).unwrap(), blue_id_of(&c).unwrap());
    }

    #[test]
    fn wire_parse_then_hash_is_stable_across_formats() {
        let from_json = Node::from_json_str(r#"{"age": {"value": 39}, "name": "Alice"}"#).unwrap();
        let from_yaml = Node::from_yaml_str("name: Alice\nage:\n  value: 39\n").unwrap();
        assert_eq!(
            blue_id_of(&from_json).unwrap(),
            blue_id_of(&from_yaml).unwrap()
        );
    }
}
