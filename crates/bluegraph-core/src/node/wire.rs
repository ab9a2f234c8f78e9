//! Wire representation: mapping between nodes and document values.
//!
//! A node is serialized as a mapping with the reserved keys `name`, `type`,
//! `value`, `items`, `blueId`, and `features`; every other key is a
//! property. A bare `{blueId: ...}` mapping is shorthand for a reference
//! placeholder, and a bare scalar is shorthand for a value-only node.
//!
//! Parsing is fail-closed: malformed references, unknown feature kinds,
//! null values, and over-deep nesting are rejected with the offending path.
//! Textual parsing itself is delegated to `serde_json` / `serde_yaml`; this
//! module consumes the parsed value tree.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

use super::{Feature, FeatureKind, Node, NodePath, NodeValue};
use crate::ident::{BlueId, BlueIdError};

/// Maximum structural nesting depth accepted from documents.
///
/// Shared with canonicalization so that any node that parses can also be
/// hashed.
pub const MAX_DEPTH: usize = 128;

/// Reserved wire keys that never become properties.
pub const RESERVED_KEYS: [&str; 6] = ["name", "type", "value", "items", "blueId", "features"];

/// Wire key carrying a reference blueId.
pub const BLUE_ID_KEY: &str = "blueId";

/// Errors from mapping a document value to a node.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum WireError {
    /// The input text was not valid JSON or YAML.
    #[error("parse error: {message}")]
    Parse {
        /// Description from the underlying parser.
        message: String,
    },

    /// A null appeared where content was required.
    ///
    /// Null is not a node value; absence is expressed by omitting the key.
    #[error("null is not a valid node at path '{path}'")]
    UnexpectedNull {
        /// Document path of the null.
        path: String,
    },

    /// The `name` key did not hold a string.
    #[error("name must be a string at path '{path}'")]
    NonStringName {
        /// Document path of the node.
        path: String,
    },

    /// The `type` key held something other than a string alias, an inline
    /// node mapping, or a reference.
    #[error("type must be a string name or an inline node at path '{path}'")]
    InvalidTypeShape {
        /// Document path of the node.
        path: String,
    },

    /// The `value` key did not hold a scalar.
    #[error("value must be a text, number, or boolean scalar at path '{path}'")]
    NonScalarValue {
        /// Document path of the node.
        path: String,
    },

    /// The `items` key did not hold a list.
    #[error("items must be a list at path '{path}'")]
    NonArrayItems {
        /// Document path of the node.
        path: String,
    },

    /// A `blueId` key did not hold a string.
    #[error("blueId must hold a base-58 string at path '{path}'")]
    NonStringReference {
        /// Document path of the reference.
        path: String,
    },

    /// A `blueId` key held a malformed identifier.
    #[error("invalid blueId at path '{path}': {source}")]
    InvalidReference {
        /// Document path of the reference.
        path: String,
        /// The underlying identifier error.
        #[source]
        source: BlueIdError,
    },

    /// The `features` key was malformed.
    #[error("invalid features at path '{path}': {message}")]
    InvalidFeature {
        /// Document path of the node.
        path: String,
        /// What was wrong.
        message: String,
    },

    /// Nesting exceeded [`MAX_DEPTH`].
    #[error("document nested deeper than {max_depth} levels")]
    MaxDepthExceeded {
        /// The exceeded limit.
        max_depth: usize,
    },
}

/// Maps a parsed document value to a node.
///
/// # Errors
///
/// Returns [`WireError`] when the value does not describe a well-formed
/// node; the error carries the offending document path.
pub fn node_from_value(value: &Value) -> Result<Node, WireError> {
    parse_node(value, &NodePath::root(), 0)
}

fn parse_node(value: &Value, path: &NodePath, depth: usize) -> Result<Node, WireError> {
    if depth > MAX_DEPTH {
        return Err(WireError::MaxDepthExceeded {
            max_depth: MAX_DEPTH,
        });
    }

    match value {
        Value::Null => Err(WireError::UnexpectedNull {
            path: path.to_string(),
        }),
        Value::Bool(flag) => Ok(Node::new().with_value(*flag)),
        Value::Number(number) => Ok(Node::new().with_value(number.clone())),
        Value::String(text) => Ok(Node::new().with_value(text.as_str())),
        Value::Array(elements) => {
            let mut items = Vec::with_capacity(elements.len());
            for (index, element) in elements.iter().enumerate() {
                items.push(parse_node(element, &path.child_index(index), depth + 1)?);
            }
            Ok(Node::new().with_items(items))
        },
        Value::Object(map) => parse_mapping(map, path, depth),
    }
}

fn parse_mapping(map: &Map<String, Value>, path: &NodePath, depth: usize) -> Result<Node, WireError> {
    let mut node = Node::new();

    for (key, entry) in map {
        match key.as_str() {
            BLUE_ID_KEY => {
                let text = entry.as_str().ok_or_else(|| WireError::NonStringReference {
                    path: path.to_string(),
                })?;
                let id = BlueId::from_base58(text).map_err(|source| WireError::InvalidReference {
                    path: path.to_string(),
                    source,
                })?;
                node.set_reference(Some(id));
            },
            "name" => {
                let text = entry.as_str().ok_or_else(|| WireError::NonStringName {
                    path: path.to_string(),
                })?;
                node.set_name(Some(text.to_owned()));
            },
            "type" => {
                let type_node = parse_type(entry, path, depth)?;
                node.set_type(Some(type_node));
            },
            "value" => {
                let scalar = parse_scalar(entry).ok_or_else(|| WireError::NonScalarValue {
                    path: path.to_string(),
                })?;
                node.set_value(Some(scalar));
            },
            "items" => {
                let elements = entry.as_array().ok_or_else(|| WireError::NonArrayItems {
                    path: path.to_string(),
                })?;
                let mut items = Vec::with_capacity(elements.len());
                for (index, element) in elements.iter().enumerate() {
                    items.push(parse_node(element, &path.child_index(index), depth + 1)?);
                }
                node.set_items(Some(items));
            },
            "features" => {
                for feature in parse_features(entry, path)? {
                    node.add_feature(feature);
                }
            },
            property_key => {
                let child = parse_node(entry, &path.child(property_key), depth + 1)?;
                node.insert_property(property_key, child);
            },
        }
    }

    Ok(node)
}

fn parse_type(entry: &Value, path: &NodePath, depth: usize) -> Result<Node, WireError> {
    match entry {
        // A bare string names a logical type alias.
        Value::String(alias) => Ok(Node::new().with_name(alias.as_str())),
        Value::Object(_) => parse_node(entry, &path.child_type(), depth + 1),
        _ => Err(WireError::InvalidTypeShape {
            path: path.to_string(),
        }),
    }
}

fn parse_scalar(entry: &Value) -> Option<NodeValue> {
    match entry {
        Value::Bool(flag) => Some(NodeValue::Bool(*flag)),
        Value::Number(number) => Some(NodeValue::Number(number.clone())),
        Value::String(text) => Some(NodeValue::Text(text.clone())),
        _ => None,
    }
}

fn parse_features(entry: &Value, path: &NodePath) -> Result<Vec<Feature>, WireError> {
    let Value::Object(map) = entry else {
        return Err(WireError::InvalidFeature {
            path: path.to_string(),
            message: "features must be a mapping keyed by feature kind".to_owned(),
        });
    };

    let mut features = Vec::with_capacity(map.len());
    for (key, payload) in map {
        let kind = FeatureKind::from_wire_key(key).ok_or_else(|| WireError::InvalidFeature {
            path: path.to_string(),
            message: format!("unknown feature kind '{key}'"),
        })?;
        features.push(parse_feature_payload(kind, payload, path)?);
    }
    Ok(features)
}

fn parse_feature_payload(
    kind: FeatureKind,
    payload: &Value,
    path: &NodePath,
) -> Result<Feature, WireError> {
    let Value::Object(entries) = payload else {
        return Err(WireError::InvalidFeature {
            path: path.to_string(),
            message: format!("feature '{}' must hold a mapping", kind.wire_key()),
        });
    };

    match kind {
        FeatureKind::SupportedTypes => {
            let mut types = BTreeMap::new();
            for (alias, id_value) in entries {
                let text = id_value.as_str().ok_or_else(|| WireError::InvalidFeature {
                    path: path.to_string(),
                    message: format!("type alias '{alias}' must map to a blueId string"),
                })?;
                let id = BlueId::from_base58(text).map_err(|err| WireError::InvalidFeature {
                    path: path.to_string(),
                    message: format!("type alias '{alias}' holds an invalid blueId: {err}"),
                })?;
                types.insert(alias.clone(), id);
            }
            Ok(Feature::SupportedTypes { types })
        },
        FeatureKind::Blueprint => {
            let mut hints = BTreeMap::new();
            for (hint_key, hint_value) in entries {
                let text = hint_value.as_str().ok_or_else(|| WireError::InvalidFeature {
                    path: path.to_string(),
                    message: format!("blueprint entry '{hint_key}' must hold a string"),
                })?;
                hints.insert(hint_key.clone(), text.to_owned());
            }
            Ok(Feature::Blueprint { entries: hints })
        },
    }
}

/// Renders a node as a wire-form JSON value.
///
/// Bare shorthands are used where the node allows them: a value-only node
/// renders as its scalar and an items-only node as its list. Property keys
/// that collide with reserved keys are not representable; such nodes are
/// rejected at canonicalization, and here the reserved key wins.
#[must_use]
pub fn node_to_value(node: &Node) -> Value {
    // Shorthand forms for nodes with exactly one kind of content.
    if node.name().is_none() && node.features().is_empty() && node.reference().is_none() {
        let only_value = node.value().is_some()
            && node.node_type().is_none()
            && node.items().is_none()
            && node.properties().is_none();
        if only_value {
            if let Some(value) = node.value() {
                return scalar_to_value(value);
            }
        }

        let only_items = node.items().is_some()
            && node.node_type().is_none()
            && node.value().is_none()
            && node.properties().is_none();
        if only_items {
            if let Some(items) = node.items() {
                return Value::Array(items.iter().map(node_to_value).collect());
            }
        }
    }

    let mut map = Map::new();
    if let Some(properties) = node.properties() {
        for (key, child) in properties {
            map.insert(key.clone(), node_to_value(child));
        }
    }
    if let Some(name) = node.name() {
        map.insert("name".to_owned(), Value::String(name.to_owned()));
    }
    if let Some(node_type) = node.node_type() {
        map.insert("type".to_owned(), type_to_value(node_type));
    }
    if let Some(value) = node.value() {
        map.insert("value".to_owned(), scalar_to_value(value));
    }
    if let Some(items) = node.items() {
        map.insert(
            "items".to_owned(),
            Value::Array(items.iter().map(node_to_value).collect()),
        );
    }
    if let Some(id) = node.reference() {
        map.insert(BLUE_ID_KEY.to_owned(), Value::String(id.to_base58()));
    }
    if !node.features().is_empty() {
        map.insert("features".to_owned(), features_to_value(node.features()));
    }
    Value::Object(map)
}

fn type_to_value(node_type: &Node) -> Value {
    // A name-only type renders back as its bare alias string.
    let alias_only = node_type.name().is_some()
        && !node_type.has_structural_content()
        && node_type.reference().is_none()
        && node_type.features().is_empty();
    if alias_only {
        if let Some(alias) = node_type.name() {
            return Value::String(alias.to_owned());
        }
    }
    node_to_value(node_type)
}

fn scalar_to_value(value: &NodeValue) -> Value {
    match value {
        NodeValue::Text(text) => Value::String(text.clone()),
        NodeValue::Number(number) => Value::Number(number.clone()),
        NodeValue::Bool(flag) => Value::Bool(*flag),
    }
}

fn features_to_value(features: &[Feature]) -> Value {
    let mut map = Map::new();
    for feature in features {
        match feature {
            Feature::SupportedTypes { types } => {
                let entries: Map<String, Value> = types
                    .iter()
                    .map(|(alias, id)| (alias.clone(), Value::String(id.to_base58())))
                    .collect();
                map.insert(
                    FeatureKind::SupportedTypes.wire_key().to_owned(),
                    Value::Object(entries),
                );
            },
            Feature::Blueprint { entries } => {
                let hints: Map<String, Value> = entries
                    .iter()
                    .map(|(key, text)| (key.clone(), Value::String(text.clone())))
                    .collect();
                map.insert(
                    FeatureKind::Blueprint.wire_key().to_owned(),
                    Value::Object(hints),
                );
            },
        }
    }
    Value::Object(map)
}
