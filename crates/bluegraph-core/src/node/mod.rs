//! The node data model.
//!
//! A [`Node`] is the single recursive entity of the document graph: a named,
//! optionally typed, optionally valued tree fragment with ordered items,
//! keyed properties, an optional reference to another document by blueId,
//! and side-channel [`Feature`]s.
//!
//! Every optional field is an explicit `Option`, and an empty container is
//! distinct from an absent one: `Some(vec![])` for items is "present with
//! zero elements" and takes part in arity checks, while `None` is "no items
//! at all".
//!
//! # Structure
//!
//! - [`Node`] owns its children exclusively. References between documents
//!   are always blueIds resolved through a provider, never live links.
//! - [`NodeArena`] holds nodes as index-addressed slots for the in-place
//!   merge and extension passes.
//! - [`wire`] maps nodes to and from their document representation.
//!
//! # Example
//!
//! ```
//! use bluegraph_core::{Node, NodeValue};
//!
//! let node = Node::new()
//!     .with_name("Alice")
//!     .with_property("age", Node::new().with_value(39_i64))
//!     .with_property("city", Node::new().with_value("Aberdeen"));
//!
//! assert_eq!(node.name(), Some("Alice"));
//! let age = node.property("age").and_then(Node::value);
//! assert_eq!(age.and_then(|v| v.as_i64()), Some(39));
//! ```

mod arena;
mod feature;
mod path;
mod value;
pub mod wire;

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use arena::{NodeArena, NodeId, NodeSnapshot};
pub use feature::{Feature, FeatureKind};
pub use path::{NodePath, TYPE_SEGMENT};
pub use value::{NodeValue, ValueKind};
pub use wire::WireError;

use crate::ident::BlueId;

/// The recursive unit of the document graph.
///
/// See the [module documentation](self) for the field semantics. Constructed
/// either through the `with_*` builders, through [`wire`] parsing, or inside
/// a [`NodeArena`] during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    name: Option<String>,
    node_type: Option<Box<Node>>,
    value: Option<NodeValue>,
    items: Option<Vec<Node>>,
    properties: Option<BTreeMap<String, Node>>,
    reference: Option<BlueId>,
    features: Vec<Feature>,
}

impl Node {
    /// Creates an empty node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pure reference placeholder for the given blueId.
    #[must_use]
    pub fn reference_to(id: BlueId) -> Self {
        Self {
            reference: Some(id),
            ..Self::default()
        }
    }

    // -- builders ---------------------------------------------------------

    /// Sets the human-readable name. Names never participate in identity.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the declared type node.
    #[must_use]
    pub fn with_type(mut self, node_type: Node) -> Self {
        self.node_type = Some(Box::new(node_type));
        self
    }

    /// Sets the scalar value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<NodeValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Sets the ordered item list.
    #[must_use]
    pub fn with_items(mut self, items: Vec<Node>) -> Self {
        self.items = Some(items);
        self
    }

    /// Inserts one property, creating the property map if absent.
    ///
    /// Keys equal to a reserved wire key (`name`, `type`, `value`, `items`,
    /// `blueId`, `features`) cannot be expressed in the wire form and are
    /// rejected at canonicalization.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, node: Node) -> Self {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), node);
        self
    }

    /// Sets the whole property map.
    #[must_use]
    pub fn with_properties(mut self, properties: BTreeMap<String, Node>) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Sets the reference blueId.
    #[must_use]
    pub fn with_reference(mut self, id: BlueId) -> Self {
        self.reference = Some(id);
        self
    }

    /// Appends a feature.
    #[must_use]
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    // -- accessors --------------------------------------------------------

    /// The human-readable name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The declared type node, if any.
    #[must_use]
    pub fn node_type(&self) -> Option<&Node> {
        self.node_type.as_deref()
    }

    /// The scalar value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&NodeValue> {
        self.value.as_ref()
    }

    /// The ordered item list, if present.
    #[must_use]
    pub fn items(&self) -> Option<&[Node]> {
        self.items.as_deref()
    }

    /// The property map, if present.
    #[must_use]
    pub const fn properties(&self) -> Option<&BTreeMap<String, Node>> {
        self.properties.as_ref()
    }

    /// Looks up one property by key.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&Node> {
        self.properties.as_ref().and_then(|map| map.get(key))
    }

    /// The reference blueId, if any.
    #[must_use]
    pub const fn reference(&self) -> Option<&BlueId> {
        self.reference.as_ref()
    }

    /// All features in declaration order.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Looks up the first feature of the given kind.
    #[must_use]
    pub fn feature(&self, kind: FeatureKind) -> Option<&Feature> {
        self.features.iter().find(|f| f.kind() == kind)
    }

    // -- mutators ---------------------------------------------------------

    /// Replaces the name.
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Replaces the declared type.
    pub fn set_type(&mut self, node_type: Option<Node>) {
        self.node_type = node_type.map(Box::new);
    }

    /// Replaces the scalar value.
    pub fn set_value(&mut self, value: Option<NodeValue>) {
        self.value = value;
    }

    /// Replaces the item list.
    pub fn set_items(&mut self, items: Option<Vec<Node>>) {
        self.items = items;
    }

    /// Replaces the reference.
    pub fn set_reference(&mut self, id: Option<BlueId>) {
        self.reference = id;
    }

    /// Inserts one property, creating the property map if absent.
    pub fn insert_property(&mut self, key: impl Into<String>, node: Node) {
        self.properties
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), node);
    }

    /// Removes one property, returning it if it was present.
    ///
    /// An emptied property map stays present; "present and empty" and
    /// "absent" are distinct states.
    pub fn remove_property(&mut self, key: &str) -> Option<Node> {
        self.properties.as_mut().and_then(|map| map.remove(key))
    }

    /// Appends a feature.
    pub fn add_feature(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    // -- predicates -------------------------------------------------------

    /// True when this node carries any identity-relevant content besides a
    /// reference: a type, a value, items, or properties.
    #[must_use]
    pub const fn has_structural_content(&self) -> bool {
        self.node_type.is_some()
            || self.value.is_some()
            || self.items.is_some()
            || self.properties.is_some()
    }

    /// True for a pure reference placeholder awaiting resolution.
    #[must_use]
    pub const fn is_reference_placeholder(&self) -> bool {
        self.reference.is_some() && !self.has_structural_content()
    }

    // -- parsing ----------------------------------------------------------

    /// Parses a node from JSON text via the wire mapping.
    pub fn from_json_str(input: &str) -> Result<Self, WireError> {
        let value: serde_json::Value =
            serde_json::from_str(input).map_err(|e| WireError::Parse {
                message: e.to_string(),
            })?;
        wire::node_from_value(&value)
    }

    /// Parses a node from YAML text via the wire mapping.
    pub fn from_yaml_str(input: &str) -> Result<Self, WireError> {
        let value: serde_json::Value =
            serde_yaml::from_str(input).map_err(|e| WireError::Parse {
                message: e.to_string(),
            })?;
        wire::node_from_value(&value)
    }

    /// Renders this node as a wire-form JSON value.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        wire::node_to_value(self)
    }
}

impl Serialize for Node {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        wire::node_to_value(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        wire::node_from_value(&value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::DIGEST_LEN;

    fn test_id(fill: u8) -> BlueId {
        BlueId::from_digest([fill; DIGEST_LEN])
    }

    // =========================================================================
    // Construction and Access
    // =========================================================================

    #[test]
    fn builder_round_trip() {
        let node = Node::new()
            .with_name("Person")
            .with_value("hello")
            .with_property("a", Node::new().with_value(1_i64));

        assert_eq!(node.name(), Some("Person"));
        assert_eq!(node.value().and_then(NodeValue::as_text), Some("hello"));
        assert!(node.property("a").is_some());
        assert!(node.property("b").is_none());
    }

    #[test]
    fn empty_node_has_no_content() {
        let node = Node::new();
        assert!(!node.has_structural_content());
        assert!(!node.is_reference_placeholder());
    }

    #[test]
    fn reference_placeholder_predicate() {
        let stub = Node::reference_to(test_id(1));
        assert!(stub.is_reference_placeholder());

        let mixed = Node::reference_to(test_id(1)).with_value(5_i64);
        assert!(!mixed.is_reference_placeholder());
        assert!(mixed.has_structural_content());
    }

    #[test]
    fn empty_items_is_structural_content() {
        let node = Node::new().with_items(vec![]);
        assert!(node.has_structural_content());
    }

    // =========================================================================
    // Features
    // =========================================================================

    #[test]
    fn feature_lookup_by_kind() {
        let mut types = std::collections::BTreeMap::new();
        types.insert("Person".to_owned(), test_id(9));
        let node = Node::new().with_feature(Feature::SupportedTypes { types });

        let found = node.feature(FeatureKind::SupportedTypes).unwrap();
        assert_eq!(found.kind(), FeatureKind::SupportedTypes);
        assert!(node.feature(FeatureKind::Blueprint).is_none());
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    #[test]
    fn remove_property_keeps_empty_map_present() {
        let mut node = Node::new().with_property("only", Node::new());
        let removed = node.remove_property("only");
        assert!(removed.is_some());
        assert_eq!(node.properties().map(BTreeMap::len), Some(0));
    }

    #[test]
    fn serde_round_trip_through_wire_form() {
        let node = Node::new()
            .with_name("Doc")
            .with_property("x", Node::new().with_value(2_i64));
        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }
}
