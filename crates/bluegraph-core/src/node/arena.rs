//! Arena storage for nodes under construction.
//!
//! Merging and expansion rewrite documents in place. Rather than chasing
//! `&mut` borrows through a recursive [`Node`](super::Node) tree, working
//! documents are imported into a [`NodeArena`] where every node is a slot
//! addressed by a [`NodeId`]. Child links are ids, so any slot can be
//! looked up or rewritten without touching its neighbours. Finished
//! documents are exported back to owned [`Node`](super::Node) trees.
//!
//! Ids are only meaningful with the arena that issued them, and child
//! links must keep forming trees. Every operation in this crate preserves
//! that shape.

use std::collections::BTreeMap;

use super::{Feature, FeatureKind, Node, NodeValue};
use crate::ident::BlueId;

/// Handle to a node slot inside a [`NodeArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// One stored node; children are arena ids.
#[derive(Debug, Clone, Default)]
struct Slot {
    name: Option<String>,
    node_type: Option<NodeId>,
    value: Option<NodeValue>,
    items: Option<Vec<NodeId>>,
    properties: Option<BTreeMap<String, NodeId>>,
    reference: Option<BlueId>,
    features: Vec<Feature>,
}

/// Owned copy of one slot's fields, children still as ids.
///
/// Recursive rewrites take a snapshot of the slot they are reading so the
/// arena stays free for mutation while they walk the children.
#[derive(Debug, Clone)]
pub struct NodeSnapshot {
    /// Display name, if any.
    pub name: Option<String>,
    /// Type child, if any.
    pub node_type: Option<NodeId>,
    /// Scalar value, if any.
    pub value: Option<NodeValue>,
    /// Item children, if the list is present.
    pub items: Option<Vec<NodeId>>,
    /// Property children, if the map is present.
    pub properties: Option<BTreeMap<String, NodeId>>,
    /// Reference target, if the node is (or carries) a reference.
    pub reference: Option<BlueId>,
    /// Attached features.
    pub features: Vec<Feature>,
}

/// Slot storage for documents being merged or expanded.
#[derive(Debug, Default)]
pub struct NodeArena {
    slots: Vec<Slot>,
}

impl NodeArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of slots allocated so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slots have been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Allocates a fresh empty node.
    pub fn alloc(&mut self) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot::default());
        id
    }

    /// Imports an owned node tree, returning the id of its root.
    pub fn import(&mut self, node: &Node) -> NodeId {
        let node_type = node.node_type().map(|child| self.import(child));
        let items = node
            .items()
            .map(|items| items.iter().map(|child| self.import(child)).collect());
        let properties = node.properties().map(|properties| {
            properties
                .iter()
                .map(|(key, child)| (key.clone(), self.import(child)))
                .collect()
        });

        let id = NodeId(self.slots.len());
        self.slots.push(Slot {
            name: node.name().map(str::to_owned),
            node_type,
            value: node.value().cloned(),
            items,
            properties,
            reference: node.reference().copied(),
            features: node.features().to_vec(),
        });
        id
    }

    /// Exports the subtree rooted at `id` as an owned node.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different arena.
    #[must_use]
    pub fn export(&self, id: NodeId) -> Node {
        let slot = self.slot(id);
        let mut node = Node::new();
        node.set_name(slot.name.clone());
        node.set_value(slot.value.clone());
        node.set_reference(slot.reference);
        if let Some(type_id) = slot.node_type {
            node.set_type(Some(self.export(type_id)));
        }
        if let Some(items) = &slot.items {
            node.set_items(Some(items.iter().map(|child| self.export(*child)).collect()));
        }
        if let Some(properties) = &slot.properties {
            for (key, child) in properties {
                node.insert_property(key.clone(), self.export(*child));
            }
        }
        for feature in &slot.features {
            node.add_feature(feature.clone());
        }
        node
    }

    /// Deep-copies the subtree rooted at `id` into fresh slots.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different arena.
    pub fn copy(&mut self, id: NodeId) -> NodeId {
        let snapshot = self.snapshot(id);
        let node_type = snapshot.node_type.map(|child| self.copy(child));
        let items = snapshot
            .items
            .map(|items| items.into_iter().map(|child| self.copy(child)).collect());
        let properties = snapshot.properties.map(|properties| {
            properties
                .into_iter()
                .map(|(key, child)| (key, self.copy(child)))
                .collect()
        });

        let copy = NodeId(self.slots.len());
        self.slots.push(Slot {
            name: snapshot.name,
            node_type,
            value: snapshot.value,
            items,
            properties,
            reference: snapshot.reference,
            features: snapshot.features,
        });
        copy
    }

    /// Replaces the slot at `id` with the content of `node`, in place.
    ///
    /// The slot's reference is cleared: splicing is how a reference
    /// placeholder becomes the document it pointed at, and the fetched
    /// content must not re-trigger expansion at the same slot.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different arena.
    pub fn splice(&mut self, id: NodeId, node: &Node) {
        let imported = self.import(node);
        let mut slot = self.slots[imported.0].clone();
        slot.reference = None;
        self.slots[id.0] = slot;
    }

    /// Copies out one slot's fields for borrow-free traversal.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different arena.
    #[must_use]
    pub fn snapshot(&self, id: NodeId) -> NodeSnapshot {
        let slot = self.slot(id);
        NodeSnapshot {
            name: slot.name.clone(),
            node_type: slot.node_type,
            value: slot.value.clone(),
            items: slot.items.clone(),
            properties: slot.properties.clone(),
            reference: slot.reference,
            features: slot.features.clone(),
        }
    }

    // =========================================================================
    // Field access
    // =========================================================================

    /// Display name of `id`, if any.
    #[must_use]
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.slot(id).name.as_deref()
    }

    /// Type child of `id`, if any.
    #[must_use]
    pub fn type_of(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).node_type
    }

    /// Scalar value of `id`, if any.
    #[must_use]
    pub fn value(&self, id: NodeId) -> Option<&NodeValue> {
        self.slot(id).value.as_ref()
    }

    /// Item children of `id`, if the list is present.
    #[must_use]
    pub fn items(&self, id: NodeId) -> Option<&[NodeId]> {
        self.slot(id).items.as_deref()
    }

    /// Property children of `id`, if the map is present.
    #[must_use]
    pub fn properties(&self, id: NodeId) -> Option<&BTreeMap<String, NodeId>> {
        self.slot(id).properties.as_ref()
    }

    /// Reference target of `id`, if any.
    #[must_use]
    pub fn reference(&self, id: NodeId) -> Option<&BlueId> {
        self.slot(id).reference.as_ref()
    }

    /// Features attached to `id`.
    #[must_use]
    pub fn features(&self, id: NodeId) -> &[Feature] {
        &self.slot(id).features
    }

    /// Looks up a feature of `kind` on `id`.
    #[must_use]
    pub fn feature(&self, id: NodeId, kind: FeatureKind) -> Option<&Feature> {
        self.slot(id)
            .features
            .iter()
            .find(|feature| feature.kind() == kind)
    }

    /// Sets or clears the name of `id`.
    pub fn set_name(&mut self, id: NodeId, name: Option<String>) {
        self.slot_mut(id).name = name;
    }

    /// Sets or clears the type child of `id`.
    pub fn set_type(&mut self, id: NodeId, node_type: Option<NodeId>) {
        self.slot_mut(id).node_type = node_type;
    }

    /// Sets or clears the scalar value of `id`.
    pub fn set_value(&mut self, id: NodeId, value: Option<NodeValue>) {
        self.slot_mut(id).value = value;
    }

    /// Sets or clears the item list of `id`.
    pub fn set_items(&mut self, id: NodeId, items: Option<Vec<NodeId>>) {
        self.slot_mut(id).items = items;
    }

    /// Sets or clears the reference target of `id`.
    pub fn set_reference(&mut self, id: NodeId, reference: Option<BlueId>) {
        self.slot_mut(id).reference = reference;
    }

    /// Inserts or replaces a property child of `id`.
    pub fn insert_property(&mut self, id: NodeId, key: impl Into<String>, child: NodeId) {
        self.slot_mut(id)
            .properties
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), child);
    }

    /// Attaches `feature` to `id`, replacing any feature of the same kind.
    pub fn replace_feature(&mut self, id: NodeId, feature: Feature) {
        let features = &mut self.slot_mut(id).features;
        if let Some(existing) = features
            .iter_mut()
            .find(|candidate| candidate.kind() == feature.kind())
        {
            *existing = feature;
        } else {
            features.push(feature);
        }
    }

    fn slot(&self, id: NodeId) -> &Slot {
        &self.slots[id.0]
    }

    fn slot_mut(&mut self, id: NodeId) -> &mut Slot {
        &mut self.slots[id.0]
    }
}
