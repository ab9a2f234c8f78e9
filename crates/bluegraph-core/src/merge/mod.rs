//! Prototype-style node merging.
//!
//! [`merge`] folds a source node into a target node, with the source's
//! type chain acting as a prototype chain: ancestors are folded first,
//! then the source's own content, so the nearest definition always wins.
//! Conflicts on scalar kind are errors, as is any attempt to merge item
//! lists of different lengths. List length is load-bearing; there is no
//! positional guessing.
//!
//! Cross-cutting field propagation (values, names, features) is pluggable
//! through [`MergeProcessor`]. The processor runs at every node the merge
//! visits, after that node's type chain has been folded and before its
//! items and properties are descended into. [`SequentialProcessor`] chains
//! processors; the standard chain covers value, name, and feature
//! propagation.
//!
//! Merging happens inside a [`NodeArena`](crate::node::NodeArena) via a
//! [`NodeManager`], which also supplies named anchor lookups for type
//! aliases. Source nodes are never mutated; merging a node into itself is
//! harmless.

use thiserror::Error;

use crate::manager::NodeManager;
use crate::node::wire::MAX_DEPTH;
use crate::node::{NodeArena, NodeId, NodePath, ValueKind};

mod processor;

pub use processor::{
    FeaturePropagator, NamePropagator, NoopProcessor, SequentialProcessor, ValuePropagator,
};

/// Errors from merging two nodes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MergeError {
    /// Item lists of different lengths cannot be merged.
    #[error(
        "cannot merge item lists of different lengths at path '{path}' \
         (target has {target_len}, source has {source_len})"
    )]
    ItemsArityMismatch {
        /// Path of the node holding the lists.
        path: String,
        /// Length of the target's list.
        target_len: usize,
        /// Length of the source's list.
        source_len: usize,
    },

    /// A scalar value cannot override a scalar of a different kind.
    #[error("cannot merge {source_kind} over {target_kind} at path '{path}'")]
    IncompatibleValue {
        /// Path of the conflicting node.
        path: String,
        /// Kind already held by the target.
        target_kind: ValueKind,
        /// Kind the source tried to write.
        source_kind: ValueKind,
    },

    /// A processor refused the merge at this node.
    #[error("merge rejected at path '{path}': {reason}")]
    ProcessorRejected {
        /// Path of the refused node.
        path: String,
        /// The processor's explanation.
        reason: String,
    },

    /// Type chains nested deeper than [`MAX_DEPTH`].
    #[error("merge recursion exceeded {max_depth} levels")]
    MaxDepthExceeded {
        /// The exceeded limit.
        max_depth: usize,
    },
}

/// Hook invoked at every node a merge visits.
///
/// Runs after the node's type chain has been folded into `target` and
/// before items and properties are descended into, so a processor sees
/// the target with inherited content already applied.
pub trait MergeProcessor: Send + Sync {
    /// Applies this processor's propagation from `source` onto `target`.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError`] to refuse the merge at this node.
    fn process(
        &self,
        arena: &mut NodeArena,
        target: NodeId,
        source: NodeId,
        path: &NodePath,
    ) -> Result<(), MergeError>;
}

/// Folds `source` into `target` under the manager's processor chain.
///
/// # Errors
///
/// Returns [`MergeError`] on arity mismatches, value kind conflicts,
/// processor refusals, or runaway recursion. The target may hold partial
/// results after an error.
pub fn merge(
    manager: &mut dyn NodeManager,
    target: NodeId,
    source: NodeId,
) -> Result<(), MergeError> {
    let processor = manager.merge_processor();
    merge_at(manager, processor.as_ref(), target, source, &NodePath::root(), 0)
}

fn merge_at(
    manager: &mut dyn NodeManager,
    processor: &dyn MergeProcessor,
    target: NodeId,
    source: NodeId,
    path: &NodePath,
    depth: usize,
) -> Result<(), MergeError> {
    if depth > MAX_DEPTH {
        return Err(MergeError::MaxDepthExceeded {
            max_depth: MAX_DEPTH,
        });
    }

    // Reads go through a snapshot so target == source cannot alias.
    let source_snapshot = manager.arena().snapshot(source);

    // Step 1: fold the source's type chain, nearest definition last.
    if let Some(type_id) = source_snapshot.node_type {
        fold_type(manager, processor, target, type_id, path, depth)?;
        let type_copy = manager.copy_node(type_id);
        manager.arena_mut().set_type(target, Some(type_copy));
    }
    if source_snapshot.reference.is_some() {
        manager
            .arena_mut()
            .set_reference(target, source_snapshot.reference);
    }

    // Step 2: cross-cutting propagation for this node.
    processor.process(manager.arena_mut(), target, source, path)?;

    // Step 3: items, element by element.
    if let Some(source_items) = source_snapshot.items {
        let target_items = manager.arena().items(target).map(<[NodeId]>::to_vec);
        match target_items {
            None => {
                let mut fresh_items = Vec::with_capacity(source_items.len());
                for (index, source_item) in source_items.iter().enumerate() {
                    let fresh = manager.new_node();
                    merge_at(
                        manager,
                        processor,
                        fresh,
                        *source_item,
                        &path.child_index(index),
                        depth + 1,
                    )?;
                    fresh_items.push(fresh);
                }
                manager.arena_mut().set_items(target, Some(fresh_items));
            },
            Some(target_items) if target_items.len() == source_items.len() => {
                for (index, (target_item, source_item)) in
                    target_items.iter().zip(&source_items).enumerate()
                {
                    merge_at(
                        manager,
                        processor,
                        *target_item,
                        *source_item,
                        &path.child_index(index),
                        depth + 1,
                    )?;
                }
            },
            Some(target_items) => {
                return Err(MergeError::ItemsArityMismatch {
                    path: path.to_string(),
                    target_len: target_items.len(),
                    source_len: source_items.len(),
                });
            },
        }
    }

    // Step 4: properties. Each source property is first resolved into a
    // fresh node so its own type chain folds in its own context, then the
    // resolved result lands on the target.
    if let Some(source_properties) = source_snapshot.properties {
        for (key, source_child) in source_properties {
            let child_path = path.child(key.as_str());
            let fresh = manager.new_node();
            merge_at(manager, processor, fresh, source_child, &child_path, depth + 1)?;

            let existing = manager
                .arena()
                .properties(target)
                .and_then(|properties| properties.get(&key).copied());
            match existing {
                None => manager.arena_mut().insert_property(target, key, fresh),
                Some(existing) => {
                    merge_at(manager, processor, existing, fresh, &child_path, depth + 1)?;
                },
            }
        }
    }

    Ok(())
}

fn fold_type(
    manager: &mut dyn NodeManager,
    processor: &dyn MergeProcessor,
    target: NodeId,
    type_id: NodeId,
    path: &NodePath,
    depth: usize,
) -> Result<(), MergeError> {
    let type_snapshot = manager.arena().snapshot(type_id);
    let inline = type_snapshot.node_type.is_some()
        || type_snapshot.value.is_some()
        || type_snapshot.items.is_some()
        || type_snapshot.properties.is_some();

    if inline {
        return merge_at(manager, processor, target, type_id, &path.child_type(), depth + 1);
    }
    if type_snapshot.reference.is_some() {
        // An unexpanded reference has no content to fold; the link itself
        // is carried onto the target by the caller.
        return Ok(());
    }
    if let Some(alias) = type_snapshot.name.as_deref() {
        if let Some(anchor) = manager.get_node(alias) {
            return merge_at(manager, processor, target, anchor, &path.child_type(), depth + 1);
        }
        tracing::debug!(alias, "type alias has no registered definition, carried as-is");
    }
    Ok(())
}
