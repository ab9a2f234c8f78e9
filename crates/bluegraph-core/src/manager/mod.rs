//! Node managers: the working context for merge and expansion.
//!
//! A [`NodeManager`] bundles the arena a rewrite operates in with the
//! collaborators the rewrite needs: named anchors for type aliases, the
//! merge processor chain, and an optional reference resolver. The merge
//! and extension algorithms only see this trait, so embedders can supply
//! their own context; [`SessionNodeManager`] is the ready-made one.
//!
//! # Example
//!
//! ```
//! use bluegraph_core::manager::{NodeManager, SessionNodeManager};
//! use bluegraph_core::{merge, Node};
//!
//! let mut manager = SessionNodeManager::standard(None);
//! let source = manager.import_document(
//!     &Node::new().with_property("x", Node::new().with_value(1_i64)),
//! );
//! let target = manager.new_node();
//! merge(&mut manager, target, source)?;
//! assert!(manager.arena().export(target).property("x").is_some());
//! # Ok::<(), bluegraph_core::MergeError>(())
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::merge::{MergeProcessor, SequentialProcessor};
use crate::node::{Node, NodeArena, NodeId};
use crate::provider::ReferenceResolver;

/// Working context for node rewrites.
pub trait NodeManager {
    /// The arena holding the nodes being worked on.
    fn arena(&self) -> &NodeArena;

    /// Mutable access to the arena.
    fn arena_mut(&mut self) -> &mut NodeArena;

    /// Looks up a node registered under `name`.
    ///
    /// Type aliases resolve through this during merging.
    fn get_node(&self, name: &str) -> Option<NodeId>;

    /// The processor chain merges run under.
    fn merge_processor(&self) -> Arc<dyn MergeProcessor>;

    /// The resolver used to fetch referenced documents, if any.
    ///
    /// Returning `None` means references cannot be expanded in this
    /// context; expansion then fails or stubs according to its policy.
    fn reference_resolver(&self) -> Option<ReferenceResolver>;

    /// Allocates a fresh empty node.
    fn new_node(&mut self) -> NodeId {
        self.arena_mut().alloc()
    }

    /// Deep-copies an existing node.
    fn copy_node(&mut self, id: NodeId) -> NodeId {
        self.arena_mut().copy(id)
    }
}

/// Self-contained manager for one resolution session.
///
/// Importing a named document registers it as an anchor, so later
/// documents can refer to it by type alias.
pub struct SessionNodeManager {
    arena: NodeArena,
    anchors: BTreeMap<String, NodeId>,
    processor: Arc<dyn MergeProcessor>,
    resolver: Option<ReferenceResolver>,
}

impl SessionNodeManager {
    /// Creates a manager with an explicit processor chain.
    #[must_use]
    pub fn new(processor: Arc<dyn MergeProcessor>, resolver: Option<ReferenceResolver>) -> Self {
        Self {
            arena: NodeArena::new(),
            anchors: BTreeMap::new(),
            processor,
            resolver,
        }
    }

    /// Creates a manager with the standard propagation chain.
    #[must_use]
    pub fn standard(resolver: Option<ReferenceResolver>) -> Self {
        Self::new(Arc::new(SequentialProcessor::standard()), resolver)
    }

    /// Imports a document into the arena.
    ///
    /// A named document is also registered as an anchor under its name,
    /// replacing any earlier anchor with that name.
    pub fn import_document(&mut self, document: &Node) -> NodeId {
        let id = self.arena.import(document);
        if let Some(name) = document.name() {
            self.anchors.insert(name.to_owned(), id);
        }
        id
    }

    /// Registers `id` as the anchor for `name`.
    pub fn register_anchor(&mut self, name: impl Into<String>, id: NodeId) {
        self.anchors.insert(name.into(), id);
    }

    /// Names registered so far, in sorted order.
    pub fn anchor_names(&self) -> impl Iterator<Item = &str> {
        self.anchors.keys().map(String::as_str)
    }
}

impl NodeManager for SessionNodeManager {
    fn arena(&self) -> &NodeArena {
        &self.arena
    }

    fn arena_mut(&mut self) -> &mut NodeArena {
        &mut self.arena
    }

    fn get_node(&self, name: &str) -> Option<NodeId> {
        self.anchors.get(name).copied()
    }

    fn merge_processor(&self) -> Arc<dyn MergeProcessor> {
        Arc::clone(&self.processor)
    }

    fn reference_resolver(&self) -> Option<ReferenceResolver> {
        self.resolver.clone()
    }
}

impl std::fmt::Debug for SessionNodeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionNodeManager")
            .field("nodes", &self.arena.len())
            .field("anchors", &self.anchors.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::NoopProcessor;
    use crate::node::NodeValue;

    #[test]
    fn import_registers_named_documents() {
        let mut manager = SessionNodeManager::standard(None);
        let unnamed = manager.import_document(&Node::new().with_value(1_i64));
        let named = manager.import_document(&Node::new().with_name("Person"));

        assert_eq!(manager.get_node("Person"), Some(named));
        assert!(manager.get_node("Unnamed").is_none());
        assert_ne!(unnamed, named);
        assert_eq!(manager.anchor_names().collect::<Vec<_>>(), vec!["Person"]);
    }

    #[test]
    fn later_import_replaces_anchor() {
        let mut manager = SessionNodeManager::standard(None);
        let first = manager.import_document(&Node::new().with_name("Person"));
        let second = manager.import_document(
            &Node::new()
                .with_name("Person")
                .with_property("x", Node::new().with_value(1_i64)),
        );
        assert_ne!(first, second);
        assert_eq!(manager.get_node("Person"), Some(second));
    }

    #[test]
    fn default_node_operations_use_the_arena() {
        let mut manager = SessionNodeManager::standard(None);
        let original = manager.import_document(&Node::new().with_value(5_i64));
        let fresh = manager.new_node();
        let copy = manager.copy_node(original);

        assert!(manager.arena().value(fresh).is_none());
        assert_eq!(
            manager.arena().value(copy).and_then(NodeValue::as_i64),
            Some(5)
        );
        assert_eq!(manager.arena().len(), 3);
    }

    // Rewrites only depend on the trait, so a minimal context works too.
    struct BareManager {
        arena: NodeArena,
    }

    impl NodeManager for BareManager {
        fn arena(&self) -> &NodeArena {
            &self.arena
        }

        fn arena_mut(&mut self) -> &mut NodeArena {
            &mut self.arena
        }

        fn get_node(&self, _name: &str) -> Option<NodeId> {
            None
        }

        fn merge_processor(&self) -> Arc<dyn MergeProcessor> {
            Arc::new(NoopProcessor)
        }

        fn reference_resolver(&self) -> Option<ReferenceResolver> {
            None
        }
    }

    #[test]
    fn merge_accepts_any_manager_impl() {
        let mut manager = BareManager {
            arena: NodeArena::new(),
        };
        let source = manager
            .arena_mut()
            .import(&Node::new().with_property("x", Node::new().with_value(1_i64)));
        let target = manager.new_node();
        crate::merge::merge(&mut manager, target, source).unwrap();
        assert!(manager.arena().export(target).property("x").is_some());
    }
}
