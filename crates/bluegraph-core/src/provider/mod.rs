//! Content-addressed document providers.
//!
//! A [`NodeProvider`] answers blueId lookups with stored documents. A
//! lookup yields a list of nodes: one element for a plain document, or
//! several when the id names a document set. Providers are passive
//! storage; verification that returned content actually hashes to the
//! requested id lives in [`ReferenceResolver`], which wraps any provider
//! and fails closed on mismatch.
//!
//! Two providers ship with the crate:
//!
//! - [`BasicNodeProvider`], an in-memory store for tests and sessions,
//! - [`DirectoryNodeProvider`], which loads a directory of YAML and JSON
//!   documents once and serves them by id.
//!
//! # Module Structure
//!
//! - [`mod@self`]: provider trait, resolver, and shared errors
//! - `memory`: in-memory provider
//! - `directory`: filesystem-backed provider

use std::sync::Arc;

use thiserror::Error;

use crate::canonical::{blue_id_of, CanonicalizeError};
use crate::ident::BlueId;
use crate::node::{Node, WireError};

mod directory;
mod memory;

pub use directory::DirectoryNodeProvider;
pub use memory::BasicNodeProvider;

/// Errors from storing or fetching documents.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProviderError {
    /// A provider returned content that does not hash to the requested id.
    #[error("content for blueId {requested} hashes to {computed}")]
    IdentityMismatch {
        /// The id that was looked up.
        requested: BlueId,
        /// The id the returned content actually has.
        computed: BlueId,
    },

    /// A document set must contain at least one document.
    #[error("document set is empty")]
    EmptyDocumentSet,

    /// Filesystem access failed.
    #[error("storage io error")]
    Io(#[from] std::io::Error),

    /// A stored document was not valid YAML or JSON.
    #[error("cannot parse document '{file}': {message}")]
    Parse {
        /// Originating file.
        file: String,
        /// Description from the underlying parser.
        message: String,
    },

    /// A stored document parsed but does not describe a node.
    #[error("document '{file}' is not a well-formed node")]
    Wire {
        /// Originating file.
        file: String,
        /// The underlying mapping error.
        #[source]
        source: WireError,
    },

    /// A document could not be canonicalized for addressing.
    #[error(transparent)]
    Canonical(#[from] CanonicalizeError),
}

/// Content-addressed lookup of stored documents.
///
/// `Ok(None)` means the id is simply not held here; errors are reserved
/// for stores that failed to answer at all.
pub trait NodeProvider: Send + Sync {
    /// Fetches the document (or document set) stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the store cannot be consulted.
    fn fetch_by_blue_id(&self, id: &BlueId) -> Result<Option<Vec<Node>>, ProviderError>;
}

impl<P: NodeProvider + ?Sized> NodeProvider for Arc<P> {
    fn fetch_by_blue_id(&self, id: &BlueId) -> Result<Option<Vec<Node>>, ProviderError> {
        (**self).fetch_by_blue_id(id)
    }
}

/// Computes the identity of a document list.
///
/// A single document keeps its own id. Several documents form a set,
/// addressed as the list node holding them in order.
///
/// # Errors
///
/// Returns [`CanonicalizeError`] if any member cannot be canonicalized.
pub fn document_set_blue_id(documents: &[Node]) -> Result<BlueId, CanonicalizeError> {
    if let [single] = documents {
        return blue_id_of(single);
    }
    let set = Node::new().with_items(documents.to_vec());
    blue_id_of(&set)
}

/// Verifying front door over a [`NodeProvider`].
///
/// Every fetched document list is re-hashed before being handed out;
/// content that does not match the requested id is rejected. Expansion
/// only ever consumes documents through this type.
#[derive(Clone)]
pub struct ReferenceResolver {
    provider: Arc<dyn NodeProvider>,
}

impl ReferenceResolver {
    /// Wraps `provider` with identity verification.
    #[must_use]
    pub fn new(provider: Arc<dyn NodeProvider>) -> Self {
        Self { provider }
    }

    /// Fetches and verifies the documents stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::IdentityMismatch`] when the provider's
    /// content does not hash to `id`, or the provider's own error when
    /// the fetch fails.
    pub fn resolve(&self, id: &BlueId) -> Result<Option<Vec<Node>>, ProviderError> {
        let Some(documents) = self.provider.fetch_by_blue_id(id)? else {
            return Ok(None);
        };
        if documents.is_empty() {
            tracing::debug!(blue_id = %id, "provider returned an empty document list");
            return Ok(None);
        }

        let computed = document_set_blue_id(&documents)?;
        if computed != *id {
            return Err(ProviderError::IdentityMismatch {
                requested: *id,
                computed,
            });
        }
        Ok(Some(documents))
    }
}

impl std::fmt::Debug for ReferenceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeValue;

    struct LyingProvider {
        served: Node,
    }

    impl NodeProvider for LyingProvider {
        fn fetch_by_blue_id(&self, _id: &BlueId) -> Result<Option<Vec<Node>>, ProviderError> {
            Ok(Some(vec![self.served.clone()]))
        }
    }

    struct EmptyHandedProvider;

    impl NodeProvider for EmptyHandedProvider {
        fn fetch_by_blue_id(&self, _id: &BlueId) -> Result<Option<Vec<Node>>, ProviderError> {
            Ok(Some(Vec::new()))
        }
    }

    fn value_node(value: i64) -> Node {
        Node::new().with_value(value)
    }

    #[test]
    fn single_document_keeps_its_own_id() {
        let doc = value_node(7);
        assert_eq!(
            document_set_blue_id(std::slice::from_ref(&doc)).unwrap(),
            blue_id_of(&doc).unwrap()
        );
    }

    #[test]
    fn document_set_id_differs_from_members() {
        let a = value_node(1);
        let b = value_node(2);
        let set_id = document_set_blue_id(&[a.clone(), b.clone()]).unwrap();
        assert_ne!(set_id, blue_id_of(&a).unwrap());
        assert_ne!(set_id, blue_id_of(&b).unwrap());

        let as_list = Node::new().with_items(vec![a, b]);
        assert_eq!(set_id, blue_id_of(&as_list).unwrap());
    }

    #[test]
    fn resolver_accepts_matching_content() {
        let provider = Arc::new(BasicNodeProvider::new());
        let doc = Node::new().with_property("x", value_node(1));
        let id = provider.put_document(&doc).unwrap();

        let resolver = ReferenceResolver::new(provider);
        let fetched = resolver.resolve(&id).unwrap().unwrap();
        assert_eq!(fetched, vec![doc]);
    }

    #[test]
    fn resolver_rejects_mismatched_content() {
        let honest = value_node(1);
        let requested = blue_id_of(&honest).unwrap();
        let resolver = ReferenceResolver::new(Arc::new(LyingProvider {
            served: value_node(2),
        }));

        let err = resolver.resolve(&requested).unwrap_err();
        match err {
            ProviderError::IdentityMismatch { requested: r, computed } => {
                assert_eq!(r, requested);
                assert_eq!(computed, blue_id_of(&value_node(2)).unwrap());
            },
            other => panic!("expected identity mismatch, got {other:?}"),
        }
    }

    #[test]
    fn resolver_normalizes_empty_answers_to_none() {
        let resolver = ReferenceResolver::new(Arc::new(EmptyHandedProvider));
        let id = BlueId::from_digest([1; crate::ident::DIGEST_LEN]);
        assert!(resolver.resolve(&id).unwrap().is_none());
    }

    #[test]
    fn resolver_passes_through_misses() {
        let resolver = ReferenceResolver::new(Arc::new(BasicNodeProvider::new()));
        let id = BlueId::from_digest([2; crate::ident::DIGEST_LEN]);
        assert!(resolver.resolve(&id).unwrap().is_none());
    }

    #[test]
    fn fetched_value_nodes_verify() {
        let provider = Arc::new(BasicNodeProvider::new());
        let doc = value_node(42);
        let id = provider.put_document(&doc).unwrap();
        let resolver = ReferenceResolver::new(provider);
        assert_eq!(
            resolver.resolve(&id).unwrap().unwrap()[0]
                .value()
                .and_then(NodeValue::as_i64),
            Some(42)
        );
    }
}
