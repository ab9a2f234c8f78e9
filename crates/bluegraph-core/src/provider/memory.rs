//! In-memory node provider.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::canonical::blue_id_of;
use crate::ident::BlueId;
use crate::node::Node;

use super::{document_set_blue_id, NodeProvider, ProviderError};

/// In-memory content-addressed store.
///
/// Backed by a `BTreeMap` behind an `RwLock`, so it is cheap to share
/// across threads in tests and short-lived sessions. Documents are
/// addressed by their canonical hash at insertion time; a fetch can
/// therefore never observe content under a stale id.
///
/// # Panics
///
/// Methods panic if the internal lock is poisoned, which only happens if
/// another thread panicked while holding it.
#[derive(Debug, Default)]
pub struct BasicNodeProvider {
    documents: RwLock<BTreeMap<BlueId, Vec<Node>>>,
}

impl BasicNodeProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a single document, returning its id.
    ///
    /// Storing the same document twice is a no-op with the same id.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if the document cannot be canonicalized.
    pub fn put_document(&self, document: &Node) -> Result<BlueId, ProviderError> {
        let id = blue_id_of(document)?;
        self.documents
            .write()
            .expect("lock poisoned")
            .insert(id, vec![document.clone()]);
        Ok(id)
    }

    /// Stores a document set, returning the set id.
    ///
    /// Each member is also stored under its own id, so references to
    /// individual members keep resolving.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::EmptyDocumentSet`] for an empty set, or a
    /// canonicalization error for unhashable members.
    pub fn put_document_set(&self, documents: &[Node]) -> Result<BlueId, ProviderError> {
        if documents.is_empty() {
            return Err(ProviderError::EmptyDocumentSet);
        }

        let set_id = document_set_blue_id(documents)?;
        let mut store = self.documents.write().expect("lock poisoned");
        for document in documents {
            let member_id = blue_id_of(document)?;
            store.insert(member_id, vec![document.clone()]);
        }
        store.insert(set_id, documents.to_vec());
        Ok(set_id)
    }

    /// Number of distinct ids stored.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    /// Whether the store holds nothing.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.read().expect("lock poisoned").is_empty()
    }
}

impl NodeProvider for BasicNodeProvider {
    fn fetch_by_blue_id(&self, id: &BlueId) -> Result<Option<Vec<Node>>, ProviderError> {
        Ok(self
            .documents
            .read()
            .expect("lock poisoned")
            .get(id)
            .cloned())
    }
}
