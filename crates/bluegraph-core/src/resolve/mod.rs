//! One-call document resolution.
//!
//! [`resolve`] runs the full pipeline over a document: declared
//! transformations are applied, references are expanded within the
//! configured limits, the type chain is folded down through merging, and
//! the result is exported with its content identity. [`ResolveOptions`]
//! carries the knobs; the defaults resolve everything reachable and fail
//! on missing content.

use std::sync::Arc;

use thiserror::Error;

use crate::canonical::{blue_id_of, CanonicalizeError};
use crate::extend::{
    extend, ExtendError, Limits, MissingReferencePolicy, UnresolvedReference,
};
use crate::ident::BlueId;
use crate::manager::NodeManager;
use crate::merge::{merge, MergeError};
use crate::node::Node;
use crate::transform::{preprocess, TransformError, TransformerProvider};

/// Options steering one resolution.
#[derive(Clone, Default)]
pub struct ResolveOptions {
    limits: Limits,
    on_missing: MissingReferencePolicy,
    transformers: Option<Arc<dyn TransformerProvider>>,
}

impl ResolveOptions {
    /// Default options: unrestricted expansion, fail on missing content,
    /// no transformers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds reference expansion.
    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the policy for references that cannot be resolved.
    #[must_use]
    pub fn with_missing_policy(mut self, policy: MissingReferencePolicy) -> Self {
        self.on_missing = policy;
        self
    }

    /// Supplies transformers for declared transformations.
    #[must_use]
    pub fn with_transformers(mut self, transformers: Arc<dyn TransformerProvider>) -> Self {
        self.transformers = Some(transformers);
        self
    }

    /// The configured expansion limits.
    #[must_use]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }
}

impl std::fmt::Debug for ResolveOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveOptions")
            .field("limits", &self.limits)
            .field("on_missing", &self.on_missing)
            .field("transformers", &self.transformers.is_some())
            .finish()
    }
}

/// A resolved document with its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The resolved node.
    pub node: Node,
    /// Content identity of the resolved node.
    pub blue_id: BlueId,
    /// References still standing as placeholders, whether stubbed,
    /// cycle-cut, or left outside the expansion limits by policy.
    pub unresolved: Vec<UnresolvedReference>,
}

/// Errors from resolving a document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// Preprocessing failed.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Reference expansion failed.
    #[error(transparent)]
    Extend(#[from] ExtendError),

    /// Type chain folding failed.
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// The resolved node has no canonical form.
    #[error(transparent)]
    Canonicalize(#[from] CanonicalizeError),
}

/// Resolves `document` inside `manager`.
///
/// The manager supplies the resolver for reference expansion, the anchor
/// table for type aliases, and the processor chain for merging. The
/// input document is not modified.
///
/// # Errors
///
/// Returns [`ResolveError`] when any pipeline stage fails.
pub fn resolve(
    document: &Node,
    manager: &mut dyn NodeManager,
    options: &ResolveOptions,
) -> Result<Resolution, ResolveError> {
    let prepared = preprocess(document.clone(), options.transformers.as_deref())?;

    let root = manager.arena_mut().import(&prepared);
    let report = extend(manager, root, &options.limits, options.on_missing)?;

    let target = manager.new_node();
    merge(manager, target, root)?;

    let node = manager.arena().export(target);
    let blue_id = blue_id_of(&node)?;

    let mut unresolved = report.unresolved;
    unresolved.extend(report.cycle_stubs);
    Ok(Resolution {
        node,
        blue_id,
        unresolved,
    })
}
