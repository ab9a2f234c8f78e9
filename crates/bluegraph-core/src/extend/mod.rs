//! Bounded reference expansion.
//!
//! [`extend`] walks a document and replaces reference placeholders with
//! the content they point at, fetched through the manager's resolver and
//! verified against the requested id. Expansion is bounded by [`Limits`]
//! (path patterns and a depth cap) so callers can pull in exactly the
//! slice of the graph they need.
//!
//! Fetched content is spliced in place and then walked itself, so chains
//! of references expand transitively. A reference to an id that is
//! already being expanded higher up the same branch is cut: the chain is
//! unrolled exactly once and the repeated reference stays a placeholder,
//! recorded in the report. Missing content is governed by
//! [`MissingReferencePolicy`]; content that fails identity verification
//! is always an error, under any policy.
//!
//! Type aliases are resolved along the way: when the document root
//! carries a supported-types feature, a name-only type node whose alias
//! appears in that catalogue is turned into a reference and expanded like
//! any other.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::ident::BlueId;
use crate::manager::NodeManager;
use crate::node::wire::MAX_DEPTH;
use crate::node::{Feature, FeatureKind, Node, NodeId, NodePath};
use crate::provider::{ProviderError, ReferenceResolver};

mod limits;

pub use limits::{Limits, LimitsError};

/// What to do when a reference within limits cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingReferencePolicy {
    /// Fail the whole expansion.
    #[default]
    Fail,
    /// Keep the placeholder, record it in the report, and continue.
    KeepStub,
}

/// A reference that stayed a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// Path of the placeholder.
    pub path: String,
    /// The id it points at.
    pub blue_id: BlueId,
}

/// Outcome summary of one expansion pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtensionReport {
    /// Number of references that were expanded.
    pub expanded: usize,
    /// References kept as stubs under [`MissingReferencePolicy::KeepStub`].
    pub unresolved: Vec<UnresolvedReference>,
    /// References cut to stop a cycle from unrolling more than once.
    pub cycle_stubs: Vec<UnresolvedReference>,
}

impl ExtensionReport {
    /// Whether every reference in reach was expanded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty() && self.cycle_stubs.is_empty()
    }
}

/// Errors from expanding references.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtendError {
    /// No document exists for a reference within limits.
    #[error("no document found for blueId {blue_id} at path '{path}'")]
    UnresolvedReference {
        /// Path of the placeholder.
        path: String,
        /// The id that could not be resolved.
        blue_id: BlueId,
    },

    /// A reference needed expanding but the manager has no resolver.
    #[error("cannot expand blueId {blue_id} at path '{path}': no resolver configured")]
    ResolverMissing {
        /// Path of the placeholder.
        path: String,
        /// The id that needed resolving.
        blue_id: BlueId,
    },

    /// The provider failed, or served content with the wrong identity.
    #[error("provider failed at path '{path}'")]
    Provider {
        /// Path of the reference being resolved.
        path: String,
        /// The underlying provider error.
        #[source]
        source: ProviderError,
    },

    /// Expansion descended deeper than [`MAX_DEPTH`].
    #[error("expansion exceeded {max_depth} levels")]
    MaxDepthExceeded {
        /// The exceeded limit.
        max_depth: usize,
    },
}

/// Expands references under `root` within `limits`.
///
/// # Errors
///
/// Returns [`ExtendError`] on unresolvable references (under
/// [`MissingReferencePolicy::Fail`]), identity mismatches, provider
/// failures, or runaway depth. The document may hold partially expanded
/// content after an error.
pub fn extend(
    manager: &mut dyn NodeManager,
    root: NodeId,
    limits: &Limits,
    policy: MissingReferencePolicy,
) -> Result<ExtensionReport, ExtendError> {
    let catalogue = match manager.arena().feature(root, FeatureKind::SupportedTypes) {
        Some(Feature::SupportedTypes { types }) => types.clone(),
        _ => BTreeMap::new(),
    };

    let mut pass = Pass {
        resolver: manager.reference_resolver(),
        limits,
        policy,
        catalogue,
        in_flight: Vec::new(),
        report: ExtensionReport::default(),
    };
    pass.visit(manager, root, &NodePath::root(), 0)?;

    tracing::debug!(
        expanded = pass.report.expanded,
        unresolved = pass.report.unresolved.len(),
        cycle_stubs = pass.report.cycle_stubs.len(),
        "expansion finished"
    );
    Ok(pass.report)
}

struct Pass<'a> {
    resolver: Option<ReferenceResolver>,
    limits: &'a Limits,
    policy: MissingReferencePolicy,
    catalogue: BTreeMap<String, BlueId>,
    in_flight: Vec<BlueId>,
    report: ExtensionReport,
}

impl Pass<'_> {
    fn visit(
        &mut self,
        manager: &mut dyn NodeManager,
        id: NodeId,
        path: &NodePath,
        depth: usize,
    ) -> Result<(), ExtendError> {
        if depth > MAX_DEPTH {
            return Err(ExtendError::MaxDepthExceeded {
                max_depth: MAX_DEPTH,
            });
        }

        // Only pure placeholders are expanded; a reference sitting next
        // to content marks an already materialized node.
        let placeholder = {
            let arena = manager.arena();
            arena.reference(id).copied().filter(|_| {
                arena.type_of(id).is_none()
                    && arena.value(id).is_none()
                    && arena.items(id).is_none()
                    && arena.properties(id).is_none()
            })
        };

        let mut guarded = false;
        if let Some(blue_id) = placeholder {
            if self.expand(manager, id, blue_id, path)? {
                self.in_flight.push(blue_id);
                guarded = true;
            }
        }

        let outcome = self.descend(manager, id, path, depth);
        if guarded {
            self.in_flight.pop();
        }
        outcome
    }

    /// Tries to splice the referenced content over the placeholder.
    /// Returns whether anything was spliced.
    fn expand(
        &mut self,
        manager: &mut dyn NodeManager,
        id: NodeId,
        blue_id: BlueId,
        path: &NodePath,
    ) -> Result<bool, ExtendError> {
        if !self.limits.allows(path) {
            tracing::debug!(%blue_id, path = %path, "reference outside limits, left as-is");
            return Ok(false);
        }

        if self.in_flight.contains(&blue_id) {
            tracing::debug!(%blue_id, path = %path, "cyclic reference cut after one unroll");
            self.report.cycle_stubs.push(UnresolvedReference {
                path: path.to_string(),
                blue_id,
            });
            return Ok(false);
        }

        let Some(resolver) = &self.resolver else {
            match self.policy {
                MissingReferencePolicy::Fail => {
                    return Err(ExtendError::ResolverMissing {
                        path: path.to_string(),
                        blue_id,
                    });
                },
                MissingReferencePolicy::KeepStub => {
                    tracing::warn!(%blue_id, path = %path, "no resolver configured, kept as stub");
                    self.report.unresolved.push(UnresolvedReference {
                        path: path.to_string(),
                        blue_id,
                    });
                    return Ok(false);
                },
            }
        };

        match resolver.resolve(&blue_id) {
            Ok(Some(mut documents)) => {
                let replacement = if documents.len() == 1 {
                    documents.swap_remove(0)
                } else {
                    // A set id expands to the list holding its members,
                    // so the spliced content hashes back to the id.
                    Node::new().with_items(documents)
                };
                manager.arena_mut().splice(id, &replacement);
                self.report.expanded += 1;
                Ok(true)
            },
            Ok(None) => match self.policy {
                MissingReferencePolicy::Fail => Err(ExtendError::UnresolvedReference {
                    path: path.to_string(),
                    blue_id,
                }),
                MissingReferencePolicy::KeepStub => {
                    tracing::warn!(%blue_id, path = %path, "document not found, kept as stub");
                    self.report.unresolved.push(UnresolvedReference {
                        path: path.to_string(),
                        blue_id,
                    });
                    Ok(false)
                },
            },
            // Wrong content for an id is corruption, never stubbed over.
            Err(mismatch @ ProviderError::IdentityMismatch { .. }) => Err(ExtendError::Provider {
                path: path.to_string(),
                source: mismatch,
            }),
            Err(source) => match self.policy {
                MissingReferencePolicy::Fail => Err(ExtendError::Provider {
                    path: path.to_string(),
                    source,
                }),
                MissingReferencePolicy::KeepStub => {
                    tracing::warn!(%blue_id, path = %path, error = %source, "provider failed, kept as stub");
                    self.report.unresolved.push(UnresolvedReference {
                        path: path.to_string(),
                        blue_id,
                    });
                    Ok(false)
                },
            },
        }
    }

    fn descend(
        &mut self,
        manager: &mut dyn NodeManager,
        id: NodeId,
        path: &NodePath,
        depth: usize,
    ) -> Result<(), ExtendError> {
        let snapshot = manager.arena().snapshot(id);
        if let Some(type_id) = snapshot.node_type {
            self.resolve_type_alias(manager, type_id);
            self.visit(manager, type_id, &path.child_type(), depth + 1)?;
        }
        if let Some(items) = snapshot.items {
            for (index, item) in items.iter().enumerate() {
                self.visit(manager, *item, &path.child_index(index), depth + 1)?;
            }
        }
        if let Some(properties) = snapshot.properties {
            for (key, child) in properties {
                self.visit(manager, child, &path.child(key.as_str()), depth + 1)?;
            }
        }
        Ok(())
    }

    /// Turns a name-only type node into a reference when the root's
    /// supported-types catalogue pins the alias to an id.
    fn resolve_type_alias(&self, manager: &mut dyn NodeManager, type_id: NodeId) {
        if self.catalogue.is_empty() {
            return;
        }
        let alias = {
            let arena = manager.arena();
            let alias_only = arena.reference(type_id).is_none()
                && arena.type_of(type_id).is_none()
                && arena.value(type_id).is_none()
                && arena.items(type_id).is_none()
                && arena.properties(type_id).is_none();
            if !alias_only {
                return;
            }
            arena.name(type_id).map(str::to_owned)
        };
        let Some(alias) = alias else {
            return;
        };
        let Some(target) = self.catalogue.get(&alias).copied() else {
            return;
        };
        manager.arena_mut().set_reference(type_id, Some(target));
        tracing::debug!(alias = %alias, blue_id = %target, "type alias pinned through supported types");
    }
}
