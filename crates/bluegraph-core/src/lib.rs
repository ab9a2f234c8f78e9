//! Content-addressed document graphs with prototype-style resolution.
//!
//! Documents are trees of [`Node`]s parsed from YAML or JSON. Every node
//! has a deterministic canonical form, and the SHA-256 digest of that
//! form (carried as a [`BlueId`]) is the node's identity: two documents
//! share an id exactly when their canonical forms are byte-identical.
//! References between documents are just ids, so a document can extend
//! another by pointing at it.
//!
//! Resolution turns such a document into a self-contained result:
//!
//! 1. declared transformations are applied and stripped
//!    ([`transform`]),
//! 2. references are expanded in place, verified against their ids and
//!    bounded by [`Limits`] ([`extend`](mod@extend)),
//! 3. the type chain is folded down, nearest definition winning
//!    ([`merge`](mod@merge)),
//! 4. the result is exported with its own identity
//!    ([`resolve`](mod@resolve)).
//!
//! Storage is pluggable through [`NodeProvider`]; every fetch is
//! re-hashed before use, so a store can be wrong but never lie.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use bluegraph_core::{
//!     resolve, BasicNodeProvider, Node, ReferenceResolver, ResolveOptions,
//!     SessionNodeManager,
//! };
//!
//! // Store a base document, then derive from it by reference.
//! let provider = Arc::new(BasicNodeProvider::new());
//! let base = Node::from_yaml_str("x:\n  value: 1\n")?;
//! let base_id = provider.put_document(&base)?;
//!
//! let document = Node::from_yaml_str(&format!(
//!     "type:\n  blueId: {base_id}\ny:\n  value: 2\n"
//! ))?;
//!
//! let mut manager =
//!     SessionNodeManager::standard(Some(ReferenceResolver::new(provider)));
//! let resolution = resolve(&document, &mut manager, &ResolveOptions::new())?;
//!
//! assert!(resolution.node.property("x").is_some());
//! assert!(resolution.node.property("y").is_some());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Module Structure
//!
//! - [`node`]: the node model, wire mapping, and arena storage
//! - [`ident`]: blueIds and their CID text form
//! - [`canonical`]: canonical JSON and identity hashing
//! - [`provider`]: document storage and verified fetching
//! - [`manager`]: the working context rewrites run in
//! - [`merge`](mod@merge): prototype-style type chain folding
//! - [`extend`](mod@extend): bounded reference expansion
//! - [`transform`]: declared document transformations
//! - [`resolve`](mod@resolve): the full pipeline in one call

pub mod canonical;
pub mod extend;
pub mod ident;
pub mod manager;
pub mod merge;
pub mod node;
pub mod provider;
pub mod resolve;
pub mod transform;

pub use canonical::{blue_id_of, canonicalize, CanonicalizeError, MAX_DEPTH};
pub use extend::{
    extend, ExtendError, ExtensionReport, Limits, LimitsError, MissingReferencePolicy,
    UnresolvedReference,
};
pub use ident::{BlueId, BlueIdError, CidError, DIGEST_LEN};
pub use manager::{NodeManager, SessionNodeManager};
pub use merge::{merge, MergeError, MergeProcessor, SequentialProcessor};
pub use node::{
    Feature, FeatureKind, Node, NodeArena, NodeId, NodePath, NodeValue, ValueKind, WireError,
};
pub use provider::{
    BasicNodeProvider, DirectoryNodeProvider, NodeProvider, ProviderError, ReferenceResolver,
};
pub use resolve::{resolve, Resolution, ResolveError, ResolveOptions};
pub use transform::{
    preprocess, DocumentTransformer, TransformError, TransformerProvider, TransformerRegistry,
    TRANSFORMATIONS_KEY,
};
