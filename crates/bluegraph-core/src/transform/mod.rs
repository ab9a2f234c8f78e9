//! Document preprocessing through declared transformations.
//!
//! A document may carry a reserved `transformations` property holding a
//! list of directives. Each directive names a transformation by blueId,
//! either as its type reference or as a bare reference. Before a document
//! is resolved, [`preprocess`] looks up a [`DocumentTransformer`] for
//! every directive, strips the property, and applies the transformers in
//! directive order.
//!
//! Lookup is all-or-nothing: if any directive names an unknown id, the
//! document is rejected before any transformer has run. Half-transformed
//! documents never escape.

use std::collections::BTreeMap;
use std::sync::Arc;

use thiserror::Error;

use crate::ident::BlueId;
use crate::node::Node;

/// Reserved property key holding transformation directives.
pub const TRANSFORMATIONS_KEY: &str = "transformations";

/// Errors from preprocessing a document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransformError {
    /// A directive names a transformation nothing is registered for.
    #[error("no transformer registered for blueId {blue_id}")]
    UnsupportedTransformation {
        /// The unknown transformation id.
        blue_id: BlueId,
    },

    /// A directive does not have the expected shape.
    #[error("malformed transformation directive at '{path}': {message}")]
    MalformedDirective {
        /// Path of the offending directive.
        path: String,
        /// What was wrong.
        message: String,
    },

    /// A transformer failed while rewriting the document.
    #[error("transformation failed: {message}")]
    Failed {
        /// The transformer's explanation.
        message: String,
    },
}

/// One document rewrite, applied during preprocessing.
pub trait DocumentTransformer: Send + Sync {
    /// Rewrites `document` according to `directive`.
    ///
    /// The directive is the full node that named this transformer, so
    /// transformers can read their parameters from its properties.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Failed`] when the document cannot be
    /// rewritten.
    fn apply(&self, document: Node, directive: &Node) -> Result<Node, TransformError>;
}

/// Source of transformers, looked up by transformation id.
pub trait TransformerProvider: Send + Sync {
    /// The transformer registered for `id`, if any.
    fn transformer_for(&self, id: &BlueId) -> Option<Arc<dyn DocumentTransformer>>;
}

/// Plain map-backed [`TransformerProvider`].
#[derive(Default, Clone)]
pub struct TransformerRegistry {
    handlers: BTreeMap<BlueId, Arc<dyn DocumentTransformer>>,
}

impl TransformerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `transformer` under `id`, replacing any earlier one.
    pub fn register(&mut self, id: BlueId, transformer: Arc<dyn DocumentTransformer>) {
        self.handlers.insert(id, transformer);
    }

    /// Number of registered transformers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl TransformerProvider for TransformerRegistry {
    fn transformer_for(&self, id: &BlueId) -> Option<Arc<dyn DocumentTransformer>> {
        self.handlers.get(id).map(Arc::clone)
    }
}

impl std::fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformerRegistry")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// Applies and strips the document's declared transformations.
///
/// A document without a `transformations` property passes through
/// unchanged. Otherwise every directive is resolved to a transformer
/// first; only then is the property removed and the transformers applied
/// in order.
///
/// # Errors
///
/// Returns [`TransformError`] on malformed directives, unknown
/// transformation ids, or a failing transformer.
pub fn preprocess(
    document: Node,
    provider: Option<&dyn TransformerProvider>,
) -> Result<Node, TransformError> {
    let Some(directives_node) = document.property(TRANSFORMATIONS_KEY) else {
        return Ok(document);
    };

    let Some(directives) = directives_node.items() else {
        return Err(TransformError::MalformedDirective {
            path: TRANSFORMATIONS_KEY.to_owned(),
            message: "must hold a list of directives".to_owned(),
        });
    };

    // Resolve every handler before touching the document.
    let mut planned: Vec<(Arc<dyn DocumentTransformer>, Node)> =
        Vec::with_capacity(directives.len());
    for (index, directive) in directives.iter().enumerate() {
        let id = directive_id(directive).ok_or_else(|| TransformError::MalformedDirective {
            path: format!("{TRANSFORMATIONS_KEY}/{index}"),
            message: "directive names no transformation id".to_owned(),
        })?;
        let transformer = provider
            .and_then(|provider| provider.transformer_for(&id))
            .ok_or(TransformError::UnsupportedTransformation { blue_id: id })?;
        planned.push((transformer, directive.clone()));
    }

    let mut document = document;
    document.remove_property(TRANSFORMATIONS_KEY);
    for (transformer, directive) in planned {
        document = transformer.apply(document, &directive)?;
    }
    Ok(document)
}

/// The transformation id a directive names: its type reference, or the
/// directive's own reference.
fn directive_id(directive: &Node) -> Option<BlueId> {
    directive
        .node_type()
        .and_then(Node::reference)
        .or_else(|| directive.reference())
        .copied()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::ident::DIGEST_LEN;
    use crate::node::NodeValue;

    fn test_id(fill: u8) -> BlueId {
        BlueId::from_digest([fill; DIGEST_LEN])
    }

    /// Appends a marker to the document's `log` text property.
    struct Stamp {
        marker: &'static str,
        applied: Arc<AtomicUsize>,
    }

    impl DocumentTransformer for Stamp {
        fn apply(&self, mut document: Node, _directive: &Node) -> Result<Node, TransformError> {
            self.applied.fetch_add(1, Ordering::SeqCst);
            let log = document
                .property("log")
                .and_then(Node::value)
                .and_then(NodeValue::as_text)
                .unwrap_or_default()
                .to_owned();
            document.insert_property(
                "log",
                Node::new().with_value(format!("{log}{}", self.marker)),
            );
            Ok(document)
        }
    }

    fn registry_with(
        id: BlueId,
        marker: &'static str,
    ) -> (TransformerRegistry, Arc<AtomicUsize>) {
        let applied = Arc::new(AtomicUsize::new(0));
        let mut registry = TransformerRegistry::new();
        registry.register(
            id,
            Arc::new(Stamp {
                marker,
                applied: Arc::clone(&applied),
            }),
        );
        (registry, applied)
    }

    fn directive_by_type(id: BlueId) -> Node {
        Node::new().with_type(Node::reference_to(id))
    }

    #[test]
    fn documents_without_directives_pass_through() {
        let document = Node::new().with_property("x", Node::new().with_value(1_i64));
        let result = preprocess(document.clone(), None).unwrap();
        assert_eq!(result, document);
    }

    #[test]
    fn directives_are_stripped_and_applied_in_order() {
        let first = test_id(1);
        let second = test_id(2);
        let (mut registry, applied_a) = registry_with(first, "a");
        let applied_b = Arc::new(AtomicUsize::new(0));
        registry.register(
            second,
            Arc::new(Stamp {
                marker: "b",
                applied: Arc::clone(&applied_b),
            }),
        );

        let document = Node::new().with_property(
            TRANSFORMATIONS_KEY,
            Node::new().with_items(vec![directive_by_type(first), directive_by_type(second)]),
        );
        let result = preprocess(document, Some(&registry)).unwrap();

        assert!(result.property(TRANSFORMATIONS_KEY).is_none());
        assert_eq!(
            result
                .property("log")
                .and_then(Node::value)
                .and_then(NodeValue::as_text),
            Some("ab")
        );
        assert_eq!(applied_a.load(Ordering::SeqCst), 1);
        assert_eq!(applied_b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn bare_reference_directives_work_too() {
        let id = test_id(3);
        let (registry, _) = registry_with(id, "x");
        let document = Node::new().with_property(
            TRANSFORMATIONS_KEY,
            Node::new().with_items(vec![Node::reference_to(id)]),
        );
        let result = preprocess(document, Some(&registry)).unwrap();
        assert!(result.property("log").is_some());
    }

    #[test]
    fn unknown_directive_rejects_before_any_rewrite() {
        let known = test_id(4);
        let unknown = test_id(5);
        let (registry, applied) = registry_with(known, "k");

        let document = Node::new().with_property(
            TRANSFORMATIONS_KEY,
            Node::new().with_items(vec![directive_by_type(known), directive_by_type(unknown)]),
        );
        let err = preprocess(document, Some(&registry)).unwrap_err();

        assert_eq!(
            err,
            TransformError::UnsupportedTransformation { blue_id: unknown }
        );
        assert_eq!(applied.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn directives_without_provider_are_unsupported() {
        let id = test_id(6);
        let document = Node::new().with_property(
            TRANSFORMATIONS_KEY,
            Node::new().with_items(vec![directive_by_type(id)]),
        );
        let err = preprocess(document, None).unwrap_err();
        assert_eq!(err, TransformError::UnsupportedTransformation { blue_id: id });
    }

    #[test]
    fn empty_directive_list_just_strips() {
        let document = Node::new()
            .with_property(TRANSFORMATIONS_KEY, Node::new().with_items(Vec::new()))
            .with_property("x", Node::new().with_value(1_i64));
        let result = preprocess(document, None).unwrap();
        assert!(result.property(TRANSFORMATIONS_KEY).is_none());
        assert!(result.property("x").is_some());
    }

    #[test]
    fn non_list_directives_are_malformed() {
        let document =
            Node::new().with_property(TRANSFORMATIONS_KEY, Node::new().with_value(1_i64));
        let err = preprocess(document, None).unwrap_err();
        assert!(matches!(err, TransformError::MalformedDirective { .. }));
    }

    #[test]
    fn directive_without_id_is_malformed() {
        let document = Node::new().with_property(
            TRANSFORMATIONS_KEY,
            Node::new().with_items(vec![Node::new().with_value("noop")]),
        );
        let err = preprocess(document, None).unwrap_err();
        match err {
            TransformError::MalformedDirective { path, .. } => {
                assert_eq!(path, "transformations/0");
            },
            other => panic!("expected malformed directive, got {other:?}"),
        }
    }
}
