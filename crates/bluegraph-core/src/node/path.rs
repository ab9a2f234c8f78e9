//! Document paths: the route from a root node to a nested position.
//!
//! Segments are property keys, decimal item indices, and the literal
//! segment `type` for the type position. Paths localize errors in large
//! graphs and drive expansion limit checks.

use std::fmt;

/// Reserved segment naming the type position of a node.
pub const TYPE_SEGMENT: &str = "type";

/// A path from the root of a document to a nested node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodePath {
    segments: Vec<String>,
}

impl NodePath {
    /// Returns the root path (no segments).
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Returns this path extended with a property-key or literal segment.
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment.into());
        Self { segments }
    }

    /// Returns this path extended with an item-index segment.
    #[must_use]
    pub fn child_index(&self, index: usize) -> Self {
        self.child(index.to_string())
    }

    /// Returns this path extended with the type segment.
    #[must_use]
    pub fn child_type(&self) -> Self {
        self.child(TYPE_SEGMENT)
    }

    /// Number of segments.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// True when this is the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// The path segments, root first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        f.write_str(&self.segments.join("/"))
    }
}
