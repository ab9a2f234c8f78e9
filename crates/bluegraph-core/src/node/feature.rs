//! Node features: side-channel metadata carried next to the content.
//!
//! Features never participate in merging or identity. They are a closed set
//! of tagged variants, and callers look them up by kind rather than by
//! position; at most one feature of a given kind is meaningful per node.

use std::collections::BTreeMap;

use crate::ident::BlueId;

/// Kind tag for a [`Feature`].
///
/// Unknown kinds in wire input are rejected at parse time (fail-closed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureKind {
    /// A catalogue mapping logical type names to their blueIds.
    SupportedTypes,
    /// Free-form hints consumed by transformation processors.
    Blueprint,
}

impl FeatureKind {
    /// Returns the reserved wire key for this kind.
    #[must_use]
    pub const fn wire_key(self) -> &'static str {
        match self {
            Self::SupportedTypes => "supportedTypes",
            Self::Blueprint => "blueprint",
        }
    }

    /// Parses a wire key into a kind.
    ///
    /// Returns `None` for unknown keys so the caller can reject them.
    #[must_use]
    pub fn from_wire_key(key: &str) -> Option<Self> {
        match key {
            "supportedTypes" => Some(Self::SupportedTypes),
            "blueprint" => Some(Self::Blueprint),
            _ => None,
        }
    }
}

/// A side-channel metadata tag on a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feature {
    /// Maps logical type names to the blueIds that define them.
    ///
    /// Consulted when a `type` names a logical alias instead of carrying
    /// inline content or a direct reference.
    SupportedTypes {
        /// Alias name to definition id.
        types: BTreeMap<String, BlueId>,
    },

    /// Arbitrary key/value hints for transformation processors.
    Blueprint {
        /// Hint entries.
        entries: BTreeMap<String, String>,
    },
}

impl Feature {
    /// Returns the kind tag of this feature.
    #[must_use]
    pub const fn kind(&self) -> FeatureKind {
        match self {
            Self::SupportedTypes { .. } => FeatureKind::SupportedTypes,
            Self::Blueprint { .. } => FeatureKind::Blueprint,
        }
    }

    /// Returns the alias catalogue if this is a supported-types feature.
    #[must_use]
    pub const fn supported_types(&self) -> Option<&BTreeMap<String, BlueId>> {
        match self {
            Self::SupportedTypes { types } => Some(types),
            Self::Blueprint { .. } => None,
        }
    }
}
