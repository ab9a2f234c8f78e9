//! Built-in merge processors.

use std::sync::Arc;

use crate::node::{NodeArena, NodeId, NodePath};

use super::{MergeError, MergeProcessor};

/// Processor that propagates nothing.
///
/// Useful as a baseline in tests and as the tail of custom chains.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProcessor;

impl MergeProcessor for NoopProcessor {
    fn process(
        &self,
        _arena: &mut NodeArena,
        _target: NodeId,
        _source: NodeId,
        _path: &NodePath,
    ) -> Result<(), MergeError> {
        Ok(())
    }
}

/// Propagates the source's scalar value onto the target.
///
/// A present source value overwrites the target's value of the same kind.
/// Overwriting across kinds is refused; a number never silently becomes
/// text.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValuePropagator;

impl MergeProcessor for ValuePropagator {
    fn process(
        &self,
        arena: &mut NodeArena,
        target: NodeId,
        source: NodeId,
        path: &NodePath,
    ) -> Result<(), MergeError> {
        let Some(source_value) = arena.value(source).cloned() else {
            return Ok(());
        };
        if let Some(target_value) = arena.value(target) {
            if target_value.kind() != source_value.kind() {
                return Err(MergeError::IncompatibleValue {
                    path: path.to_string(),
                    target_kind: target_value.kind(),
                    source_kind: source_value.kind(),
                });
            }
        }
        arena.set_value(target, Some(source_value));
        Ok(())
    }
}

/// Propagates the source's name onto the target when present.
#[derive(Debug, Default, Clone, Copy)]
pub struct NamePropagator;

impl MergeProcessor for NamePropagator {
    fn process(
        &self,
        arena: &mut NodeArena,
        target: NodeId,
        source: NodeId,
        _path: &NodePath,
    ) -> Result<(), MergeError> {
        if let Some(name) = arena.name(source).map(str::to_owned) {
            arena.set_name(target, Some(name));
        }
        Ok(())
    }
}

/// Propagates the source's features onto the target.
///
/// A source feature replaces a target feature of the same kind; other
/// target features are kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeaturePropagator;

impl MergeProcessor for FeaturePropagator {
    fn process(
        &self,
        arena: &mut NodeArena,
        target: NodeId,
        source: NodeId,
        _path: &NodePath,
    ) -> Result<(), MergeError> {
        for feature in arena.features(source).to_vec() {
            arena.replace_feature(target, feature);
        }
        Ok(())
    }
}

/// Runs a chain of processors in order, stopping at the first refusal.
#[derive(Clone, Default)]
pub struct SequentialProcessor {
    stages: Vec<Arc<dyn MergeProcessor>>,
}

impl SequentialProcessor {
    /// Creates a chain from explicit stages.
    #[must_use]
    pub fn new(stages: Vec<Arc<dyn MergeProcessor>>) -> Self {
        Self { stages }
    }

    /// The standard chain: value, name, then feature propagation.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(vec![
            Arc::new(ValuePropagator),
            Arc::new(NamePropagator),
            Arc::new(FeaturePropagator),
        ])
    }

    /// Appends a stage to the chain.
    #[must_use]
    pub fn with_stage(mut self, stage: Arc<dyn MergeProcessor>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Number of stages in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the chain has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl MergeProcessor for SequentialProcessor {
    fn process(
        &self,
        arena: &mut NodeArena,
        target: NodeId,
        source: NodeId,
        path: &NodePath,
    ) -> Result<(), MergeError> {
        for stage in &self.stages {
            stage.process(arena, target, source, path)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for SequentialProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequentialProcessor")
            .field("stages", &self.stages.len())
            .finish()
    }
}
