//! Error types shared by the builder and the predictor.

use std::fmt;

use crate::repr::{FeatureIndex, LeafId, NodeId, ValidationError, ValueKind};

/// One of the three fixed buffers owned by a forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffer {
    Nodes,
    Roots,
    Leaves,
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Buffer::Nodes => "nodes",
            Buffer::Roots => "trees",
            Buffer::Leaves => "leaves",
        };
        f.write_str(name)
    }
}

/// Caller input rejected before any tree is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("expecting {expected} feature buffer, got {actual}")]
    ValueKindMismatch {
        expected: ValueKind,
        actual: ValueKind,
    },
    #[error("output buffer has length {actual}, expected {expected}")]
    OutputLenMismatch { expected: usize, actual: usize },
    #[error("class count is not set")]
    ClassCountUnset,
    #[error("feature rows must be contiguous")]
    NonContiguousRows,
}

/// A fault detected while walking a single tree.
///
/// These only occur for forests whose references were never validated;
/// a forest that passes [`Forest::validate`](crate::Forest::validate) and is
/// given enough features never produces one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TraversalFault {
    #[error("walk exceeded {limit} steps, reference graph has a cycle")]
    CycleDetected { limit: usize },
    #[error("node {node} is out of range ({n_nodes} nodes)")]
    DanglingNode { node: NodeId, n_nodes: usize },
    #[error("leaf {leaf} is out of range ({n_leaves} leaves)")]
    DanglingLeaf { leaf: LeafId, n_leaves: usize },
    #[error("node {node} splits on feature {feature}, only {n_features} supplied")]
    FeatureOutOfRange {
        node: NodeId,
        feature: FeatureIndex,
        n_features: usize,
    },
    #[error("class {class} is out of range ({n_classes} classes)")]
    ClassOutOfRange { class: u32, n_classes: usize },
}

/// Error type for forest construction and prediction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForestError {
    /// A buffer could not be obtained at construction.
    #[error("failed to allocate {requested} {buffer}")]
    Allocation { buffer: Buffer, requested: usize },
    /// An append hit a fixed bound. Nothing was written.
    #[error("max {buffer} reached (capacity {capacity})")]
    CapacityExceeded { buffer: Buffer, capacity: usize },
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    #[error("tree {tree}: {fault}")]
    Traversal { tree: usize, fault: TraversalFault },
    #[error("forest has no trees")]
    EmptyForest,
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

impl ForestError {
    /// Returns `true` if the caller can recover by changing what it passes in.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ForestError::CapacityExceeded { .. } | ForestError::InvalidInput(_)
        )
    }
}
