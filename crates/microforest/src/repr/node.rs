//! Split nodes and child references.

use super::{FeatureIndex, LeafId, NodeId, SplitValue};

/// Reference to a child (or a tree root): an internal node or a leaf.
///
/// What a `Leaf` payload means depends on the forest's
/// [`LeafMode`](super::LeafMode): an index into the leaf-label array, or the
/// class label itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Node(NodeId),
    Leaf(LeafId),
}

impl NodeRef {
    /// Decode the signed form used by model exporters.
    ///
    /// Non-negative values are node indices; a negative `r` is leaf `-(r + 1)`.
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        if raw >= 0 {
            NodeRef::Node(raw as NodeId)
        } else {
            NodeRef::Leaf((-(raw + 1)) as LeafId)
        }
    }

    /// Encode back to the signed form. `None` if the payload exceeds `i32::MAX`.
    pub fn to_raw(self) -> Option<i32> {
        match self {
            NodeRef::Node(id) => i32::try_from(id).ok(),
            NodeRef::Leaf(leaf) => i32::try_from(leaf).ok().map(|l| -l - 1),
        }
    }

    #[inline]
    pub fn is_leaf(self) -> bool {
        matches!(self, NodeRef::Leaf(_))
    }
}

/// A binary split: `feature < threshold` goes left, everything else right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node<T: SplitValue> {
    pub feature: FeatureIndex,
    pub threshold: T,
    pub left: NodeRef,
    pub right: NodeRef,
}

impl<T: SplitValue> Node<T> {
    pub fn new(feature: FeatureIndex, threshold: T, left: NodeRef, right: NodeRef) -> Self {
        Self {
            feature,
            threshold,
            left,
            right,
        }
    }

    /// Child to descend into for a feature value.
    ///
    /// Equality goes right. An unordered value (NaN) is not less than the
    /// threshold and also goes right.
    #[inline]
    pub fn next(&self, value: T) -> NodeRef {
        if value < self.threshold {
            self.left
        } else {
            self.right
        }
    }
}
