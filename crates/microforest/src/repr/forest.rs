//! Forest storage and the append-only builder API.

use serde::{Deserialize, Serialize};

use crate::config::ForestConfig;
use crate::error::{Buffer, ForestError, TraversalFault};
use crate::inference::{FeatureBuffer, Predictor};

use super::storage::FixedVec;
use super::{
    ClassLabel, FeatureIndex, LeafId, LeafMode, Node, NodeId, NodeRef, SplitValue, ValueKind,
};

/// Largest node or leaf capacity whose indices still fit the signed
/// reference encoding.
pub const MAX_INDEX_CAPACITY: usize = i32::MAX as usize;

/// Decision forest over a shared node arena.
///
/// Nodes from all trees live in one arena and may interleave; a tree is just
/// an entry in the root array. All three buffers are sized at construction
/// and never grow.
///
/// The forest is populated by `add_*` calls, then read by [`Predictor`]s.
/// A predictor holds a shared borrow, so the forest cannot be mutated while
/// one is alive.
#[derive(Debug, Clone)]
pub struct Forest<T: SplitValue = f32> {
    nodes: FixedVec<Node<T>>,
    roots: FixedVec<NodeRef>,
    leaves: FixedVec<ClassLabel>,
    n_features: usize,
    n_classes: usize,
}

/// Forest with `f32` thresholds and a leaf-label array.
pub type FloatForest = Forest<f32>;

/// Forest with `i16` thresholds and class ids carried in leaf references.
pub type QuantizedForest = Forest<i16>;

/// Why a leaf payload did not resolve to a class label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LeafFault {
    Dangling { leaf: LeafId, n_leaves: usize },
    ClassOutOfRange { class: u32, n_classes: usize },
}

impl From<LeafFault> for TraversalFault {
    fn from(fault: LeafFault) -> Self {
        match fault {
            LeafFault::Dangling { leaf, n_leaves } => {
                TraversalFault::DanglingLeaf { leaf, n_leaves }
            }
            LeafFault::ClassOutOfRange { class, n_classes } => {
                TraversalFault::ClassOutOfRange { class, n_classes }
            }
        }
    }
}

/// Introspection summary of a forest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestMeta {
    pub value_kind: ValueKind,
    pub leaf_mode: LeafMode,
    pub n_features: usize,
    pub n_classes: usize,
    pub n_trees: usize,
    pub n_nodes: usize,
    pub n_leaves: usize,
    pub max_trees: usize,
    pub max_nodes: usize,
    pub max_leaves: usize,
}

impl<T: SplitValue> Forest<T> {
    /// Allocate storage for up to `max_trees` roots, `max_nodes` nodes and
    /// `max_leaves` leaf labels.
    ///
    /// `max_leaves` is ignored for inline-leaf forests, which have no leaf array.
    ///
    /// # Errors
    ///
    /// [`ForestError::Allocation`] if a buffer cannot be reserved, or if a node
    /// or leaf capacity exceeds [`MAX_INDEX_CAPACITY`].
    pub fn new(max_trees: usize, max_nodes: usize, max_leaves: usize) -> Result<Self, ForestError> {
        let max_leaves = match T::LEAF_MODE {
            LeafMode::Indexed => max_leaves,
            LeafMode::Inline => 0,
        };
        if max_nodes > MAX_INDEX_CAPACITY {
            return Err(ForestError::Allocation {
                buffer: Buffer::Nodes,
                requested: max_nodes,
            });
        }
        if max_leaves > MAX_INDEX_CAPACITY {
            return Err(ForestError::Allocation {
                buffer: Buffer::Leaves,
                requested: max_leaves,
            });
        }

        let nodes = FixedVec::try_with_capacity(Buffer::Nodes, max_nodes)?;
        let roots = FixedVec::try_with_capacity(Buffer::Roots, max_trees)?;
        let leaves = FixedVec::try_with_capacity(Buffer::Leaves, max_leaves)?;

        tracing::debug!(
            kind = %T::KIND,
            max_trees,
            max_nodes,
            max_leaves,
            "allocated forest storage"
        );

        Ok(Self {
            nodes,
            roots,
            leaves,
            n_features: 0,
            n_classes: 0,
        })
    }

    /// Allocate storage sized from a validated [`ForestConfig`].
    pub fn from_config(config: &ForestConfig) -> Result<Self, ForestError> {
        Self::new(config.max_trees, config.max_nodes, config.max_leaves)
    }

    // =========================================================================
    // Builder
    // =========================================================================

    /// Record the expected input width and the number of classes.
    ///
    /// Neither is enforced against the feature slice at predict time. When
    /// `n_classes` is non-zero, predicted classes outside `0..n_classes` are
    /// reported as traversal faults.
    pub fn set_feature_class_counts(&mut self, n_features: usize, n_classes: usize) {
        self.n_features = n_features;
        self.n_classes = n_classes;
    }

    /// Append a split node, returning its id.
    ///
    /// Child references are stored as given; they are checked during
    /// traversal or by [`Forest::validate`], not here.
    pub fn add_node(
        &mut self,
        left: NodeRef,
        right: NodeRef,
        feature: FeatureIndex,
        threshold: T,
    ) -> Result<NodeId, ForestError> {
        let index = self.nodes.push(Node::new(feature, threshold, left, right))?;
        // capacity is bounded by MAX_INDEX_CAPACITY
        Ok(index as NodeId)
    }

    /// [`Forest::add_node`] with children in the signed exporter encoding.
    pub fn add_raw_node(
        &mut self,
        left: i32,
        right: i32,
        feature: FeatureIndex,
        threshold: T,
    ) -> Result<NodeId, ForestError> {
        self.add_node(NodeRef::from_raw(left), NodeRef::from_raw(right), feature, threshold)
    }

    /// Append a tree root, returning the tree index.
    pub fn add_root(&mut self, root: NodeRef) -> Result<usize, ForestError> {
        self.roots.push(root)
    }

    /// [`Forest::add_root`] with the root in the signed exporter encoding.
    pub fn add_raw_root(&mut self, raw: i32) -> Result<usize, ForestError> {
        self.add_root(NodeRef::from_raw(raw))
    }

    /// Append a leaf label, returning the id to use in `NodeRef::Leaf`.
    ///
    /// Inline-leaf forests have zero leaf capacity, so this always fails
    /// with [`ForestError::CapacityExceeded`] for them.
    pub fn add_leaf(&mut self, class: ClassLabel) -> Result<LeafId, ForestError> {
        let index = self.leaves.push(class)?;
        Ok(index as LeafId)
    }

    /// Free all storage.
    ///
    /// Consumes the forest, so it cannot be released twice or used afterwards.
    pub fn release(self) {
        tracing::debug!(
            n_trees = self.n_trees(),
            n_nodes = self.n_nodes(),
            n_leaves = self.n_leaves(),
            "releasing forest storage"
        );
        drop(self);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.roots.len()
    }

    #[inline]
    pub fn n_leaves(&self) -> usize {
        self.leaves.len()
    }

    #[inline]
    pub fn max_nodes(&self) -> usize {
        self.nodes.capacity()
    }

    #[inline]
    pub fn max_trees(&self) -> usize {
        self.roots.capacity()
    }

    #[inline]
    pub fn max_leaves(&self) -> usize {
        self.leaves.capacity()
    }

    /// Expected feature count (0 if never set).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of classes (0 if never set).
    #[inline]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id as usize)
    }

    #[inline]
    pub fn nodes(&self) -> &[Node<T>] {
        self.nodes.as_slice()
    }

    #[inline]
    pub fn root(&self, tree: usize) -> Option<NodeRef> {
        self.roots.get(tree).copied()
    }

    #[inline]
    pub fn roots(&self) -> &[NodeRef] {
        self.roots.as_slice()
    }

    #[inline]
    pub fn leaf(&self, id: LeafId) -> Option<ClassLabel> {
        self.leaves.get(id as usize).copied()
    }

    #[inline]
    pub fn leaves(&self) -> &[ClassLabel] {
        self.leaves.as_slice()
    }

    pub fn meta(&self) -> ForestMeta {
        ForestMeta {
            value_kind: T::KIND,
            leaf_mode: T::LEAF_MODE,
            n_features: self.n_features,
            n_classes: self.n_classes,
            n_trees: self.n_trees(),
            n_nodes: self.n_nodes(),
            n_leaves: self.n_leaves(),
            max_trees: self.max_trees(),
            max_nodes: self.max_nodes(),
            max_leaves: self.max_leaves(),
        }
    }

    /// Resolve a leaf payload to its class label.
    #[inline]
    pub(crate) fn leaf_class(&self, leaf: LeafId) -> Result<ClassLabel, LeafFault> {
        let class = match T::LEAF_MODE {
            LeafMode::Indexed => {
                let label = self.leaf(leaf).ok_or(LeafFault::Dangling {
                    leaf,
                    n_leaves: self.n_leaves(),
                })?;
                u32::from(label)
            }
            LeafMode::Inline => leaf,
        };

        let out_of_range = LeafFault::ClassOutOfRange {
            class,
            n_classes: self.n_classes,
        };
        if self.n_classes > 0 && class as usize >= self.n_classes {
            return Err(out_of_range);
        }
        ClassLabel::try_from(class).map_err(|_| out_of_range)
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Predict the class for one feature vector by plurality vote.
    ///
    /// Shorthand for `Predictor::new(self).predict(features)`.
    pub fn predict(&self, features: &[T]) -> Result<ClassLabel, ForestError> {
        Predictor::new(self).predict(features)
    }

    /// Predict from an untyped buffer, checking its element type first.
    pub fn predict_buffer(&self, features: FeatureBuffer<'_>) -> Result<ClassLabel, ForestError> {
        Predictor::new(self).predict_buffer(features)
    }
}
