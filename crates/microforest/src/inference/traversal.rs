//! Single-tree traversal.
//!
//! A walk starts at a root reference and follows `left` while the selected
//! feature is below the node's threshold and `right` otherwise, until it
//! reaches a leaf reference. Every step is bounds-checked, and a walk is cut
//! off after `n_nodes` steps: an acyclic path cannot be longer than that.

use crate::error::TraversalFault;
use crate::repr::{ClassLabel, Forest, LeafId, NodeRef, SplitValue};

/// Walk from `start` to a leaf and return the leaf payload.
///
/// The payload is a leaf-array index or an inline class, depending on the
/// forest's [`LeafMode`](crate::repr::LeafMode).
#[inline]
pub fn traverse_to_leaf<T: SplitValue>(
    forest: &Forest<T>,
    start: NodeRef,
    features: &[T],
) -> Result<LeafId, TraversalFault> {
    let nodes = forest.nodes();
    let limit = nodes.len();
    let mut cursor = start;
    let mut steps = 0usize;

    loop {
        match cursor {
            NodeRef::Leaf(leaf) => return Ok(leaf),
            NodeRef::Node(id) => {
                let node = nodes
                    .get(id as usize)
                    .ok_or(TraversalFault::DanglingNode {
                        node: id,
                        n_nodes: limit,
                    })?;
                if steps == limit {
                    return Err(TraversalFault::CycleDetected { limit });
                }
                steps += 1;

                let value = features.get(node.feature as usize).copied().ok_or(
                    TraversalFault::FeatureOutOfRange {
                        node: id,
                        feature: node.feature,
                        n_features: features.len(),
                    },
                )?;

                cursor = node.next(value);
            }
        }
    }
}

/// Walk from `start` to a leaf and resolve its class label.
#[inline]
pub fn traverse_tree<T: SplitValue>(
    forest: &Forest<T>,
    start: NodeRef,
    features: &[T],
) -> Result<ClassLabel, TraversalFault> {
    let leaf = traverse_to_leaf(forest, start, features)?;
    forest.leaf_class(leaf).map_err(TraversalFault::from)
}
