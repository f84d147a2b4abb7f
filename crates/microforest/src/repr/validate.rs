//! Opt-in structural validation.
//!
//! Appends never check references, so a forest can hold dangling or cyclic
//! references until it is walked. [`Forest::validate`] checks everything
//! reachable from the roots once, so that prediction on a validated forest
//! can only fault on a too-short feature vector.

use super::forest::LeafFault;
use super::{Forest, LeafId, NodeId, NodeRef, SplitValue};

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("forest has no trees")]
    NoTrees,
    #[error("tree {tree}: reference to node {node} is out of range ({n_nodes} nodes)")]
    DanglingNode {
        tree: usize,
        node: NodeId,
        n_nodes: usize,
    },
    #[error("tree {tree}: reference to leaf {leaf} is out of range ({n_leaves} leaves)")]
    DanglingLeaf {
        tree: usize,
        leaf: LeafId,
        n_leaves: usize,
    },
    #[error("tree {tree}: cycle through node {node}")]
    CycleDetected { tree: usize, node: NodeId },
    #[error("tree {tree}: node {node} splits on feature {feature} (forest has {n_features})")]
    FeatureOutOfRange {
        tree: usize,
        node: NodeId,
        feature: u16,
        n_features: usize,
    },
    #[error("tree {tree}: leaf predicts class {class} (forest has {n_classes})")]
    ClassOutOfRange {
        tree: usize,
        class: u32,
        n_classes: usize,
    },
}

const UNVISITED: u8 = 0;
const VISITING: u8 = 1;
const DONE: u8 = 2;

impl<T: SplitValue> Forest<T> {
    /// Check every reference reachable from the roots.
    ///
    /// Nodes may be shared between trees; a node is only checked the first
    /// time it is reached. Feature indices are checked against `n_features`
    /// and classes against `n_classes` when those are non-zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.n_trees() == 0 {
            return Err(ValidationError::NoTrees);
        }

        let n_nodes = self.n_nodes();
        // Iterative DFS with color marking shared across trees.
        let mut color = vec![UNVISITED; n_nodes];
        let mut stack: Vec<(NodeId, bool)> = Vec::new();

        for (tree, &root) in self.roots().iter().enumerate() {
            self.check_ref(tree, root)?;
            let NodeRef::Node(root) = root else {
                continue;
            };
            stack.push((root, false));

            while let Some((node, finished)) = stack.pop() {
                let idx = node as usize;
                if finished {
                    color[idx] = DONE;
                    continue;
                }
                match color[idx] {
                    UNVISITED => {}
                    VISITING => return Err(ValidationError::CycleDetected { tree, node }),
                    _ => continue,
                }
                color[idx] = VISITING;
                stack.push((node, true));

                let split = &self.nodes()[idx];
                if self.n_features() > 0 && split.feature as usize >= self.n_features() {
                    return Err(ValidationError::FeatureOutOfRange {
                        tree,
                        node,
                        feature: split.feature,
                        n_features: self.n_features(),
                    });
                }

                for child in [split.right, split.left] {
                    self.check_ref(tree, child)?;
                    if let NodeRef::Node(child) = child {
                        if color[child as usize] == VISITING {
                            return Err(ValidationError::CycleDetected { tree, node: child });
                        }
                        if color[child as usize] == UNVISITED {
                            stack.push((child, false));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Check that a single reference resolves.
    fn check_ref(&self, tree: usize, node_ref: NodeRef) -> Result<(), ValidationError> {
        match node_ref {
            NodeRef::Node(node) if node as usize >= self.n_nodes() => {
                Err(ValidationError::DanglingNode {
                    tree,
                    node,
                    n_nodes: self.n_nodes(),
                })
            }
            NodeRef::Node(_) => Ok(()),
            NodeRef::Leaf(leaf) => match self.leaf_class(leaf) {
                Ok(_) => Ok(()),
                Err(LeafFault::Dangling { leaf, n_leaves }) => Err(ValidationError::DanglingLeaf {
                    tree,
                    leaf,
                    n_leaves,
                }),
                Err(LeafFault::ClassOutOfRange { class, n_classes }) => {
                    Err(ValidationError::ClassOutOfRange {
                        tree,
                        class,
                        n_classes,
                    })
                }
            },
        }
    }
}
