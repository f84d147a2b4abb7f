//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::fmt::Write as _;

use proptest::collection::vec as prop_vec;
use proptest::prelude::*;
use proptest::sample::Index;

use microforest::{ClassLabel, FloatForest, NodeRef};

/// Number of features every generated forest splits on.
pub const N_FEATURES: usize = 3;

/// A forest as the flat list of builder calls that produce it.
///
/// Child references only point at leaves or at nodes appended earlier, so
/// every generated forest is acyclic and fully resolvable.
#[derive(Debug, Clone)]
pub struct ForestRecipe {
    pub n_classes: usize,
    pub leaves: Vec<ClassLabel>,
    /// `(feature, threshold, raw_left, raw_right)`
    pub nodes: Vec<(u16, f32, i32, i32)>,
    pub roots: Vec<i32>,
}

impl ForestRecipe {
    /// Replay the recipe into a forest with exactly enough capacity.
    pub fn build(&self) -> FloatForest {
        let mut forest =
            FloatForest::new(self.roots.len(), self.nodes.len(), self.leaves.len()).unwrap();
        forest.set_feature_class_counts(N_FEATURES, self.n_classes);
        for &class in &self.leaves {
            forest.add_leaf(class).unwrap();
        }
        for &(feature, threshold, left, right) in &self.nodes {
            forest.add_raw_node(left, right, feature, threshold).unwrap();
        }
        for &root in &self.roots {
            forest.add_raw_root(root).unwrap();
        }
        forest
    }

    /// The same calls as CSV replay records.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        writeln!(out, "f,{N_FEATURES}").unwrap();
        writeln!(out, "c,{}", self.n_classes).unwrap();
        for class in &self.leaves {
            writeln!(out, "l,{class}").unwrap();
        }
        for (feature, threshold, left, right) in &self.nodes {
            writeln!(out, "n,{feature},{threshold},{left},{right}").unwrap();
        }
        for root in &self.roots {
            writeln!(out, "r,{root}").unwrap();
        }
        out
    }

    /// Straightforward recursive evaluation over the raw records.
    pub fn reference_predict(&self, features: &[f32]) -> ClassLabel {
        let mut counts = vec![0u32; self.n_classes];
        for &root in &self.roots {
            counts[self.reference_walk(root, features) as usize] += 1;
        }
        let best = counts.iter().copied().max().unwrap_or(0);
        counts.iter().position(|&c| c == best).unwrap() as ClassLabel
    }

    fn reference_walk(&self, raw: i32, features: &[f32]) -> ClassLabel {
        if raw < 0 {
            return self.leaves[(-raw - 1) as usize];
        }
        let (feature, threshold, left, right) = self.nodes[raw as usize];
        if features[feature as usize] < threshold {
            self.reference_walk(left, features)
        } else {
            self.reference_walk(right, features)
        }
    }
}

/// Map a sampled index onto a node below `n_nodes` or any leaf, in the raw
/// signed encoding.
fn pick_ref(index: &Index, n_nodes: usize, n_leaves: usize) -> i32 {
    let k = index.index(n_nodes + n_leaves);
    if k < n_nodes {
        k as i32
    } else {
        -((k - n_nodes) as i32) - 1
    }
}

pub fn arb_recipe() -> impl Strategy<Value = ForestRecipe> {
    (1usize..=4, 1usize..=8, 0usize..=16, 1usize..=7).prop_flat_map(
        |(n_classes, n_leaves, n_nodes, n_trees)| {
            let leaves = prop_vec(0..n_classes as ClassLabel, n_leaves);
            let nodes = prop_vec(
                (
                    0..N_FEATURES as u16,
                    -10.0f32..10.0,
                    any::<Index>(),
                    any::<Index>(),
                ),
                n_nodes,
            );
            let roots = prop_vec(any::<Index>(), n_trees);

            (leaves, nodes, roots).prop_map(move |(leaves, nodes, roots)| {
                let nodes = nodes
                    .into_iter()
                    .enumerate()
                    .map(|(id, (feature, threshold, left, right))| {
                        (
                            feature,
                            threshold,
                            pick_ref(&left, id, n_leaves),
                            pick_ref(&right, id, n_leaves),
                        )
                    })
                    .collect();
                let roots = roots
                    .iter()
                    .map(|root| pick_ref(root, n_nodes, n_leaves))
                    .collect();
                ForestRecipe {
                    n_classes,
                    leaves,
                    nodes,
                    roots,
                }
            })
        },
    )
}

pub fn arb_features() -> impl Strategy<Value = Vec<f32>> {
    prop_vec(-12.0f32..12.0, N_FEATURES)
}

/// Root splits feature 0 at 1.0; class 0 on the left, class 1 on the right.
pub fn two_level_forest() -> FloatForest {
    let mut forest = FloatForest::new(1, 1, 2).unwrap();
    forest.set_feature_class_counts(1, 2);
    let left = forest.add_leaf(0).unwrap();
    let right = forest.add_leaf(1).unwrap();
    let root = forest
        .add_node(NodeRef::Leaf(left), NodeRef::Leaf(right), 0, 1.0)
        .unwrap();
    forest.add_root(NodeRef::Node(root)).unwrap();
    forest
}
