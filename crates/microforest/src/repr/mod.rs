//! Canonical forest representation.
//!
//! - [`storage`]: fixed-capacity append-only arena ([`FixedVec`])
//! - [`node`]: split nodes and tagged child references
//! - [`value`]: threshold representations (`f32`, `i16`)
//! - [`forest`]: the forest itself and its builder operations
//! - [`validate`]: opt-in structural validation

/// Index of a node in the forest's shared node arena.
pub type NodeId = u32;

/// Index into the leaf-label array, or an inline class id.
pub type LeafId = u32;

/// Index of an input feature.
///
/// Unsigned: a leaf is never stored as a node with a sentinel feature, it is
/// a [`NodeRef::Leaf`] reference instead.
pub type FeatureIndex = u16;

/// Predicted class label.
pub type ClassLabel = u8;

pub mod forest;
pub mod node;
pub mod storage;
pub mod validate;
pub mod value;

pub use forest::{FloatForest, Forest, ForestMeta, QuantizedForest};
pub use node::{Node, NodeRef};
pub use storage::FixedVec;
pub use validate::ValidationError;
pub use value::{LeafMode, SplitValue, ValueKind};
