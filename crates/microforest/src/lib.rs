//! microforest: a fixed-capacity decision forest classifier.
//!
//! Trees are trained elsewhere and loaded by replaying a sequence of
//! `add_node` / `add_root` / `add_leaf` calls against storage that is sized
//! once, up front. Prediction walks every tree and takes a plurality vote
//! without allocating.
//!
//! # Key Types
//!
//! - [`Forest`] - Node/root/leaf storage plus the append-only builder API
//! - [`Predictor`] - Read-only prediction over a borrowed forest
//! - [`ForestConfig`] - Validated capacity configuration
//! - [`NodeRef`] - Tagged child/root reference (internal node or leaf)
//!
//! # Variants
//!
//! - [`FloatForest`]: `f32` thresholds, leaves stored in a separate label array
//! - [`QuantizedForest`]: `i16` thresholds, leaf references carry the class directly
//!
//! # Example
//!
//! ```
//! use microforest::{FloatForest, NodeRef};
//!
//! let mut forest = FloatForest::new(1, 1, 2).unwrap();
//! forest.set_feature_class_counts(1, 2);
//! let low = forest.add_leaf(0).unwrap();
//! let high = forest.add_leaf(1).unwrap();
//! let root = forest
//!     .add_node(NodeRef::Leaf(low), NodeRef::Leaf(high), 0, 1.0)
//!     .unwrap();
//! forest.add_root(NodeRef::Node(root)).unwrap();
//!
//! assert_eq!(forest.predict(&[0.5]).unwrap(), 0);
//! assert_eq!(forest.predict(&[1.0]).unwrap(), 1);
//! ```
//!
//! # Loading Models
//!
//! Use [`io::csv::load_model`] to replay a CSV model export.

pub mod config;
pub mod error;
pub mod inference;
pub mod io;
pub mod repr;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use config::{ConfigError, ForestConfig};
pub use error::{Buffer, ForestError, InputError, TraversalFault};
pub use inference::{FeatureBuffer, Predictor, VoteTally};
pub use repr::{
    ClassLabel, FeatureIndex, FloatForest, Forest, ForestMeta, LeafId, LeafMode, Node, NodeId,
    NodeRef, QuantizedForest, SplitValue, ValidationError, ValueKind,
};
