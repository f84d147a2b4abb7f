//! Prediction over a populated forest.
//!
//! # Module Structure
//!
//! - [`traversal`]: walking one tree from its root to a leaf
//! - [`votes`]: fixed-size plurality vote tally
//! - [`predictor`]: ensemble prediction ([`Predictor`])
//! - [`input`]: untyped feature buffers ([`FeatureBuffer`])
//!
//! # Quick Start
//!
//! ```ignore
//! use microforest::{Forest, Predictor};
//!
//! let forest: Forest = /* ... */;
//! let predictor = Predictor::strict(&forest)?;
//! let class = predictor.predict(&features)?;
//! ```

pub mod input;
pub mod predictor;
pub mod traversal;
pub mod votes;

pub use input::FeatureBuffer;
pub use predictor::Predictor;
pub use traversal::traverse_tree;
pub use votes::{VoteTally, MAX_CLASSES};
