//! Forest capacity configuration with builder pattern.
//!
//! # Example
//!
//! ```
//! use microforest::{FloatForest, ForestConfig};
//!
//! let config = ForestConfig::builder()
//!     .max_trees(10)
//!     .max_nodes(1_000)
//!     .max_leaves(1_010)
//!     .strict(true)
//!     .build()
//!     .unwrap();
//!
//! let forest = FloatForest::from_config(&config).unwrap();
//! assert_eq!(forest.max_nodes(), 1_000);
//! ```

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::repr::forest::MAX_INDEX_CAPACITY;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A forest needs room for at least one tree.
    #[error("max_trees must be at least 1")]
    InvalidMaxTrees,
    /// Node and leaf ids must fit the signed reference encoding.
    #[error("{field} must be at most {max}, got {value}")]
    CapacityTooLarge {
        field: &'static str,
        value: usize,
        max: usize,
    },
}

// =============================================================================
// ForestConfig
// =============================================================================

/// Capacities for a forest's three buffers, plus prediction strictness.
///
/// Usually deserialized next to a model file, or built in code through
/// [`ForestConfig::builder`]. The builder validates; configs obtained
/// through serde should be checked with [`ForestConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(derive(Clone, Debug), finish_fn(vis = "", name = __build_internal))]
pub struct ForestConfig {
    /// Maximum number of trees (roots).
    pub max_trees: usize,

    /// Maximum number of split nodes across all trees.
    pub max_nodes: usize,

    /// Maximum number of leaf labels. Ignored by quantized forests. Default: 0.
    #[builder(default)]
    #[serde(default)]
    pub max_leaves: usize,

    /// Validate the forest once before predicting. Default: false.
    #[builder(default)]
    #[serde(default)]
    pub strict: bool,
}

/// Custom finishing function that validates the config.
impl<S: forest_config_builder::IsComplete> ForestConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `max_trees == 0` or a node or leaf
    /// capacity exceeds `i32::MAX`.
    pub fn build(self) -> Result<ForestConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl ForestConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_trees == 0 {
            return Err(ConfigError::InvalidMaxTrees);
        }

        for (field, value) in [("max_nodes", self.max_nodes), ("max_leaves", self.max_leaves)] {
            if value > MAX_INDEX_CAPACITY {
                return Err(ConfigError::CapacityTooLarge {
                    field,
                    value,
                    max: MAX_INDEX_CAPACITY,
                });
            }
        }

        Ok(())
    }
}
