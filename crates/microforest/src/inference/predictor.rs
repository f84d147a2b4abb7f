//! Ensemble predictor.
//!
//! [`Predictor`] borrows a forest immutably and classifies feature vectors by
//! walking every tree and taking a plurality vote. Holding the borrow is what
//! marks the forest as ready: no `add_*` call can happen while a predictor
//! is alive.
//!
//! # Usage
//!
//! ```ignore
//! use microforest::inference::Predictor;
//!
//! // Unchecked: faults surface per call as `ForestError::Traversal`
//! let predictor = Predictor::new(&forest);
//!
//! // Strict: validate every reference once, up front
//! let predictor = Predictor::strict(&forest)?;
//!
//! let class = predictor.predict(&features)?;
//! ```
//!
//! # Tie-breaking
//!
//! When several classes share the highest vote count, the lowest class id
//! wins.

use ndarray::{ArrayView2, Axis};

use crate::error::{ForestError, InputError};
use crate::repr::{ClassLabel, Forest, SplitValue};

use super::traversal::traverse_tree;
use super::{FeatureBuffer, VoteTally};

/// Plurality-vote predictor over a borrowed forest.
#[derive(Debug, Clone, Copy)]
pub struct Predictor<'f, T: SplitValue> {
    forest: &'f Forest<T>,
}

impl<'f, T: SplitValue> Predictor<'f, T> {
    /// Create a predictor without validating the forest.
    #[inline]
    pub fn new(forest: &'f Forest<T>) -> Self {
        Self { forest }
    }

    /// Create a predictor after checking every reference in the forest.
    ///
    /// # Errors
    ///
    /// [`ForestError::Validation`] if [`Forest::validate`] fails.
    pub fn strict(forest: &'f Forest<T>) -> Result<Self, ForestError> {
        if let Err(err) = forest.validate() {
            tracing::warn!(error = %err, "forest failed strict validation");
            return Err(err.into());
        }
        Ok(Self::new(forest))
    }

    /// Get a reference to the underlying forest.
    #[inline]
    pub fn forest(&self) -> &'f Forest<T> {
        self.forest
    }

    /// Walk every tree and count votes.
    ///
    /// # Errors
    ///
    /// [`ForestError::EmptyForest`] if there are no trees, or
    /// [`ForestError::Traversal`] for the first tree that faults.
    pub fn tally(&self, features: &[T]) -> Result<VoteTally, ForestError> {
        if self.forest.n_trees() == 0 {
            return Err(ForestError::EmptyForest);
        }

        let mut tally = VoteTally::new();
        for (tree, &root) in self.forest.roots().iter().enumerate() {
            let class = traverse_tree(self.forest, root, features)
                .map_err(|fault| ForestError::Traversal { tree, fault })?;
            tally.record(class);
        }
        Ok(tally)
    }

    /// Predict the class for one feature vector.
    ///
    /// `features` should have the forest's `n_features` entries; only the
    /// entries referenced along each walk are actually read.
    pub fn predict(&self, features: &[T]) -> Result<ClassLabel, ForestError> {
        self.tally(features)?
            .winner()
            .ok_or(ForestError::EmptyForest)
    }

    /// Predict from an untyped buffer.
    ///
    /// # Errors
    ///
    /// [`InputError::ValueKindMismatch`] if the buffer's element type differs
    /// from the forest's threshold type. Checked before any tree is walked.
    pub fn predict_buffer(&self, features: FeatureBuffer<'_>) -> Result<ClassLabel, ForestError> {
        let typed = T::from_buffer(features).ok_or(InputError::ValueKindMismatch {
            expected: T::KIND,
            actual: features.kind(),
        })?;
        self.predict(typed)
    }

    /// Write the fraction of trees voting for each class into `out`.
    ///
    /// `out` must have exactly `n_classes` entries.
    pub fn predict_proba_into(&self, features: &[T], out: &mut [f32]) -> Result<(), ForestError> {
        let n_classes = self.forest.n_classes();
        if n_classes == 0 {
            return Err(InputError::ClassCountUnset.into());
        }
        if out.len() != n_classes {
            return Err(InputError::OutputLenMismatch {
                expected: n_classes,
                actual: out.len(),
            }
            .into());
        }

        self.tally(features)?.fractions_into(out);
        Ok(())
    }

    /// Convenience method: vote fractions with allocation.
    pub fn predict_proba(&self, features: &[T]) -> Result<Vec<f32>, ForestError> {
        let mut out = vec![0.0; self.forest.n_classes()];
        self.predict_proba_into(features, &mut out)?;
        Ok(out)
    }

    /// Predict one class per row of a `[n_samples, n_features]` matrix.
    ///
    /// Rows must be contiguous (standard layout). Stops at the first
    /// failing row; earlier entries of `out` are already written.
    pub fn predict_rows_into(
        &self,
        features: ArrayView2<'_, T>,
        out: &mut [ClassLabel],
    ) -> Result<(), ForestError> {
        if out.len() != features.nrows() {
            return Err(InputError::OutputLenMismatch {
                expected: features.nrows(),
                actual: out.len(),
            }
            .into());
        }

        for (row, slot) in features.axis_iter(Axis(0)).zip(out.iter_mut()) {
            let row = row.to_slice().ok_or(InputError::NonContiguousRows)?;
            *slot = self.predict(row)?;
        }
        Ok(())
    }

    /// Convenience method: predict rows with allocation.
    pub fn predict_rows(
        &self,
        features: ArrayView2<'_, T>,
    ) -> Result<Vec<ClassLabel>, ForestError> {
        let mut out = vec![0; features.nrows()];
        self.predict_rows_into(features, &mut out)?;
        Ok(out)
    }
}
