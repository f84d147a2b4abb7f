//! Untyped feature input.

use crate::repr::ValueKind;

/// A feature vector whose element type is only known at runtime.
///
/// Front ends that receive raw numeric buffers wrap them here; the
/// predictor checks the element type against the forest before walking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureBuffer<'a> {
    F32(&'a [f32]),
    I16(&'a [i16]),
}

impl FeatureBuffer<'_> {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            FeatureBuffer::F32(_) => ValueKind::F32,
            FeatureBuffer::I16(_) => ValueKind::I16,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        match self {
            FeatureBuffer::F32(values) => values.len(),
            FeatureBuffer::I16(values) => values.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> From<&'a [f32]> for FeatureBuffer<'a> {
    fn from(values: &'a [f32]) -> Self {
        FeatureBuffer::F32(values)
    }
}

impl<'a> From<&'a [i16]> for FeatureBuffer<'a> {
    fn from(values: &'a [i16]) -> Self {
        FeatureBuffer::I16(values)
    }
}
