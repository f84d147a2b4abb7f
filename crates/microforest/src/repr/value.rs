//! Threshold and feature value representations.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::inference::FeatureBuffer;

/// How a [`NodeRef::Leaf`](super::NodeRef::Leaf) payload resolves to a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeafMode {
    /// The payload indexes the forest's leaf-label array.
    Indexed,
    /// The payload is the class label; the forest has no leaf array.
    Inline,
}

/// Element type of thresholds and feature vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    F32,
    I16,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::F32 => f.write_str("float32"),
            ValueKind::I16 => f.write_str("int16"),
        }
    }
}

/// A value type usable as a split threshold.
///
/// Features passed to prediction must use the same type the forest was
/// built with. Implemented for `f32` (indexed leaves) and `i16` (quantized,
/// inline leaves).
pub trait SplitValue:
    Copy + PartialOrd + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    const KIND: ValueKind;
    const LEAF_MODE: LeafMode;

    /// Borrow the typed slice out of an untyped buffer, if the kinds match.
    fn from_buffer(buffer: FeatureBuffer<'_>) -> Option<&[Self]>;

    /// Parse a threshold as written in a model file.
    fn parse_threshold(s: &str) -> Option<Self>;
}

impl SplitValue for f32 {
    const KIND: ValueKind = ValueKind::F32;
    const LEAF_MODE: LeafMode = LeafMode::Indexed;

    #[inline]
    fn from_buffer(buffer: FeatureBuffer<'_>) -> Option<&[Self]> {
        match buffer {
            FeatureBuffer::F32(values) => Some(values),
            FeatureBuffer::I16(_) => None,
        }
    }

    fn parse_threshold(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl SplitValue for i16 {
    const KIND: ValueKind = ValueKind::I16;
    const LEAF_MODE: LeafMode = LeafMode::Inline;

    #[inline]
    fn from_buffer(buffer: FeatureBuffer<'_>) -> Option<&[Self]> {
        match buffer {
            FeatureBuffer::I16(values) => Some(values),
            FeatureBuffer::F32(_) => None,
        }
    }

    fn parse_threshold(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_thresholds() {
        assert_eq!(f32::parse_threshold("1.5"), Some(1.5));
        assert_eq!(f32::parse_threshold("-3"), Some(-3.0));
        assert_eq!(f32::parse_threshold("abc"), None);

        assert_eq!(i16::parse_threshold("-120"), Some(-120));
        assert_eq!(i16::parse_threshold("1.5"), None);
        assert_eq!(i16::parse_threshold("40000"), None);
    }

    #[test]
    fn buffer_kinds() {
        let floats = [1.0f32, 2.0];
        let ints = [1i16, 2];
        assert_eq!(f32::from_buffer(FeatureBuffer::F32(&floats)), Some(&floats[..]));
        assert_eq!(f32::from_buffer(FeatureBuffer::I16(&ints)), None);
        assert_eq!(i16::from_buffer(FeatureBuffer::I16(&ints)), Some(&ints[..]));
        assert_eq!(i16::from_buffer(FeatureBuffer::F32(&floats)), None);
    }
}
