//! Fixed-capacity append-only storage.

use crate::error::{Buffer, ForestError};

/// An arena with a capacity fixed at construction.
///
/// The backing allocation is reserved once by [`FixedVec::try_with_capacity`];
/// [`FixedVec::push`] never reallocates and fails instead of growing.
/// Elements are never removed or overwritten.
#[derive(Debug)]
pub struct FixedVec<T> {
    buffer: Buffer,
    items: Vec<T>,
    capacity: usize,
}

// Clones keep the full reservation.
impl<T: Clone> Clone for FixedVec<T> {
    fn clone(&self) -> Self {
        let mut items = Vec::with_capacity(self.capacity);
        items.extend_from_slice(&self.items);
        Self {
            buffer: self.buffer,
            items,
            capacity: self.capacity,
        }
    }
}

impl<T> FixedVec<T> {
    /// Reserve storage for exactly `capacity` elements.
    ///
    /// # Errors
    ///
    /// [`ForestError::Allocation`] if the reservation fails.
    pub fn try_with_capacity(buffer: Buffer, capacity: usize) -> Result<Self, ForestError> {
        let mut items = Vec::new();
        items
            .try_reserve_exact(capacity)
            .map_err(|_| ForestError::Allocation {
                buffer,
                requested: capacity,
            })?;
        Ok(Self {
            buffer,
            items,
            capacity,
        })
    }

    /// Append an element, returning its index.
    ///
    /// # Errors
    ///
    /// [`ForestError::CapacityExceeded`] when full; the arena is left unchanged.
    pub fn push(&mut self, value: T) -> Result<usize, ForestError> {
        if self.is_full() {
            return Err(ForestError::CapacityExceeded {
                buffer: self.buffer,
                capacity: self.capacity,
            });
        }
        let index = self.items.len();
        // len < capacity <= reserved, so this never reallocates
        self.items.push(value);
        Ok(index)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of elements this arena accepts.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Which forest buffer this arena backs.
    #[inline]
    pub fn buffer(&self) -> Buffer {
        self.buffer
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_until_full() {
        let mut arena = FixedVec::try_with_capacity(Buffer::Roots, 3).unwrap();
        assert_eq!(arena.push(10).unwrap(), 0);
        assert_eq!(arena.push(20).unwrap(), 1);
        assert_eq!(arena.push(30).unwrap(), 2);
        assert!(arena.is_full());

        let err = arena.push(40).unwrap_err();
        assert_eq!(
            err,
            ForestError::CapacityExceeded {
                buffer: Buffer::Roots,
                capacity: 3
            }
        );
        assert_eq!(arena.as_slice(), &[10, 20, 30]);
    }

    #[test]
    fn push_does_not_reallocate() {
        let mut arena = FixedVec::try_with_capacity(Buffer::Nodes, 16).unwrap();
        arena.push(0u64).unwrap();
        let ptr = arena.as_slice().as_ptr();
        for i in 1..16 {
            arena.push(i).unwrap();
        }
        assert_eq!(arena.as_slice().as_ptr(), ptr);
    }

    #[test]
    fn clone_keeps_reservation() {
        let mut arena = FixedVec::try_with_capacity(Buffer::Leaves, 8).unwrap();
        arena.push(1u8).unwrap();
        let mut copy = arena.clone();
        let ptr = copy.as_slice().as_ptr();
        for i in 2..=8 {
            copy.push(i).unwrap();
        }
        assert_eq!(copy.as_slice().as_ptr(), ptr);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn zero_capacity_rejects_everything() {
        let mut arena = FixedVec::<u8>::try_with_capacity(Buffer::Leaves, 0).unwrap();
        assert!(arena.is_full());
        assert!(arena.push(1).is_err());
        assert!(arena.is_empty());
    }

    #[test]
    fn impossible_reservation_is_an_allocation_error() {
        let err = FixedVec::<u64>::try_with_capacity(Buffer::Nodes, usize::MAX).unwrap_err();
        assert_eq!(
            err,
            ForestError::Allocation {
                buffer: Buffer::Nodes,
                requested: usize::MAX
            }
        );
    }
}
