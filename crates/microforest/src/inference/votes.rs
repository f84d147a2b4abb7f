//! Plurality vote tally.

use crate::repr::ClassLabel;

/// Number of distinct labels a [`ClassLabel`] can hold.
pub const MAX_CLASSES: usize = ClassLabel::MAX as usize + 1;

/// Per-class vote counts for one prediction.
///
/// Lives on the stack with one slot per possible label, so counting votes
/// never allocates.
#[derive(Debug, Clone)]
pub struct VoteTally {
    counts: [u32; MAX_CLASSES],
    total: u32,
    /// Highest class seen so far, bounds the winner scan.
    max_class: usize,
}

impl Default for VoteTally {
    fn default() -> Self {
        Self::new()
    }
}

impl VoteTally {
    #[inline]
    pub fn new() -> Self {
        Self {
            counts: [0; MAX_CLASSES],
            total: 0,
            max_class: 0,
        }
    }

    #[inline]
    pub fn record(&mut self, class: ClassLabel) {
        let idx = class as usize;
        self.counts[idx] += 1;
        self.total += 1;
        self.max_class = self.max_class.max(idx);
    }

    #[inline]
    pub fn count(&self, class: ClassLabel) -> u32 {
        self.counts[class as usize]
    }

    #[inline]
    pub fn total(&self) -> u32 {
        self.total
    }

    /// Class with the most votes; ties go to the lowest class id.
    ///
    /// `None` if no votes were recorded.
    pub fn winner(&self) -> Option<ClassLabel> {
        if self.total == 0 {
            return None;
        }
        let mut best = 0usize;
        for class in 1..=self.max_class {
            if self.counts[class] > self.counts[best] {
                best = class;
            }
        }
        // best <= max_class < MAX_CLASSES
        Some(best as ClassLabel)
    }

    /// Write each class's share of the votes into `out`, indexed by class.
    ///
    /// Classes beyond `out.len()` are ignored, and slots past the last
    /// possible label are zeroed. With no votes, `out` is all zeros.
    pub fn fractions_into(&self, out: &mut [f32]) {
        out.fill(0.0);
        if self.total == 0 {
            return;
        }
        let total = self.total as f32;
        for (slot, &count) in out.iter_mut().zip(self.counts.iter()) {
            *slot = count as f32 / total;
        }
    }
}
