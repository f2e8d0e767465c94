//! Least Recently Used (LRU) replacement policy.
//!
//! Evicts the line that has not been accessed for the longest time. Each
//! set keeps a usage stack: an access moves the way to the top (most
//! recently used position) and the victim is taken from the bottom.

use super::ReplacementPolicy;

/// LRU policy state.
pub struct LruPolicy {
    /// One usage stack per set; index 0 is MRU, the last index is LRU.
    usage: Vec<Vec<usize>>,
}

impl LruPolicy {
    /// Creates an LRU policy for `sets` sets of `ways` ways.
    ///
    /// The initial stack order makes way 0 the first victim, matching the
    /// lowest-way tie-break for untouched sets.
    pub fn new(sets: usize, ways: usize) -> Self {
        let usage = (0..sets).map(|_| (0..ways).rev().collect()).collect();
        Self { usage }
    }
}

impl ReplacementPolicy for LruPolicy {
    /// Moves the accessed way to the MRU position.
    fn touch(&mut self, set: usize, way: usize) {
        let stack = &mut self.usage[set];
        if let Some(pos) = stack.iter().position(|&w| w == way) {
            stack.remove(pos);
        }
        stack.insert(0, way);
    }

    /// A fill counts as an access.
    fn fill(&mut self, set: usize, way: usize) {
        self.touch(set, way);
    }

    /// Returns the way at the LRU position.
    fn victim(&mut self, set: usize) -> usize {
        *self.usage[set].last().unwrap()
    }
}
