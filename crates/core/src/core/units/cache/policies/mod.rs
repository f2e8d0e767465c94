//! Cache replacement policies.
//!
//! Implements the victim-selection algorithms for the set-associative cache.
//!
//! # Policies
//!
//! - `Lru`: Least Recently Used.
//! - `Lfu`: Least Frequently Used (counters reset when a line is filled).
//! - `Rand`: Pseudo-random selection.
//!
//! Ties between ways with equal metadata are broken toward the lowest way
//! index. Invalid ways are preferred by the cache itself before the policy
//! is consulted.

/// Least Recently Used replacement policy.
pub mod lru;

/// Least Frequently Used replacement policy.
pub mod lfu;

/// Pseudo-random replacement policy.
pub mod rand;

pub use lfu::LfuPolicy;
pub use lru::LruPolicy;
pub use rand::RandPolicy;

/// Trait for cache replacement policies.
///
/// Defines the interface for updating usage metadata and selecting victim
/// lines within one cache set.
pub trait ReplacementPolicy {
    /// Updates the policy state when a line is accessed (hit or post-fill).
    ///
    /// # Arguments
    ///
    /// * `set` - The cache set index.
    /// * `way` - The way index within the set that was accessed.
    fn touch(&mut self, set: usize, way: usize);

    /// Resets per-line metadata when a new line is installed in a way.
    ///
    /// # Arguments
    ///
    /// * `set` - The cache set index.
    /// * `way` - The way index the fill went to.
    fn fill(&mut self, set: usize, way: usize);

    /// Selects a victim way to evict from a set with no invalid ways.
    ///
    /// # Arguments
    ///
    /// * `set` - The cache set index.
    ///
    /// # Returns
    ///
    /// The index of the way to evict.
    fn victim(&mut self, set: usize) -> usize;
}
