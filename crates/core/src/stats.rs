//! Machine-level statistics collection.
//!
//! Tracks the logical clock and the pipeline stall breakdown. Cache
//! hit/miss/traffic counters live with each cache; this structure carries
//! everything that belongs to the machine as a whole. All counters are
//! monotonic and read-only to external observers.

/// Execution statistics for one machine run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MachineStats {
    /// Cycles executed since the last reset.
    pub cycles: u64,
    /// Instructions committed (bubbles excluded).
    pub instructions: u64,
    /// Bubbles inserted for data hazards (load-use or full RAW stalls).
    pub stalls_data: u64,
    /// Bubbles inserted for control hazards (taken branches and jumps).
    pub stalls_control: u64,
    /// Fetch cycles lost to the single-ported memory.
    pub stalls_structural: u64,
}

impl MachineStats {
    /// Cycles per committed instruction; 0.0 before the first commit.
    pub fn cpi(&self) -> f64 {
        if self.instructions == 0 {
            0.0
        } else {
            self.cycles as f64 / self.instructions as f64
        }
    }
}
