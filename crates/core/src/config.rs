//! Configuration system for the MIPS simulator.
//!
//! This module defines all configuration structures and enums used to parameterize
//! the machine. It provides:
//! 1. **Defaults:** Baseline hardware constants (section bases, memory timing, cache shape).
//! 2. **Structures:** Hierarchical config for the core, the caches, and memory timing.
//! 3. **Enums:** Hazard unit, cache replacement policy, and cache write policy.
//!
//! Configuration is assembled by the CLI from command-line flags or deserialized
//! from JSON; use `MachineConfig::default()` for the stock machine.

use serde::Deserialize;

/// Default configuration constants for the simulator.
///
/// These values define the baseline hardware configuration when not
/// explicitly overridden by the host.
mod defaults {
    /// Base address of the program (`.text`) section.
    ///
    /// The assembler places code here and the machine starts fetching here
    /// unless a `_start` symbol overrides the entry point.
    pub const TEXT_BASE: u32 = 0x8002_0000;

    /// Base address of the `.data` section cursor in the assembler.
    pub const DATA_BASE: u32 = 0x8100_0000;

    /// Memory read access time in cycles.
    pub const READ_TIME: u32 = 10;

    /// Memory write access time in cycles.
    pub const WRITE_TIME: u32 = 10;

    /// Additional per-word time for the second and later words of a burst.
    pub const BURST_TIME: u32 = 0;

    /// Default number of cache sets.
    pub const CACHE_SETS: u32 = 1;

    /// Default number of words per cache block.
    pub const CACHE_BLOCK_WORDS: u32 = 1;

    /// Default cache associativity (1 way = direct-mapped).
    pub const CACHE_WAYS: u32 = 1;
}

/// Hazard resolution strategy for the pipelined core.
///
/// Selects how the pipeline reacts to read-after-write dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HazardUnit {
    /// No interlock at all; dependent instructions read stale registers.
    ///
    /// Useful for demonstrating why hazard handling exists.
    None,
    /// Stall until the producing instruction has written back.
    Stall,
    /// Forward EX/MEM and MEM/WB results into EX; stall only on load-use.
    #[default]
    #[serde(alias = "forward")]
    StallForward,
}

/// Cache replacement policy algorithms.
///
/// Specifies the algorithm used to select which cache line to evict
/// when a new line must be installed in a full cache set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    /// Pseudo-random replacement (xorshift generator).
    #[serde(alias = "Rand", alias = "Random")]
    Rand,
    /// Least Recently Used replacement.
    #[default]
    #[serde(alias = "Lru")]
    Lru,
    /// Least Frequently Used replacement; access counts reset on fill.
    #[serde(alias = "Lfu")]
    Lfu,
}

/// Cache write policy.
///
/// Determines when stores reach backing memory and whether a store miss
/// allocates a cache line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WritePolicy {
    /// Write-back with write-allocate; dirty blocks are written on eviction.
    #[default]
    #[serde(alias = "wb")]
    WriteBack,
    /// Write-through without allocation; store misses go straight to memory.
    #[serde(alias = "wt", alias = "wtna")]
    WriteThroughNoAlloc,
    /// Write-through with allocation; store misses fill the line first.
    #[serde(alias = "wta")]
    WriteThroughAlloc,
}

/// Configuration of one L1 cache (instruction or data side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether this cache is present at all.
    pub enabled: bool,
    /// Number of sets.
    pub sets: u32,
    /// Words per block.
    pub block_words: u32,
    /// Associativity (ways per set).
    pub ways: u32,
    /// Victim selection policy.
    pub policy: ReplacementPolicy,
    /// Store handling policy.
    pub write_policy: WritePolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            sets: defaults::CACHE_SETS,
            block_words: defaults::CACHE_BLOCK_WORDS,
            ways: defaults::CACHE_WAYS,
            policy: ReplacementPolicy::default(),
            write_policy: WritePolicy::default(),
        }
    }
}

impl CacheConfig {
    /// Returns a sanity-checked copy; zero-sized dimensions are raised to 1.
    pub fn sanitized(&self) -> Self {
        Self {
            sets: self.sets.max(1),
            block_words: self.block_words.max(1),
            ways: self.ways.max(1),
            ..*self
        }
    }
}

/// Main memory access timing in cycles.
///
/// A burst transfer of `W` words costs `access_time + (W - 1) * burst_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemoryTiming {
    /// Cycles for a memory read access.
    pub read_time: u32,
    /// Cycles for a memory write access.
    pub write_time: u32,
    /// Cycles for each additional word of a burst.
    pub burst_time: u32,
}

impl Default for MemoryTiming {
    fn default() -> Self {
        Self {
            read_time: defaults::READ_TIME,
            write_time: defaults::WRITE_TIME,
            burst_time: defaults::BURST_TIME,
        }
    }
}

/// Root machine configuration.
///
/// Collects everything needed to construct a `Machine`: core selection,
/// delay-slot and hazard behaviour, both cache configurations, and memory
/// timing. Changing the configuration requires constructing a new machine
/// (delay-slot semantics are not a mode switch mid-execution).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Use the five-stage pipelined core instead of the single-cycle core.
    pub pipelined: bool,
    /// Execute the instruction after a branch unconditionally (MIPS classic).
    pub delay_slot: bool,
    /// Hazard resolution strategy (pipelined core only).
    pub hazard_unit: HazardUnit,
    /// Instruction-side L1 cache.
    pub icache: CacheConfig,
    /// Data-side L1 cache.
    pub dcache: CacheConfig,
    /// Main memory timing.
    pub memory: MemoryTiming,
    /// Reset the machine before assembling a new source file.
    pub reset_at_assembly: bool,
    /// Emulate operating-system services for SYSCALL.
    pub osemu_enable: bool,
    /// Base address for code and default entry point.
    pub text_base: u32,
    /// Default `.data` cursor for the assembler.
    pub data_base: u32,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            pipelined: false,
            delay_slot: true,
            hazard_unit: HazardUnit::default(),
            icache: CacheConfig::default(),
            dcache: CacheConfig::default(),
            memory: MemoryTiming::default(),
            reset_at_assembly: false,
            osemu_enable: true,
            text_base: defaults::TEXT_BASE,
            data_base: defaults::DATA_BASE,
        }
    }
}
