//! Pipeline stage implementations.
//!
//! Each stage is a free function that reads one input latch and produces
//! the next latch. The same functions drive both the pipelined engine
//! (one stage per latch per cycle) and the single-cycle engine (all five
//! in sequence within one cycle).

/// Instruction fetch.
pub mod fetch;

/// Instruction decode and register read.
pub mod decode;

/// Execute (ALU, branches, multiplier, CP0 moves).
pub mod execute;

/// Data memory access.
pub mod memory;

/// Write-back and commit.
pub mod writeback;

pub use decode::decode_stage;
pub use execute::execute_stage;
pub use fetch::fetch_stage;
pub use memory::memory_stage;
pub use writeback::{writeback_stage, WbOutcome};
