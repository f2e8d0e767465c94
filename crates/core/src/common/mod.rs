//! Common utilities and types used throughout the MIPS machine simulator.
//!
//! This module provides fundamental building blocks that are shared across all
//! components of the simulator. It includes:
//! 1. **Constants:** System-wide constants for memory layout and register naming.
//! 2. **Memory Access:** Definitions for access widths and access sources.
//! 3. **Error Handling:** CPU trap representations with MIPS cause codes.
//! 4. **Change Events:** Typed notifications emitted while the machine runs.

/// Common constants used throughout the simulator.
pub mod constants;

/// Memory access width and source definitions.
pub mod data;

/// Trap definitions and cause codes.
pub mod error;

/// Change-notification events and the per-cycle event log.
pub mod events;

pub use data::{AccessSource, AccessWidth};
pub use error::Trap;
pub use events::{EventLog, MachineEvent, RegChange, RegKind, Stage};
