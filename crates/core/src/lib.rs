//! MIPS-I subset machine simulator library.
//!
//! This crate implements an educational 32-bit MIPS machine simulator with the following:
//! 1. **Core:** A single-cycle core and a classic five-stage pipeline (IF/ID/EX/MEM/WB)
//!    with hazard detection, forwarding, and configurable branch-delay-slot semantics.
//! 2. **Memory:** A physical address space of paged RAM and memory-mapped peripherals,
//!    fronted by configurable split L1 caches with multiple replacement and write policies.
//! 3. **ISA:** Decoding, encoding, and disassembly of the MIPS-I integer subset,
//!    including multiply/divide, Coprocessor 0 moves, SYSCALL, and BREAK.
//! 4. **Assembler:** A single-pass assembler with fix-ups, an expression evaluator,
//!    directives, includes, and pseudo-instruction expansion.
//! 5. **Simulation:** A machine facade with a logical clock, change-notification
//!    observers, breakpoints, cancellation, and statistics collection.

/// Common types and constants (access kinds, traps, change events).
pub mod common;
/// Simulator configuration (defaults, enums, hierarchical config structures).
pub mod config;
/// CPU core (architectural state, ALU, caches, single-cycle and pipelined engines).
pub mod core;
/// Instruction set (decode, encode, instruction record, disassembly).
pub mod isa;
/// Integrated assembler (expressions, directives, fix-ups, includes).
pub mod asm;
/// Machine facade, symbol table, range loader, and OS call emulation.
pub mod sim;
/// Physical address space (bus, paged RAM, memory-mapped peripherals).
pub mod soc;
/// Machine-level statistics collection.
pub mod stats;

/// Root configuration type; use `MachineConfig::default()` or deserialize from JSON.
pub use crate::config::MachineConfig;
/// Top-level machine facade; owns the bus, core, symbol table, and observers.
pub use crate::sim::Machine;
/// Physical address space; routes reads and writes to RAM and peripherals.
pub use crate::soc::Bus;
