//! Instruction fetch (IF) stage.
//!
//! Fetches the machine word at the current program counter through the
//! instruction cache. Fetch-time errors (misaligned PC, bus errors) are
//! recorded in the latch rather than raised immediately, so the fault is
//! attributable to this instruction when it reaches write-back and is
//! distinguishable from faults raised later in execute.

use crate::common::data::AccessSource;
use crate::common::data::AccessWidth;
use crate::common::error::Trap;
use crate::core::pipeline::latches::IfId;
use crate::core::Cpu;
use crate::soc::bus::Bus;

/// Executes the instruction fetch stage.
///
/// # Arguments
///
/// * `cpu` - The CPU state (provides the PC and the instruction cache).
/// * `bus` - The physical address space.
///
/// # Returns
///
/// The IF/ID latch for the fetched instruction; on a fetch fault the latch
/// carries the trap and a zero word.
pub fn fetch_stage(cpu: &mut Cpu, bus: &mut Bus) -> IfId {
    let pc = cpu.regs.read_pc();

    if pc & 3 != 0 {
        return IfId {
            valid: true,
            pc,
            word: 0,
            trap: Some(Trap::UnalignedJump(pc)),
        };
    }

    match cpu
        .icache
        .read(bus, pc, AccessWidth::Word, AccessSource::Cpu)
    {
        Ok(word) => IfId {
            valid: true,
            pc,
            word,
            trap: None,
        },
        Err(trap) => IfId {
            valid: true,
            pc,
            word: 0,
            trap: Some(trap),
        },
    }
}
