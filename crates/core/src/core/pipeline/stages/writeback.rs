//! Write-back (WB) stage.
//!
//! Commits the instruction: writes the destination register, takes any trap
//! that rode the latches, and captures SYSCALL/BREAK for the machine to
//! service between cycles. SYSCALLs are serviced at commit so every older
//! instruction has already retired and the argument registers are final.

use crate::core::pipeline::latches::MemWb;
use crate::core::pipeline::signals::dest_index;
use crate::core::{Cpu, SyscallRequest, TrapEvent};

/// Result of the write-back stage for one cycle.
#[derive(Clone, Debug, Default)]
pub struct WbOutcome {
    /// Trap to take; the machine latches CP0 state and stops.
    pub trap: Option<TrapEvent>,
    /// SYSCALL to service between cycles.
    pub syscall: Option<SyscallRequest>,
    /// A BREAK instruction committed.
    pub break_hit: bool,
    /// Number of instructions committed (0 for bubbles).
    pub retired: u32,
}

/// Executes the write-back stage.
///
/// # Arguments
///
/// * `cpu` - The CPU state; the destination register is written here.
/// * `mem_wb` - The MEM/WB latch to commit.
///
/// # Returns
///
/// The commit outcome: trap, syscall request, break, and retire count.
pub fn writeback_stage(cpu: &mut Cpu, mem_wb: &MemWb) -> WbOutcome {
    let mut out = WbOutcome::default();
    if !mem_wb.valid {
        return out;
    }

    if let Some(trap) = &mem_wb.trap {
        out.trap = Some(TrapEvent {
            trap: trap.clone(),
            pc: mem_wb.pc,
            store: mem_wb.trap_store,
        });
        return out;
    }

    if let Some(dest) = dest_index(&mem_wb.ctrl, &mem_wb.inst) {
        cpu.set_gp(dest, mem_wb.commit_value());
    }

    if mem_wb.ctrl.syscall {
        out.syscall = Some(SyscallRequest {
            service: cpu.gp(2),
            args: [cpu.gp(4), cpu.gp(5), cpu.gp(6), cpu.gp(7)],
        });
    }
    if mem_wb.ctrl.brk {
        out.break_hit = true;
    }

    out.retired = 1;
    out
}
