//! Single-cycle execution engine.
//!
//! Runs one full instruction per cycle by chaining the five stage functions
//! over fresh latches. The fetch phase is still modelled separately so that
//! bus errors during fetch are distinguishable from faults in execute.
//!
//! With the delay slot enabled, a taken branch defers the PC change by one
//! instruction: the instruction after the branch executes unconditionally
//! before the target is installed. With it disabled, the branch updates the
//! PC at the end of its own cycle.

use crate::common::events::{MachineEvent, Stage};
use crate::core::pipeline::stages::{
    decode_stage, execute_stage, fetch_stage, memory_stage, writeback_stage,
};
use crate::core::{CycleOutcome, Cpu, TrapEvent};
use crate::soc::bus::Bus;

/// Single-cycle core state.
#[derive(Default)]
pub struct SingleCycleCore {
    /// Branch target to install after the delay-slot instruction.
    pending_branch: Option<u32>,
}

impl SingleCycleCore {
    /// Creates the core with no branch in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears any branch in flight.
    pub fn reset(&mut self) {
        self.pending_branch = None;
    }

    /// Converts a latch trap into the machine-level trap event.
    fn take_trap(trap: crate::common::error::Trap, pc: u32, store: bool) -> TrapEvent {
        TrapEvent { trap, pc, store }
    }

    /// Executes one instruction (one cycle).
    ///
    /// # Arguments
    ///
    /// * `cpu` - The CPU state shared with the machine.
    /// * `bus` - The physical address space.
    ///
    /// # Returns
    ///
    /// The cycle outcome, or the trap raised by this instruction.
    pub fn step(&mut self, cpu: &mut Cpu, bus: &mut Bus) -> Result<CycleOutcome, TrapEvent> {
        let pc = cpu.regs.read_pc();

        if cpu.halt_address == Some(pc) {
            return Ok(CycleOutcome {
                halted: true,
                ..CycleOutcome::default()
            });
        }

        let if_id = fetch_stage(cpu, bus);
        cpu.events.push(MachineEvent::StageTrace {
            stage: Stage::If,
            pc,
            word: if_id.word,
        });
        if let Some(trap) = if_id.trap.clone() {
            return Err(Self::take_trap(trap, pc, false));
        }

        let id_ex = decode_stage(cpu, &if_id);
        if let Some(trap) = id_ex.trap.clone() {
            return Err(Self::take_trap(trap, pc, false));
        }

        let ex_mem = execute_stage(cpu, &id_ex);
        if let Some(trap) = ex_mem.trap.clone() {
            return Err(Self::take_trap(trap, pc, false));
        }

        let mem_wb = memory_stage(cpu, bus, &ex_mem);
        if let Some(trap) = mem_wb.trap.clone() {
            return Err(Self::take_trap(trap, pc, mem_wb.trap_store));
        }

        let wb = writeback_stage(cpu, &mem_wb);

        // End-of-cycle commit of the program counter. A pending branch from
        // the previous (delay-slot) cycle wins over sequential flow; the
        // instruction just executed may queue the next one.
        let mut next_pc = self
            .pending_branch
            .take()
            .unwrap_or_else(|| pc.wrapping_add(4));
        if let Some(target) = ex_mem.taken {
            if cpu.delay_slot {
                self.pending_branch = Some(target);
            } else {
                next_pc = target;
            }
        }
        cpu.set_pc(next_pc);

        cpu.stats.instructions += u64::from(wb.retired);
        Ok(CycleOutcome {
            halted: false,
            break_hit: wb.break_hit,
            syscall: wb.syscall,
            retired: wb.retired,
        })
    }
}
