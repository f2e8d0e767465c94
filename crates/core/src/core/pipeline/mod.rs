//! Five-stage pipelined execution engine.
//!
//! This module implements the classic IF/ID/EX/MEM/WB pipeline. Per cycle,
//! every stage computes from its input latch and writes its output latch,
//! so the evaluation order between stages is immaterial; the code runs them
//! back-to-front so that write-back commits before decode reads the
//! register file.
//!
//! Hazard handling follows the configured hazard unit:
//! - `None`: no interlock; dependent instructions read stale values.
//! - `Stall`: the consumer waits in decode until the producer left memory.
//! - `StallForward`: EX/MEM and MEM/WB results forward into EX; only
//!   load-use pairs cost a bubble.
//!
//! Branches resolve in EX under predict-not-taken. With the delay slot
//! enabled, the slot instruction (already in decode) proceeds and only the
//! IF/ID latch is flushed; without it, the decoded instruction is flushed
//! as well. A structural stall holds fetch for a cycle when memory is
//! single-ported (both caches disabled) and MEM is accessing it.

/// Data hazard detection and forwarding.
pub mod hazards;

/// Inter-stage latch records.
pub mod latches;

/// Control signal derivation.
pub mod signals;

/// The five stage implementations.
pub mod stages;

use crate::common::events::{MachineEvent, Stage};
use crate::config::HazardUnit;
use crate::core::pipeline::latches::{ExMem, IdEx, IfId, MemWb};
use crate::core::pipeline::stages::{
    decode_stage, execute_stage, fetch_stage, memory_stage, writeback_stage,
};
use crate::core::{CycleOutcome, Cpu, TrapEvent};
use crate::soc::bus::Bus;

/// Pipelined core: the four latches plus control-transfer bookkeeping.
#[derive(Default)]
pub struct PipelinedCore {
    if_id: IfId,
    id_ex: IdEx,
    ex_mem: ExMem,
    mem_wb: MemWb,
    /// Branch target waiting for a stalled delay-slot instruction to decode.
    pending_target: Option<u32>,
    /// Fetch reached the halt address; the pipeline is emptying.
    draining: bool,
}

impl PipelinedCore {
    /// Creates a pipeline full of bubbles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the pipeline and clears control-transfer state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns whether every latch is a bubble.
    fn is_empty(&self) -> bool {
        !self.if_id.valid && !self.id_ex.valid && !self.ex_mem.valid && !self.mem_wb.valid
    }

    /// Emits stage-occupancy trace events in IF→ID→EX→MEM→WB order.
    fn trace_stages(&self, cpu: &mut Cpu, bus: &mut Bus, fetching: bool) {
        if fetching {
            let pc = cpu.regs.read_pc();
            let word = bus.probe_word(pc).unwrap_or(0);
            cpu.events
                .push(MachineEvent::StageTrace { stage: Stage::If, pc, word });
        }
        if self.if_id.valid {
            cpu.events.push(MachineEvent::StageTrace {
                stage: Stage::Id,
                pc: self.if_id.pc,
                word: self.if_id.word,
            });
        }
        if self.id_ex.valid {
            cpu.events.push(MachineEvent::StageTrace {
                stage: Stage::Ex,
                pc: self.id_ex.pc,
                word: self.id_ex.inst.word,
            });
        }
        if self.ex_mem.valid {
            cpu.events.push(MachineEvent::StageTrace {
                stage: Stage::Mem,
                pc: self.ex_mem.pc,
                word: self.ex_mem.inst.word,
            });
        }
        if self.mem_wb.valid {
            cpu.events.push(MachineEvent::StageTrace {
                stage: Stage::Wb,
                pc: self.mem_wb.pc,
                word: self.mem_wb.inst.word,
            });
        }
    }

    /// Advances the pipeline by one cycle.
    ///
    /// # Arguments
    ///
    /// * `cpu` - The CPU state shared with the machine.
    /// * `bus` - The physical address space.
    ///
    /// # Returns
    ///
    /// The cycle outcome, or the trap taken at write-back this cycle.
    pub fn step(&mut self, cpu: &mut Cpu, bus: &mut Bus) -> Result<CycleOutcome, TrapEvent> {
        let pc = cpu.regs.read_pc();

        if !self.draining && cpu.halt_address == Some(pc) {
            self.draining = true;
        }

        let stall = match cpu.hazard_unit {
            HazardUnit::None => false,
            HazardUnit::Stall => hazards::raw_stall(&self.id_ex, &self.ex_mem, &self.if_id),
            HazardUnit::StallForward => hazards::load_use_stall(&self.id_ex, &self.if_id),
        };

        let redirecting = self.pending_target.is_some() && !stall;
        let structural = !stall
            && !redirecting
            && !self.draining
            && !cpu.icache.enabled()
            && !cpu.dcache.enabled()
            && self.ex_mem.valid
            && (self.ex_mem.ctrl.mem_read || self.ex_mem.ctrl.mem_write);

        let fetching = !stall && !structural && !self.draining && !redirecting;

        self.trace_stages(cpu, bus, fetching);

        // Write-back commits first so decode reads fresh register state.
        let wb = writeback_stage(cpu, &self.mem_wb);
        if let Some(trap) = wb.trap {
            return Err(trap);
        }

        let new_mem_wb = memory_stage(cpu, bus, &self.ex_mem);

        let mut ex_input = self.id_ex.clone();
        if cpu.hazard_unit == HazardUnit::StallForward {
            hazards::forward_operands(&mut ex_input, &self.ex_mem, &self.mem_wb);
        }
        let new_ex_mem = execute_stage(cpu, &ex_input);

        let mut new_id_ex = if stall {
            IdEx::bubble()
        } else {
            decode_stage(cpu, &self.if_id)
        };

        let mut next_pc = pc;
        let mut new_if_id = if fetching {
            next_pc = pc.wrapping_add(4);
            fetch_stage(cpu, bus)
        } else if stall {
            self.if_id.clone()
        } else {
            IfId::bubble()
        };

        if redirecting {
            next_pc = self.pending_target.take().unwrap_or(next_pc);
            // The frozen sequential PC may have matched the halt address on
            // the wrong path; the redirect re-arms detection at the target.
            self.draining = false;
            // The fetch slot spent applying a deferred branch target is a
            // control bubble, same as the flush on an undeferred redirect.
            cpu.stats.stalls_control += 1;
        }

        if let Some(target) = new_ex_mem.taken {
            self.draining = false;
            if cpu.delay_slot {
                if stall {
                    // The delay slot is still held in IF/ID; redirect once
                    // it has been consumed by decode.
                    self.pending_target = Some(target);
                } else {
                    next_pc = target;
                    new_if_id = IfId::bubble();
                    cpu.stats.stalls_control += 1;
                }
            } else {
                next_pc = target;
                new_if_id = IfId::bubble();
                new_id_ex = IdEx::bubble();
                self.pending_target = None;
                cpu.stats.stalls_control += 2;
            }
        }

        if stall {
            cpu.stats.stalls_data += 1;
        }
        if structural {
            cpu.stats.stalls_structural += 1;
        }

        self.mem_wb = new_mem_wb;
        self.ex_mem = new_ex_mem;
        self.id_ex = new_id_ex;
        self.if_id = new_if_id;

        if next_pc != pc {
            cpu.set_pc(next_pc);
        }

        let mut outcome = CycleOutcome {
            halted: false,
            break_hit: wb.break_hit,
            syscall: wb.syscall,
            retired: wb.retired,
        };
        if self.draining && self.is_empty() {
            outcome.halted = true;
        }
        cpu.stats.instructions += u64::from(wb.retired);
        Ok(outcome)
    }
}
