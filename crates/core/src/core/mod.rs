//! CPU core: architectural state and the two execution engines.
//!
//! This module contains:
//! 1. **Arch:** General-purpose registers, HI/LO, PC, and Coprocessor 0.
//! 2. **Units:** The ALU and the set-associative cache model.
//! 3. **Engines:** The single-cycle core and the five-stage pipeline.
//! 4. **Cpu:** The shared per-core state (registers, caches, events, stats)
//!    that the machine facade owns and the engines operate on.

/// Architectural register state.
pub mod arch;

/// Functional units (ALU, caches).
pub mod units;

/// Single-cycle execution engine.
pub mod single;

/// Five-stage pipelined execution engine.
pub mod pipeline;

use crate::common::error::Trap;
use crate::common::events::{EventLog, RegKind};
use crate::config::{HazardUnit, MachineConfig};
use crate::core::arch::Registers;
use crate::core::units::cache::Cache;
use crate::stats::MachineStats;

/// A trap together with the PC of the instruction that raised it.
///
/// The machine latches `pc` into `EPC` and the trap's cause code into
/// `Cause` before stopping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrapEvent {
    /// The trap kind.
    pub trap: Trap,
    /// Address of the faulting instruction.
    pub pc: u32,
    /// Whether the faulting access was a store (selects the cause code).
    pub store: bool,
}

/// A SYSCALL captured at commit for the machine to service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyscallRequest {
    /// Service selector from `$v0`.
    pub service: u32,
    /// Argument registers `$a0`-`$a3` at commit time.
    pub args: [u32; 4],
}

/// Result of advancing a core by one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    /// The core reached a halt condition (halt address or exit syscall).
    pub halted: bool,
    /// A BREAK instruction committed; the machine stops cleanly.
    pub break_hit: bool,
    /// A SYSCALL committed and needs servicing between cycles.
    pub syscall: Option<SyscallRequest>,
    /// Number of instructions that committed this cycle.
    pub retired: u32,
}

/// Shared per-core architectural and micro-architectural state.
///
/// Owned by the machine facade; the execution engines receive it together
/// with the bus each cycle. All register mutations go through the helpers
/// here so that every effective write emits exactly one change event.
pub struct Cpu {
    /// Architectural registers (GPR, HI/LO, PC, CP0).
    pub regs: Registers,
    /// Instruction-side L1 cache.
    pub icache: Cache,
    /// Data-side L1 cache.
    pub dcache: Cache,
    /// Event buffer drained by the machine between cycles.
    pub events: EventLog,
    /// Execute the instruction after a branch unconditionally.
    pub delay_slot: bool,
    /// Hazard strategy for the pipelined engine.
    pub hazard_unit: HazardUnit,
    /// Address whose fetch halts the machine (`_halt` symbol).
    pub halt_address: Option<u32>,
    /// Machine-level statistics.
    pub stats: MachineStats,
}

impl Cpu {
    /// Creates the CPU state for the given configuration.
    pub fn new(config: &MachineConfig) -> Self {
        let mut cpu = Self {
            regs: Registers::new(),
            icache: Cache::new(&config.icache, &config.memory),
            dcache: Cache::new(&config.dcache, &config.memory),
            events: EventLog::new(),
            delay_slot: config.delay_slot,
            hazard_unit: config.hazard_unit,
            halt_address: None,
            stats: MachineStats::default(),
        };
        cpu.regs.set_pc_silent(config.text_base);
        cpu
    }

    /// Reads a general-purpose register.
    #[inline]
    pub fn gp(&self, idx: usize) -> u32 {
        self.regs.read_gp(idx)
    }

    /// Writes a general-purpose register, emitting a change event.
    pub fn set_gp(&mut self, idx: usize, val: u32) {
        if let Some(change) = self.regs.write_gp(idx, val) {
            self.events
                .reg_change(RegKind::Gp, change.0, change.1, change.2);
        }
    }

    /// Writes the program counter, emitting a change event.
    pub fn set_pc(&mut self, val: u32) {
        if let Some(change) = self.regs.write_pc(val) {
            self.events.reg_change(RegKind::Pc, 0, change.0, change.1);
        }
    }

    /// Writes the HI register, emitting a change event.
    pub fn set_hi(&mut self, val: u32) {
        if let Some(change) = self.regs.write_hi(val) {
            self.events.reg_change(RegKind::Hi, 0, change.0, change.1);
        }
    }

    /// Writes the LO register, emitting a change event.
    pub fn set_lo(&mut self, val: u32) {
        if let Some(change) = self.regs.write_lo(val) {
            self.events.reg_change(RegKind::Lo, 0, change.0, change.1);
        }
    }

    /// Writes a Coprocessor 0 register, emitting a change event.
    pub fn set_cp0(&mut self, reg: usize, val: u32) {
        if let Some(change) = self.regs.write_cp0(reg, val) {
            self.events
                .reg_change(RegKind::Cp0, reg as u8, change.0, change.1);
        }
    }

    /// Latches trap state into Coprocessor 0.
    ///
    /// Sets `EPC` to the faulting PC, `Cause` to the trap's exception code,
    /// `BadVAddr` for address errors, and the `EXL` bit in `Status`.
    pub fn latch_trap(&mut self, event: &TrapEvent) {
        use crate::core::arch::cp0;
        let code = if event.store {
            event.trap.cause_code_store()
        } else {
            event.trap.cause_code()
        };
        self.set_cp0(cp0::REG_EPC, event.pc);
        self.set_cp0(cp0::REG_CAUSE, code << cp0::CAUSE_CODE_SHIFT);
        if let Some(addr) = event.trap.bad_vaddr() {
            self.set_cp0(cp0::REG_BADVADDR, addr);
        }
        let status = self.regs.read_cp0(cp0::REG_STATUS);
        self.set_cp0(cp0::REG_STATUS, status | cp0::STATUS_EXL);
    }

    /// Resets architectural state and caches to the given entry point.
    pub fn reset(&mut self, entry: u32, cycle_seed: u64) {
        self.regs.reset();
        self.regs.set_pc_silent(entry);
        self.icache.reset(cycle_seed);
        self.dcache.reset(cycle_seed);
        self.stats = MachineStats::default();
        self.events.drain();
    }
}
