//! Execution tracer.
//!
//! Subscribes to machine change notifications and prints per-stage
//! instruction traces and register changes according to the command-line
//! flags. The tracer holds no references into the machine; it only sees
//! the typed events dispatched between cycles.

use mips_core::common::events::{MachineEvent, RegKind, Stage};
use mips_core::isa::disasm::disassemble_word;
use mips_core::Machine;

/// Trace configuration assembled from the command line.
#[derive(Clone, Copy, Debug, Default)]
pub struct Tracer {
    /// Trace instructions entering fetch.
    pub fetch: bool,
    /// Trace instructions in decode (pipelined core only).
    pub decode: bool,
    /// Trace instructions in execute (pipelined core only).
    pub execute: bool,
    /// Trace instructions in memory (pipelined core only).
    pub memory: bool,
    /// Trace instructions in write-back (pipelined core only).
    pub writeback: bool,
    /// Print program counter changes.
    pub pc: bool,
    /// Print HI register changes.
    pub hi: bool,
    /// Print LO register changes.
    pub lo: bool,
    /// Per-register general-purpose change tracing.
    pub gp: [bool; 32],
}

impl Tracer {
    /// Returns whether any trace output is enabled.
    fn active(&self) -> bool {
        self.fetch
            || self.decode
            || self.execute
            || self.memory
            || self.writeback
            || self.pc
            || self.hi
            || self.lo
            || self.gp.iter().any(|&enabled| enabled)
    }

    fn stage_enabled(&self, stage: Stage) -> bool {
        match stage {
            Stage::If => self.fetch,
            Stage::Id => self.decode,
            Stage::Ex => self.execute,
            Stage::Mem => self.memory,
            Stage::Wb => self.writeback,
        }
    }

    /// Subscribes this tracer to the machine's event stream.
    pub fn install(self, machine: &mut Machine) {
        if !self.active() {
            return;
        }
        machine.subscribe(Box::new(move |event| match event {
            MachineEvent::StageTrace { stage, pc, word } => {
                if self.stage_enabled(*stage) {
                    println!(
                        "{:<3} {:#010x}: {}",
                        stage.label(),
                        pc,
                        disassemble_word(*word, *pc)
                    );
                }
            }
            MachineEvent::RegChange(change) => match change.kind {
                RegKind::Gp => {
                    if self.gp[change.index as usize] {
                        println!("GP {}: {:#010x}", change.index, change.new);
                    }
                }
                RegKind::Pc => {
                    if self.pc {
                        println!("PC: {:#010x}", change.new);
                    }
                }
                RegKind::Hi => {
                    if self.hi {
                        println!("HI: {:#010x}", change.new);
                    }
                }
                RegKind::Lo => {
                    if self.lo {
                        println!("LO: {:#010x}", change.new);
                    }
                }
                RegKind::Cp0 => {}
            },
            _ => {}
        }));
    }
}
