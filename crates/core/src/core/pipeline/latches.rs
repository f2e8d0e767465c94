//! Pipeline latch structures for inter-stage communication.
//!
//! This module defines the four records carried between the five stages:
//! IF/ID, ID/EX, EX/MEM, and MEM/WB. Each latch carries the instruction,
//! the values computed so far, and any trap raised by an earlier stage
//! (traps ride the latches and are taken when the instruction reaches
//! write-back, keeping older instructions' effects committed).
//!
//! A bubble is a latch whose payload is invalid; its instruction is the
//! canonical NOP, so flushes and forwarding stay total.

use crate::common::error::Trap;
use crate::core::pipeline::signals::ControlSignals;
use crate::isa::instruction::Instruction;

/// IF/ID latch: the fetched machine word.
#[derive(Clone, Debug, Default)]
pub struct IfId {
    /// Whether this latch holds an instruction (false = bubble).
    pub valid: bool,
    /// Address of the fetched instruction.
    pub pc: u32,
    /// Raw machine word.
    pub word: u32,
    /// Trap raised during fetch, if any.
    pub trap: Option<Trap>,
}

impl IfId {
    /// Returns an empty latch.
    pub fn bubble() -> Self {
        Self::default()
    }
}

/// ID/EX latch: the decoded instruction with its operands and signals.
#[derive(Clone, Debug)]
pub struct IdEx {
    /// Whether this latch holds an instruction (false = bubble).
    pub valid: bool,
    /// Address of the instruction.
    pub pc: u32,
    /// Decoded instruction.
    pub inst: Instruction,
    /// Control signals for the downstream stages.
    pub ctrl: ControlSignals,
    /// Value read from the `rs` register.
    pub rs_val: u32,
    /// Value read from the `rt` register.
    pub rt_val: u32,
    /// Trap raised during fetch or decode, if any.
    pub trap: Option<Trap>,
}

impl Default for IdEx {
    fn default() -> Self {
        Self {
            valid: false,
            pc: 0,
            inst: Instruction::NOP,
            ctrl: ControlSignals::default(),
            rs_val: 0,
            rt_val: 0,
            trap: None,
        }
    }
}

impl IdEx {
    /// Returns an empty latch.
    pub fn bubble() -> Self {
        Self::default()
    }
}

/// EX/MEM latch: execution results and memory operation parameters.
#[derive(Clone, Debug)]
pub struct ExMem {
    /// Whether this latch holds an instruction (false = bubble).
    pub valid: bool,
    /// Address of the instruction.
    pub pc: u32,
    /// Decoded instruction.
    pub inst: Instruction,
    /// Control signals for the downstream stages.
    pub ctrl: ControlSignals,
    /// ALU result, memory address, or link value.
    pub alu: u32,
    /// Value to store (for store instructions).
    pub store_data: u32,
    /// Resolved control transfer target when the branch was taken.
    pub taken: Option<u32>,
    /// Trap raised by this or an earlier stage, if any.
    pub trap: Option<Trap>,
}

impl Default for ExMem {
    fn default() -> Self {
        Self {
            valid: false,
            pc: 0,
            inst: Instruction::NOP,
            ctrl: ControlSignals::default(),
            alu: 0,
            store_data: 0,
            taken: None,
            trap: None,
        }
    }
}

impl ExMem {
    /// Returns an empty latch.
    pub fn bubble() -> Self {
        Self::default()
    }
}

/// MEM/WB latch: the value to commit.
#[derive(Clone, Debug)]
pub struct MemWb {
    /// Whether this latch holds an instruction (false = bubble).
    pub valid: bool,
    /// Address of the instruction.
    pub pc: u32,
    /// Decoded instruction.
    pub inst: Instruction,
    /// Control signals for the write-back stage.
    pub ctrl: ControlSignals,
    /// ALU result or link value (non-load instructions).
    pub alu: u32,
    /// Data loaded from memory, already extended (load instructions).
    pub mem_data: u32,
    /// Trap raised by this or an earlier stage, if any.
    pub trap: Option<Trap>,
    /// Whether the trap came from a store access (selects the cause code).
    pub trap_store: bool,
}

impl Default for MemWb {
    fn default() -> Self {
        Self {
            valid: false,
            pc: 0,
            inst: Instruction::NOP,
            ctrl: ControlSignals::default(),
            alu: 0,
            mem_data: 0,
            trap: None,
            trap_store: false,
        }
    }
}

impl MemWb {
    /// Returns an empty latch.
    pub fn bubble() -> Self {
        Self::default()
    }

    /// Returns the value this instruction writes to its destination.
    pub fn commit_value(&self) -> u32 {
        if self.ctrl.mem_read {
            self.mem_data
        } else {
            self.alu
        }
    }
}
