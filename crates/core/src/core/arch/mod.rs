//! Architectural register state.
//!
//! This module provides the unified `Registers` interface over the
//! general-purpose register file (with HI/LO and PC) and Coprocessor 0.
//! Every effective write reports an `(old, new)` pair so the owning `Cpu`
//! can emit exactly one change notification per write; reads are free of
//! side effects.

/// General-purpose registers, HI/LO, and the program counter.
pub mod gpr;

/// Coprocessor 0 registers and trap-latching constants.
pub mod cp0;

use self::cp0::Cp0;
use self::gpr::Gpr;

/// Unified register file for one core.
pub struct Registers {
    gpr: Gpr,
    cp0: Cp0,
}

impl Registers {
    /// Creates a register file with all registers zero.
    pub fn new() -> Self {
        Self {
            gpr: Gpr::new(),
            cp0: Cp0::new(),
        }
    }

    /// Reads a general-purpose register; `$zero` always reads 0.
    #[inline]
    pub fn read_gp(&self, idx: usize) -> u32 {
        self.gpr.read(idx)
    }

    /// Writes a general-purpose register.
    ///
    /// Writes to `$zero` are architecturally discarded and return `None`;
    /// every other write returns `(index, old, new)`.
    pub fn write_gp(&mut self, idx: usize, val: u32) -> Option<(u8, u32, u32)> {
        self.gpr.write(idx, val)
    }

    /// Reads the program counter.
    #[inline]
    pub fn read_pc(&self) -> u32 {
        self.gpr.pc
    }

    /// Writes the program counter, returning `(old, new)`.
    pub fn write_pc(&mut self, val: u32) -> Option<(u32, u32)> {
        let old = self.gpr.pc;
        self.gpr.pc = val;
        Some((old, val))
    }

    /// Writes the program counter without reporting a change.
    ///
    /// Used for machine construction and reset, which are not cycles.
    pub fn set_pc_silent(&mut self, val: u32) {
        self.gpr.pc = val;
    }

    /// Reads the HI register.
    #[inline]
    pub fn read_hi(&self) -> u32 {
        self.gpr.hi
    }

    /// Writes the HI register, returning `(old, new)`.
    pub fn write_hi(&mut self, val: u32) -> Option<(u32, u32)> {
        let old = self.gpr.hi;
        self.gpr.hi = val;
        Some((old, val))
    }

    /// Reads the LO register.
    #[inline]
    pub fn read_lo(&self) -> u32 {
        self.gpr.lo
    }

    /// Writes the LO register, returning `(old, new)`.
    pub fn write_lo(&mut self, val: u32) -> Option<(u32, u32)> {
        let old = self.gpr.lo;
        self.gpr.lo = val;
        Some((old, val))
    }

    /// Reads a Coprocessor 0 register by register number.
    #[inline]
    pub fn read_cp0(&self, reg: usize) -> u32 {
        self.cp0.read(reg)
    }

    /// Writes a Coprocessor 0 register, returning `(old, new)`.
    pub fn write_cp0(&mut self, reg: usize, val: u32) -> Option<(u32, u32)> {
        Some(self.cp0.write(reg, val))
    }

    /// Clears all registers (including CP0) to zero.
    pub fn reset(&mut self) {
        self.gpr = Gpr::new();
        self.cp0 = Cp0::new();
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
