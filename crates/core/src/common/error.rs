//! Trap definitions for the MIPS machine simulator.
//!
//! This module defines the error handling mechanisms for the simulator. It provides:
//! 1. **Trap Representation:** All synchronous CPU error conditions the cores can raise.
//! 2. **Cause Codes:** The Coprocessor 0 `Cause` exception codes latched on a trap.
//! 3. **Error Handling:** Integration with the standard Rust error traits.

use std::fmt;

/// CPU trap kinds raised by the cores and the address space.
///
/// A trap stops execution: the machine latches the faulting PC in `EPC`, the
/// cause code in `Cause`, and, for address errors, the offending address in
/// `BadVAddr`. Traps carry the value most useful for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trap {
    /// The decoder rejected the machine word.
    ///
    /// The associated value is the unrecognised instruction encoding.
    UnsupportedInstruction(u32),

    /// The ALU reached an operand combination with no defined operation.
    ///
    /// The associated value is the instruction encoding that produced it.
    UnsupportedAlu(u32),

    /// Signed overflow on a trapping arithmetic variant (ADD, ADDI, SUB).
    ///
    /// The associated value is the address of the trapping instruction.
    Overflow(u32),

    /// Jump or branch target not aligned to the instruction size.
    ///
    /// The associated value is the misaligned target address.
    UnalignedJump(u32),

    /// Data access not aligned to its width.
    ///
    /// The associated value is the misaligned data address.
    UnalignedAccess(u32),

    /// Access to an address with no backing memory or peripheral.
    ///
    /// The associated value is the unmapped address.
    BusError(u32),
}

/// MIPS Coprocessor 0 `Cause` register exception codes.
mod cause {
    /// Address error on load or instruction fetch.
    pub const ADEL: u32 = 4;
    /// Address error on store.
    pub const ADES: u32 = 5;
    /// Bus error on instruction fetch or data access.
    pub const DBE: u32 = 7;
    /// Reserved instruction.
    pub const RI: u32 = 10;
    /// Arithmetic overflow.
    pub const OV: u32 = 12;
}

impl Trap {
    /// Returns the Coprocessor 0 `Cause` exception code for this trap.
    ///
    /// Unaligned accesses report the load flavour; callers that know the
    /// access was a store use `cause_code_store`.
    pub fn cause_code(&self) -> u32 {
        match self {
            Trap::UnsupportedInstruction(_) | Trap::UnsupportedAlu(_) => cause::RI,
            Trap::Overflow(_) => cause::OV,
            Trap::UnalignedJump(_) | Trap::UnalignedAccess(_) => cause::ADEL,
            Trap::BusError(_) => cause::DBE,
        }
    }

    /// Alternate cause code when the faulting access was a store.
    pub fn cause_code_store(&self) -> u32 {
        match self {
            Trap::UnalignedAccess(_) => cause::ADES,
            _ => self.cause_code(),
        }
    }

    /// Returns the address to latch into `BadVAddr`, if this trap has one.
    pub fn bad_vaddr(&self) -> Option<u32> {
        match self {
            Trap::UnalignedJump(addr) | Trap::UnalignedAccess(addr) | Trap::BusError(addr) => {
                Some(*addr)
            }
            _ => None,
        }
    }

    /// Returns the single-letter failure class used by `--fail-match`.
    ///
    /// `I` unsupported instruction, `A` unsupported ALU operation,
    /// `O` overflow, `J` unaligned jump or access. Bus errors have no
    /// letter and only satisfy a bare `--expect-fail`.
    pub fn fail_letter(&self) -> Option<char> {
        match self {
            Trap::UnsupportedInstruction(_) => Some('I'),
            Trap::UnsupportedAlu(_) => Some('A'),
            Trap::Overflow(_) => Some('O'),
            Trap::UnalignedJump(_) | Trap::UnalignedAccess(_) => Some('J'),
            Trap::BusError(_) => None,
        }
    }
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trap::UnsupportedInstruction(word) => {
                write!(f, "UnsupportedInstruction({:#010x})", word)
            }
            Trap::UnsupportedAlu(word) => write!(f, "UnsupportedAlu({:#010x})", word),
            Trap::Overflow(pc) => write!(f, "Overflow(pc={:#010x})", pc),
            Trap::UnalignedJump(addr) => write!(f, "UnalignedJump({:#010x})", addr),
            Trap::UnalignedAccess(addr) => write!(f, "UnalignedAccess({:#010x})", addr),
            Trap::BusError(addr) => write!(f, "BusError({:#010x})", addr),
        }
    }
}

impl std::error::Error for Trap {}
