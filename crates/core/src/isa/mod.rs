//! Instruction set support for the MIPS-I subset.
//!
//! This module groups everything that understands machine words:
//! 1. **Opcodes:** Field masks and the opcode/function/REGIMM/COP0 constants.
//! 2. **Instruction:** The decoded instruction record and its encoders.
//! 3. **Decode:** Exhaustive table-driven decoding of R, I, and J formats.
//! 4. **Disassembly:** Mnemonic rendering for traces and diagnostics.

/// Field masks and opcode constants.
pub mod opcodes;

/// Decoded instruction record, operation enum, and encoders.
pub mod instruction;

/// Machine word decoder.
pub mod decode;

/// Instruction disassembler.
pub mod disasm;

pub use decode::decode;
pub use disasm::disassemble;
pub use instruction::{Instruction, InstructionBits, Op};
