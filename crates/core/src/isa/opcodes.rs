//! Instruction field masks and opcode constants for the MIPS-I subset.
//!
//! All three MIPS formats share the primary opcode in bits 31-26:
//!
//! ```text
//! R-type: | op 6 | rs 5 | rt 5 | rd 5 | shamt 5 | funct 6 |
//! I-type: | op 6 | rs 5 | rt 5 |       imm 16            |
//! J-type: | op 6 |            target 26                  |
//! ```

/// Bit shift of the primary opcode field.
pub const OPCODE_SHIFT: u32 = 26;
/// Bit mask of the primary opcode field (after shifting).
pub const OPCODE_MASK: u32 = 0x3f;
/// Bit shift of the `rs` register field.
pub const RS_SHIFT: u32 = 21;
/// Bit shift of the `rt` register field.
pub const RT_SHIFT: u32 = 16;
/// Bit shift of the `rd` register field.
pub const RD_SHIFT: u32 = 11;
/// Bit shift of the shift-amount field.
pub const SHAMT_SHIFT: u32 = 6;
/// Bit mask of a 5-bit register or shift-amount field (after shifting).
pub const REG_MASK: u32 = 0x1f;
/// Bit mask of the R-type function field.
pub const FUNCT_MASK: u32 = 0x3f;
/// Bit mask of the I-type immediate field.
pub const IMM_MASK: u32 = 0xffff;
/// Bit mask of the J-type target field.
pub const TARGET_MASK: u32 = 0x03ff_ffff;

/// Primary opcodes.
pub mod op {
    /// R-type instructions; the function field selects the operation.
    pub const SPECIAL: u32 = 0x00;
    /// Conditional branches selected by the `rt` field.
    pub const REGIMM: u32 = 0x01;
    pub const J: u32 = 0x02;
    pub const JAL: u32 = 0x03;
    pub const BEQ: u32 = 0x04;
    pub const BNE: u32 = 0x05;
    pub const BLEZ: u32 = 0x06;
    pub const BGTZ: u32 = 0x07;
    pub const ADDI: u32 = 0x08;
    pub const ADDIU: u32 = 0x09;
    pub const SLTI: u32 = 0x0a;
    pub const SLTIU: u32 = 0x0b;
    pub const ANDI: u32 = 0x0c;
    pub const ORI: u32 = 0x0d;
    pub const XORI: u32 = 0x0e;
    pub const LUI: u32 = 0x0f;
    /// Coprocessor 0 moves; the `rs` field selects MFC0/MTC0.
    pub const COP0: u32 = 0x10;
    pub const LB: u32 = 0x20;
    pub const LH: u32 = 0x21;
    pub const LW: u32 = 0x23;
    pub const LBU: u32 = 0x24;
    pub const LHU: u32 = 0x25;
    pub const SB: u32 = 0x28;
    pub const SH: u32 = 0x29;
    pub const SW: u32 = 0x2b;
}

/// Function codes for `SPECIAL` (R-type) instructions.
pub mod funct {
    pub const SLL: u32 = 0x00;
    pub const SRL: u32 = 0x02;
    pub const SRA: u32 = 0x03;
    pub const SLLV: u32 = 0x04;
    pub const SRLV: u32 = 0x06;
    pub const SRAV: u32 = 0x07;
    pub const JR: u32 = 0x08;
    pub const JALR: u32 = 0x09;
    pub const SYSCALL: u32 = 0x0c;
    pub const BREAK: u32 = 0x0d;
    pub const MFHI: u32 = 0x10;
    pub const MTHI: u32 = 0x11;
    pub const MFLO: u32 = 0x12;
    pub const MTLO: u32 = 0x13;
    pub const MULT: u32 = 0x18;
    pub const MULTU: u32 = 0x19;
    pub const DIV: u32 = 0x1a;
    pub const DIVU: u32 = 0x1b;
    pub const ADD: u32 = 0x20;
    pub const ADDU: u32 = 0x21;
    pub const SUB: u32 = 0x22;
    pub const SUBU: u32 = 0x23;
    pub const AND: u32 = 0x24;
    pub const OR: u32 = 0x25;
    pub const XOR: u32 = 0x26;
    pub const NOR: u32 = 0x27;
    pub const SLT: u32 = 0x2a;
    pub const SLTU: u32 = 0x2b;
}

/// `rt`-field codes for `REGIMM` branches.
pub mod regimm {
    pub const BLTZ: u32 = 0x00;
    pub const BGEZ: u32 = 0x01;
    pub const BLTZAL: u32 = 0x10;
    pub const BGEZAL: u32 = 0x11;
}

/// `rs`-field codes for `COP0` moves.
pub mod cop0 {
    pub const MFC0: u32 = 0x00;
    pub const MTC0: u32 = 0x04;
}
