//! Decoded instruction record, operation enum, and instruction encoders.
//!
//! Provides the `Instruction` record carried through the cores, the `Op`
//! enum naming every supported operation, the `InstructionBits` trait for
//! raw field extraction, and the format encoders used by the assembler and
//! by the round-trip tests.

use crate::isa::opcodes::{
    FUNCT_MASK, IMM_MASK, OPCODE_MASK, OPCODE_SHIFT, RD_SHIFT, REG_MASK, RS_SHIFT, RT_SHIFT,
    SHAMT_SHIFT, TARGET_MASK,
};

/// Trait for extracting instruction fields from encoded machine words.
///
/// Implemented for `u32` so both the decoder and the assembler fix-up
/// patching can pick fields out of raw encodings.
pub trait InstructionBits {
    /// Extracts the primary opcode (bits 31-26).
    fn opcode(&self) -> u32;
    /// Extracts the `rs` register field (bits 25-21).
    fn rs(&self) -> usize;
    /// Extracts the `rt` register field (bits 20-16).
    fn rt(&self) -> usize;
    /// Extracts the `rd` register field (bits 15-11).
    fn rd(&self) -> usize;
    /// Extracts the shift-amount field (bits 10-6).
    fn shamt(&self) -> u32;
    /// Extracts the R-type function field (bits 5-0).
    fn funct(&self) -> u32;
    /// Extracts the I-type immediate field (bits 15-0).
    fn imm16(&self) -> u32;
    /// Extracts the J-type target field (bits 25-0).
    fn target26(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline]
    fn opcode(&self) -> u32 {
        (self >> OPCODE_SHIFT) & OPCODE_MASK
    }
    #[inline]
    fn rs(&self) -> usize {
        ((self >> RS_SHIFT) & REG_MASK) as usize
    }
    #[inline]
    fn rt(&self) -> usize {
        ((self >> RT_SHIFT) & REG_MASK) as usize
    }
    #[inline]
    fn rd(&self) -> usize {
        ((self >> RD_SHIFT) & REG_MASK) as usize
    }
    #[inline]
    fn shamt(&self) -> u32 {
        (self >> SHAMT_SHIFT) & REG_MASK
    }
    #[inline]
    fn funct(&self) -> u32 {
        self & FUNCT_MASK
    }
    #[inline]
    fn imm16(&self) -> u32 {
        self & IMM_MASK
    }
    #[inline]
    fn target26(&self) -> u32 {
        self & TARGET_MASK
    }
}

/// Every operation of the supported MIPS-I subset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    // Shifts.
    Sll,
    Srl,
    Sra,
    Sllv,
    Srlv,
    Srav,
    // Register jumps and system.
    Jr,
    Jalr,
    Syscall,
    Break,
    // Multiplier unit.
    Mfhi,
    Mthi,
    Mflo,
    Mtlo,
    Mult,
    Multu,
    Div,
    Divu,
    // Three-register arithmetic and logic.
    Add,
    Addu,
    Sub,
    Subu,
    And,
    Or,
    Xor,
    Nor,
    Slt,
    Sltu,
    // REGIMM branches.
    Bltz,
    Bgez,
    Bltzal,
    Bgezal,
    // Jumps.
    J,
    Jal,
    // I-type branches.
    Beq,
    Bne,
    Blez,
    Bgtz,
    // Immediates.
    Addi,
    Addiu,
    Slti,
    Sltiu,
    Andi,
    Ori,
    Xori,
    Lui,
    // Loads and stores.
    Lb,
    Lh,
    Lw,
    Lbu,
    Lhu,
    Sb,
    Sh,
    Sw,
    // Coprocessor 0 moves.
    Mfc0,
    Mtc0,
}

impl Op {
    /// Returns the assembly mnemonic of this operation.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Sll => "sll",
            Op::Srl => "srl",
            Op::Sra => "sra",
            Op::Sllv => "sllv",
            Op::Srlv => "srlv",
            Op::Srav => "srav",
            Op::Jr => "jr",
            Op::Jalr => "jalr",
            Op::Syscall => "syscall",
            Op::Break => "break",
            Op::Mfhi => "mfhi",
            Op::Mthi => "mthi",
            Op::Mflo => "mflo",
            Op::Mtlo => "mtlo",
            Op::Mult => "mult",
            Op::Multu => "multu",
            Op::Div => "div",
            Op::Divu => "divu",
            Op::Add => "add",
            Op::Addu => "addu",
            Op::Sub => "sub",
            Op::Subu => "subu",
            Op::And => "and",
            Op::Or => "or",
            Op::Xor => "xor",
            Op::Nor => "nor",
            Op::Slt => "slt",
            Op::Sltu => "sltu",
            Op::Bltz => "bltz",
            Op::Bgez => "bgez",
            Op::Bltzal => "bltzal",
            Op::Bgezal => "bgezal",
            Op::J => "j",
            Op::Jal => "jal",
            Op::Beq => "beq",
            Op::Bne => "bne",
            Op::Blez => "blez",
            Op::Bgtz => "bgtz",
            Op::Addi => "addi",
            Op::Addiu => "addiu",
            Op::Slti => "slti",
            Op::Sltiu => "sltiu",
            Op::Andi => "andi",
            Op::Ori => "ori",
            Op::Xori => "xori",
            Op::Lui => "lui",
            Op::Lb => "lb",
            Op::Lh => "lh",
            Op::Lw => "lw",
            Op::Lbu => "lbu",
            Op::Lhu => "lhu",
            Op::Sb => "sb",
            Op::Sh => "sh",
            Op::Sw => "sw",
            Op::Mfc0 => "mfc0",
            Op::Mtc0 => "mtc0",
        }
    }

    /// Returns whether this operation reads memory.
    pub fn is_load(self) -> bool {
        matches!(self, Op::Lb | Op::Lh | Op::Lw | Op::Lbu | Op::Lhu)
    }

    /// Returns whether this operation writes memory.
    pub fn is_store(self) -> bool {
        matches!(self, Op::Sb | Op::Sh | Op::Sw)
    }

    /// Returns whether this operation is a conditional branch.
    pub fn is_branch(self) -> bool {
        matches!(
            self,
            Op::Beq
                | Op::Bne
                | Op::Blez
                | Op::Bgtz
                | Op::Bltz
                | Op::Bgez
                | Op::Bltzal
                | Op::Bgezal
        )
    }

    /// Returns whether this operation is an unconditional jump.
    pub fn is_jump(self) -> bool {
        matches!(self, Op::J | Op::Jal | Op::Jr | Op::Jalr)
    }
}

/// A decoded machine instruction.
///
/// Carries the original encoding together with every extracted field;
/// fields not meaningful for the operation's format decode as zero.
/// Decoding is pure and deterministic over the 32-bit word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// Original machine word.
    pub word: u32,
    /// Decoded operation.
    pub op: Op,
    /// `rs` source register index.
    pub rs: u8,
    /// `rt` source/destination register index.
    pub rt: u8,
    /// `rd` destination register index.
    pub rd: u8,
    /// Constant shift amount.
    pub shamt: u8,
    /// Raw 16-bit immediate.
    pub imm: u16,
    /// Raw 26-bit jump target field.
    pub target: u32,
}

impl Instruction {
    /// The canonical NOP, `sll $0, $0, 0`, used for pipeline bubbles.
    pub const NOP: Instruction = Instruction {
        word: 0,
        op: Op::Sll,
        rs: 0,
        rt: 0,
        rd: 0,
        shamt: 0,
        imm: 0,
        target: 0,
    };

    /// Returns the sign-extended immediate.
    #[inline]
    pub fn imm_se(&self) -> i32 {
        self.imm as i16 as i32
    }

    /// Returns the zero-extended immediate.
    #[inline]
    pub fn imm_ze(&self) -> u32 {
        self.imm as u32
    }

    /// Returns the branch target relative to the instruction at `pc`.
    ///
    /// MIPS branch displacement is a signed word offset from the delay-slot
    /// address `pc + 4`.
    #[inline]
    pub fn branch_target(&self, pc: u32) -> u32 {
        pc.wrapping_add(4)
            .wrapping_add((self.imm_se() as u32) << 2)
    }

    /// Returns the absolute jump target for a J-type instruction at `pc`.
    ///
    /// The upper four bits come from the delay-slot address.
    #[inline]
    pub fn jump_target(&self, pc: u32) -> u32 {
        (pc.wrapping_add(4) & 0xf000_0000) | (self.target << 2)
    }

    /// Returns whether this instruction is the canonical NOP encoding.
    #[inline]
    pub fn is_nop(&self) -> bool {
        self.word == 0
    }

    /// Re-encodes this instruction from its decoded fields.
    ///
    /// For any instruction produced by `decode`, `encode` reproduces the
    /// original word exactly.
    pub fn encode(&self) -> u32 {
        use crate::isa::opcodes::{cop0, funct, op, regimm};
        let r = |f: u32| {
            encode_r(
                f,
                self.rs as u32,
                self.rt as u32,
                self.rd as u32,
                self.shamt as u32,
            )
        };
        let i = |o: u32| encode_i(o, self.rs as u32, self.rt as u32, self.imm);
        let ri = |code: u32| encode_regimm(code, self.rs as u32, self.imm);
        match self.op {
            Op::Sll => r(funct::SLL),
            Op::Srl => r(funct::SRL),
            Op::Sra => r(funct::SRA),
            Op::Sllv => r(funct::SLLV),
            Op::Srlv => r(funct::SRLV),
            Op::Srav => r(funct::SRAV),
            Op::Jr => r(funct::JR),
            Op::Jalr => r(funct::JALR),
            Op::Syscall => r(funct::SYSCALL),
            Op::Break => r(funct::BREAK),
            Op::Mfhi => r(funct::MFHI),
            Op::Mthi => r(funct::MTHI),
            Op::Mflo => r(funct::MFLO),
            Op::Mtlo => r(funct::MTLO),
            Op::Mult => r(funct::MULT),
            Op::Multu => r(funct::MULTU),
            Op::Div => r(funct::DIV),
            Op::Divu => r(funct::DIVU),
            Op::Add => r(funct::ADD),
            Op::Addu => r(funct::ADDU),
            Op::Sub => r(funct::SUB),
            Op::Subu => r(funct::SUBU),
            Op::And => r(funct::AND),
            Op::Or => r(funct::OR),
            Op::Xor => r(funct::XOR),
            Op::Nor => r(funct::NOR),
            Op::Slt => r(funct::SLT),
            Op::Sltu => r(funct::SLTU),
            Op::Bltz => ri(regimm::BLTZ),
            Op::Bgez => ri(regimm::BGEZ),
            Op::Bltzal => ri(regimm::BLTZAL),
            Op::Bgezal => ri(regimm::BGEZAL),
            Op::J => encode_j(op::J, self.target),
            Op::Jal => encode_j(op::JAL, self.target),
            Op::Beq => i(op::BEQ),
            Op::Bne => i(op::BNE),
            Op::Blez => i(op::BLEZ),
            Op::Bgtz => i(op::BGTZ),
            Op::Addi => i(op::ADDI),
            Op::Addiu => i(op::ADDIU),
            Op::Slti => i(op::SLTI),
            Op::Sltiu => i(op::SLTIU),
            Op::Andi => i(op::ANDI),
            Op::Ori => i(op::ORI),
            Op::Xori => i(op::XORI),
            Op::Lui => i(op::LUI),
            Op::Lb => i(op::LB),
            Op::Lh => i(op::LH),
            Op::Lw => i(op::LW),
            Op::Lbu => i(op::LBU),
            Op::Lhu => i(op::LHU),
            Op::Sb => i(op::SB),
            Op::Sh => i(op::SH),
            Op::Sw => i(op::SW),
            Op::Mfc0 => encode_cop0(cop0::MFC0, self.rt as u32, self.rd as u32),
            Op::Mtc0 => encode_cop0(cop0::MTC0, self.rt as u32, self.rd as u32),
        }
    }
}

/// Encodes an R-type instruction word.
#[inline]
pub fn encode_r(funct: u32, rs: u32, rt: u32, rd: u32, shamt: u32) -> u32 {
    ((rs & REG_MASK) << RS_SHIFT)
        | ((rt & REG_MASK) << RT_SHIFT)
        | ((rd & REG_MASK) << RD_SHIFT)
        | ((shamt & REG_MASK) << SHAMT_SHIFT)
        | (funct & FUNCT_MASK)
}

/// Encodes an I-type instruction word.
#[inline]
pub fn encode_i(opcode: u32, rs: u32, rt: u32, imm: u16) -> u32 {
    ((opcode & OPCODE_MASK) << OPCODE_SHIFT)
        | ((rs & REG_MASK) << RS_SHIFT)
        | ((rt & REG_MASK) << RT_SHIFT)
        | imm as u32
}

/// Encodes a J-type instruction word.
#[inline]
pub fn encode_j(opcode: u32, target: u32) -> u32 {
    ((opcode & OPCODE_MASK) << OPCODE_SHIFT) | (target & TARGET_MASK)
}

/// Encodes a REGIMM branch; `code` goes into the `rt` field.
#[inline]
pub fn encode_regimm(code: u32, rs: u32, imm: u16) -> u32 {
    encode_i(crate::isa::opcodes::op::REGIMM, rs, code, imm)
}

/// Encodes a COP0 move; `sel` goes into the `rs` field.
#[inline]
pub fn encode_cop0(sel: u32, rt: u32, rd: u32) -> u32 {
    ((crate::isa::opcodes::op::COP0 & OPCODE_MASK) << OPCODE_SHIFT)
        | ((sel & REG_MASK) << RS_SHIFT)
        | ((rt & REG_MASK) << RT_SHIFT)
        | ((rd & REG_MASK) << RD_SHIFT)
}
