//! MIPS machine word decoder.
//!
//! Translates a 32-bit encoding into an `Instruction` record. The decode is
//! exhaustive over the supported subset: the primary opcode selects the
//! format, the function field resolves `SPECIAL`, the `rt` field resolves
//! `REGIMM`, and the `rs` field resolves `COP0`. Anything else raises
//! `Trap::UnsupportedInstruction`.

use crate::common::error::Trap;
use crate::isa::instruction::{Instruction, InstructionBits, Op};
use crate::isa::opcodes::{cop0, funct, op, regimm};

/// Resolves a `SPECIAL` (R-type) function code.
fn decode_special(word: u32) -> Result<Op, Trap> {
    match word.funct() {
        funct::SLL => Ok(Op::Sll),
        funct::SRL => Ok(Op::Srl),
        funct::SRA => Ok(Op::Sra),
        funct::SLLV => Ok(Op::Sllv),
        funct::SRLV => Ok(Op::Srlv),
        funct::SRAV => Ok(Op::Srav),
        funct::JR => Ok(Op::Jr),
        funct::JALR => Ok(Op::Jalr),
        funct::SYSCALL => Ok(Op::Syscall),
        funct::BREAK => Ok(Op::Break),
        funct::MFHI => Ok(Op::Mfhi),
        funct::MTHI => Ok(Op::Mthi),
        funct::MFLO => Ok(Op::Mflo),
        funct::MTLO => Ok(Op::Mtlo),
        funct::MULT => Ok(Op::Mult),
        funct::MULTU => Ok(Op::Multu),
        funct::DIV => Ok(Op::Div),
        funct::DIVU => Ok(Op::Divu),
        funct::ADD => Ok(Op::Add),
        funct::ADDU => Ok(Op::Addu),
        funct::SUB => Ok(Op::Sub),
        funct::SUBU => Ok(Op::Subu),
        funct::AND => Ok(Op::And),
        funct::OR => Ok(Op::Or),
        funct::XOR => Ok(Op::Xor),
        funct::NOR => Ok(Op::Nor),
        funct::SLT => Ok(Op::Slt),
        funct::SLTU => Ok(Op::Sltu),
        _ => Err(Trap::UnsupportedInstruction(word)),
    }
}

/// Resolves a `REGIMM` branch code held in the `rt` field.
fn decode_regimm(word: u32) -> Result<Op, Trap> {
    match word.rt() as u32 {
        regimm::BLTZ => Ok(Op::Bltz),
        regimm::BGEZ => Ok(Op::Bgez),
        regimm::BLTZAL => Ok(Op::Bltzal),
        regimm::BGEZAL => Ok(Op::Bgezal),
        _ => Err(Trap::UnsupportedInstruction(word)),
    }
}

/// Resolves a `COP0` move code held in the `rs` field.
fn decode_cop0(word: u32) -> Result<Op, Trap> {
    match word.rs() as u32 {
        cop0::MFC0 => Ok(Op::Mfc0),
        cop0::MTC0 => Ok(Op::Mtc0),
        _ => Err(Trap::UnsupportedInstruction(word)),
    }
}

/// Decodes one machine word.
///
/// # Arguments
///
/// * `word` - The 32-bit instruction encoding.
///
/// # Returns
///
/// The decoded `Instruction`, or `Trap::UnsupportedInstruction` when the
/// encoding is not part of the supported subset.
pub fn decode(word: u32) -> Result<Instruction, Trap> {
    let operation = match word.opcode() {
        op::SPECIAL => decode_special(word)?,
        op::REGIMM => decode_regimm(word)?,
        op::J => Op::J,
        op::JAL => Op::Jal,
        op::BEQ => Op::Beq,
        op::BNE => Op::Bne,
        op::BLEZ => Op::Blez,
        op::BGTZ => Op::Bgtz,
        op::ADDI => Op::Addi,
        op::ADDIU => Op::Addiu,
        op::SLTI => Op::Slti,
        op::SLTIU => Op::Sltiu,
        op::ANDI => Op::Andi,
        op::ORI => Op::Ori,
        op::XORI => Op::Xori,
        op::LUI => Op::Lui,
        op::COP0 => decode_cop0(word)?,
        op::LB => Op::Lb,
        op::LH => Op::Lh,
        op::LW => Op::Lw,
        op::LBU => Op::Lbu,
        op::LHU => Op::Lhu,
        op::SB => Op::Sb,
        op::SH => Op::Sh,
        op::SW => Op::Sw,
        _ => return Err(Trap::UnsupportedInstruction(word)),
    };

    Ok(Instruction {
        word,
        op: operation,
        rs: word.rs() as u8,
        rt: word.rt() as u8,
        rd: word.rd() as u8,
        shamt: word.shamt() as u8,
        imm: word.imm16() as u16,
        target: word.target26(),
    })
}
