//! Instruction disassembler for the MIPS-I subset.
//!
//! Converts a decoded instruction (or a raw encoding) into a human-readable
//! mnemonic string for debug tracing, logging, and test diagnostics.
//! Branch and jump targets are rendered as absolute addresses using the
//! instruction's own address.
//!
//! # Usage
//!
//! ```ignore
//! use mips_core::isa::disasm::disassemble_word;
//! let text = disassemble_word(0x2401_0001, 0x8002_0000); // addiu $at, $zero, 1
//! assert_eq!(text, "addiu $at, $zero, 1");
//! ```

use crate::common::constants::REGISTER_NAMES;
use crate::isa::decode::decode;
use crate::isa::instruction::{Instruction, Op};

/// Returns the conventional `$`-prefixed name for a register index.
#[inline]
fn reg(idx: u8) -> String {
    match REGISTER_NAMES.get(idx as usize) {
        Some(name) => format!("${}", name),
        None => "$??".to_string(),
    }
}

/// Disassembles a decoded instruction located at `pc`.
///
/// # Arguments
///
/// * `inst` - The decoded instruction.
/// * `pc` - The address of the instruction, used to resolve branch and
///   jump targets to absolute addresses.
///
/// # Returns
///
/// A mnemonic string like `"add $t0, $t1, $t2"`.
pub fn disassemble(inst: &Instruction, pc: u32) -> String {
    if inst.is_nop() {
        return "nop".to_string();
    }
    let m = inst.op.mnemonic();
    match inst.op {
        Op::Sll | Op::Srl | Op::Sra => {
            format!("{} {}, {}, {}", m, reg(inst.rd), reg(inst.rt), inst.shamt)
        }
        Op::Sllv | Op::Srlv | Op::Srav => {
            format!("{} {}, {}, {}", m, reg(inst.rd), reg(inst.rt), reg(inst.rs))
        }
        Op::Jr | Op::Mthi | Op::Mtlo => format!("{} {}", m, reg(inst.rs)),
        Op::Jalr => format!("{} {}, {}", m, reg(inst.rd), reg(inst.rs)),
        Op::Syscall | Op::Break => m.to_string(),
        Op::Mfhi | Op::Mflo => format!("{} {}", m, reg(inst.rd)),
        Op::Mult | Op::Multu | Op::Div | Op::Divu => {
            format!("{} {}, {}", m, reg(inst.rs), reg(inst.rt))
        }
        Op::Add
        | Op::Addu
        | Op::Sub
        | Op::Subu
        | Op::And
        | Op::Or
        | Op::Xor
        | Op::Nor
        | Op::Slt
        | Op::Sltu => {
            format!("{} {}, {}, {}", m, reg(inst.rd), reg(inst.rs), reg(inst.rt))
        }
        Op::Bltz | Op::Bgez | Op::Bltzal | Op::Bgezal => {
            format!("{} {}, {:#010x}", m, reg(inst.rs), inst.branch_target(pc))
        }
        Op::J | Op::Jal => format!("{} {:#010x}", m, inst.jump_target(pc)),
        Op::Beq | Op::Bne => format!(
            "{} {}, {}, {:#010x}",
            m,
            reg(inst.rs),
            reg(inst.rt),
            inst.branch_target(pc)
        ),
        Op::Blez | Op::Bgtz => {
            format!("{} {}, {:#010x}", m, reg(inst.rs), inst.branch_target(pc))
        }
        Op::Addi | Op::Addiu | Op::Slti | Op::Sltiu => {
            format!("{} {}, {}, {}", m, reg(inst.rt), reg(inst.rs), inst.imm_se())
        }
        Op::Andi | Op::Ori | Op::Xori => format!(
            "{} {}, {}, {:#x}",
            m,
            reg(inst.rt),
            reg(inst.rs),
            inst.imm_ze()
        ),
        Op::Lui => format!("{} {}, {:#x}", m, reg(inst.rt), inst.imm_ze()),
        Op::Lb | Op::Lh | Op::Lw | Op::Lbu | Op::Lhu | Op::Sb | Op::Sh | Op::Sw => {
            format!("{} {}, {}({})", m, reg(inst.rt), inst.imm_se(), reg(inst.rs))
        }
        Op::Mfc0 | Op::Mtc0 => format!("{} {}, ${}", m, reg(inst.rt), inst.rd),
    }
}

/// Disassembles a raw machine word located at `pc`.
///
/// Returns `"unknown"` for encodings outside the supported subset.
pub fn disassemble_word(word: u32, pc: u32) -> String {
    match decode(word) {
        Ok(inst) => disassemble(&inst, pc),
        Err(_) => "unknown".to_string(),
    }
}
