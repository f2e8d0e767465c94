//! Arithmetic/logic unit.
//!
//! Pure evaluation of the integer operations shared by both execution
//! engines. Trapping variants (`ADD`, `ADDI`, `SUB`) raise `Overflow` on
//! signed overflow; the unsigned variants wrap. Multiply and divide are
//! handled by the engines directly because they produce a HI/LO pair.

use crate::common::error::Trap;

/// ALU operation selector.
///
/// For the shift operations, operand `a` is the shift amount (constant or
/// register, masked to 5 bits) and operand `b` is the value being shifted.
/// For everything else `a` and `b` are the left and right operands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AluOp {
    /// Shift left logical.
    #[default]
    Sll,
    /// Shift right logical.
    Srl,
    /// Shift right arithmetic.
    Sra,
    /// Signed addition; traps on overflow.
    Add,
    /// Unsigned (wrapping) addition.
    Addu,
    /// Signed subtraction; traps on overflow.
    Sub,
    /// Unsigned (wrapping) subtraction.
    Subu,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Bitwise NOR.
    Nor,
    /// Set on signed less-than.
    Slt,
    /// Set on unsigned less-than.
    Sltu,
}

/// Evaluates one ALU operation.
///
/// # Arguments
///
/// * `op` - Operation selector.
/// * `a` - Left operand, or the shift amount for shifts.
/// * `b` - Right operand, or the shifted value for shifts.
/// * `pc` - Address of the executing instruction, reported by overflow traps.
///
/// # Returns
///
/// The 32-bit result, or `Trap::Overflow` for trapping arithmetic.
pub fn operate(op: AluOp, a: u32, b: u32, pc: u32) -> Result<u32, Trap> {
    let result = match op {
        AluOp::Sll => b << (a & 0x1f),
        AluOp::Srl => b >> (a & 0x1f),
        AluOp::Sra => ((b as i32) >> (a & 0x1f)) as u32,
        AluOp::Add => (a as i32)
            .checked_add(b as i32)
            .ok_or(Trap::Overflow(pc))? as u32,
        AluOp::Addu => a.wrapping_add(b),
        AluOp::Sub => (a as i32)
            .checked_sub(b as i32)
            .ok_or(Trap::Overflow(pc))? as u32,
        AluOp::Subu => a.wrapping_sub(b),
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Nor => !(a | b),
        AluOp::Slt => u32::from((a as i32) < (b as i32)),
        AluOp::Sltu => u32::from(a < b),
    };
    Ok(result)
}
