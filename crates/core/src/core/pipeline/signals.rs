//! Pipeline control signals.
//!
//! This module defines the signals that steer an instruction through the
//! stages. It performs:
//! 1. **Operand Selection:** Sources for the two ALU inputs (registers,
//!    shift amount, immediate variants).
//! 2. **Result Selection:** Which unit produces the EX-stage result (ALU,
//!    HI/LO reads, Coprocessor 0 reads).
//! 3. **Memory Control:** Access width and sign extension for loads.
//! 4. **Control Flow:** Branch condition kinds and link-register writes.
//!
//! The signals are derived once from a decoded instruction and carried
//! through the latches, so the stages never re-inspect opcodes.

use crate::common::data::AccessWidth;
use crate::core::units::alu::AluOp;
use crate::isa::instruction::{Instruction, Op};

/// Destination register selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DestReg {
    /// No register is written.
    #[default]
    None,
    /// Write the `rd` field register.
    Rd,
    /// Write the `rt` field register.
    Rt,
    /// Write the return-address register `$ra`.
    Ra,
}

/// Source of the first ALU operand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AluASrc {
    /// The `rs` register value.
    #[default]
    Rs,
    /// The constant shift amount field.
    Shamt,
    /// Constant zero.
    Zero,
}

/// Source of the second ALU operand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AluBSrc {
    /// The `rt` register value.
    #[default]
    Rt,
    /// Sign-extended immediate.
    ImmSigned,
    /// Zero-extended immediate.
    ImmZero,
    /// Immediate shifted into the upper half-word (LUI).
    ImmUpper,
}

/// Which value the EX stage latches as its result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExResult {
    /// The ALU output.
    #[default]
    Alu,
    /// The HI register.
    Hi,
    /// The LO register.
    Lo,
    /// The Coprocessor 0 register selected by the `rd` field.
    Cp0,
}

/// Branch/jump condition evaluated in EX.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BranchKind {
    /// Not a control-flow instruction.
    #[default]
    None,
    /// Taken when `rs == rt`.
    Eq,
    /// Taken when `rs != rt`.
    Ne,
    /// Taken when `rs <= 0` (signed).
    Lez,
    /// Taken when `rs > 0` (signed).
    Gtz,
    /// Taken when `rs < 0` (signed).
    Ltz,
    /// Taken when `rs >= 0` (signed).
    Gez,
    /// Unconditional jump to the 26-bit target.
    Jump,
    /// Unconditional jump to the `rs` register value.
    JumpReg,
}

/// Multiplier-unit operation performed in EX.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HiLoOp {
    /// No multiplier activity.
    #[default]
    None,
    /// Signed multiply into HI/LO.
    Mult,
    /// Unsigned multiply into HI/LO.
    Multu,
    /// Signed divide: quotient to LO, remainder to HI.
    Div,
    /// Unsigned divide: quotient to LO, remainder to HI.
    Divu,
    /// Move `rs` to HI.
    Mthi,
    /// Move `rs` to LO.
    Mtlo,
}

/// Control signals for one instruction's trip through the pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlSignals {
    /// ALU operation.
    pub alu_op: AluOp,
    /// First ALU operand source.
    pub a_src: AluASrc,
    /// Second ALU operand source.
    pub b_src: AluBSrc,
    /// EX result selector.
    pub result: ExResult,
    /// Multiplier-unit operation.
    pub hilo: HiLoOp,
    /// Destination register selector.
    pub dest: DestReg,
    /// Instruction reads memory.
    pub mem_read: bool,
    /// Instruction writes memory.
    pub mem_write: bool,
    /// Memory access width.
    pub mem_width: AccessWidth,
    /// Sign-extend loaded sub-words.
    pub mem_signed: bool,
    /// Branch condition.
    pub branch: BranchKind,
    /// Write the return address to the destination register.
    pub link: bool,
    /// Write the Coprocessor 0 register selected by `rd` from `rt`.
    pub cp0_write: bool,
    /// SYSCALL; serviced by the machine at commit.
    pub syscall: bool,
    /// BREAK; stops the machine cleanly at commit.
    pub brk: bool,
}

impl ControlSignals {
    /// Derives the control signals for a decoded instruction.
    pub fn from_instruction(inst: &Instruction) -> Self {
        let mut c = ControlSignals::default();
        match inst.op {
            Op::Sll | Op::Srl | Op::Sra => {
                c.alu_op = match inst.op {
                    Op::Sll => AluOp::Sll,
                    Op::Srl => AluOp::Srl,
                    _ => AluOp::Sra,
                };
                c.a_src = AluASrc::Shamt;
                c.dest = DestReg::Rd;
            }
            Op::Sllv | Op::Srlv | Op::Srav => {
                c.alu_op = match inst.op {
                    Op::Sllv => AluOp::Sll,
                    Op::Srlv => AluOp::Srl,
                    _ => AluOp::Sra,
                };
                c.dest = DestReg::Rd;
            }
            Op::Add | Op::Addu | Op::Sub | Op::Subu | Op::And | Op::Or | Op::Xor | Op::Nor
            | Op::Slt | Op::Sltu => {
                c.alu_op = match inst.op {
                    Op::Add => AluOp::Add,
                    Op::Addu => AluOp::Addu,
                    Op::Sub => AluOp::Sub,
                    Op::Subu => AluOp::Subu,
                    Op::And => AluOp::And,
                    Op::Or => AluOp::Or,
                    Op::Xor => AluOp::Xor,
                    Op::Nor => AluOp::Nor,
                    Op::Slt => AluOp::Slt,
                    _ => AluOp::Sltu,
                };
                c.dest = DestReg::Rd;
            }
            Op::Addi | Op::Addiu | Op::Slti | Op::Sltiu => {
                c.alu_op = match inst.op {
                    Op::Addi => AluOp::Add,
                    Op::Addiu => AluOp::Addu,
                    Op::Slti => AluOp::Slt,
                    _ => AluOp::Sltu,
                };
                c.b_src = AluBSrc::ImmSigned;
                c.dest = DestReg::Rt;
            }
            Op::Andi | Op::Ori | Op::Xori => {
                c.alu_op = match inst.op {
                    Op::Andi => AluOp::And,
                    Op::Ori => AluOp::Or,
                    _ => AluOp::Xor,
                };
                c.b_src = AluBSrc::ImmZero;
                c.dest = DestReg::Rt;
            }
            Op::Lui => {
                c.alu_op = AluOp::Or;
                c.a_src = AluASrc::Zero;
                c.b_src = AluBSrc::ImmUpper;
                c.dest = DestReg::Rt;
            }
            Op::Lb | Op::Lh | Op::Lw | Op::Lbu | Op::Lhu => {
                c.alu_op = AluOp::Addu;
                c.b_src = AluBSrc::ImmSigned;
                c.dest = DestReg::Rt;
                c.mem_read = true;
                c.mem_width = match inst.op {
                    Op::Lb | Op::Lbu => AccessWidth::Byte,
                    Op::Lh | Op::Lhu => AccessWidth::Half,
                    _ => AccessWidth::Word,
                };
                c.mem_signed = matches!(inst.op, Op::Lb | Op::Lh);
            }
            Op::Sb | Op::Sh | Op::Sw => {
                c.alu_op = AluOp::Addu;
                c.b_src = AluBSrc::ImmSigned;
                c.mem_write = true;
                c.mem_width = match inst.op {
                    Op::Sb => AccessWidth::Byte,
                    Op::Sh => AccessWidth::Half,
                    _ => AccessWidth::Word,
                };
            }
            Op::Beq => c.branch = BranchKind::Eq,
            Op::Bne => c.branch = BranchKind::Ne,
            Op::Blez => c.branch = BranchKind::Lez,
            Op::Bgtz => c.branch = BranchKind::Gtz,
            Op::Bltz => c.branch = BranchKind::Ltz,
            Op::Bgez => c.branch = BranchKind::Gez,
            Op::Bltzal => {
                c.branch = BranchKind::Ltz;
                c.dest = DestReg::Ra;
                c.link = true;
            }
            Op::Bgezal => {
                c.branch = BranchKind::Gez;
                c.dest = DestReg::Ra;
                c.link = true;
            }
            Op::J => c.branch = BranchKind::Jump,
            Op::Jal => {
                c.branch = BranchKind::Jump;
                c.dest = DestReg::Ra;
                c.link = true;
            }
            Op::Jr => c.branch = BranchKind::JumpReg,
            Op::Jalr => {
                c.branch = BranchKind::JumpReg;
                c.dest = DestReg::Rd;
                c.link = true;
            }
            Op::Mult => c.hilo = HiLoOp::Mult,
            Op::Multu => c.hilo = HiLoOp::Multu,
            Op::Div => c.hilo = HiLoOp::Div,
            Op::Divu => c.hilo = HiLoOp::Divu,
            Op::Mthi => c.hilo = HiLoOp::Mthi,
            Op::Mtlo => c.hilo = HiLoOp::Mtlo,
            Op::Mfhi => {
                c.result = ExResult::Hi;
                c.dest = DestReg::Rd;
            }
            Op::Mflo => {
                c.result = ExResult::Lo;
                c.dest = DestReg::Rd;
            }
            Op::Syscall => c.syscall = true,
            Op::Break => c.brk = true,
            Op::Mfc0 => {
                c.result = ExResult::Cp0;
                c.dest = DestReg::Rt;
            }
            Op::Mtc0 => c.cp0_write = true,
        }
        c
    }
}

/// Resolves the destination register index of an instruction.
///
/// Returns `None` when the instruction writes no register or the selected
/// register is `$zero`.
pub fn dest_index(ctrl: &ControlSignals, inst: &Instruction) -> Option<usize> {
    let idx = match ctrl.dest {
        DestReg::None => return None,
        DestReg::Rd => inst.rd as usize,
        DestReg::Rt => inst.rt as usize,
        DestReg::Ra => 31,
    };
    if idx == 0 {
        None
    } else {
        Some(idx)
    }
}
