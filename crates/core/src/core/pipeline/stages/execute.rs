//! Execute (EX) stage.
//!
//! This module implements the third stage. It performs the following:
//! 1. **Arithmetic:** Evaluates the ALU operation selected by the signals.
//! 2. **Branch Resolution:** Decides taken/not-taken and computes targets;
//!    register jumps to misaligned addresses trap here.
//! 3. **Multiplier Unit:** MULT/MULTU/DIV/DIVU and HI/LO moves execute and
//!    write HI/LO immediately; older instructions have already passed EX,
//!    so HI/LO dependencies need no interlock.
//! 4. **Coprocessor 0:** MFC0 reads and MTC0 writes the selected register.
//!
//! Operand values must already be forwarded by the engine before this
//! stage runs.

use crate::core::pipeline::latches::{ExMem, IdEx};
use crate::core::pipeline::signals::{AluASrc, AluBSrc, BranchKind, ExResult, HiLoOp};
use crate::core::units::alu;
use crate::core::Cpu;

/// Evaluates a branch condition against the (forwarded) operands.
fn branch_taken(kind: BranchKind, rs_val: u32, rt_val: u32) -> bool {
    match kind {
        BranchKind::None => false,
        BranchKind::Eq => rs_val == rt_val,
        BranchKind::Ne => rs_val != rt_val,
        BranchKind::Lez => (rs_val as i32) <= 0,
        BranchKind::Gtz => (rs_val as i32) > 0,
        BranchKind::Ltz => (rs_val as i32) < 0,
        BranchKind::Gez => (rs_val as i32) >= 0,
        BranchKind::Jump | BranchKind::JumpReg => true,
    }
}

/// Executes the multiplier-unit operation, writing HI/LO.
fn run_hilo(cpu: &mut Cpu, op: HiLoOp, rs_val: u32, rt_val: u32) {
    match op {
        HiLoOp::None => {}
        HiLoOp::Mult => {
            let product = i64::from(rs_val as i32) * i64::from(rt_val as i32);
            cpu.set_hi((product >> 32) as u32);
            cpu.set_lo(product as u32);
        }
        HiLoOp::Multu => {
            let product = u64::from(rs_val) * u64::from(rt_val);
            cpu.set_hi((product >> 32) as u32);
            cpu.set_lo(product as u32);
        }
        HiLoOp::Div => {
            // Division by zero leaves HI/LO unchanged (unpredictable per
            // the architecture; this keeps runs reproducible).
            if rt_val != 0 {
                let a = rs_val as i32;
                let b = rt_val as i32;
                cpu.set_lo(a.wrapping_div(b) as u32);
                cpu.set_hi(a.wrapping_rem(b) as u32);
            }
        }
        HiLoOp::Divu => {
            if rt_val != 0 {
                cpu.set_lo(rs_val / rt_val);
                cpu.set_hi(rs_val % rt_val);
            }
        }
        HiLoOp::Mthi => cpu.set_hi(rs_val),
        HiLoOp::Mtlo => cpu.set_lo(rs_val),
    }
}

/// Executes the instruction execute stage.
///
/// # Arguments
///
/// * `cpu` - The CPU state (HI/LO, CP0, delay-slot configuration).
/// * `id_ex` - The ID/EX latch with forwarded operand values.
///
/// # Returns
///
/// The EX/MEM latch; ALU overflow and misaligned register-jump targets are
/// recorded as traps riding the latch.
pub fn execute_stage(cpu: &mut Cpu, id_ex: &IdEx) -> ExMem {
    if !id_ex.valid {
        return ExMem::bubble();
    }

    if let Some(trap) = &id_ex.trap {
        return ExMem {
            valid: true,
            pc: id_ex.pc,
            inst: id_ex.inst,
            ctrl: id_ex.ctrl,
            trap: Some(trap.clone()),
            ..ExMem::default()
        };
    }

    let inst = &id_ex.inst;
    let ctrl = &id_ex.ctrl;

    let a = match ctrl.a_src {
        AluASrc::Rs => id_ex.rs_val,
        AluASrc::Shamt => u32::from(inst.shamt),
        AluASrc::Zero => 0,
    };
    let b = match ctrl.b_src {
        AluBSrc::Rt => id_ex.rt_val,
        AluBSrc::ImmSigned => inst.imm_se() as u32,
        AluBSrc::ImmZero => inst.imm_ze(),
        AluBSrc::ImmUpper => inst.imm_ze() << 16,
    };

    let mut out = ExMem {
        valid: true,
        pc: id_ex.pc,
        inst: *inst,
        ctrl: *ctrl,
        alu: 0,
        store_data: id_ex.rt_val,
        taken: None,
        trap: None,
    };

    let alu_value = match alu::operate(ctrl.alu_op, a, b, id_ex.pc) {
        Ok(value) => value,
        Err(trap) => {
            out.trap = Some(trap);
            return out;
        }
    };

    if branch_taken(ctrl.branch, id_ex.rs_val, id_ex.rt_val) {
        let target = match ctrl.branch {
            BranchKind::Jump => inst.jump_target(id_ex.pc),
            BranchKind::JumpReg => id_ex.rs_val,
            _ => inst.branch_target(id_ex.pc),
        };
        if target & 3 != 0 {
            out.trap = Some(crate::common::error::Trap::UnalignedJump(target));
            return out;
        }
        out.taken = Some(target);
    }

    run_hilo(cpu, ctrl.hilo, id_ex.rs_val, id_ex.rt_val);

    if ctrl.cp0_write {
        cpu.set_cp0(inst.rd as usize, id_ex.rt_val);
    }

    out.alu = if ctrl.link {
        let step = if cpu.delay_slot { 8 } else { 4 };
        id_ex.pc.wrapping_add(step)
    } else {
        match ctrl.result {
            ExResult::Alu => alu_value,
            ExResult::Hi => cpu.regs.read_hi(),
            ExResult::Lo => cpu.regs.read_lo(),
            ExResult::Cp0 => cpu.regs.read_cp0(inst.rd as usize),
        }
    };

    out
}
