//! Instruction decode (ID) stage.
//!
//! Decodes the fetched word into an `Instruction`, derives the control
//! signals, and reads the source operands from the register file. Decode
//! failures ride the latch as traps so they are taken precisely at
//! write-back.

use crate::core::pipeline::latches::{IdEx, IfId};
use crate::core::pipeline::signals::ControlSignals;
use crate::core::Cpu;
use crate::isa::decode::decode;
use crate::isa::instruction::Instruction;

/// Executes the instruction decode stage.
///
/// # Arguments
///
/// * `cpu` - The CPU state (provides the register file).
/// * `if_id` - The IF/ID latch produced by fetch.
///
/// # Returns
///
/// The ID/EX latch; bubbles pass through unchanged and fetch traps are
/// propagated with a NOP payload.
pub fn decode_stage(cpu: &Cpu, if_id: &IfId) -> IdEx {
    if !if_id.valid {
        return IdEx::bubble();
    }

    if let Some(trap) = &if_id.trap {
        return IdEx {
            valid: true,
            pc: if_id.pc,
            trap: Some(trap.clone()),
            ..IdEx::default()
        };
    }

    match decode(if_id.word) {
        Ok(inst) => {
            let ctrl = ControlSignals::from_instruction(&inst);
            IdEx {
                valid: true,
                pc: if_id.pc,
                inst,
                ctrl,
                rs_val: cpu.regs.read_gp(inst.rs as usize),
                rt_val: cpu.regs.read_gp(inst.rt as usize),
                trap: None,
            }
        }
        Err(trap) => IdEx {
            valid: true,
            pc: if_id.pc,
            inst: Instruction::NOP,
            ctrl: ControlSignals::default(),
            rs_val: 0,
            rt_val: 0,
            trap: Some(trap),
        },
    }
}
