//! Data hazard detection and forwarding.
//!
//! This module implements the logic for maintaining pipeline consistency
//! when data dependencies exist between instructions. It provides:
//! 1. **Load-use detection:** One-bubble stalls when a load's consumer sits
//!    in decode while the load executes.
//! 2. **Full RAW detection:** For the forwarding-free `Stall` hazard unit,
//!    stalls until the producer has written back.
//! 3. **Operand forwarding:** Supplies EX/MEM and MEM/WB results to EX
//!    inputs, with EX/MEM taking priority.
//!
//! Source registers of the instruction still in IF/ID are taken from the
//! raw field positions; instructions that do not read a field simply never
//! match a producer's destination in practice, and a spurious match only
//! costs a cycle, never correctness.

use crate::core::pipeline::latches::{ExMem, IdEx, IfId, MemWb};
use crate::core::pipeline::signals::dest_index;
use crate::isa::instruction::InstructionBits;

/// Checks whether a producer writing `dest` is used by the raw word in IF/ID.
fn word_uses(word: u32, dest: usize) -> bool {
    word.rs() == dest || word.rt() == dest
}

/// Checks if a stall is needed due to a load-use data hazard.
///
/// A load-use hazard occurs when the instruction in decode depends on data
/// that is currently being loaded by the instruction in execute; the value
/// only becomes forwardable once the load reaches MEM/WB.
///
/// # Arguments
///
/// * `id_ex` - The ID/EX latch holding the instruction entering execute.
/// * `if_id` - The IF/ID latch holding the instruction being decoded.
///
/// # Returns
///
/// `true` if one bubble must be inserted.
pub fn load_use_stall(id_ex: &IdEx, if_id: &IfId) -> bool {
    if !id_ex.valid || !if_id.valid || !id_ex.ctrl.mem_read {
        return false;
    }
    match dest_index(&id_ex.ctrl, &id_ex.inst) {
        Some(dest) => word_uses(if_id.word, dest),
        None => false,
    }
}

/// Checks if a stall is needed under the forwarding-free `Stall` hazard unit.
///
/// The consumer in decode must wait while any producer of one of its source
/// registers is still in execute or memory; producers in MEM/WB commit
/// before decode reads the register file in the same cycle.
///
/// # Arguments
///
/// * `id_ex` - The ID/EX latch (producer one cycle ahead).
/// * `ex_mem` - The EX/MEM latch (producer two cycles ahead).
/// * `if_id` - The IF/ID latch holding the consumer.
///
/// # Returns
///
/// `true` if a bubble must be inserted.
pub fn raw_stall(id_ex: &IdEx, ex_mem: &ExMem, if_id: &IfId) -> bool {
    if !if_id.valid {
        return false;
    }
    if id_ex.valid {
        if let Some(dest) = dest_index(&id_ex.ctrl, &id_ex.inst) {
            if word_uses(if_id.word, dest) {
                return true;
            }
        }
    }
    if ex_mem.valid {
        if let Some(dest) = dest_index(&ex_mem.ctrl, &ex_mem.inst) {
            if word_uses(if_id.word, dest) {
                return true;
            }
        }
    }
    false
}

/// Forwards EX/MEM and MEM/WB results into the operands of `id_ex`.
///
/// MEM/WB is applied first and EX/MEM second, so the younger result wins
/// when both latches write the same register. Loads never forward from
/// EX/MEM; the load-use stall guarantees their consumers are at least two
/// instructions behind.
///
/// # Arguments
///
/// * `id_ex` - The latch about to execute; `rs_val`/`rt_val` are updated.
/// * `ex_mem` - The EX/MEM latch holding the one-cycle-older result.
/// * `mem_wb` - The MEM/WB latch holding the two-cycle-older result.
pub fn forward_operands(id_ex: &mut IdEx, ex_mem: &ExMem, mem_wb: &MemWb) {
    if !id_ex.valid {
        return;
    }
    let rs = id_ex.inst.rs as usize;
    let rt = id_ex.inst.rt as usize;

    if mem_wb.valid && mem_wb.trap.is_none() {
        if let Some(dest) = dest_index(&mem_wb.ctrl, &mem_wb.inst) {
            let value = mem_wb.commit_value();
            if dest == rs {
                id_ex.rs_val = value;
            }
            if dest == rt {
                id_ex.rt_val = value;
            }
        }
    }

    if ex_mem.valid && ex_mem.trap.is_none() && !ex_mem.ctrl.mem_read {
        if let Some(dest) = dest_index(&ex_mem.ctrl, &ex_mem.inst) {
            if dest == rs {
                id_ex.rs_val = ex_mem.alu;
            }
            if dest == rt {
                id_ex.rt_val = ex_mem.alu;
            }
        }
    }
}
